//! LFG posting store access and lifecycle policy.
//!
//! A posting is `active` from creation until someone completes or cancels
//! it, or until its expiry lapses. Expiry is enforced twice: the read path
//! never serves an expired posting as active, and a background sweep closes
//! stale rows out so admin-facing counts agree with what readers see.

use crate::app_config;
use crate::error::ApiError;
use crate::orm::lfg_postings::PostingStatus;
use crate::orm::{lfg_participants, lfg_postings, users};
use crate::user::{CreatorView, Profile};
use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::{entity::*, query::*, sea_query::Expr, ActiveValue::Set, DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_GAME_MODE: &str = "Extraction";
pub const DEFAULT_SKILL_LEVEL: &str = "Any";
pub const DEFAULT_PREFERRED_MAP: &str = "Any";
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_PLAYERS_NEEDED: i32 = 2;

/// Sentinel filter value meaning "no filter on this field". Must never be
/// used as a literal match value.
pub const ANY_FILTER: &str = "Any";

/// Client-supplied posting fields. Anything else in the request body is
/// ignored, expiry values included; expiry is computed server-side.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub game_mode: Option<String>,
    pub skill_level: Option<String>,
    pub preferred_map: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub players_needed: Option<i32>,
}

/// A validated, default-filled posting ready for insertion.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidPosting {
    pub title: String,
    pub description: String,
    pub game_mode: String,
    pub skill_level: String,
    pub preferred_map: String,
    pub timezone: String,
    pub language: String,
    pub players_needed: i32,
}

fn or_default(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_owned(),
        _ => default.to_owned(),
    }
}

/// Validates required fields and applies the documented defaults.
pub fn validate_input(input: &PostingInput) -> Result<ValidPosting, ApiError> {
    let title = input.title.as_deref().map(str::trim).unwrap_or("");
    if title.is_empty() {
        return Err(ApiError::validation("title", "Title is required"));
    }

    let description = input.description.as_deref().map(str::trim).unwrap_or("");
    if description.is_empty() {
        return Err(ApiError::validation(
            "description",
            "Description is required",
        ));
    }

    let players_needed = input.players_needed.unwrap_or(DEFAULT_PLAYERS_NEEDED);
    if players_needed < 1 {
        return Err(ApiError::validation(
            "playersNeeded",
            "At least one player is needed",
        ));
    }

    Ok(ValidPosting {
        title: title.to_owned(),
        description: description.to_owned(),
        game_mode: or_default(input.game_mode.as_deref(), DEFAULT_GAME_MODE),
        skill_level: or_default(input.skill_level.as_deref(), DEFAULT_SKILL_LEVEL),
        preferred_map: or_default(input.preferred_map.as_deref(), DEFAULT_PREFERRED_MAP),
        timezone: or_default(input.timezone.as_deref(), DEFAULT_TIMEZONE),
        language: or_default(input.language.as_deref(), DEFAULT_LANGUAGE),
        players_needed,
    })
}

/// Normalizes a raw filter parameter. Blank and the `"Any"` sentinel both
/// mean "no filter".
pub fn filter_value(raw: Option<&str>) -> Option<String> {
    match raw.map(str::trim) {
        Some(v) if !v.is_empty() && v != ANY_FILTER => Some(v.to_owned()),
        _ => None,
    }
}

/// Exact-match listing filters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostingFilter {
    pub game_mode: Option<String>,
    pub skill_level: Option<String>,
}

impl PostingFilter {
    pub fn from_params(game_mode: Option<&str>, skill_level: Option<&str>) -> Self {
        Self {
            game_mode: filter_value(game_mode),
            skill_level: filter_value(skill_level),
        }
    }
}

/// Server-side expiry: creation time plus the configured TTL.
pub fn expiry_from(created_at: NaiveDateTime, ttl_hours: i64) -> NaiveDateTime {
    created_at + Duration::hours(ttl_hours)
}

pub fn is_expired(posting: &lfg_postings::Model, now: NaiveDateTime) -> bool {
    posting.expires_at <= now
}

/// Transition rules. Both terminal states are final.
pub fn can_transition(from: &PostingStatus, to: &PostingStatus) -> bool {
    matches!(
        (from, to),
        (PostingStatus::Active, PostingStatus::Completed)
            | (PostingStatus::Active, PostingStatus::Cancelled)
    )
}

/// Completing or cancelling is reserved to the posting's creator and staff.
pub fn may_transition(profile: &Profile, posting: &lfg_postings::Model) -> bool {
    profile.id == posting.creator_id || profile.is_staff()
}

/// A posting can accept another participant while below its headcount.
pub fn has_capacity(participant_count: usize, players_needed: i32) -> bool {
    (participant_count as i32) < players_needed
}

/// The posting record as served over the wire, with the creator projection
/// and the derived participant list.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingView {
    pub id: i32,
    pub creator_id: i32,
    pub title: String,
    pub description: String,
    pub game_mode: String,
    pub skill_level: String,
    pub preferred_map: String,
    pub timezone: String,
    pub language: String,
    pub players_needed: i32,
    /// Derived from the participants relation, never stored.
    pub current_players: i32,
    pub status: PostingStatus,
    pub is_featured: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub creator: Option<CreatorView>,
    pub participant_ids: Vec<i32>,
}

pub fn build_view(
    posting: lfg_postings::Model,
    creator: Option<&users::Model>,
    participant_ids: Vec<i32>,
) -> PostingView {
    PostingView {
        id: posting.id,
        creator_id: posting.creator_id,
        title: posting.title,
        description: posting.description,
        game_mode: posting.game_mode,
        skill_level: posting.skill_level,
        preferred_map: posting.preferred_map,
        timezone: posting.timezone,
        language: posting.language,
        players_needed: posting.players_needed,
        current_players: participant_ids.len() as i32,
        status: posting.status,
        is_featured: posting.is_featured,
        created_at: posting.created_at,
        updated_at: posting.updated_at,
        expires_at: posting.expires_at,
        creator: creator.map(CreatorView::from),
        participant_ids,
    }
}

/// Batch-builds views for (posting, creator) rows, loading all participant
/// lists in one query.
pub async fn collect_views(
    db: &DatabaseConnection,
    rows: Vec<(lfg_postings::Model, Option<users::Model>)>,
) -> Result<Vec<PostingView>, DbErr> {
    let posting_ids: Vec<i32> = rows.iter().map(|(p, _)| p.id).collect();

    let mut participants_by_posting: HashMap<i32, Vec<i32>> = HashMap::new();
    if !posting_ids.is_empty() {
        let participants = lfg_participants::Entity::find()
            .filter(lfg_participants::Column::PostingId.is_in(posting_ids))
            .all(db)
            .await?;

        for participant in participants {
            participants_by_posting
                .entry(participant.posting_id)
                .or_default()
                .push(participant.user_id);
        }
    }

    Ok(rows
        .into_iter()
        .map(|(posting, creator)| {
            let participant_ids = participants_by_posting
                .remove(&posting.id)
                .unwrap_or_default();
            build_view(posting, creator.as_ref(), participant_ids)
        })
        .collect())
}

/// Loads a single posting view with creator and participants.
pub(crate) async fn load_view(
    db: &DatabaseConnection,
    posting_id: i32,
) -> Result<PostingView, ApiError> {
    let row = lfg_postings::Entity::find_by_id(posting_id)
        .find_also_related(users::Entity)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Posting"))?;

    let mut views = collect_views(db, vec![row]).await?;
    views.pop().ok_or(ApiError::NotFound("Posting"))
}

/// Active postings, newest first, capped at the configured page size.
///
/// An `active` row past its expiry is never served; the sweep may not have
/// reached it yet.
pub async fn list_postings(
    db: &DatabaseConnection,
    filter: &PostingFilter,
) -> Result<Vec<PostingView>, ApiError> {
    let now = Utc::now().naive_utc();

    let mut query = lfg_postings::Entity::find()
        .filter(lfg_postings::Column::Status.eq(PostingStatus::Active))
        .filter(lfg_postings::Column::ExpiresAt.gt(now));

    if let Some(game_mode) = &filter.game_mode {
        query = query.filter(lfg_postings::Column::GameMode.eq(game_mode.as_str()));
    }
    if let Some(skill_level) = &filter.skill_level {
        query = query.filter(lfg_postings::Column::SkillLevel.eq(skill_level.as_str()));
    }

    let rows = query
        .find_also_related(users::Entity)
        .order_by_desc(lfg_postings::Column::CreatedAt)
        .limit(app_config::lfg().page_size)
        .all(db)
        .await?;

    Ok(collect_views(db, rows).await?)
}

/// Creates a posting for `creator_id` and returns the persisted record.
pub async fn create_posting(
    db: &DatabaseConnection,
    creator_id: i32,
    input: &PostingInput,
) -> Result<PostingView, ApiError> {
    let valid = validate_input(input)?;
    let now = Utc::now().naive_utc();

    let posting = lfg_postings::ActiveModel {
        creator_id: Set(creator_id),
        title: Set(valid.title),
        description: Set(valid.description),
        game_mode: Set(valid.game_mode),
        skill_level: Set(valid.skill_level),
        preferred_map: Set(valid.preferred_map),
        timezone: Set(valid.timezone),
        language: Set(valid.language),
        players_needed: Set(valid.players_needed),
        status: Set(PostingStatus::Active),
        is_featured: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        expires_at: Set(expiry_from(now, app_config::lfg().posting_ttl_hours)),
        ..Default::default()
    };

    let res = lfg_postings::Entity::insert(posting).exec(db).await?;

    log::info!(
        "Posting {} created by user {}",
        res.last_insert_id,
        creator_id
    );

    load_view(db, res.last_insert_id).await
}

/// Adds `user_id` to a posting's participants, enforcing the capacity
/// invariant at join time.
pub async fn join_posting(
    db: &DatabaseConnection,
    user_id: i32,
    posting_id: i32,
) -> Result<PostingView, ApiError> {
    let posting = lfg_postings::Entity::find_by_id(posting_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Posting"))?;

    let now = Utc::now().naive_utc();
    if posting.status != PostingStatus::Active || is_expired(&posting, now) {
        return Err(ApiError::validation("postingId", "Posting is not active"));
    }
    if posting.creator_id == user_id {
        return Err(ApiError::validation(
            "postingId",
            "You created this posting",
        ));
    }

    let participants = lfg_participants::Entity::find()
        .filter(lfg_participants::Column::PostingId.eq(posting_id))
        .all(db)
        .await?;

    if participants.iter().any(|p| p.user_id == user_id) {
        return Err(ApiError::validation(
            "postingId",
            "Already joined this posting",
        ));
    }
    if !has_capacity(participants.len(), posting.players_needed) {
        return Err(ApiError::validation("postingId", "Posting is full"));
    }

    let participant = lfg_participants::ActiveModel {
        posting_id: Set(posting_id),
        user_id: Set(user_id),
        joined_at: Set(now),
        ..Default::default()
    };
    lfg_participants::Entity::insert(participant).exec(db).await?;

    load_view(db, posting_id).await
}

/// Applies a lifecycle transition for the calling user.
pub async fn transition_posting(
    db: &DatabaseConnection,
    profile: &Profile,
    posting_id: i32,
    to: PostingStatus,
) -> Result<PostingView, ApiError> {
    let posting = lfg_postings::Entity::find_by_id(posting_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Posting"))?;

    if !may_transition(profile, &posting) {
        return Err(ApiError::Authorization(
            "Only the creator or staff may close a posting".to_string(),
        ));
    }
    if !can_transition(&posting.status, &to) {
        return Err(ApiError::validation("status", "Posting is already closed"));
    }

    let now = Utc::now().naive_utc();
    let mut active: lfg_postings::ActiveModel = posting.into();
    active.status = Set(to);
    active.updated_at = Set(now);
    active.update(db).await?;

    load_view(db, posting_id).await
}

/// Closes out `active` postings whose expiry has lapsed. Returns the number
/// of rows swept. Run periodically from the server entrypoint.
pub async fn expire_stale_postings(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let now = Utc::now().naive_utc();

    let result = lfg_postings::Entity::update_many()
        .col_expr(
            lfg_postings::Column::Status,
            Expr::value(PostingStatus::Cancelled),
        )
        .col_expr(lfg_postings::Column::UpdatedAt, Expr::value(now))
        .filter(lfg_postings::Column::Status.eq(PostingStatus::Active))
        .filter(lfg_postings::Column::ExpiresAt.lte(now))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
