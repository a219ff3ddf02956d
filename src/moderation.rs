//! Owner-gated moderation actions and site statistics.
//!
//! Every moderation mutation writes its audit entry in the same transaction
//! as the primary effect; if either write fails, both roll back and the
//! caller sees a single storage error. Audit rows are never silently
//! dropped.

use crate::error::ApiError;
use crate::identity;
use crate::lfg::{self, PostingView};
use crate::orm::lfg_postings::PostingStatus;
use crate::orm::mod_log::{AuditAction, AuditTarget};
use crate::orm::{lfg_postings, mod_log, users};
use crate::user::Profile;
use chrono::Utc;
use sea_orm::{entity::*, query::*, ActiveValue::Set, DatabaseConnection, TransactionTrait};
use serde::Serialize;

/// Ramp thresholds of the health score. Each ramp saturates at 100 points
/// once its threshold is reached.
const USER_RAMP_THRESHOLD: f64 = 100.0;
const POSTING_RAMP_THRESHOLD: f64 = 50.0;

fn audit_entry(
    moderator_id: i32,
    action: AuditAction,
    target_type: AuditTarget,
    target_id: i32,
    reason: Option<&str>,
    now: chrono::NaiveDateTime,
) -> mod_log::ActiveModel {
    mod_log::ActiveModel {
        moderator_id: Set(Some(moderator_id)),
        action: Set(action),
        target_type: Set(target_type),
        target_id: Set(target_id),
        reason: Set(reason.map(str::to_string)),
        metadata: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
}

/// Bans a user. The configured owner can never be banned, including by
/// themself. The ban and its audit entry are one atomic unit.
pub async fn ban_user(
    db: &DatabaseConnection,
    moderator: &Profile,
    target_user_id: i32,
    reason: &str,
) -> Result<users::Model, ApiError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ApiError::validation("reason", "Ban reason is required"));
    }

    let user = users::Entity::find_by_id(target_user_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if user.is_owner || identity::is_owner_discord_id(&user.discord_id) {
        return Err(ApiError::Authorization("Cannot ban the owner".to_string()));
    }

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;

    let mut active: users::ActiveModel = user.into();
    active.is_banned = Set(true);
    active.ban_reason = Set(Some(reason.to_string()));
    active.banned_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(&txn).await?;

    mod_log::Entity::insert(audit_entry(
        moderator.id,
        AuditAction::Ban,
        AuditTarget::User,
        target_user_id,
        Some(reason),
        now,
    ))
    .exec(&txn)
    .await?;

    txn.commit().await?;

    log::info!(
        "User {} banned by owner {} ({})",
        target_user_id,
        moderator.id,
        reason
    );

    users::Entity::find_by_id(target_user_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("User"))
}

/// Lifts a ban. Audited as `unban`, atomically with the flag clear.
pub async fn unban_user(
    db: &DatabaseConnection,
    moderator: &Profile,
    target_user_id: i32,
) -> Result<users::Model, ApiError> {
    let user = users::Entity::find_by_id(target_user_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if !user.is_banned {
        return Err(ApiError::validation("userId", "User is not banned"));
    }

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;

    let mut active: users::ActiveModel = user.into();
    active.is_banned = Set(false);
    active.ban_reason = Set(None);
    active.banned_at = Set(None);
    active.updated_at = Set(now);
    active.update(&txn).await?;

    mod_log::Entity::insert(audit_entry(
        moderator.id,
        AuditAction::Unban,
        AuditTarget::User,
        target_user_id,
        None,
        now,
    ))
    .exec(&txn)
    .await?;

    txn.commit().await?;

    log::info!("User {} unbanned by owner {}", target_user_id, moderator.id);

    users::Entity::find_by_id(target_user_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("User"))
}

/// Sets the featured flag on a posting. Audited as `feature`/`unfeature`.
pub async fn feature_posting(
    db: &DatabaseConnection,
    moderator: &Profile,
    posting_id: i32,
    featured: bool,
) -> Result<PostingView, ApiError> {
    let posting = lfg_postings::Entity::find_by_id(posting_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Posting"))?;

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;

    let mut active: lfg_postings::ActiveModel = posting.into();
    active.is_featured = Set(featured);
    active.updated_at = Set(now);
    active.update(&txn).await?;

    let action = if featured {
        AuditAction::Feature
    } else {
        AuditAction::Unfeature
    };
    mod_log::Entity::insert(audit_entry(
        moderator.id,
        action,
        AuditTarget::Posting,
        posting_id,
        None,
        now,
    ))
    .exec(&txn)
    .await?;

    txn.commit().await?;

    lfg::load_view(db, posting_id).await
}

/// Admin removal of a posting; maps to the `cancelled` terminal state.
pub async fn remove_posting(
    db: &DatabaseConnection,
    moderator: &Profile,
    posting_id: i32,
    reason: Option<&str>,
) -> Result<PostingView, ApiError> {
    let posting = lfg_postings::Entity::find_by_id(posting_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Posting"))?;

    if posting.status.is_terminal() {
        return Err(ApiError::validation("status", "Posting is already closed"));
    }

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;

    let mut active: lfg_postings::ActiveModel = posting.into();
    active.status = Set(PostingStatus::Cancelled);
    active.updated_at = Set(now);
    active.update(&txn).await?;

    mod_log::Entity::insert(audit_entry(
        moderator.id,
        AuditAction::RemovePosting,
        AuditTarget::Posting,
        posting_id,
        reason,
        now,
    ))
    .exec(&txn)
    .await?;

    txn.commit().await?;

    log::info!(
        "Posting {} removed by owner {}",
        posting_id,
        moderator.id
    );

    lfg::load_view(db, posting_id).await
}

/// Full user roster, newest first. Privileged view.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<users::Model>, ApiError> {
    Ok(users::Entity::find()
        .order_by_desc(users::Column::CreatedAt)
        .all(db)
        .await?)
}

/// All postings regardless of status, with creator and participant
/// projections.
pub async fn list_postings_admin(db: &DatabaseConnection) -> Result<Vec<PostingView>, ApiError> {
    let rows = lfg_postings::Entity::find()
        .find_also_related(users::Entity)
        .order_by_desc(lfg_postings::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(lfg::collect_views(db, rows).await?)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    pub total_users: i64,
    pub active_postings: i64,
    pub verified_players: i64,
    pub banned_users: i64,
    pub health_score: i64,
}

/// Two capped linear ramps averaged together: 100 users and 50 active
/// postings each saturate their ramp at 100 points.
pub fn health_score(total_users: i64, active_postings: i64) -> i64 {
    let user_ramp = (total_users as f64 / USER_RAMP_THRESHOLD).min(1.0) * 100.0;
    let posting_ramp = (active_postings as f64 / POSTING_RAMP_THRESHOLD).min(1.0) * 100.0;

    ((user_ramp + posting_ramp) / 2.0).round() as i64
}

/// Site statistics for the admin dashboard. The four counts are independent
/// and issued concurrently.
pub async fn compute_stats(db: &DatabaseConnection) -> Result<SiteStats, ApiError> {
    let now = Utc::now().naive_utc();

    let (total_users, active_postings, verified_players, banned_users) = futures::try_join!(
        users::Entity::find().count(db),
        lfg_postings::Entity::find()
            .filter(lfg_postings::Column::Status.eq(PostingStatus::Active))
            .filter(lfg_postings::Column::ExpiresAt.gt(now))
            .count(db),
        users::Entity::find()
            .filter(users::Column::EmbarkId.is_not_null())
            .count(db),
        users::Entity::find()
            .filter(users::Column::IsBanned.eq(true))
            .count(db),
    )?;

    let total_users = total_users as i64;
    let active_postings = active_postings as i64;

    Ok(SiteStats {
        total_users,
        active_postings,
        verified_players: verified_players as i64,
        banned_users: banned_users as i64,
        health_score: health_score(total_users, active_postings),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturated_site_scores_one_hundred() {
        assert_eq!(health_score(100, 50), 100);
    }

    #[test]
    fn empty_site_scores_zero() {
        assert_eq!(health_score(0, 0), 0);
    }

    #[test]
    fn half_filled_ramps_average_to_fifty() {
        assert_eq!(health_score(50, 25), 50);
    }

    #[test]
    fn ramps_cap_at_their_thresholds() {
        assert_eq!(health_score(100_000, 9_000), 100);
    }

    #[test]
    fn each_ramp_contributes_half() {
        assert_eq!(health_score(0, 50), 50);
        assert_eq!(health_score(100, 0), 50);
    }

    #[test]
    fn average_rounds_half_up() {
        // One user is a 1-point ramp; the average of 1 and 0 rounds to 1.
        assert_eq!(health_score(1, 0), 1);
    }
}
