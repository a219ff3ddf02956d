/// Tests for the request-scoped client context: the owner gate must be
/// uniform for every non-owner caller, and banned accounts must keep their
/// session while losing all mutation rights.
use chrono::NaiveDate;
use lfghub::error::ApiError;
use lfghub::middleware::{ClientCtx, ClientCtxInner};
use lfghub::orm::lfg_postings::{self, PostingStatus};
use lfghub::orm::users::Role;
use lfghub::user::Profile;

fn profile(id: i32, role: Role) -> Profile {
    Profile {
        id,
        name: format!("user-{}", id),
        avatar_url: None,
        role: role.clone(),
        is_owner: matches!(role, Role::Owner),
        is_banned: false,
        ban_reason: None,
        embark_id: None,
    }
}

fn ctx_for(client: Option<Profile>) -> ClientCtx {
    ClientCtx::from(ClientCtxInner {
        client,
        ..Default::default()
    })
}

fn sample_posting(creator_id: i32) -> lfg_postings::Model {
    let created = NaiveDate::from_ymd_opt(2026, 6, 1)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();

    lfg_postings::Model {
        id: 1,
        creator_id,
        title: "Duo tonight".to_string(),
        description: "chill runs".to_string(),
        game_mode: "Extraction".to_string(),
        skill_level: "Any".to_string(),
        preferred_map: "Any".to_string(),
        timezone: "UTC".to_string(),
        language: "English".to_string(),
        players_needed: 2,
        status: PostingStatus::Active,
        is_featured: false,
        created_at: created,
        updated_at: created,
        expires_at: created + chrono::Duration::hours(24),
    }
}

#[test]
fn owner_gate_rejects_every_non_owner_with_the_same_message() {
    let guest = ctx_for(None);
    let user = ctx_for(Some(profile(1, Role::User)));
    let moderator = ctx_for(Some(profile(2, Role::Moderator)));
    let admin = ctx_for(Some(profile(3, Role::Admin)));

    let mut messages = Vec::new();
    for ctx in [&guest, &user, &moderator, &admin] {
        match ctx.require_owner() {
            Err(ApiError::Authorization(message)) => messages.push(message),
            other => panic!("expected a uniform authorization error, got {:?}", other.map(|p| p.id)),
        }
    }

    // One message for all causes: nothing reveals which check failed.
    assert!(messages.iter().all(|m| m == "Unauthorized - Owner access only"));
}

#[test]
fn owner_gate_admits_the_owner() {
    let owner = ctx_for(Some(profile(9, Role::Owner)));
    assert_eq!(owner.require_owner().unwrap().id, 9);
}

#[test]
fn an_admin_role_is_not_enough_for_the_owner_gate() {
    // The strict isOwner predicate gates moderation, not the admin role.
    let admin = ctx_for(Some(profile(3, Role::Admin)));
    assert!(admin.require_owner().is_err());
}

#[test]
fn banned_users_keep_their_session_but_cannot_mutate() {
    let mut banned = profile(4, Role::User);
    banned.is_banned = true;
    banned.ban_reason = Some("abuse".to_string());
    let ctx = ctx_for(Some(banned));

    // Identity still resolves.
    assert!(ctx.require_login().is_ok());
    assert_eq!(ctx.get_id(), Some(4));

    // Mutation does not, independent of role.
    assert!(matches!(
        ctx.require_active(),
        Err(ApiError::Authorization(_))
    ));
}

#[test]
fn guests_are_unauthenticated_not_unauthorized() {
    let guest = ctx_for(None);
    assert!(matches!(
        guest.require_login(),
        Err(ApiError::Authentication)
    ));
    assert!(matches!(
        guest.require_active(),
        Err(ApiError::Authentication)
    ));
}

#[test]
fn posting_transitions_are_gated_to_creator_and_staff() {
    let posting = sample_posting(1);

    assert!(lfghub::lfg::may_transition(&profile(1, Role::User), &posting));
    assert!(lfghub::lfg::may_transition(&profile(3, Role::Admin), &posting));
    assert!(lfghub::lfg::may_transition(&profile(9, Role::Owner), &posting));
    assert!(!lfghub::lfg::may_transition(&profile(2, Role::User), &posting));
    assert!(!lfghub::lfg::may_transition(
        &profile(2, Role::Moderator),
        &posting
    ));
}
