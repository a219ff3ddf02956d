/// Tests for owner identity resolution and the wire projections.
/// The owner predicate must hold for exactly one configured identity, and
/// public projections must never leak privileged user fields.
use chrono::NaiveDate;
use lfghub::identity::is_owner_external_id;
use lfghub::orm::users::{self, Role};
use lfghub::user::{CreatorView, Profile, SessionIdentity};

fn sample_user() -> users::Model {
    let created = NaiveDate::from_ymd_opt(2026, 1, 10)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();

    users::Model {
        id: 7,
        discord_id: "1368087024401252393".to_string(),
        discord_tag: Some("bl0wdart".to_string()),
        name: "Blowdart".to_string(),
        email: Some("owner@example.com".to_string()),
        avatar_url: Some("https://cdn.discordapp.com/avatars/1368087024401252393/abc.png".to_string()),
        embark_id: Some("BL0WDART#3014".to_string()),
        embark_username: Some("BL0WDART".to_string()),
        role: Role::Owner,
        is_owner: true,
        is_admin: true,
        is_banned: false,
        ban_reason: None,
        banned_at: None,
        created_at: created,
        updated_at: created,
    }
}

#[test]
fn owner_predicate_holds_for_exactly_the_configured_identity() {
    let configured = "1368087024401252393";

    assert!(is_owner_external_id(configured, "1368087024401252393"));
    assert!(!is_owner_external_id(configured, "1368087024401252394"));
    assert!(!is_owner_external_id(configured, ""));

    // With no owner configured, nothing resolves to the owner role.
    assert!(!is_owner_external_id("", "1368087024401252393"));
    assert!(!is_owner_external_id("", ""));
}

#[test]
fn creator_projection_never_leaks_privileged_fields() {
    let user = sample_user();
    let view = serde_json::to_value(CreatorView::from(&user)).unwrap();

    assert_eq!(view["id"], 7);
    assert_eq!(view["name"], "Blowdart");
    assert_eq!(view["embarkUsername"], "BL0WDART");
    assert_eq!(view["discordTag"], "bl0wdart");

    let keys: Vec<&String> = view.as_object().unwrap().keys().collect();
    assert!(!keys.iter().any(|k| k.as_str() == "email"));
    assert!(!keys.iter().any(|k| k.as_str() == "role"));
    assert!(!keys.iter().any(|k| k.as_str() == "isBanned"));
    assert!(!keys.iter().any(|k| k.as_str() == "isOwner"));
}

#[test]
fn session_identity_exposes_the_role_model() {
    let user = sample_user();
    let identity = serde_json::to_value(SessionIdentity::from(&user)).unwrap();

    assert_eq!(identity["role"], "owner");
    assert_eq!(identity["isOwner"], true);
    assert_eq!(identity["isBanned"], false);
}

#[test]
fn banned_users_still_resolve_a_session_identity() {
    let mut user = sample_user();
    user.role = Role::User;
    user.is_owner = false;
    user.is_admin = false;
    user.is_banned = true;
    user.ban_reason = Some("Spamming postings".to_string());

    // The profile resolves; only mutation is rejected elsewhere.
    let profile = Profile::from(&user);
    assert!(profile.is_banned);

    let identity = serde_json::to_value(SessionIdentity::from(&profile)).unwrap();
    assert_eq!(identity["isBanned"], true);
    assert_eq!(identity["banReason"], "Spamming postings");
    assert_eq!(identity["role"], "user");
}

#[test]
fn staff_covers_owner_and_admin_only() {
    assert!(Role::Owner.is_staff());
    assert!(Role::Admin.is_staff());
    assert!(!Role::Moderator.is_staff());
    assert!(!Role::User.is_staff());
}
