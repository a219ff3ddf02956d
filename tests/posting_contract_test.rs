/// Tests for the posting creation and listing contract: required fields,
/// documented defaults, server-side expiry, and the "Any" filter sentinel.
use chrono::Duration;
use lfghub::error::ApiError;
use lfghub::lfg::{
    expiry_from, filter_value, validate_input, PostingFilter, PostingInput,
};

fn minimal_input() -> PostingInput {
    PostingInput {
        title: Some("Trio for ranked".to_string()),
        description: Some("Looking for two more, EU evenings".to_string()),
        ..Default::default()
    }
}

#[test]
fn blank_required_fields_create_nothing() {
    for bad in ["", "   ", "\t", "\n  \n"] {
        let mut input = minimal_input();
        input.title = Some(bad.to_string());
        assert!(
            matches!(
                validate_input(&input),
                Err(ApiError::Validation { field: "title", .. })
            ),
            "title {:?} should be rejected",
            bad
        );

        let mut input = minimal_input();
        input.description = Some(bad.to_string());
        assert!(
            matches!(
                validate_input(&input),
                Err(ApiError::Validation {
                    field: "description",
                    ..
                })
            ),
            "description {:?} should be rejected",
            bad
        );
    }
}

#[test]
fn title_and_description_alone_produce_the_documented_defaults() {
    let valid = validate_input(&minimal_input()).expect("minimal input should validate");

    assert_eq!(valid.game_mode, "Extraction");
    assert_eq!(valid.skill_level, "Any");
    assert_eq!(valid.preferred_map, "Any");
    assert_eq!(valid.timezone, "UTC");
    assert_eq!(valid.language, "English");
    assert_eq!(valid.players_needed, 2);
}

#[test]
fn supplied_optional_fields_survive_validation() {
    let input = PostingInput {
        title: Some("  Night squad  ".to_string()),
        description: Some("casual".to_string()),
        game_mode: Some("World Tour".to_string()),
        skill_level: Some("Diamond".to_string()),
        preferred_map: Some("Spaceport".to_string()),
        timezone: Some("CET".to_string()),
        language: Some("German".to_string()),
        players_needed: Some(4),
    };

    let valid = validate_input(&input).unwrap();
    assert_eq!(valid.title, "Night squad");
    assert_eq!(valid.game_mode, "World Tour");
    assert_eq!(valid.skill_level, "Diamond");
    assert_eq!(valid.players_needed, 4);
}

#[test]
fn expiry_is_exactly_twenty_four_hours_after_creation() {
    let created = chrono::NaiveDate::from_ymd_opt(2026, 3, 14)
        .unwrap()
        .and_hms_opt(9, 26, 53)
        .unwrap();

    assert_eq!(expiry_from(created, 24), created + Duration::hours(24));
}

#[test]
fn client_cannot_mint_long_lived_postings() {
    // An expiry in the request body is not even part of the input type;
    // it falls away during deserialization.
    let input: PostingInput = serde_json::from_str(
        r#"{
            "title": "forever posting",
            "description": "should still expire in 24h",
            "expiresAt": "2099-12-31T23:59:59",
            "status": "completed",
            "isFeatured": true
        }"#,
    )
    .expect("unknown fields are ignored");

    assert!(validate_input(&input).is_ok());
}

#[test]
fn any_filter_matches_the_absent_parameter() {
    assert_eq!(
        PostingFilter::from_params(Some("Any"), Some("Any")),
        PostingFilter::from_params(None, None)
    );
    assert_eq!(filter_value(Some("Any")), None);
    assert_eq!(filter_value(Some(" ")), None);

    // A real value is an exact-match filter, not a pattern.
    assert_eq!(filter_value(Some("Extraction")), Some("Extraction".to_string()));
}
