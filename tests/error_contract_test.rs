/// Tests for the HTTP error contract: taxonomy-to-status mapping and the
/// JSON `{"error": ...}` body shape, with internal detail kept out of
/// client responses.
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::ResponseError;
use lfghub::error::ApiError;

async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
    let response = err.error_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[actix_rt::test]
async fn validation_errors_are_400_with_field_level_messages() {
    let (status, body) = body_of(ApiError::validation("title", "Title is required")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");
}

#[actix_rt::test]
async fn missing_sessions_are_401() {
    let (status, body) = body_of(ApiError::Authentication).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");
}

#[actix_rt::test]
async fn the_owner_gate_is_a_uniform_403() {
    let (status, body) = body_of(ApiError::owner_only()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized - Owner access only");
}

#[actix_rt::test]
async fn missing_rows_are_404() {
    let (status, body) = body_of(ApiError::NotFound("Posting")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Posting not found");
}

#[actix_rt::test]
async fn storage_detail_never_reaches_the_client() {
    let (status, body) =
        body_of(ApiError::Storage("connection refused at 10.0.0.3:5432".to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");

    let rendered = serde_json::to_string(&body).unwrap();
    assert!(!rendered.contains("10.0.0.3"));
}

#[actix_rt::test]
async fn ban_rejections_are_authorization_errors() {
    let (status, _) = body_of(ApiError::banned()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
