//! LFG posting endpoints

use crate::db::get_db_pool;
use crate::error::ApiError;
use crate::lfg::{self, PostingFilter, PostingInput};
use crate::middleware::ClientCtx;
use crate::orm::lfg_postings::PostingStatus;
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_postings)
        .service(create_posting)
        .service(join_posting)
        .service(complete_posting)
        .service(cancel_posting);
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    game_mode: Option<String>,
    skill_level: Option<String>,
}

/// GET /api/lfg/postings - active postings, newest first
#[get("/api/lfg/postings")]
async fn list_postings(query: web::Query<ListQuery>) -> Result<HttpResponse, ApiError> {
    let filter =
        PostingFilter::from_params(query.game_mode.as_deref(), query.skill_level.as_deref());
    let postings = lfg::list_postings(get_db_pool(), &filter).await?;

    Ok(HttpResponse::Ok().json(postings))
}

/// POST /api/lfg/postings - create a posting
///
/// Expiry is computed server-side; a client-supplied value is ignored.
#[post("/api/lfg/postings")]
async fn create_posting(
    client: ClientCtx,
    input: web::Json<PostingInput>,
) -> Result<HttpResponse, ApiError> {
    let profile = client.require_active()?;
    let posting = lfg::create_posting(get_db_pool(), profile.id, &input).await?;

    Ok(HttpResponse::Created().json(posting))
}

/// POST /api/lfg/postings/{id}/join - claim a participant slot
#[post("/api/lfg/postings/{id}/join")]
async fn join_posting(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let profile = client.require_active()?;
    let posting = lfg::join_posting(get_db_pool(), profile.id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(posting))
}

/// POST /api/lfg/postings/{id}/complete - the creator marks the group filled
#[post("/api/lfg/postings/{id}/complete")]
async fn complete_posting(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let profile = client.require_active()?;
    let posting = lfg::transition_posting(
        get_db_pool(),
        profile,
        path.into_inner(),
        PostingStatus::Completed,
    )
    .await?;

    Ok(HttpResponse::Ok().json(posting))
}

/// POST /api/lfg/postings/{id}/cancel - creator or staff withdraws a posting
#[post("/api/lfg/postings/{id}/cancel")]
async fn cancel_posting(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let profile = client.require_active()?;
    let posting = lfg::transition_posting(
        get_db_pool(),
        profile,
        path.into_inner(),
        PostingStatus::Cancelled,
    )
    .await?;

    Ok(HttpResponse::Ok().json(posting))
}
