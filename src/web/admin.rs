//! Owner-only administration endpoints
//!
//! Every handler re-verifies the owner role on each call; there is no cached
//! authorization. All rejections share one uniform 403 body so the response
//! never reveals which check failed.

use crate::db::get_db_pool;
use crate::error::ApiError;
use crate::middleware::ClientCtx;
use crate::moderation;
use crate::orm::users;
use actix_web::{get, post, web, HttpResponse};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_users)
        .service(list_postings)
        .service(view_stats)
        .service(ban_user)
        .service(unban_user)
        .service(feature_posting)
        .service(remove_posting);
}

/// Roster row for the admin panel. Includes role, ban, and verification
/// fields; must never be reachable by non-owner roles.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    pub id: i32,
    pub discord_id: String,
    pub discord_tag: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub embark_id: Option<String>,
    pub embark_username: Option<String>,
    pub role: users::Role,
    pub is_owner: bool,
    pub is_admin: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub banned_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl From<&users::Model> for AdminUserView {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            discord_id: user.discord_id.to_owned(),
            discord_tag: user.discord_tag.to_owned(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            avatar_url: user.avatar_url.to_owned(),
            embark_id: user.embark_id.to_owned(),
            embark_username: user.embark_username.to_owned(),
            role: user.role.to_owned(),
            is_owner: user.is_owner,
            is_admin: user.is_admin,
            is_banned: user.is_banned,
            ban_reason: user.ban_reason.to_owned(),
            banned_at: user.banned_at,
            created_at: user.created_at,
        }
    }
}

/// GET /api/admin/users - full roster, newest first
#[get("/api/admin/users")]
async fn list_users(client: ClientCtx) -> Result<HttpResponse, ApiError> {
    client.require_owner()?;

    let users = moderation::list_users(get_db_pool()).await?;
    let users: Vec<AdminUserView> = users.iter().map(AdminUserView::from).collect();

    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/admin/postings - all postings regardless of status
#[get("/api/admin/postings")]
async fn list_postings(client: ClientCtx) -> Result<HttpResponse, ApiError> {
    client.require_owner()?;

    let postings = moderation::list_postings_admin(get_db_pool()).await?;

    Ok(HttpResponse::Ok().json(postings))
}

/// GET /api/admin/stats - computed site statistics
#[get("/api/admin/stats")]
async fn view_stats(client: ClientCtx) -> Result<HttpResponse, ApiError> {
    client.require_owner()?;

    let stats = moderation::compute_stats(get_db_pool()).await?;

    Ok(HttpResponse::Ok().json(stats))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BanUserForm {
    user_id: i32,
    reason: String,
}

/// POST /api/admin/ban-user - ban a user, atomically with its audit entry
#[post("/api/admin/ban-user")]
async fn ban_user(
    client: ClientCtx,
    form: web::Json<BanUserForm>,
) -> Result<HttpResponse, ApiError> {
    let moderator = client.require_owner()?;

    let user = moderation::ban_user(get_db_pool(), moderator, form.user_id, &form.reason).await?;

    Ok(HttpResponse::Ok().json(AdminUserView::from(&user)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnbanUserForm {
    user_id: i32,
}

/// POST /api/admin/unban-user - lift a ban
#[post("/api/admin/unban-user")]
async fn unban_user(
    client: ClientCtx,
    form: web::Json<UnbanUserForm>,
) -> Result<HttpResponse, ApiError> {
    let moderator = client.require_owner()?;

    let user = moderation::unban_user(get_db_pool(), moderator, form.user_id).await?;

    Ok(HttpResponse::Ok().json(AdminUserView::from(&user)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeaturePostingForm {
    posting_id: i32,
    featured: bool,
}

/// POST /api/admin/feature-posting - toggle the featured flag
#[post("/api/admin/feature-posting")]
async fn feature_posting(
    client: ClientCtx,
    form: web::Json<FeaturePostingForm>,
) -> Result<HttpResponse, ApiError> {
    let moderator = client.require_owner()?;

    let posting =
        moderation::feature_posting(get_db_pool(), moderator, form.posting_id, form.featured)
            .await?;

    Ok(HttpResponse::Ok().json(posting))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemovePostingForm {
    posting_id: i32,
    reason: Option<String>,
}

/// POST /api/admin/remove-posting - cancel a posting as a moderation action
#[post("/api/admin/remove-posting")]
async fn remove_posting(
    client: ClientCtx,
    form: web::Json<RemovePostingForm>,
) -> Result<HttpResponse, ApiError> {
    let moderator = client.require_owner()?;

    let posting = moderation::remove_posting(
        get_db_pool(),
        moderator,
        form.posting_id,
        form.reason.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(posting))
}
