//! Account profile endpoints

use crate::db::get_db_pool;
use crate::error::ApiError;
use crate::middleware::ClientCtx;
use crate::orm::users;
use crate::user::SessionIdentity;
use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, ActiveValue::Set};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(link_game_account);
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameAccountForm {
    embark_id: String,
    embark_username: Option<String>,
}

/// POST /api/profile/game-account - link an EMBARK id
///
/// The link is set at most once per account; a second attempt is rejected.
#[post("/api/profile/game-account")]
async fn link_game_account(
    client: ClientCtx,
    form: web::Json<GameAccountForm>,
) -> Result<HttpResponse, ApiError> {
    let profile = client.require_active()?;

    let embark_id = form.embark_id.trim();
    if embark_id.is_empty() {
        return Err(ApiError::validation("embarkId", "EMBARK ID is required"));
    }

    let db = get_db_pool();
    let user = users::Entity::find_by_id(profile.id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if user.embark_id.is_some() {
        return Err(ApiError::validation(
            "embarkId",
            "Game account is already linked",
        ));
    }

    // Fall back to the handle portion of "NAME#1234" when no username is
    // supplied.
    let embark_username = form
        .embark_username
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .or_else(|| embark_id.split('#').next().map(str::to_owned));

    let user_id = user.id;
    let mut active: users::ActiveModel = user.into();
    active.embark_id = Set(Some(embark_id.to_owned()));
    active.embark_username = Set(embark_username);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await?;

    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(HttpResponse::Ok().json(SessionIdentity::from(&user)))
}
