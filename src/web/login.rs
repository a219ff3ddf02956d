//! Discord sign-in endpoints
//!
//! GET /auth/discord hands the client to the provider with a one-time state
//! nonce; the callback consumes the nonce, completes the code exchange, and
//! resolves the external identity to a session.

use crate::db::get_db_pool;
use crate::error::ApiError;
use crate::identity::{self, IdentityProvider};
use crate::middleware::ClientCtx;
use crate::session;
use crate::user::SessionIdentity;
use actix_session::Session;
use actix_web::web::Data;
use actix_web::{get, web, HttpResponse};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(begin_discord_login)
        .service(discord_callback)
        .service(view_me);
}

/// In-flight OAuth state nonces and when they were issued.
static OAUTH_STATES: Lazy<DashMap<String, Instant>> = Lazy::new(DashMap::new);

/// How long a login attempt may sit between redirect and callback.
const STATE_TTL: Duration = Duration::from_secs(600);

fn issue_state() -> String {
    // Drop abandoned attempts so the map cannot grow unbounded.
    OAUTH_STATES.retain(|_, issued| issued.elapsed() < STATE_TTL);

    let state: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();

    OAUTH_STATES.insert(state.clone(), Instant::now());
    state
}

fn consume_state(state: &str) -> bool {
    match OAUTH_STATES.remove(state) {
        Some((_, issued)) => issued.elapsed() < STATE_TTL,
        None => false,
    }
}

/// GET /auth/discord - redirect to the provider's authorization page
#[get("/auth/discord")]
async fn begin_discord_login(provider: Data<Arc<dyn IdentityProvider>>) -> HttpResponse {
    let state = issue_state();

    HttpResponse::Found()
        .append_header(("Location", provider.authorize_url(&state)))
        .finish()
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// GET /auth/discord/callback - complete the provider flow
#[get("/auth/discord/callback")]
async fn discord_callback(
    cookies: Session,
    provider: Data<Arc<dyn IdentityProvider>>,
    query: web::Query<CallbackQuery>,
) -> Result<HttpResponse, ApiError> {
    if let Some(reason) = &query.error {
        log::warn!("Discord login denied: {}", reason);
        return Err(ApiError::Authentication);
    }

    let code = query.code.as_deref().ok_or(ApiError::Authentication)?;
    let state = query.state.as_deref().ok_or(ApiError::Authentication)?;

    if !consume_state(state) {
        log::warn!("Discord callback with unknown or expired state");
        return Err(ApiError::Authentication);
    }

    let ext = provider.exchange_code(code).await?;
    let user = identity::resolve_identity(get_db_pool(), &ext).await?;

    session::put_user_id(&cookies, user.id)?;

    Ok(HttpResponse::Found()
        .append_header(("Location", "/"))
        .finish())
}

/// GET /api/me - the session identity record
///
/// Banned users still resolve here so the client can show the ban notice.
#[get("/api/me")]
async fn view_me(client: ClientCtx) -> Result<HttpResponse, ApiError> {
    let profile = client.require_login()?;

    Ok(HttpResponse::Ok().json(SessionIdentity::from(profile)))
}
