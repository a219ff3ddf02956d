//! Cookie-session helpers.
//!
//! The session stores only the internal user id. The profile (role, ban
//! state) is re-read from storage on every request, so a role reset or a
//! fresh ban takes effect on the next request, not the next login.

use crate::db::get_db_pool;
use crate::error::ApiError;
use crate::orm::users;
use crate::user::Profile;
use actix_session::Session;
use sea_orm::EntityTrait;

const SESSION_USER_KEY: &str = "uid";

/// Establishes the session for a freshly resolved identity.
pub fn put_user_id(session: &Session, user_id: i32) -> Result<(), ApiError> {
    session
        .insert(SESSION_USER_KEY, user_id)
        .map_err(|e| ApiError::Storage(format!("session write failed: {}", e)))
}

/// Drops the session and its cookie.
pub fn purge(session: &Session) {
    session.purge();
}

/// Resolves the session cookie to a fresh profile, or None for guests.
pub async fn authenticate_client_by_session(session: &Session) -> Option<Profile> {
    let user_id: i32 = match session.get(SESSION_USER_KEY) {
        Ok(Some(id)) => id,
        Ok(None) => return None,
        Err(err) => {
            log::warn!("Unable to read session data: {}", err);
            return None;
        }
    };

    match users::Entity::find_by_id(user_id).one(get_db_pool()).await {
        Ok(Some(user)) => Some(Profile::from(&user)),
        Ok(None) => None,
        Err(err) => {
            log::error!("Session user lookup failed: {}", err);
            None
        }
    }
}
