//! Request-scoped user identity and the projections exposed over the wire.

use crate::orm::users;
use serde::Serialize;

/// A struct holding the session user's identity for one request cycle.
///
/// Built fresh from the users row on every request so stored-role drift or a
/// newly applied ban takes effect immediately.
#[derive(Clone, Debug)]
pub struct Profile {
    pub id: i32,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: users::Role,
    pub is_owner: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub embark_id: Option<String>,
}

impl Profile {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

impl From<&users::Model> for Profile {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name.to_owned(),
            avatar_url: user.avatar_url.to_owned(),
            role: user.role.to_owned(),
            is_owner: user.is_owner,
            is_banned: user.is_banned,
            ban_reason: user.ban_reason.to_owned(),
            embark_id: user.embark_id.to_owned(),
        }
    }
}

/// Minimal creator projection embedded in posting responses.
///
/// Deliberately narrow: never carries email, role, or ban state, so listing
/// postings leaks nothing to unauthenticated viewers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorView {
    pub id: i32,
    pub name: String,
    pub avatar_url: Option<String>,
    pub embark_username: Option<String>,
    pub discord_tag: Option<String>,
}

impl From<&users::Model> for CreatorView {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name.to_owned(),
            avatar_url: user.avatar_url.to_owned(),
            embark_username: user.embark_username.to_owned(),
            discord_tag: user.discord_tag.to_owned(),
        }
    }
}

/// The session identity record returned by /api/me.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub id: i32,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: users::Role,
    pub is_owner: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub embark_id: Option<String>,
}

impl From<&Profile> for SessionIdentity {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.to_owned(),
            avatar_url: profile.avatar_url.to_owned(),
            role: profile.role.to_owned(),
            is_owner: profile.is_owner,
            is_banned: profile.is_banned,
            ban_reason: profile.ban_reason.to_owned(),
            embark_id: profile.embark_id.to_owned(),
        }
    }
}

impl From<&users::Model> for SessionIdentity {
    fn from(user: &users::Model) -> Self {
        SessionIdentity::from(&Profile::from(user))
    }
}
