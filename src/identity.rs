//! Identity & Role Resolver
//!
//! Maps an authenticated external identity (a Discord account) to an internal
//! user row and computes the effective role for the session. The configured
//! owner identity outranks whatever the row says: the override runs on every
//! sign-in, so a drifted or reset role column heals itself.

use crate::app_config;
use crate::orm::{mod_log, users};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{entity::*, query::*, ActiveValue::Set, DatabaseConnection, DbErr, TransactionTrait};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider reported success but the profile carries no account id.
    #[error("identity provider returned no account id")]
    MissingExternalId,
    #[error("identity provider request failed: {0}")]
    Provider(String),
    #[error(transparent)]
    Storage(#[from] DbErr),
}

/// Profile attributes reported by the external identity provider.
#[derive(Clone, Debug)]
pub struct ExternalIdentity {
    pub external_id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

/// Narrow seam any auth provider can satisfy. Handlers only ever see this
/// trait; the concrete provider is wired up at process start.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the client is redirected to for external login.
    fn authorize_url(&self, state: &str) -> String;

    /// Completes the provider flow for an authorization code.
    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, IdentityError>;
}

/// Returns true iff `candidate` equals the single configured owner identity.
/// An empty configuration matches nothing.
pub fn is_owner_external_id(configured: &str, candidate: &str) -> bool {
    !configured.is_empty() && configured == candidate
}

/// Owner check against the process configuration.
pub fn is_owner_discord_id(discord_id: &str) -> bool {
    is_owner_external_id(&app_config::owner().id, discord_id)
}

/// Preferred display name for an external identity.
pub fn display_name(ext: &ExternalIdentity) -> String {
    ext.global_name
        .as_deref()
        .unwrap_or(ext.username.as_str())
        .to_owned()
}

/// Resolve-or-create the user row for a successful external login.
///
/// Upsert semantics: an unknown external id creates the user; a known one
/// refreshes the drifting profile attributes. When the identity is the
/// configured owner, the role columns are forced and one `owner_signin`
/// audit entry is appended, in the same transaction as the upsert.
///
/// Banned users resolve like anyone else; mutation is rejected later, per
/// request, so the client can still show the ban notice.
pub async fn resolve_identity(
    db: &DatabaseConnection,
    ext: &ExternalIdentity,
) -> Result<users::Model, IdentityError> {
    if ext.external_id.trim().is_empty() {
        return Err(IdentityError::MissingExternalId);
    }

    let is_owner = is_owner_discord_id(&ext.external_id);
    let now = Utc::now().naive_utc();

    let txn = db.begin().await?;

    let existing = users::Entity::find()
        .filter(users::Column::DiscordId.eq(ext.external_id.as_str()))
        .one(&txn)
        .await?;

    let user_id = match existing {
        Some(user) => {
            let user_id = user.id;
            let mut active: users::ActiveModel = user.into();
            active.name = Set(display_name(ext));
            active.discord_tag = Set(Some(ext.username.to_owned()));
            active.avatar_url = Set(ext.avatar_url.to_owned());
            if ext.email.is_some() {
                active.email = Set(ext.email.to_owned());
            }
            if is_owner {
                // Self-healing: never trust the stored role for the owner.
                active.role = Set(users::Role::Owner);
                active.is_owner = Set(true);
                active.is_admin = Set(true);
            }
            active.updated_at = Set(now);
            active.update(&txn).await?;
            user_id
        }
        None => {
            let role = if is_owner {
                users::Role::Owner
            } else {
                users::Role::User
            };
            let user = users::ActiveModel {
                discord_id: Set(ext.external_id.to_owned()),
                discord_tag: Set(Some(ext.username.to_owned())),
                name: Set(display_name(ext)),
                email: Set(ext.email.to_owned()),
                avatar_url: Set(ext.avatar_url.to_owned()),
                embark_id: Set(None),
                embark_username: Set(None),
                role: Set(role),
                is_owner: Set(is_owner),
                is_admin: Set(is_owner),
                is_banned: Set(false),
                ban_reason: Set(None),
                banned_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let res = users::Entity::insert(user).exec(&txn).await?;
            res.last_insert_id
        }
    };

    if is_owner {
        // Exactly one audit entry per owner sign-in event.
        let entry = mod_log::ActiveModel {
            moderator_id: Set(Some(user_id)),
            action: Set(mod_log::AuditAction::OwnerSignin),
            target_type: Set(mod_log::AuditTarget::User),
            target_id: Set(user_id),
            reason: Set(None),
            metadata: Set(Some(serde_json::json!({
                "email": ext.email,
                "name": display_name(ext),
            }))),
            created_at: Set(now),
            ..Default::default()
        };
        mod_log::Entity::insert(entry).exec(&txn).await?;

        log::info!("Owner signed in: user_id={}", user_id);
    }

    txn.commit().await?;

    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            IdentityError::Storage(DbErr::Custom("user row missing after sign-in".to_string()))
        })
}

/// Discord OAuth2 provider.
///
/// Exchanges the authorization code for a bearer token, then reads
/// `/users/@me` for the stable account id and profile attributes.
pub struct DiscordProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    http_client: reqwest::Client,
}

impl DiscordProvider {
    /// Reads DISCORD_CLIENT_ID / DISCORD_CLIENT_SECRET. The redirect URI is
    /// derived from the configured site base URL.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("DISCORD_CLIENT_ID").ok()?;
        let client_secret = std::env::var("DISCORD_CLIENT_SECRET").ok()?;
        let base_url = app_config::site().base_url;

        Some(Self {
            client_id,
            client_secret,
            redirect_uri: format!("{}/auth/discord/callback", base_url.trim_end_matches('/')),
            http_client: reqwest::Client::new(),
        })
    }
}

/// Discord OAuth token response
#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
}

/// Discord user info from /users/@me
#[derive(serde::Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    global_name: Option<String>,
    avatar: Option<String>,
    email: Option<String>,
}

#[async_trait]
impl IdentityProvider for DiscordProvider {
    fn authorize_url(&self, state: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "identify email")
            .append_pair("state", state)
            .finish();

        format!("https://discord.com/oauth2/authorize?{}", query)
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, IdentityError> {
        let response = self
            .http_client
            .post("https://discord.com/api/oauth2/token")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| IdentityError::Provider(format!("token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(IdentityError::Provider(format!(
                "token exchange returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Provider(format!("bad token response: {}", e)))?;

        let response = self
            .http_client
            .get("https://discord.com/api/users/@me")
            .header(
                "Authorization",
                format!("{} {}", token.token_type, token.access_token),
            )
            .send()
            .await
            .map_err(|e| IdentityError::Provider(format!("user info request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(IdentityError::Provider(format!(
                "user info request returned {}",
                response.status()
            )));
        }

        let user: DiscordUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Provider(format!("bad user info response: {}", e)))?;

        if user.id.trim().is_empty() {
            return Err(IdentityError::MissingExternalId);
        }

        let avatar_url = user.avatar.as_ref().map(|hash| {
            format!(
                "https://cdn.discordapp.com/avatars/{}/{}.png",
                user.id, hash
            )
        });

        Ok(ExternalIdentity {
            external_id: user.id,
            username: user.username,
            global_name: user.global_name,
            avatar_url,
            email: user.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(global_name: Option<&str>) -> ExternalIdentity {
        ExternalIdentity {
            external_id: "1368087024401252393".to_string(),
            username: "bl0wdart".to_string(),
            global_name: global_name.map(str::to_string),
            avatar_url: None,
            email: None,
        }
    }

    #[test]
    fn owner_check_requires_exact_match() {
        assert!(is_owner_external_id("1368087024401252393", "1368087024401252393"));
        assert!(!is_owner_external_id("1368087024401252393", "999"));
    }

    #[test]
    fn empty_owner_config_matches_nothing() {
        assert!(!is_owner_external_id("", ""));
        assert!(!is_owner_external_id("", "123"));
    }

    #[test]
    fn display_name_prefers_global_name() {
        assert_eq!(display_name(&identity(Some("Blowdart"))), "Blowdart");
        assert_eq!(display_name(&identity(None)), "bl0wdart");
    }
}
