use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use lfghub::db::{get_db_pool, init_db};
use lfghub::identity::{DiscordProvider, IdentityProvider};
use lfghub::middleware::ClientCtx;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();
    init_our_mods();
    init_db(std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.")).await;

    let provider: Arc<dyn IdentityProvider> = Arc::new(
        DiscordProvider::from_env()
            .expect("DISCORD_CLIENT_ID and DISCORD_CLIENT_SECRET must be set."),
    );

    let secret_key = match std::env::var("SECRET_KEY") {
        Ok(key) => Key::from(key.as_bytes()),
        Err(err) => {
            let random_string: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(128)
                .map(char::from)
                .collect();
            log::warn!("SECRET_KEY was invalid ({:?}). Session cookies will be signed with a one-off random key and stop validating on every restart. A key must be at least 64 bytes; need one?\r\n{}", err, random_string);
            Key::from(random_string.as_bytes())
        }
    };

    // Close out postings whose expiry has lapsed so admin-facing counts
    // match what the read path serves.
    actix_web::rt::spawn(async {
        let sweep_interval = lfghub::app_config::lfg().sweep_interval_seconds;
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(sweep_interval));
        loop {
            interval.tick().await;
            match lfghub::lfg::expire_stale_postings(get_db_pool()).await {
                Ok(0) => {}
                Ok(swept) => log::info!("Expiry sweep cancelled {} stale postings", swept),
                Err(err) => log::error!("Expiry sweep failed: {}", err),
            }
        }
    });

    HttpServer::new(move || {
        let provider_data: Data<Arc<dyn IdentityProvider>> = Data::new(provider.clone());

        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(provider_data)
            // Security headers - applied to all responses
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(ClientCtx::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(false) // Allow HTTP for development
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(Logger::new("%a %{User-Agent}i"))
            .configure(lfghub::web::configure)
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    // This should be calls to crates without any transformative work applied.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Initialize all local mods.
pub fn init_our_mods() {
    // Each module should work mostly independent of others so individual
    // modules stay unit-testable without loading the entire application.
    lfghub::app_config::init();
}
