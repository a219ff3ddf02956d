//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with LFGHUB_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! The owner identity is configuration, not data: it is injected here at
//! process start and asserted on every sign-in, never read back out of a
//! database flag alone. Provider secrets (Discord client credentials) stay
//! in plain environment variables, not in the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "LFG Hub".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Owner identity configuration
///
/// `id` is the external (Discord) account id of the single site owner.
/// Empty means no owner is configured and nothing resolves to the owner role.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OwnerConfig {
    /// Set via LFGHUB_OWNER_ID
    pub id: String,
}

/// Posting lifecycle tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LfgConfig {
    /// Page-size ceiling for the public listing
    pub page_size: u64,
    /// Hours until a new posting expires
    pub posting_ttl_hours: i64,
    /// Interval of the background sweep that closes out expired postings
    pub sweep_interval_seconds: u64,
}

impl Default for LfgConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            posting_ttl_hours: 24,
            sweep_interval_seconds: 300,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub owner: OwnerConfig,
    pub lfg: LfgConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file (optional)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // Override with environment variables (LFGHUB_ prefix)
            // e.g., LFGHUB_OWNER_ID, LFGHUB_SITE_NAME
            .add_source(
                Environment::with_prefix("LFGHUB")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Initialize application configuration
///
/// This triggers the lazy loading of the config file and logs the result.
/// Should be called early in application startup.
pub fn init() {
    let config = APP_CONFIG.read().unwrap();
    if config.owner.id.is_empty() {
        log::warn!(
            "No owner identity configured (LFGHUB_OWNER_ID); admin endpoints will reject every caller"
        );
    }
    log::info!("Configuration loaded: site.name = {}", config.site.name);
}

// Convenience functions for accessing global config

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

/// Get site configuration
pub fn site() -> SiteConfig {
    get_config().site
}

/// Get owner identity configuration
pub fn owner() -> OwnerConfig {
    get_config().owner
}

/// Get posting lifecycle configuration
pub fn lfg() -> LfgConfig {
    get_config().lfg
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.site.name, "LFG Hub");
        assert_eq!(config.owner.id, "");
        assert_eq!(config.lfg.page_size, 50);
        assert_eq!(config.lfg.posting_ttl_hours, 24);
        assert_eq!(config.lfg.sweep_interval_seconds, 300);
    }

    #[test]
    #[serial]
    fn test_load_from_toml_file() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[site]
name = "Test LFG"
base_url = "https://lfg.example.com"

[owner]
id = "1368087024401252393"

[lfg]
posting_ttl_hours = 48
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(temp_file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.site.name, "Test LFG");
        assert_eq!(config.site.base_url, "https://lfg.example.com");
        assert_eq!(config.owner.id, "1368087024401252393");
        assert_eq!(config.lfg.posting_ttl_hours, 48);
        // Defaults should still apply for unspecified values
        assert_eq!(config.lfg.page_size, 50);
    }

    #[test]
    #[serial]
    fn test_missing_config_file_uses_defaults() {
        let config = AppConfig::load_from_path("/nonexistent/config.toml").unwrap();
        assert_eq!(config.site.name, "LFG Hub");
        assert_eq!(config.lfg.posting_ttl_hours, 24);
    }

    #[test]
    #[serial]
    fn test_owner_id_from_environment() {
        std::env::set_var("LFGHUB_OWNER_ID", "4242");
        let config = AppConfig::load_from_path("/nonexistent/config.toml").unwrap();
        std::env::remove_var("LFGHUB_OWNER_ID");
        assert_eq!(config.owner.id, "4242");
    }
}
