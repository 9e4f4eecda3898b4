//! Configuration and settings management
//!
//! Loads extraction settings from config files and environment variables.

use crate::providers::TikTokVersion;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Default timeout for a single extraction request.
pub const EXTRACTOR_TIMEOUT_SECS: u64 = 30;

/// Default TikTok extraction backend.
pub const TIKTOK_API_VERSION: &str = "v3";

/// Build the layered configuration shared by every settings struct.
///
/// Sources, lowest priority first: `config/default`, `config/{RUN_MODE}`,
/// `config/local`, `APP__*` variables, then plain environment variables.
///
/// # Errors
///
/// Returns a `ConfigError` if a present source cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        // Eg.. `APP__TIKTOK_API_URL=... ./target/app`
        .add_source(Environment::with_prefix("APP").separator("__"))
        // UPPER_SNAKE_CASE is mapped to snake_case; empty values count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Extraction service settings.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ExtractorSettings {
    /// Instagram extraction endpoint
    pub instagram_api_url: String,
    /// TikTok extraction endpoint
    pub tiktok_api_url: String,
    /// TikTok backend version selector (`v1`, `v2`, `v3`)
    #[serde(default = "default_tiktok_api_version")]
    pub tiktok_api_version: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_extractor_timeout_secs")]
    pub extractor_timeout_secs: u64,
}

fn default_tiktok_api_version() -> String {
    TIKTOK_API_VERSION.to_string()
}

const fn default_extractor_timeout_secs() -> u64 {
    EXTRACTOR_TIMEOUT_SECS
}

impl ExtractorSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediagrab_core::config::ExtractorSettings;
    ///
    /// let settings = ExtractorSettings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or an endpoint is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Self = build_config()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("instagram_api_url", &self.instagram_api_url),
            ("tiktok_api_url", &self.tiktok_api_url),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::NotFound(key.to_string()));
            }
        }
        Ok(())
    }

    /// TikTok backend version, falling back to the default on bad input.
    #[must_use]
    pub fn tiktok_version(&self) -> TikTokVersion {
        self.tiktok_api_version.parse().unwrap_or_else(|e| {
            warn!("{e}; using {}", TikTokVersion::default());
            TikTokVersion::default()
        })
    }

    /// Per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.extractor_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Single test so environment variables are not raced by parallel tests
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("INSTAGRAM_API_URL", "http://extractor.local/instagram");
        env::set_var("TIKTOK_API_URL", "http://extractor.local/tiktok");
        env::set_var("EXTRACTOR_TIMEOUT_SECS", "12");

        let settings = ExtractorSettings::new()?;
        assert_eq!(settings.instagram_api_url, "http://extractor.local/instagram");
        assert_eq!(settings.tiktok_version(), TikTokVersion::V3);
        assert_eq!(settings.timeout(), Duration::from_secs(12));

        // Empty values are ignored, so the endpoint counts as missing
        env::set_var("TIKTOK_API_URL", "");
        assert!(ExtractorSettings::new().is_err());

        env::remove_var("INSTAGRAM_API_URL");
        env::remove_var("TIKTOK_API_URL");
        env::remove_var("EXTRACTOR_TIMEOUT_SECS");
        Ok(())
    }

    #[test]
    fn test_tiktok_version_fallback() {
        let settings = ExtractorSettings {
            tiktok_api_version: "v2".to_string(),
            ..ExtractorSettings::default()
        };
        assert_eq!(settings.tiktok_version(), TikTokVersion::V2);

        let settings = ExtractorSettings {
            tiktok_api_version: "latest".to_string(),
            ..ExtractorSettings::default()
        };
        assert_eq!(settings.tiktok_version(), TikTokVersion::V3);
    }
}
