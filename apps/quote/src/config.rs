//! # Harness Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line flags (highest priority, applied in main)              │
//! │     --campaigns ./campaigns.json                                        │
//! │                                                                         │
//! │  2. Environment Variables                                               │
//! │     VANTAGE_CACHE_TTL_SECS=60                                           │
//! │     VANTAGE_CACHE_MAX_ENTRIES=16                                        │
//! │     VANTAGE_CAMPAIGN_FILE=/srv/pos/campaigns.json                       │
//! │                                                                         │
//! │  3. TOML Config File                                                    │
//! │     ~/.config/vantage-pos/quote.toml (Linux)                            │
//! │     ~/Library/Application Support/com.vantage.pos/quote.toml (macOS)    │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # quote.toml
//! campaign_file = "campaigns.json"
//!
//! [engine]
//! cache_ttl_secs = 300
//! cache_max_entries = 64
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vantage_pricing::EngineSettings;

use crate::error::{QuoteError, QuoteResult};

/// Complete harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Engine tunables.
    #[serde(default)]
    pub engine: EngineSettings,

    /// Campaign catalog: a JSON array of campaigns.
    #[serde(default)]
    pub campaign_file: Option<PathBuf>,
}

impl QuoteConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (quote.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> QuoteResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading quote config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> QuoteResult<()> {
        self.engine
            .validate()
            .map_err(|e| QuoteError::InvalidConfig(e.to_string()))?;

        if let Some(path) = &self.campaign_file {
            if path.as_os_str().is_empty() {
                return Err(QuoteError::InvalidConfig(
                    "campaign_file must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `VANTAGE_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(ttl) = lookup("VANTAGE_CACHE_TTL_SECS") {
            match ttl.parse::<u64>() {
                Ok(secs) => {
                    debug!(secs, "Overriding cache TTL from environment");
                    self.engine.cache_ttl_secs = secs;
                }
                Err(_) => warn!(value = %ttl, "Ignoring non-numeric VANTAGE_CACHE_TTL_SECS"),
            }
        }

        if let Some(max) = lookup("VANTAGE_CACHE_MAX_ENTRIES") {
            match max.parse::<usize>() {
                Ok(entries) => self.engine.cache_max_entries = entries,
                Err(_) => warn!(value = %max, "Ignoring non-numeric VANTAGE_CACHE_MAX_ENTRIES"),
            }
        }

        if let Some(file) = lookup("VANTAGE_CAMPAIGN_FILE") {
            debug!(file = %file, "Overriding campaign file from environment");
            self.campaign_file = Some(PathBuf::from(file));
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "vantage", "pos")
            .map(|dirs| dirs.config_dir().join("quote.toml"))
    }
}
