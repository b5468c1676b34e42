//! # Engine Settings
//!
//! Tunables for the discount engine. Embedding applications deserialize
//! them from their own config file (see the `quote` harness for a
//! TOML + environment loader).
//!
//! ```toml
//! [engine]
//! cache_ttl_secs = 300     # how long a compiled rule list is reused
//! cache_max_entries = 64   # campaigns cached before expired ones are evicted
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PricingError, PricingResult};

/// Settings for [`DiscountEngine`](crate::engine::DiscountEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Lifetime of a cached rule list (seconds).
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Entry count above which expired rule lists are evicted.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    64
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            cache_ttl_secs: default_cache_ttl(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

impl EngineSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn validate(&self) -> PricingResult<()> {
        if self.cache_max_entries == 0 {
            return Err(PricingError::InvalidSettings(
                "cache_max_entries must be greater than 0".into(),
            ));
        }

        // A day is far beyond any campaign edit cadence
        if self.cache_ttl_secs > 86_400 {
            return Err(PricingError::InvalidSettings(format!(
                "cache_ttl_secs must be at most 86400, got {}",
                self.cache_ttl_secs
            )));
        }

        Ok(())
    }
}
