//! # Rule-List Cache
//!
//! Compiled rule lists keyed by campaign id, shared by every sale session
//! of one engine.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_or_build("summer-24", build)                                       │
//! │     │                                                                   │
//! │     ├── read lock: entry younger than TTL? ──► yes ──► Arc clone        │
//! │     │                                                                   │
//! │     └── no ──► build() outside any lock                                 │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │            write lock: insert, then if len > max_entries                │
//! │            evict every expired entry                                    │
//! │                                                                         │
//! │  invalidate_all() ──► write lock: clear                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cached data is immutable once built, so a poisoned lock is recovered
//! rather than propagated. Two sessions missing at the same time may both
//! build; the later insert wins and both lists are identical.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::rules::DiscountRule;
use crate::settings::EngineSettings;

#[derive(Debug)]
struct CachedRules {
    rules: Arc<[DiscountRule]>,
    built_at: Instant,
}

impl CachedRules {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.built_at) < ttl
    }
}

/// Campaign-keyed cache of compiled rule lists.
#[derive(Debug)]
pub struct RuleCache {
    entries: RwLock<HashMap<String, CachedRules>>,
    ttl: Duration,
    max_entries: usize,
}

impl RuleCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        RuleCache {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        RuleCache::new(settings.cache_ttl(), settings.cache_max_entries)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached list for `campaign_id`, building it on a miss or
    /// when the cached one has expired.
    pub fn get_or_build<F>(&self, campaign_id: &str, build: F) -> Arc<[DiscountRule]>
    where
        F: FnOnce() -> Vec<DiscountRule>,
    {
        let now = Instant::now();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = entries.get(campaign_id) {
                if cached.is_fresh(self.ttl, now) {
                    return Arc::clone(&cached.rules);
                }
            }
        }

        let rules: Arc<[DiscountRule]> = build().into();
        debug!(campaign_id, rules = rules.len(), "Built rule list");

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            campaign_id.to_string(),
            CachedRules {
                rules: Arc::clone(&rules),
                built_at: Instant::now(),
            },
        );

        if entries.len() > self.max_entries {
            let before = entries.len();
            let now = Instant::now();
            let ttl = self.ttl;
            entries.retain(|_, cached| cached.is_fresh(ttl, now));
            debug!(evicted = before - entries.len(), "Evicted expired rule lists");
        }

        rules
    }

    /// Drops every cached list. Call after any campaign edit.
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = entries.len();
        entries.clear();
        info!(dropped, "Rule cache invalidated");
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RuleCache {
    fn default() -> Self {
        RuleCache::from_settings(&EngineSettings::default())
    }
}
