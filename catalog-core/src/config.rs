//! # Catalog configuration
//!
//! A small string key/value store, in the spirit of `app.set()` /
//! `app.get()`. Typed settings (image host, store deadlines, admin
//! policies) are read from a [`CatalogConfigSnapshot`] by the crate that
//! owns them.
//!
//! ```rust
//! use catalog_core::CatalogConfig;
//!
//! let mut config = CatalogConfig::new();
//! config.set("images.timeout_secs", "10");
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get_u64("images.timeout_secs"), Some(10));
//! ```
//!
//! ## Environment overrides
//! `CatalogConfig::load_env("CATALOG__")` maps
//! `CATALOG__IMAGES__API_KEY=abc` to `images.api_key = "abc"`.

use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct CatalogConfig {
    values: HashMap<String, String>,
}

impl CatalogConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Build a config from environment variables carrying `prefix`.
    pub fn from_env(prefix: &str) -> Self {
        let mut config = Self::new();
        config.load_env(prefix);
        config
    }

    /// Layer environment variables carrying `prefix` on top of current values.
    pub fn load_env(&mut self, prefix: &str) {
        self.load_pairs(prefix, std::env::vars());
    }

    fn load_pairs<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                // CATALOG__STORE__TIMEOUT_MS -> store.timeout_ms
                let normalized = stripped.to_lowercase().replace("__", ".");
                self.set(normalized, value);
            }
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Chainable `set`.
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> CatalogConfigSnapshot {
        CatalogConfigSnapshot::new(self.values.clone())
    }
}

/// Immutable view handed to component constructors.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfigSnapshot {
    map: HashMap<String, String>,
}

impl CatalogConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.trim().parse::<bool>().ok())
    }

    pub fn get_secs(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_secs)
    }

    pub fn get_millis(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_millis)
    }
}

/// Settings for the document store side of the layer.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Deadline applied to every store call when wrapped in `DeadlineStore`.
    pub timeout: Duration,

    /// Buffered change events per collection before slow feeds lag.
    pub feed_capacity: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            feed_capacity: 256,
        }
    }
}

impl StoreSettings {
    pub fn from_config(config: &CatalogConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            timeout: config.get_millis("store.timeout_ms").unwrap_or(defaults.timeout),
            feed_capacity: config
                .get_usize("store.feed_capacity")
                .filter(|c| *c > 0)
                .unwrap_or(defaults.feed_capacity),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity;
        self
    }
}
