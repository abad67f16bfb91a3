use std::time::Duration;

use catalog_core::CatalogConfigSnapshot;

/// Public ImgBB upload endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// Configuration for image uploads
#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    /// Upload endpoint (multipart POST)
    pub endpoint: String,

    /// API key, sent as the `key` query parameter
    pub api_key: String,

    /// Upper bound for a single upload, transport included
    pub timeout: Duration,

    /// Largest image accepted before any network call
    pub max_image_bytes: u64,

    /// Gallery uploads in flight at once. 1 means strictly sequential;
    /// results are always reassembled in input order.
    pub gallery_concurrency: usize,
}

impl Default for ImageHostConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
            max_image_bytes: 32 * 1024 * 1024, // 32MB, ImgBB's limit
            gallery_concurrency: 1,
        }
    }
}

impl ImageHostConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `images.*` keys, falling back to defaults
    pub fn from_config(config: &CatalogConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            endpoint: config.get_string("images.endpoint").unwrap_or(defaults.endpoint),
            api_key: config.get_string("images.api_key").unwrap_or(defaults.api_key),
            timeout: config.get_secs("images.timeout_secs").unwrap_or(defaults.timeout),
            max_image_bytes: config.get_u64("images.max_bytes").unwrap_or(defaults.max_image_bytes),
            gallery_concurrency: config
                .get_usize("images.gallery_concurrency")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.gallery_concurrency),
        }
    }

    /// Set the upload endpoint
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the API key
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the per-upload timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max image size
    pub fn with_max_image_bytes(mut self, bytes: u64) -> Self {
        self.max_image_bytes = bytes;
        self
    }

    /// Allow up to `n` gallery uploads in flight
    pub fn with_gallery_concurrency(mut self, n: usize) -> Self {
        self.gallery_concurrency = n.max(1);
        self
    }
}
