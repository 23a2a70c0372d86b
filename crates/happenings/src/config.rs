use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute base for links in feeds and calendars (default: "http://localhost:3000")
    pub base_url: String,
    /// Site name shown in page titles and feeds (default: "Happenings")
    pub site_title: String,
    /// Listing cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cached listings (default: 64)
    pub cache_max_entries: usize,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BASE_URL` - Absolute site URL (default: "http://localhost:3000")
    /// - `SITE_TITLE` - Site name (default: "Happenings")
    /// - `CACHE_TTL_SECONDS` - Listing cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cached listings (default: 64)
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout (default: 10)
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("BASE_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            site_title: env::var("SITE_TITLE").unwrap_or_else(|_| "Happenings".to_string()),
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
