use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Profile-Reel
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub session: SessionConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
}

/// HTTP session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Base URL every page reference is resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Crawl pacing and budget configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of photos downloaded per profile
    #[serde(rename = "max-photos", default = "default_max_photos")]
    pub max_photos: usize,

    /// Total number of attempts for every fetch
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Delay between two attempts of the same fetch (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Delay between consecutive requests while scraping one profile (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Delay between two profiles (milliseconds)
    #[serde(rename = "entity-delay-ms", default = "default_entity_delay_ms")]
    pub entity_delay_ms: u64,
}

impl CrawlerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn entity_delay(&self) -> Duration {
        Duration::from_millis(self.entity_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_photos: default_max_photos(),
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            request_delay_ms: default_request_delay_ms(),
            entity_delay_ms: default_entity_delay_ms(),
        }
    }
}

/// Catalog storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root folder holding one subfolder per profile and the profile store
    pub root: PathBuf,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux i686; rv:39.0) Gecko/20100101 Firefox/39.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_photos() -> usize {
    5
}

fn default_attempts() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    5000
}

fn default_request_delay_ms() -> u64 {
    2000
}

fn default_entity_delay_ms() -> u64 {
    5000
}
