//! Profile-Reel: an incremental profile and photo-reel crawler
//!
//! This crate crawls profile pages, follows each profile's chain of photo
//! pages, downloads the photos and keeps an append-only catalog whose
//! one-folder-per-profile layout always agrees with its persisted store.

pub mod catalog;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod ids;
pub mod model;
pub mod scrape;

use thiserror::Error;

/// Main error type for Profile-Reel operations
#[derive(Debug, Error)]
pub enum ReelError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Cannot walk photos of {id}: no profile photo reference and no photos yet")]
    NoStartReference { id: String },

    #[error("Photo {photo_id} already exists in {folder}")]
    AlreadyDownloaded { photo_id: String, folder: String },

    #[error("Found folder for {id} while this ID does not exist in the catalog")]
    AlreadyExistsOnDisk { id: String },

    #[error("Failed to find the profile store in {root}")]
    MissingStore { root: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Identifier list error: {0}")]
    IdList(#[from] ids::IdListError),
}

impl ReelError {
    /// Returns true if the error must abort the whole run
    ///
    /// Per-profile scrape failures (fetching, extraction, a missing start
    /// photo, a stopped reel) are recoverable: the catalog skips the profile
    /// and rolls back its folder. Everything that means the catalog and the
    /// filesystem disagree is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Fetch(_)
                | Self::Extract(_)
                | Self::NoStartReference { .. }
                | Self::AlreadyDownloaded { .. }
        )
    }
}

/// Network errors surfaced by the retrying fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Giving up on {url} after {attempts} attempts (last status: {})", display_status(.last_status))]
    ExhaustedRetries {
        url: String,
        attempts: u32,
        last_status: Option<u16>,
    },

    #[error("Invalid page reference '{reference}': {source}")]
    InvalidReference {
        reference: String,
        source: ::url::ParseError,
    },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "no response".to_string(), |s| s.to_string())
}

/// Errors raised when a page does not have the expected structure
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing <{element}> on {url}")]
    MissingElement { element: String, url: String },

    #[error("Found {found} photo links on {url}, expected at least 2")]
    TooFewPhotoLinks { found: usize, url: String },

    #[error("No full size redirect link found on {url}")]
    NoRedirectTarget { url: String },

    #[error("Expected exactly one <meta> element on {url}, found {found}")]
    UnexpectedMetaCount { found: usize, url: String },

    #[error("Malformed refresh target on {url}: {content}")]
    MalformedRefresh { content: String, url: String },

    #[error("Photo reference '{reference}' has no '{key}' query parameter")]
    MissingPhotoId { reference: String, key: String },

    #[error("Photo reference '{reference}' carries an id that cannot be a file name: '{id}'")]
    InvalidPhotoId { reference: String, id: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Profile-Reel operations
pub type Result<T> = std::result::Result<T, ReelError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{AddOutcome, Catalog};
pub use config::Config;
pub use extract::{MobileMarkup, PageExtractor};
pub use fetch::{Document, Fetcher, RetryPolicy};
pub use model::{Photo, Profile, ProfileRecord};
pub use scrape::{ProfileScraper, ReelOutcome, ReelStop, ReelWalker};
