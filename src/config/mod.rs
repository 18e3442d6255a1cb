//! Configuration module for Profile-Reel
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use profile_reel::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("reel.toml")).unwrap();
//! println!("Photo budget per profile: {}", config.crawler.max_photos);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, SessionConfig, StorageConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
