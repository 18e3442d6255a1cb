//! Fetch module: the only place that talks to the network
//!
//! This module contains:
//! - HTTP client construction and session login
//! - The retrying fetcher used for pages and photo assets

mod fetcher;
mod session;

pub use fetcher::{Document, Fetcher, RetryPolicy};
pub use session::{build_http_client, login, Credentials};
