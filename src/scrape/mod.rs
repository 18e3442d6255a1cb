//! Scraping of one profile
//!
//! This module contains:
//! - [`ProfileScraper`]: profile page, about page, then the photo reel
//! - [`ReelWalker`]: the forward walk along a profile's photo reel

mod profile;
mod reel;

pub use profile::ProfileScraper;
pub use reel::{ReelOutcome, ReelStop, ReelWalker};
