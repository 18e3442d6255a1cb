//! Profile and photo data structures
//!
//! This module defines the in-memory entities built during a scrape and the
//! flat [`ProfileRecord`] that the catalog persists.

mod photo;
mod profile;

pub use photo::{photo_id_from_reference, Photo, PHOTO_ID_KEY};
pub use profile::{PhotoRecord, Profile, ProfileRecord};
