//! Profiles and their persisted records

use crate::model::Photo;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A profile being scraped
///
/// Created in memory when a scrape begins and projected into a
/// [`ProfileRecord`] once the scrape succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Unique profile identifier, also the folder name
    pub id: String,

    /// Folder holding the downloaded photos
    pub folder: PathBuf,

    pub first_name: Option<String>,
    pub last_name: Option<String>,

    /// Projected from the about page, if present
    pub hometown: Option<String>,
    pub current_residence: Option<String>,

    /// Every recognized fact found on the about page
    pub about: BTreeMap<String, String>,

    pub profile_photo_ref: Option<String>,
    pub cover_photo_ref: Option<String>,

    /// Downloaded photos in reel order
    pub photos: Vec<Photo>,
}

impl Profile {
    /// Creates an empty profile whose folder lives under `root`
    pub fn new(id: impl Into<String>, root: &Path) -> Self {
        let id = id.into();
        let folder = root.join(&id);

        Self {
            id,
            folder,
            first_name: None,
            last_name: None,
            hometown: None,
            current_residence: None,
            about: BTreeMap::new(),
            profile_photo_ref: None,
            cover_photo_ref: None,
            photos: Vec::new(),
        }
    }

    /// Name parts joined with a space, if any are known
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }

    /// Logs a short description of the profile
    pub fn describe(&self) {
        tracing::info!(
            "Profile {}: name={}, hometown={}, current residence={}, photos={}",
            self.id,
            self.full_name().as_deref().unwrap_or("-"),
            self.hometown.as_deref().unwrap_or("-"),
            self.current_residence.as_deref().unwrap_or("-"),
            self.photos.len()
        );
    }

    /// Projects the profile into its persisted record
    pub fn to_record(&self) -> ProfileRecord {
        ProfileRecord {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            hometown: self.hometown.clone(),
            current_residence: self.current_residence.clone(),
            about: self.about.clone(),
            profile_photo_ref: self.profile_photo_ref.clone(),
            cover_photo_ref: self.cover_photo_ref.clone(),
            photos: self.photos.iter().map(PhotoRecord::from).collect(),
        }
    }
}

/// Persisted row for one profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub hometown: Option<String>,
    pub current_residence: Option<String>,
    pub about: BTreeMap<String, String>,
    pub profile_photo_ref: Option<String>,
    pub cover_photo_ref: Option<String>,
    pub photos: Vec<PhotoRecord>,
}

impl ProfileRecord {
    /// Photo page references in reel order
    pub fn photo_page_refs(&self) -> Vec<&str> {
        self.photos.iter().map(|p| p.page_ref.as_str()).collect()
    }

    /// Resolved asset URLs in reel order
    pub fn asset_urls(&self) -> Vec<Option<&str>> {
        self.photos.iter().map(|p| p.asset_url.as_deref()).collect()
    }

    /// (previous, next) reference pairs in reel order
    pub fn neighbor_refs(&self) -> Vec<(Option<&str>, Option<&str>)> {
        self.photos
            .iter()
            .map(|p| (p.previous_ref.as_deref(), p.next_ref.as_deref()))
            .collect()
    }
}

/// Persisted data for one photo of a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    pub page_ref: String,
    pub asset_url: Option<String>,
    pub previous_ref: Option<String>,
    pub next_ref: Option<String>,
}

impl From<&Photo> for PhotoRecord {
    fn from(photo: &Photo) -> Self {
        Self {
            page_ref: photo.page_ref.clone(),
            asset_url: photo.asset_url.clone(),
            previous_ref: photo.previous_ref.clone(),
            next_ref: photo.next_ref.clone(),
        }
    }
}
