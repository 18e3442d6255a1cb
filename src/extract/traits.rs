//! Extractor trait and the structured values it yields

use crate::fetch::Document;
use crate::ExtractError;
use std::collections::BTreeMap;

/// About-page label projected into [`crate::model::Profile::hometown`]
pub const HOMETOWN_LABEL: &str = "Hometown";

/// About-page label projected into [`crate::model::Profile::current_residence`]
pub const CURRENT_RESIDENCE_LABEL: &str = "Current City";

/// About-page labels kept in a profile's facts
pub const RECOGNIZED_ABOUT_LABELS: &[&str] = &[
    HOMETOWN_LABEL,
    CURRENT_RESIDENCE_LABEL,
    "Birthday",
    "Gender",
    "Languages",
    "Relationship",
    "Work",
    "College",
    "High School",
];

/// Name parts read from a profile page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileName {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// The two photo links of a profile page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePhotoRefs {
    pub cover_photo_ref: String,
    pub profile_photo_ref: String,
}

/// Neighbor links of a photo page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborRefs {
    pub previous_ref: Option<String>,
    pub next_ref: Option<String>,
}

/// Turns fetched pages into structured fields
///
/// Implementations own every markup-specific decision. Degradations that
/// still leave a usable answer are logged as warnings; structure that makes
/// the page unusable is an [`ExtractError`].
pub trait PageExtractor {
    /// Reads the display name from a profile page
    fn profile_name(&self, doc: &Document) -> Result<ProfileName, ExtractError>;

    /// Finds the cover and profile photo references on a profile page
    ///
    /// Fails if fewer than two photo links are present.
    fn profile_photo_refs(&self, doc: &Document) -> Result<ProfilePhotoRefs, ExtractError>;

    /// Reads recognized label/value facts from an about page
    fn about_facts(&self, doc: &Document) -> Result<BTreeMap<String, String>, ExtractError>;

    /// Finds the previous and next photo links of a photo page
    ///
    /// A single link is taken as the next one; no links yield neither.
    fn neighbor_refs(&self, doc: &Document) -> NeighborRefs;

    /// Finds the full size redirect link of a photo page
    fn redirect_target(&self, doc: &Document) -> Result<String, ExtractError>;

    /// Reads the direct image URL from a redirect page
    ///
    /// The page must contain exactly one metadata element.
    fn direct_asset_url(&self, doc: &Document) -> Result<String, ExtractError>;
}
