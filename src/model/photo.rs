//! Photo references and their on-disk files

use crate::ExtractError;
use std::path::{Path, PathBuf};
use url::Url;

/// Query parameter carrying the photo identifier in a photo page reference
pub const PHOTO_ID_KEY: &str = "fbid";

/// Extension used when the asset URL does not name a known image type
const DEFAULT_EXTENSION: &str = "jpg";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// One photo of a profile's reel
///
/// Whether the photo is downloaded is never stored: it is recomputed from
/// the folder contents by [`Photo::is_downloaded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// Identifier parsed from the page reference
    pub id: String,

    /// Folder of the owning profile
    pub folder: PathBuf,

    /// Reference of the photo page
    pub page_ref: String,

    /// Direct URL of the image, known once the photo is resolved
    pub asset_url: Option<String>,

    /// Reference of the previous photo in the reel
    pub previous_ref: Option<String>,

    /// Reference of the next photo in the reel
    pub next_ref: Option<String>,
}

impl Photo {
    /// Creates an unresolved photo from its page reference
    ///
    /// Fails if the reference carries no usable photo identifier.
    pub fn new(page_ref: impl Into<String>, folder: impl Into<PathBuf>) -> Result<Self, ExtractError> {
        let page_ref = page_ref.into();
        let id = photo_id_from_reference(&page_ref)?;

        Ok(Self {
            id,
            folder: folder.into(),
            page_ref,
            asset_url: None,
            previous_ref: None,
            next_ref: None,
        })
    }

    /// File name for the photo once its asset URL is known
    pub fn filename(&self) -> String {
        let extension = self
            .asset_url
            .as_deref()
            .map(extension_from_url)
            .unwrap_or(DEFAULT_EXTENSION);
        format!("{}.{}", self.id, extension)
    }

    /// Full path of the photo file once its asset URL is known
    pub fn file_path(&self) -> PathBuf {
        self.folder.join(self.filename())
    }

    /// True if a file named `{id}.{ext}` exists in the photo's folder
    pub fn is_downloaded(&self) -> std::io::Result<bool> {
        is_downloaded_in(&self.folder, &self.id)
    }
}

/// Parses the photo identifier out of a photo page reference
///
/// The identifier becomes the photo's file name, so only ASCII letters,
/// digits, `_` and `-` are accepted.
///
/// # Example
///
/// ```
/// use profile_reel::model::photo_id_from_reference;
///
/// let id = photo_id_from_reference("/photo.php?fbid=1234&id=42&set=a.1").unwrap();
/// assert_eq!(id, "1234");
/// ```
pub fn photo_id_from_reference(reference: &str) -> Result<String, ExtractError> {
    let missing = || ExtractError::MissingPhotoId {
        reference: reference.to_string(),
        key: PHOTO_ID_KEY.to_string(),
    };

    // Relative references only need a base to expose their query string
    let base = Url::parse("http://reference.invalid/").map_err(|_| missing())?;
    let url = base.join(reference).map_err(|_| missing())?;

    let id = url
        .query_pairs()
        .find(|(key, _)| key == PHOTO_ID_KEY)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(missing)?;

    if !is_plain_file_stem(&id) {
        return Err(ExtractError::InvalidPhotoId {
            reference: reference.to_string(),
            id,
        });
    }
    Ok(id)
}

fn is_plain_file_stem(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn extension_from_url(asset_url: &str) -> &'static str {
    let path = Url::parse(asset_url)
        .map(|url| url.path().to_ascii_lowercase())
        .unwrap_or_default();

    IMAGE_EXTENSIONS
        .iter()
        .find(|ext| path.ends_with(&format!(".{}", ext)))
        .copied()
        .unwrap_or(DEFAULT_EXTENSION)
}

fn is_downloaded_in(folder: &Path, photo_id: &str) -> std::io::Result<bool> {
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && path.file_stem().and_then(|s| s.to_str()) == Some(photo_id) {
            return Ok(true);
        }
    }
    Ok(false)
}
