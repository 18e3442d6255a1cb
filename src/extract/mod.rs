//! Page extraction
//!
//! The crawl and catalog logic never look at markup directly. They consume
//! pages through the [`PageExtractor`] trait; [`MobileMarkup`] implements it
//! for the site's lightweight mobile pages.

mod markup;
mod traits;

pub use markup::MobileMarkup;
pub use traits::{
    NeighborRefs, PageExtractor, ProfileName, ProfilePhotoRefs, CURRENT_RESIDENCE_LABEL,
    HOMETOWN_LABEL, RECOGNIZED_ABOUT_LABELS,
};
