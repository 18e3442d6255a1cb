//! Extractor for the site's mobile markup
//!
//! Pages on the mobile site are plain server-rendered HTML, so every field is
//! found with a small set of link and element heuristics.

use crate::extract::traits::{
    NeighborRefs, PageExtractor, ProfileName, ProfilePhotoRefs, RECOGNIZED_ABOUT_LABELS,
};
use crate::fetch::Document;
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Substring identifying photo links on a profile page
const PROFILE_PHOTO_MARKER: &str = "photo";

/// Substring identifying neighbor links on a photo page
const NEIGHBOR_PHOTO_MARKER: &str = "/photo";

/// Substring identifying the full size redirect link on a photo page
const FULL_SIZE_MARKER: &str = "view_full_size";

/// [`PageExtractor`] for the mobile site
#[derive(Debug, Clone, Copy, Default)]
pub struct MobileMarkup;

impl MobileMarkup {
    pub fn new() -> Self {
        Self
    }
}

impl PageExtractor for MobileMarkup {
    fn profile_name(&self, doc: &Document) -> Result<ProfileName, ExtractError> {
        let html = Html::parse_document(&doc.body);
        let titles = select_texts(&html, "title");

        if titles.len() > 1 {
            tracing::warn!(
                "Found {} titles on {}, only the first one is used",
                titles.len(),
                doc.url
            );
        }

        let title = titles
            .into_iter()
            .next()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractError::MissingElement {
                element: "title".to_string(),
                url: doc.url.to_string(),
            })?;

        let mut words: Vec<&str> = title.split_whitespace().collect();
        let last_name = words.pop().map(str::to_string);
        let first_name = Some(words.join(" ")).filter(|s| !s.is_empty());

        Ok(ProfileName {
            first_name,
            last_name,
        })
    }

    fn profile_photo_refs(&self, doc: &Document) -> Result<ProfilePhotoRefs, ExtractError> {
        let html = Html::parse_document(&doc.body);
        let mut hrefs = select_hrefs(&html, PROFILE_PHOTO_MARKER).into_iter();

        match (hrefs.next(), hrefs.next()) {
            // The cover photo link comes first on the page
            (Some(cover_photo_ref), Some(profile_photo_ref)) => Ok(ProfilePhotoRefs {
                cover_photo_ref,
                profile_photo_ref,
            }),
            (first, _) => Err(ExtractError::TooFewPhotoLinks {
                found: usize::from(first.is_some()),
                url: doc.url.to_string(),
            }),
        }
    }

    fn about_facts(&self, doc: &Document) -> Result<BTreeMap<String, String>, ExtractError> {
        let html = Html::parse_document(&doc.body);
        let mut facts = BTreeMap::new();

        if let Ok(span_selector) = Selector::parse("span") {
            for span in html.select(&span_selector) {
                let label = element_text(span);
                if !RECOGNIZED_ABOUT_LABELS.contains(&label.as_str()) {
                    continue;
                }

                match next_element(span).map(element_text) {
                    Some(value) if !value.is_empty() => {
                        facts.entry(label).or_insert(value);
                    }
                    _ => tracing::debug!("No value found for '{}' on {}", label, doc.url),
                }
            }
        }

        if facts.is_empty() {
            tracing::warn!("Found no recognized about facts on {}", doc.url);
        }

        Ok(facts)
    }

    fn neighbor_refs(&self, doc: &Document) -> NeighborRefs {
        let html = Html::parse_document(&doc.body);
        let hrefs = select_hrefs(&html, NEIGHBOR_PHOTO_MARKER);

        match hrefs.as_slice() {
            [] => {
                tracing::warn!("Found no neighbor photo links on {}", doc.url);
                NeighborRefs::default()
            }
            [only] => {
                tracing::warn!(
                    "Found a single neighbor photo link on {}, using it as the next photo",
                    doc.url
                );
                NeighborRefs {
                    previous_ref: None,
                    next_ref: Some(only.clone()),
                }
            }
            [previous, next, ..] => NeighborRefs {
                previous_ref: Some(previous.clone()),
                next_ref: Some(next.clone()),
            },
        }
    }

    fn redirect_target(&self, doc: &Document) -> Result<String, ExtractError> {
        let html = Html::parse_document(&doc.body);
        let hrefs = select_hrefs(&html, FULL_SIZE_MARKER);

        if hrefs.len() > 1 {
            tracing::warn!(
                "Found {} full size links on {}, using the first one",
                hrefs.len(),
                doc.url
            );
        }

        hrefs
            .into_iter()
            .next()
            .ok_or_else(|| ExtractError::NoRedirectTarget {
                url: doc.url.to_string(),
            })
    }

    fn direct_asset_url(&self, doc: &Document) -> Result<String, ExtractError> {
        let html = Html::parse_document(&doc.body);
        let metas: Vec<ElementRef> = match Selector::parse("meta") {
            Ok(selector) => html.select(&selector).collect(),
            Err(_) => Vec::new(),
        };

        let [meta] = metas.as_slice() else {
            return Err(ExtractError::UnexpectedMetaCount {
                found: metas.len(),
                url: doc.url.to_string(),
            });
        };

        let content = meta.value().attr("content").unwrap_or_default();
        refresh_target(content).ok_or_else(|| ExtractError::MalformedRefresh {
            content: content.to_string(),
            url: doc.url.to_string(),
        })
    }
}

/// Extracts the target of a `<meta http-equiv="refresh">` content value
fn refresh_target(content: &str) -> Option<String> {
    let start = content.to_ascii_lowercase().find("url=")? + "url=".len();
    let target = content[start..].trim().trim_matches(|c| c == '\'' || c == '"');
    Some(target.to_string()).filter(|t| !t.is_empty())
}

/// Collects `href` values of links containing `marker`, in document order
fn select_hrefs(html: &Html, marker: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    html.select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains(marker))
        .map(str::to_string)
        .collect()
}

fn select_texts(html: &Html, css: &str) -> Vec<String> {
    match Selector::parse(css) {
        Ok(selector) => html.select(&selector).map(element_text).collect(),
        Err(_) => Vec::new(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// The element following `element` in document order
fn next_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if let Some(child) = element.children().find_map(ElementRef::wrap) {
        return Some(child);
    }

    let mut node = Some(*element);
    while let Some(current) = node {
        if let Some(sibling) = current.next_siblings().find_map(ElementRef::wrap) {
            return Some(sibling);
        }
        node = current.parent();
    }
    None
}
