//! Reading the list of profile ids to scrape
//!
//! Two formats are supported:
//! - `.txt`: one id per line; whitespace is dropped and blank lines skipped
//! - `.toml`: a top-level `ids = ["...", ...]` array

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading an id list
#[derive(Debug, Error)]
pub enum IdListError {
    #[error("Failed to read id list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse id list: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Id list should be a .txt or .toml file, got '{0}'")]
    UnsupportedFormat(String),
}

#[derive(Debug, Deserialize)]
struct IdListFile {
    ids: Vec<String>,
}

/// Reads profile ids from `path`, choosing the format by extension
pub fn read_id_list(path: &Path) -> Result<Vec<String>, IdListError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let content = match extension.as_str() {
        "txt" | "toml" => std::fs::read_to_string(path)?,
        _ => return Err(IdListError::UnsupportedFormat(path.display().to_string())),
    };

    if extension == "txt" {
        Ok(parse_lines(&content))
    } else {
        let file: IdListFile = toml::from_str(&content)?;
        Ok(file.ids)
    }
}

fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Returns the `start..end` window of `ids`, clamped to the list
pub fn select_range(ids: &[String], start: usize, end: Option<usize>) -> &[String] {
    let end = end.unwrap_or(ids.len()).min(ids.len());
    let start = start.min(end);
    &ids[start..end]
}
