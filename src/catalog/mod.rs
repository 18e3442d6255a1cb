//! Profile catalog
//!
//! The catalog owns the storage root: one subfolder per profile plus the
//! profile store. Two invariants hold at all times:
//!
//! - After loading and after every save, the set of known profile ids equals
//!   the set of subfolders of the root.
//! - A failed scrape never leaves an empty folder behind, and a failed scrape
//!   that already wrote files is a hard error rather than silent data loss.
//!
//! Violations are reported as [`ReelError::Database`] and never repaired
//! automatically.

mod schema;
mod store;

pub use store::{ProfileStore, STORE_FILE_NAME};

use crate::extract::PageExtractor;
use crate::model::{Profile, ProfileRecord};
use crate::scrape::{ProfileScraper, ReelStop};
use crate::ReelError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// What [`Catalog::add`] did with an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The id was already in the catalog; nothing was requested
    Skipped,

    /// The profile was scraped and buffered for the next save
    Added { photos: usize, stop: ReelStop },

    /// The scrape failed and its empty folder was rolled back
    Failed { reason: String },
}

/// Append-only, consistency-checked collection of scraped profiles
#[derive(Debug)]
pub struct Catalog {
    root: PathBuf,
    known_ids: BTreeSet<String>,
    /// Records loaded from the store
    stored: Vec<ProfileRecord>,
    /// Records scraped since the last save
    pending: Vec<ProfileRecord>,
}

impl Catalog {
    /// Loads the catalog rooted at `root`
    ///
    /// A missing root is created and yields an empty catalog.
    ///
    /// # Returns
    ///
    /// * `Ok(Catalog)` - Empty catalog, or the stored one after validation
    /// * `Err(ReelError::Database)` - A store exists without folders, or the
    ///   stored ids and the folders disagree
    /// * `Err(ReelError::MissingStore)` - Folders exist without a store
    pub fn load(root: &Path) -> Result<Self, ReelError> {
        std::fs::create_dir_all(root)?;

        let folders = list_folders(root)?;
        let store_path = root.join(STORE_FILE_NAME);
        let has_store = store_path.is_file();

        if folders.is_empty() {
            if has_store {
                return Err(ReelError::Database(format!(
                    "{} exists in {} while no profile folders were found",
                    STORE_FILE_NAME,
                    root.display()
                )));
            }

            tracing::info!(
                "No existing catalog found, a new one will be created in {}",
                root.display()
            );
            return Ok(Self::empty(root));
        }

        if !has_store {
            return Err(ReelError::MissingStore {
                root: root.display().to_string(),
            });
        }

        let stored = ProfileStore::open(&store_path)?.load_records()?;
        let catalog = Self {
            root: root.to_path_buf(),
            known_ids: stored.iter().map(|r| r.id.clone()).collect(),
            stored,
            pending: Vec::new(),
        };
        catalog.check()?;

        tracing::info!(
            "Loaded catalog with {} profiles from {}",
            catalog.known_ids.len(),
            root.display()
        );
        Ok(catalog)
    }

    fn empty(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            known_ids: BTreeSet::new(),
            stored: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store_path(&self) -> PathBuf {
        self.root.join(STORE_FILE_NAME)
    }

    /// Ids of every profile in the catalog, saved or not
    pub fn existing_ids(&self) -> &BTreeSet<String> {
        &self.known_ids
    }

    /// Names of the subfolders currently present in the root
    pub fn existing_folders(&self) -> Result<BTreeSet<String>, ReelError> {
        list_folders(&self.root)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.known_ids.contains(id)
    }

    /// Stored records followed by the records scraped since the last save
    pub fn records(&self) -> impl Iterator<Item = &ProfileRecord> {
        self.stored.iter().chain(self.pending.iter())
    }

    /// Records scraped since the last save
    pub fn pending(&self) -> &[ProfileRecord] {
        &self.pending
    }

    /// Folders in the root that have no row in the persisted store
    ///
    /// These are the profiles added since the last save, plus any folder a
    /// fatal scrape failure refused to roll back. A run that aborts before
    /// saving leaves them behind, and they must be removed before the
    /// catalog loads again.
    pub fn uncommitted_folders(&self) -> Result<Vec<PathBuf>, ReelError> {
        let stored: BTreeSet<&str> = self.stored.iter().map(|r| r.id.as_str()).collect();
        Ok(self
            .existing_folders()?
            .into_iter()
            .filter(|name| !stored.contains(name.as_str()))
            .map(|name| self.root.join(name))
            .collect())
    }

    /// Verifies that the known ids and the root's subfolders match exactly
    pub fn check(&self) -> Result<(), ReelError> {
        let folders = self.existing_folders()?;
        if folders != self.known_ids {
            return Err(ReelError::Database(format!(
                "catalog in {} is inconsistent: found folders for {:?} while the store contains {:?}",
                self.root.display(),
                folders,
                self.known_ids
            )));
        }
        Ok(())
    }

    /// Scrapes a profile into the catalog
    ///
    /// # Flow
    ///
    /// 1. Skip ids that are already known, without any request
    /// 2. Refuse ids that have a folder but are unknown
    /// 3. Create the folder and run the scraper
    /// 4. On success, buffer the record for [`Catalog::save`]
    /// 5. On failure, remove the folder if it is still empty
    ///
    /// # Returns
    ///
    /// * `Ok(AddOutcome)` - The id was skipped, added, or failed and rolled back
    /// * `Err(ReelError::AlreadyExistsOnDisk)` - A folder exists for an unknown id
    /// * `Err(ReelError::Database)` - A failed scrape left files behind
    pub async fn add<E: PageExtractor>(
        &mut self,
        id: &str,
        scraper: &ProfileScraper<'_, E>,
    ) -> Result<AddOutcome, ReelError> {
        if self.known_ids.contains(id) {
            tracing::info!("Skipping {} because it exists in the catalog", id);
            return Ok(AddOutcome::Skipped);
        }

        if !is_valid_id(id) {
            tracing::warn!("Skipping '{}' because it cannot be used as a folder name", id);
            return Ok(AddOutcome::Failed {
                reason: format!("invalid profile id '{}'", id),
            });
        }

        let mut profile = Profile::new(id, &self.root);
        if profile.folder.exists() {
            return Err(ReelError::AlreadyExistsOnDisk { id: id.to_string() });
        }

        tracing::info!("Attempting to scrape {}", id);
        std::fs::create_dir(&profile.folder)?;

        match scraper.scrape(&mut profile).await {
            Ok(stop) => {
                let photos = profile.photos.len();
                self.known_ids.insert(profile.id.clone());
                self.pending.push(profile.to_record());

                tracing::info!("{} scraped successfully with {} photos", id, photos);
                profile.describe();
                Ok(AddOutcome::Added { photos, stop })
            }
            Err(e) => {
                tracing::warn!("Failed to scrape {}: {}", id, e);
                self.rollback(&profile)?;

                if e.is_fatal() {
                    return Err(e);
                }
                Ok(AddOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Removes the folder of a failed scrape if nothing was written to it
    fn rollback(&self, profile: &Profile) -> Result<(), ReelError> {
        let written = std::fs::read_dir(&profile.folder)?.count();

        if written > 0 {
            return Err(ReelError::Database(format!(
                "scrape of {} failed after writing {} files to {}; refusing to discard them",
                profile.id,
                written,
                profile.folder.display()
            )));
        }

        std::fs::remove_dir(&profile.folder)?;
        tracing::info!("Removed empty folder {}", profile.folder.display());
        Ok(())
    }

    /// Persists the records scraped since the last save
    ///
    /// New rows are appended after the stored ones and never replace them.
    /// Saving with nothing buffered leaves the store untouched (and does not
    /// create one).
    ///
    /// # Returns
    ///
    /// The number of records written
    pub fn save(&mut self) -> Result<usize, ReelError> {
        if self.pending.is_empty() {
            tracing::debug!("Nothing new to save in {}", self.root.display());
            return Ok(0);
        }

        let mut store = ProfileStore::open(&self.store_path())?;
        let written = store.append_records(&self.pending)?;
        self.stored.append(&mut self.pending);

        self.check()?;
        tracing::info!(
            "Saved {} new profiles to {} ({} in total)",
            written,
            self.store_path().display(),
            self.stored.len()
        );
        Ok(written)
    }
}

/// A profile id doubles as a folder name, so it must be a single path component
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(|c: char| c == '/' || c == '\\')
}

fn list_folders(root: &Path) -> Result<BTreeSet<String>, ReelError> {
    let mut folders = BTreeSet::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            folders.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(folders)
}
