//! Photo reel walker
//!
//! A reel is an implicit linked list: a photo page only reveals its
//! neighbors once it has been fetched. The walker therefore never
//! materializes the reel up front. It keeps the reference of the next photo,
//! downloads that photo, and reads the following reference off its page.
//!
//! ```text
//! Start --(profile photo ref)--> HasCurrent --(next ref)--> HasCurrent
//!                                     |
//!                                     +--(no next ref)--> Exhausted
//! ```

use crate::extract::PageExtractor;
use crate::fetch::Fetcher;
use crate::model::Photo;
use crate::{FetchError, ReelError};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Why a reel walk stopped
///
/// Every variant is a normal termination; failures are returned as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReelStop {
    /// The photo budget was reached
    BudgetReached,

    /// The last downloaded photo has no next photo
    Exhausted,

    /// The next photo is already on disk
    AlreadyDownloaded { photo_id: String },
}

/// Result of a completed reel walk
#[derive(Debug, Clone)]
pub struct ReelOutcome {
    /// Photos downloaded during this walk, in reel order
    pub photos: Vec<Photo>,

    pub stop: ReelStop,
}

/// Walks a profile's photo reel and downloads each photo
pub struct ReelWalker<'a, E: PageExtractor> {
    fetcher: &'a Fetcher,
    extractor: &'a E,
    request_delay: Duration,
}

impl<'a, E: PageExtractor> ReelWalker<'a, E> {
    pub fn new(fetcher: &'a Fetcher, extractor: &'a E, request_delay: Duration) -> Self {
        Self {
            fetcher,
            extractor,
            request_delay,
        }
    }

    /// Downloads up to `max_photos` photos starting at `start_ref`
    ///
    /// # Arguments
    ///
    /// * `profile_id` - Owner of the reel, used in errors and logs
    /// * `folder` - Folder the photo files are written to
    /// * `start_ref` - Page reference of the first photo (the profile photo)
    /// * `max_photos` - Photo budget
    ///
    /// # Returns
    ///
    /// * `Ok(ReelOutcome)` - The walk stopped normally
    /// * `Err(ReelError::NoStartReference)` - There is no photo to start from
    /// * `Err(ReelError)` - Fetching, extraction or writing a photo failed
    pub async fn walk(
        &self,
        profile_id: &str,
        folder: &Path,
        start_ref: Option<&str>,
        max_photos: usize,
    ) -> Result<ReelOutcome, ReelError> {
        let start_ref = start_ref.ok_or_else(|| ReelError::NoStartReference {
            id: profile_id.to_string(),
        })?;

        let mut photos: Vec<Photo> = Vec::new();
        let mut next_ref = Some(start_ref.to_string());

        let stop = loop {
            if photos.len() >= max_photos {
                break ReelStop::BudgetReached;
            }

            let Some(reference) = next_ref.take() else {
                break ReelStop::Exhausted;
            };

            if !photos.is_empty() {
                tokio::time::sleep(self.request_delay).await;
            }

            let mut photo = Photo::new(reference, folder)?;
            match self.download(&mut photo).await {
                Ok(()) => {}
                Err(ReelError::AlreadyDownloaded { photo_id, .. }) => {
                    tracing::info!(
                        "Photo {} of {} is already downloaded, stopping the reel",
                        photo_id,
                        profile_id
                    );
                    break ReelStop::AlreadyDownloaded { photo_id };
                }
                Err(e) => return Err(e),
            }

            tracing::debug!(
                "Downloaded photo {} of {} ({} so far)",
                photo.id,
                profile_id,
                photos.len() + 1
            );

            next_ref = photo.next_ref.clone();
            photos.push(photo);
        };

        if stop == ReelStop::Exhausted {
            tracing::info!(
                "Reel of {} ended after {} photos",
                profile_id,
                photos.len()
            );
        }

        Ok(ReelOutcome { photos, stop })
    }

    /// Resolves and downloads one photo into its folder
    ///
    /// Sets the photo's neighbor references and asset URL along the way.
    /// Fails with [`ReelError::AlreadyDownloaded`] before any request if the
    /// photo file already exists.
    pub async fn download(&self, photo: &mut Photo) -> Result<(), ReelError> {
        if photo.is_downloaded()? {
            return Err(already_downloaded(photo));
        }

        let page = self.fetcher.fetch(&photo.page_ref).await?;
        let neighbors = self.extractor.neighbor_refs(&page);
        photo.previous_ref = neighbors.previous_ref;
        photo.next_ref = neighbors.next_ref;
        let redirect_ref = self.extractor.redirect_target(&page)?;

        tokio::time::sleep(self.request_delay).await;
        let redirect_page = self.fetcher.fetch(&redirect_ref).await?;
        let asset_url = self.extractor.direct_asset_url(&redirect_page)?;
        photo.asset_url = Some(asset_url.clone());

        let mut response = self.fetcher.fetch_asset(&asset_url).await?;

        let path = photo.file_path();
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(already_downloaded(photo))
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Body {
            url: asset_url.clone(),
            source,
        })? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }
}

fn already_downloaded(photo: &Photo) -> ReelError {
    ReelError::AlreadyDownloaded {
        photo_id: photo.id.clone(),
        folder: photo.folder.display().to_string(),
    }
}
