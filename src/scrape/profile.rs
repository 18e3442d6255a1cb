//! Profile scraper: one full scrape of one profile

use crate::extract::{PageExtractor, CURRENT_RESIDENCE_LABEL, HOMETOWN_LABEL};
use crate::fetch::Fetcher;
use crate::model::Profile;
use crate::scrape::reel::{ReelStop, ReelWalker};
use crate::ReelError;
use std::time::Duration;

/// Scrapes profile information and downloads the photo reel
///
/// Holds the shared fetcher (and its logged-in session) so one scraper can
/// be reused for every profile of a run.
pub struct ProfileScraper<'a, E: PageExtractor> {
    fetcher: &'a Fetcher,
    extractor: &'a E,
    request_delay: Duration,
    max_photos: usize,
}

impl<'a, E: PageExtractor> ProfileScraper<'a, E> {
    /// Creates a new scraper
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The retrying fetcher used for every request
    /// * `extractor` - Reads fields out of fetched pages
    /// * `request_delay` - Pause between consecutive requests
    /// * `max_photos` - Photo budget per profile
    pub fn new(
        fetcher: &'a Fetcher,
        extractor: &'a E,
        request_delay: Duration,
        max_photos: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            request_delay,
            max_photos,
        }
    }

    /// Scrapes `profile` in place
    ///
    /// # Flow
    ///
    /// 1. Fetch the profile page, read the name and the two photo references
    /// 2. Fetch the about page, read the recognized facts
    /// 3. Walk the photo reel from the profile photo, up to the photo budget
    ///
    /// Any failure is returned unchanged; nothing is persisted here.
    pub async fn scrape(&self, profile: &mut Profile) -> Result<ReelStop, ReelError> {
        let profile_page = self.fetcher.fetch(&profile.id).await?;
        let name = self.extractor.profile_name(&profile_page)?;
        profile.first_name = name.first_name;
        profile.last_name = name.last_name;

        let photo_refs = self.extractor.profile_photo_refs(&profile_page)?;
        profile.cover_photo_ref = Some(photo_refs.cover_photo_ref);
        profile.profile_photo_ref = Some(photo_refs.profile_photo_ref);

        tokio::time::sleep(self.request_delay).await;
        let about_page = self.fetcher.fetch(&format!("{}/about", profile.id)).await?;
        let about = self.extractor.about_facts(&about_page)?;
        profile.hometown = about.get(HOMETOWN_LABEL).cloned();
        profile.current_residence = about.get(CURRENT_RESIDENCE_LABEL).cloned();
        profile.about = about;

        tokio::time::sleep(self.request_delay).await;
        let walker = ReelWalker::new(self.fetcher, self.extractor, self.request_delay);
        let outcome = walker
            .walk(
                &profile.id,
                &profile.folder,
                profile.profile_photo_ref.as_deref(),
                self.max_photos,
            )
            .await?;

        profile.photos = outcome.photos;
        Ok(outcome.stop)
    }
}
