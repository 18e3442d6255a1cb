//! Mock profile site shared by the integration tests

use profile_reel::fetch::{Fetcher, RetryPolicy};
use reqwest::Client;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Offset separating cover photo ids from reel photo ids
const COVER_OFFSET: u32 = 9000;

pub struct Site {
    pub server: MockServer,
}

impl Site {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Fetcher pointed at the mock site, with no delay between attempts
    pub fn fetcher(&self, attempts: u32) -> Fetcher {
        let base_url = Url::parse(&format!("{}/", self.server.uri())).expect("mock server URL");
        let policy = RetryPolicy {
            attempts,
            retry_delay: Duration::ZERO,
        };
        Fetcher::new(Client::new(), base_url, policy)
    }

    /// Number of requests the site has received so far
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    /// Mounts the profile and about pages of `id`, whose profile photo is `first_photo`
    pub async fn profile(&self, id: &str, name: &str, first_photo: u32) {
        let profile_page = format!(
            r#"<html><head><title>{name}</title></head><body>
                <a href="/{id}/about">About</a>
                <a href="/photo.php?fbid={cover}&amp;id={id}">Cover photo</a>
                <a href="/photo.php?fbid={first_photo}&amp;id={id}">Profile photo</a>
            </body></html>"#,
            name = name,
            id = id,
            cover = first_photo + COVER_OFFSET,
            first_photo = first_photo,
        );
        self.page(&format!("/{}", id), profile_page).await;

        let about_page = r#"<html><body>
                <div><span>Hometown</span><div>Oxford</div></div>
                <div><span>Current City</span><div>London</div></div>
                <div><span>Gender</span><div>Female</div></div>
            </body></html>"#;
        self.page(&format!("/{}/about", id), about_page.to_string())
            .await;
    }

    /// Mounts a reel walking through `photos` in order and ending after the last one
    pub async fn reel(&self, photos: &[u32]) {
        for (index, &photo) in photos.iter().enumerate() {
            let previous = index.checked_sub(1).map(|i| photos[i]);
            let next = photos.get(index + 1).copied();

            // The last page carries no neighbor links, which ends the reel
            let links = match (previous, next) {
                (_, None) => String::new(),
                (None, Some(next)) => photo_link(next, "Next"),
                (Some(previous), Some(next)) => {
                    format!("{}{}", photo_link(previous, "Previous"), photo_link(next, "Next"))
                }
            };
            self.photo(photo, &links).await;
        }
    }

    /// Mounts the photo page, full size redirect page and asset of `photo`
    pub async fn photo(&self, photo: u32, neighbor_links: &str) {
        let page = format!(
            r#"<html><body>{}<a href="/view_full_size/?fbid={}">View full size</a></body></html>"#,
            neighbor_links, photo
        );
        Mock::given(method("GET"))
            .and(path("/photo.php"))
            .and(query_param("fbid", photo.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&self.server)
            .await;

        let redirect = format!(
            r#"<html><head><meta http-equiv="refresh" content="0;url={}/assets/{}.jpg"></head></html>"#,
            self.server.uri(),
            photo
        );
        Mock::given(method("GET"))
            .and(path("/view_full_size/"))
            .and(query_param("fbid", photo.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(redirect))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/assets/{}.jpg", photo)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(asset_bytes(photo)))
            .mount(&self.server)
            .await;
    }

    /// Makes every request for photo page `photo` fail
    pub async fn broken_photo(&self, photo: u32) {
        Mock::given(method("GET"))
            .and(path("/photo.php"))
            .and(query_param("fbid", photo.to_string()))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.server)
            .await;
    }

    pub async fn page(&self, page_path: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }
}

pub fn asset_bytes(photo: u32) -> Vec<u8> {
    format!("jpeg-bytes-{}", photo).into_bytes()
}

fn photo_link(photo: u32, label: &str) -> String {
    format!(r#"<a href="/photo.php?fbid={}">{}</a>"#, photo, label)
}
