//! Retrying HTTP fetcher
//!
//! Every request of a run goes through [`Fetcher`]. Non-success responses and
//! transport failures are retried after a fixed delay until the attempt
//! budget runs out; callers only ever see a successful response or a
//! [`FetchError`].

use crate::FetchError;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// Attempt budget and pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of requests issued before giving up (at least one)
    pub attempts: u32,

    /// Pause between two consecutive attempts
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// A fetched HTML page
#[derive(Debug, Clone)]
pub struct Document {
    /// Final URL of the page after redirects
    pub url: Url,

    /// Raw page body
    pub body: String,
}

impl Document {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }
}

/// HTTP fetcher with bounded retry-with-delay
///
/// Holds the shared (possibly logged-in) client and the site base URL that
/// relative page references are resolved against.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    base_url: Url,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, base_url: Url, policy: RetryPolicy) -> Self {
        Self {
            client,
            base_url,
            policy,
        }
    }

    /// Resolves a page reference (absolute URL or site-relative path)
    pub fn resolve(&self, reference: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(reference)
            .map_err(|source| FetchError::InvalidReference {
                reference: reference.to_string(),
                source,
            })
    }

    /// Fetches a page with the fetcher's default retry policy
    pub async fn fetch(&self, reference: &str) -> Result<Document, FetchError> {
        self.fetch_with(reference, self.policy).await
    }

    /// Fetches a page, retrying non-success responses per `policy`
    pub async fn fetch_with(
        &self,
        reference: &str,
        policy: RetryPolicy,
    ) -> Result<Document, FetchError> {
        let url = self.resolve(reference)?;
        let response = self.get_with_retries(&url, policy).await?;
        let final_url = response.url().clone();

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: final_url.to_string(),
            source,
        })?;

        Ok(Document::new(final_url, body))
    }

    /// Fetches a binary asset with the fetcher's default retry policy
    ///
    /// The body is not buffered: callers stream it with `Response::chunk`.
    pub async fn fetch_asset(&self, reference: &str) -> Result<Response, FetchError> {
        self.fetch_asset_with(reference, self.policy).await
    }

    /// Fetches a binary asset, retrying non-success responses per `policy`
    pub async fn fetch_asset_with(
        &self,
        reference: &str,
        policy: RetryPolicy,
    ) -> Result<Response, FetchError> {
        let url = self.resolve(reference)?;
        self.get_with_retries(&url, policy).await
    }

    async fn get_with_retries(&self, url: &Url, policy: RetryPolicy) -> Result<Response, FetchError> {
        let attempts = policy.attempts.max(1);
        let mut remaining = attempts;

        loop {
            remaining -= 1;

            let last_status = match self.client.get(url.clone()).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => Some(response.status().as_u16()),
                Err(e) => {
                    tracing::debug!("Request to {} failed: {}", url, e);
                    None
                }
            };

            if remaining == 0 {
                return Err(FetchError::ExhaustedRetries {
                    url: url.to_string(),
                    attempts,
                    last_status,
                });
            }

            match last_status {
                Some(status) => tracing::warn!(
                    "Url {} answered with status {}. {} attempts remaining.",
                    url,
                    status,
                    remaining
                ),
                None => tracing::warn!(
                    "Url {} could not be reached. {} attempts remaining.",
                    url,
                    remaining
                ),
            }

            tokio::time::sleep(policy.retry_delay).await;
        }
    }
}
