//! HTTP client construction and session acquisition

use crate::config::SessionConfig;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Login credentials for the profile site
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Builds an HTTP client with proper configuration
///
/// The client keeps a cookie store so that one logged-in session is reused
/// for every profile and photo request of a run.
///
/// # Example
///
/// ```no_run
/// use profile_reel::config::SessionConfig;
/// use profile_reel::fetch::build_http_client;
///
/// let config = SessionConfig {
///     base_url: "https://m.example.com".to_string(),
///     user_agent: "ProfileReel/0.1".to_string(),
///     timeout_secs: 30,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &SessionConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Logs the client in to the site at `base_url`
///
/// Visits the home page first so the site sets its cookies, then posts the
/// login form. The session cookies stay in the client's cookie store.
pub async fn login(
    client: &Client,
    base_url: &Url,
    credentials: &Credentials,
) -> Result<(), FetchError> {
    client.get(base_url.clone()).send().await?;

    let login_url = base_url
        .join("login.php")
        .map_err(|source| FetchError::InvalidReference {
            reference: "login.php".to_string(),
            source,
        })?;

    let response = client
        .post(login_url)
        .form(&[
            ("email", credentials.email.as_str()),
            ("pass", credentials.password.as_str()),
        ])
        .send()
        .await?;

    tracing::info!(
        "Login request for {} answered with status {}",
        credentials.email,
        response.status()
    );

    Ok(())
}
