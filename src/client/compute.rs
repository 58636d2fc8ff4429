//! Compute API client module
//!
//! Provides `ComputeClient` for making authenticated requests against an
//! OpenStack-compatible compute endpoint.

use super::Auth;
use base64::Engine;
use eyre::{Result, eyre};
use reqwest::{Client, Method};
use url::Url;

/// Compute API client
///
/// Paths are resolved relative to the base URL, which is normalised to end
/// with a slash so that versioned endpoints such as `/v2.1` keep their
/// prefix.
///
/// # Example
/// ```no_run
/// use usage_extractor::client::{Auth, ComputeClient};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("http://controller:8774/v2.1")?;
/// let client = ComputeClient::try_new(url, Auth::Token("gAAAA".to_string()))?;
/// let response = client.get("os-simple-tenant-usage/research", &[]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ComputeClient {
    client: Client,
    url: Url,
}

impl ComputeClient {
    /// Create a new client from a base URL and Auth
    ///
    /// # Errors
    /// Returns an error if the credentials are not valid header values or
    /// the HTTP client cannot be built
    pub fn try_new(mut url: Url, auth: Auth) -> Result<Self> {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, "application/json".parse()?);
        match auth {
            Auth::Token(token) => {
                headers.insert("X-Auth-Token", token.parse()?);
            }
            Auth::Basic(username, password) => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    format!("Basic {}", credentials).parse()?,
                );
            }
            Auth::None => {}
        }
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, url })
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolve `path` against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let path = path.strip_prefix('/').unwrap_or(path);
        Ok(self.url.join(path)?)
    }

    /// Send a GET request with query parameters
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = self.endpoint(path)?;
        log::trace!("GET {}", url);
        self.client
            .request(Method::GET, url)
            .query(query)
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request: {}", e))
    }
}

impl std::fmt::Display for ComputeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}
