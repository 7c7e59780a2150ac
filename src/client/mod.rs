use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::rate_limiter::RateLimiter;

pub mod envelope;

pub use envelope::{ResponseMessage, ResultInfo};

/// Cloudflare v4 API origin
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// User agent sent with every request
pub const CLIENT_USER_AGENT: &str = concat!("cfctl/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Email and global API key used to authenticate every request
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub key: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            key: key.into(),
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Auth-Email", HeaderValue::from_str(&self.email)?);
        let mut key = HeaderValue::from_str(&self.key)?;
        key.set_sensitive(true);
        headers.insert("X-Auth-Key", key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        Ok(headers)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Authenticated, rate-limited client for a single API origin.
///
/// Every physical request goes through [`RateLimiter::admit`] first. GET
/// requests follow `result_info` pagination and return the concatenated
/// items of all pages. Error envelopes come back as [`Error::Provider`].
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    limiter: RateLimiter,
}

impl ApiClient {
    /// Create a client for the Cloudflare API origin
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be sent as header values or
    /// the HTTP client cannot be built
    pub fn new(credentials: &Credentials, limiter: RateLimiter) -> Result<Self> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL, limiter)
    }

    /// Create a client for another origin, such as a local mock server
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be sent as header values or
    /// the HTTP client cannot be built
    pub fn with_base_url(
        credentials: &Credentials,
        base_url: impl Into<String>,
        limiter: RateLimiter,
    ) -> Result<Self> {
        Self::build(credentials, base_url.into(), DEFAULT_TIMEOUT, limiter)
    }

    /// Create a client from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The API email or key is missing
    /// - The credentials cannot be sent as header values
    /// - The HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let (Some(email), Some(key)) = (&config.api.email, &config.api.key) else {
            return Err(Error::MissingCredentials);
        };
        Self::build(
            &Credentials::new(email.as_str(), key.as_str()),
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_seconds),
            RateLimiter::from_limits(&config.limits),
        )
    }

    fn build(
        credentials: &Credentials,
        base_url: String,
        timeout: Duration,
        limiter: RateLimiter,
    ) -> Result<Self> {
        let http = Client::builder()
            .default_headers(credentials.headers()?)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a GET request and collect the results of every page
    ///
    /// An array result contributes its items, `null` contributes nothing and
    /// any other value is returned as a single item.
    ///
    /// # Errors
    ///
    /// Returns an error if any page fails; items from earlier pages are dropped
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<Value>> {
        let mut query = owned_query(query);
        let mut items = Vec::new();

        loop {
            let page = self.send(Method::GET, path, &query, None).await?;
            collect_items(&mut items, page.result);

            match page.info {
                Some(info) if info.has_next_page() => {
                    let next = advance_page(&mut query)?;
                    debug!(
                        "Fetching page {} of {} for {}",
                        next, info.total_pages, path
                    );
                }
                _ => break,
            }
        }

        Ok(items)
    }

    /// Send a POST request with a JSON body and return the unwrapped result
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body cannot be encoded, or
    /// the API rejects the request
    pub async fn post<B>(&self, path: &str, body: &B, query: &[(&str, &str)]) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;
        let page = self
            .send(Method::POST, path, &owned_query(query), Some(body))
            .await?;
        Ok(page.result)
    }

    /// Send a PUT request with a JSON body and return the unwrapped result
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body cannot be encoded, or
    /// the API rejects the request
    pub async fn put<B>(&self, path: &str, body: &B, query: &[(&str, &str)]) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;
        let page = self
            .send(Method::PUT, path, &owned_query(query), Some(body))
            .await?;
        Ok(page.result)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Vec<u8>>,
    ) -> Result<envelope::Page> {
        self.limiter.admit().await;

        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, ?query, "Sending request");

        let mut request = self.http.request(method, &url).query(query);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%status, bytes = text.len(), "Received response");

        // The envelope decides success; the status only explains a body that is not one
        match envelope::unwrap_body(&text) {
            Err(Error::Decode(source)) if !status.is_success() => Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                source,
            }),
            page => page,
        }
    }
}

fn owned_query(query: &[(&str, &str)]) -> Vec<(String, String)> {
    query
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

fn collect_items(items: &mut Vec<Value>, result: Value) {
    match result {
        Value::Array(values) => items.extend(values),
        Value::Null => {}
        other => items.push(other),
    }
}

/// Bump the `page` parameter, starting at 2 when it is absent
fn advance_page(query: &mut Vec<(String, String)>) -> Result<u64> {
    if let Some((_, value)) = query.iter_mut().find(|(key, _)| key == "page") {
        let current: u64 = value
            .parse()
            .map_err(|_| Error::InvalidQuery(format!("page={value}")))?;
        let next = current + 1;
        *value = next.to_string();
        return Ok(next);
    }

    query.push(("page".to_string(), "2".to_string()));
    Ok(2)
}
