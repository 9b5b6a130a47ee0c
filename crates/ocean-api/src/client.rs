//! HTTP client for the `/v2` REST API.
//!
//! [`ApiClient`] owns a pooled `reqwest::Client`, the base URL and the access
//! token. Resource modules build on its small set of request helpers. List
//! calls request 200 items per page and follow `links.pages.next` until the
//! last page.
//!
//! # Example
//!
//! ```rust,no_run
//! use ocean_api::{ApiClient, ClientConfig, DropletsService};
//!
//! # async fn example() -> Result<(), ocean_api::ApiError> {
//! let client = ApiClient::new(ClientConfig {
//!     access_token: Some("my-token".into()),
//!     ..ClientConfig::default()
//! })?;
//! for droplet in client.list_droplets().await? {
//!     println!("{} {}", droplet.id, droplet.name);
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ApiError;

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com";

/// Default request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size requested by list calls.
const PER_PAGE: &str = "200";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client construction parameters.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API.
    pub api_url: String,
    /// Bearer token. Requests fail with [`ApiError::MissingToken`] without one.
    pub access_token: Option<String>,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Log every request and response status at `debug`.
    pub trace: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            user_agent: format!("oceanctl/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            trace: false,
        }
    }
}

/// Typed REST client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    trace: bool,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("trace", &self.trace)
            .finish_non_exhaustive()
    }
}

/// Error body returned by the API on failure.
#[derive(Debug, Default, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

impl ApiClient {
    /// Build a client from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL does not parse or the HTTP client
    /// cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(&config.api_url)?;
        // Relative joins replace the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: config.access_token.filter(|t| !t.is_empty()),
            trace: config.trace,
        })
    }

    /// Resolve a relative path or an absolute href against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is not a valid URL.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    fn token(&self) -> Result<&str, ApiError> {
        self.token.as_deref().ok_or(ApiError::MissingToken)
    }

    /// Send one request and return the raw body of a 2xx response.
    async fn execute<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<String, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let token = self.token()?;

        if self.trace {
            debug!(method = %method, url = %url, "api request");
        }

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let header_request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let text = response.text().await?;

        if self.trace {
            debug!(status = status.as_u16(), url = %url, "api response");
        }

        if !status.is_success() {
            return Err(api_error(&method, &url, status, header_request_id, &text));
        }
        Ok(text)
    }

    async fn execute_value<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let context = url.path().to_string();
        let text = self.execute(method, url, body).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| ApiError::Decode { context, source })
    }

    /// GET `path` and decode the object stored under `key`.
    pub(crate) async fn get_key<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<T, ApiError> {
        let url = self.resolve(path)?;
        let body = self.execute_value::<()>(Method::GET, url, None).await?;
        take_key(body, key)
    }

    /// GET `path` and decode the whole body.
    pub(crate) async fn get_body<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let context = url.path().to_string();
        let body = self.execute_value::<()>(Method::GET, url, None).await?;
        serde_json::from_value(body).map_err(|source| ApiError::Decode { context, source })
    }

    /// Send `body` with `method` to `path` and decode the object under `key`.
    pub(crate) async fn send_key<B, T>(&self, method: Method, path: &str, body: &B, key: &str) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        let value = self.execute_value(method, url, Some(body)).await?;
        take_key(value, key)
    }

    /// Send `body` with `method` to `path` and decode the whole response.
    pub(crate) async fn send_body<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        let value = self.execute_value(method, url, Some(body)).await?;
        serde_json::from_value(value).map_err(|source| ApiError::Decode {
            context: path.to_string(),
            source,
        })
    }

    /// DELETE `path`, ignoring any response body.
    pub(crate) async fn delete_path(&self, path: &str) -> Result<(), ApiError> {
        let url = self.resolve(path)?;
        self.execute::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Collect every page of a list endpoint.
    ///
    /// Requests `per_page=200` and follows `links.pages.next` (absolute or
    /// relative) until it is absent.
    pub(crate) async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        key: &str,
    ) -> Result<Vec<T>, ApiError> {
        let mut url = self.resolve(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
            pairs.append_pair("per_page", PER_PAGE);
        }

        let mut items = Vec::new();
        loop {
            let mut page = self.execute_value::<()>(Method::GET, url.clone(), None).await?;

            if let Some(list) = page.get_mut(key).map(Value::take) {
                if !list.is_null() {
                    let mut batch: Vec<T> = serde_json::from_value(list).map_err(|source| ApiError::Decode {
                        context: key.to_string(),
                        source,
                    })?;
                    items.append(&mut batch);
                }
            }

            let next = page
                .pointer("/links/pages/next")
                .and_then(Value::as_str)
                .filter(|next| !next.is_empty());
            match next {
                Some(next) => {
                    let next_url = self.base_url.join(next)?;
                    if next_url == url {
                        break;
                    }
                    url = next_url;
                }
                None => break,
            }
        }
        Ok(items)
    }

    /// Download a document from a presigned URL outside the API.
    ///
    /// No authorization header is sent.
    pub(crate) async fn download(&self, url: &str) -> Result<String, ApiError> {
        let url = Url::parse(url)?;
        if self.trace {
            debug!(url = %url, "download");
        }
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(&Method::GET, &url, status, None, &text));
        }
        Ok(text)
    }
}

fn take_key<T: DeserializeOwned>(mut body: Value, key: &str) -> Result<T, ApiError> {
    let value = body.get_mut(key).map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        context: key.to_string(),
        source,
    })
}

fn api_error(method: &Method, url: &Url, status: StatusCode, header_request_id: Option<String>, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status.canonical_reason().unwrap_or_default().to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        parsed.message
    };

    ApiError::Api {
        method: method.to_string(),
        url: url.to_string(),
        status: status.as_u16(),
        request_id: parsed.request_id.filter(|id| !id.is_empty()).or(header_request_id),
        message,
    }
}
