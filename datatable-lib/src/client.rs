//! HTTP list client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;
use crate::error::Error;
use crate::provider::JsonProvider;
use crate::provider::ListProvider;
use crate::provider::ListRequest;
use crate::response::Envelope;
use crate::response::PageResult;

/// HTTP client for paginated list endpoints.
///
/// Issues `GET {base_url}{resource}?limit=&page=&search=` and decodes the
/// JSON envelope. This client is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use datatable_lib::{ListClient, ListRequest, ListProvider, model::Record};
///
/// let client = ListClient::builder()
///     .url("http://127.0.0.1:3000")
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let page: PageResult<Record> = client.list(&ListRequest::new("/api/users", 10)).await?;
/// ```
#[derive(Clone)]
pub struct ListClient {
    inner: Arc<ListClientInner>,
}

struct ListClientInner {
    base_url: Url,
    search_param: String,
    http_client: Client,
    timeout: Option<Duration>,
}

impl ListClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> ListClientBuilder<Missing> {
        ListClientBuilder::new()
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the query parameter name used for the search term.
    pub fn search_param(&self) -> &str {
        &self.inner.search_param
    }

    /// Resolves `path` against the base URL. Absolute URLs pass through.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .inner
                .base_url
                .join(path)
                .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e))),
            Err(e) => Err(ApiError::InvalidUrl(format!("{}: {}", path, e))),
        }
    }

    /// Builds the full URL for a list request.
    pub fn list_url(&self, request: &ListRequest) -> Result<Url, ApiError> {
        let mut url = self.resolve(&request.resource)?;
        url.query_pairs_mut()
            .append_pair("limit", &request.page_size.to_string())
            .append_pair("page", &request.page.to_string())
            .append_pair(&self.inner.search_param, &request.search);
        Ok(url)
    }

    /// Sends a GET and returns the body of a successful response.
    ///
    /// Statuses >= 400 become [`ApiError::Http`], using the envelope's error
    /// message when the body is an envelope.
    async fn get_text(&self, url: Url) -> Result<String, ApiError> {
        log::debug!("GET {}", url);

        let mut request = self.inner.http_client.get(url.clone());
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<Envelope<Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or(body);
        log::warn!("GET {} failed with {}: {}", url, status, message);
        Err(ApiError::http(status.as_u16(), message))
    }
}

#[async_trait]
impl<R> ListProvider<R> for ListClient
where
    R: DeserializeOwned + Send + 'static,
{
    async fn list(&self, request: &ListRequest) -> Result<PageResult<R>, Error> {
        let url = self.list_url(request)?;
        let body = self.get_text(url).await?;

        let envelope: Envelope<Vec<R>> = serde_json::from_str(&body)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), body.clone()))?;

        if !envelope.success {
            let message = envelope.error.unwrap_or_else(|| "Request failed".to_string());
            return Err(ApiError::Envelope(message).into());
        }

        let items = envelope
            .data
            .ok_or_else(|| ApiError::parse_with_body("missing `data` field", body))?;

        if let Some(meta) = &envelope.meta
            && !meta.is_consistent()
        {
            log::warn!(
                "server pagination for {} disagrees with total/page/limit: {:?}",
                request.resource,
                meta
            );
        }

        Ok(PageResult {
            items,
            meta: envelope.meta,
        })
    }
}

#[async_trait]
impl JsonProvider for ListClient {
    async fn get_json(&self, url: &str) -> Result<Value, Error> {
        let url = self.resolve(url)?;
        let body = self.get_text(url).await?;

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), body.clone()))?;

        // A 200 can still carry a failed envelope.
        if value.get("success") == Some(&Value::Bool(false)) {
            let message = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Request failed")
                .to_string();
            return Err(ApiError::Envelope(message).into());
        }

        Ok(value)
    }
}

impl std::fmt::Debug for ListClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("search_param", &self.inner.search_param)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`ListClient`].
///
/// The base URL is required and enforced at compile time.
///
/// ```ignore
/// let client = ListClient::builder()
///     .url("http://127.0.0.1:3000")
///     .search_param("q")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct ListClientBuilder<U> {
    url: U,
    search_param: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl ListClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            search_param: "search".to_string(),
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the base URL of the API server.
    pub fn url(self, url: impl Into<String>) -> ListClientBuilder<Set<String>> {
        ListClientBuilder {
            url: Set(url.into()),
            search_param: self.search_param,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for ListClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> ListClientBuilder<U> {
    /// Sets the query parameter name for the search term.
    ///
    /// Defaults to `search`.
    pub fn search_param(mut self, name: impl Into<String>) -> Self {
        self.search_param = name.into();
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl ListClientBuilder<Set<String>> {
    /// Builds the [`ListClient`].
    ///
    /// Fails if the base URL does not parse or the HTTP client cannot be built.
    pub fn build(self) -> Result<ListClient, ApiError> {
        let base_url = Url::parse(&self.url.0)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.url.0, e)))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(ListClient {
            inner: Arc::new(ListClientInner {
                base_url,
                search_param: self.search_param,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ListClient {
        ListClient::builder().url("http://127.0.0.1:3000").build().unwrap()
    }

    #[test]
    fn test_list_url_carries_query() {
        let request = ListRequest::new("/api/users", 10).page(2).search("jane doe");
        let url = client().list_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:3000/api/users?limit=10&page=2&search=jane+doe"
        );
    }

    #[test]
    fn test_custom_search_param() {
        let client = ListClient::builder()
            .url("http://127.0.0.1:3000")
            .search_param("q")
            .build()
            .unwrap();
        let url = client.list_url(&ListRequest::new("/api/users", 5)).unwrap();
        assert_eq!(url.query(), Some("limit=5&page=1&q="));
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let url = client().resolve("http://example.com/api/users/1/tasks").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ListClient::builder().url("not a url").build().unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
