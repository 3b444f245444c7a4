//! HTTP client with tracing and domain allowlist.
//!
//! This module provides the reqwest-backed [`Transport`]:
//! - Request/response tracing
//! - Domain allowlist
//! - Connection pool sized to the source's concurrency limit

use async_trait::async_trait;
use reqwest::{Client, header};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use jobharvest_core::SourceConfig;

use crate::error::FetchError;
use crate::request::{HttpMethod, HttpRequest, RawResponse, RequestBody};
use crate::transport::Transport;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default idle connections kept per host.
const DEFAULT_MAX_CONNECTIONS: usize = 20;

/// User agent string for jobharvest.
const USER_AGENT: &str = concat!("jobharvest/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and domain allowlist.
///
/// The client is shared by every fetch of a phase. The engine bounds the
/// number of requests in flight, so the pool never holds more connections
/// per host than the configured concurrency limit.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Result<Self, FetchError> {
        Self::builder().build()
    }

    /// Creates a builder for customizing the client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Creates a client tuned for one source.
    pub fn for_source(config: &SourceConfig) -> Result<Self, FetchError> {
        Self::builder()
            .timeout(config.request_timeout)
            .max_connections(config.concurrency_limit.max(config.batch_size))
            .build()
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), FetchError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(()); // No restrictions
        };

        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidRequest(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::InvalidRequest("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(FetchError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, FetchError> {
        self.is_domain_allowed(&request.url)?;
        debug!("Sending request");

        let mut builder = match request.method {
            HttpMethod::Get => self.inner.get(&request.url),
            HttpMethod::Post => self.inner.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            Some(RequestBody::Form(encoded)) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encoded.clone()),
            Some(RequestBody::Json(value)) => builder.json(value),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        debug!(status, "Response received");

        let body = response.text().await?;
        Ok(RawResponse::new(status, body))
    }
}

// ============================================================================
// HTTP Client Builder
// ============================================================================

/// Builder for constructing an [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_connections: usize,
    user_agent: String,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            user_agent: USER_AGENT.to_string(),
            allowed_domains: None,
        }
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum idle connections kept per host.
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max.max(1);
        self
    }

    /// Overrides the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Restricts requests to the given domains and their subdomains.
    pub fn allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<HttpClient, FetchError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.max_connections)
            .user_agent(self.user_agent)
            .build()?;

        Ok(HttpClient {
            inner: client,
            allowed_domains: self.allowed_domains,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_domain_allowlist() {
        let client = HttpClient::builder()
            .allowed_domains(vec![
                "careers.microsoft.com".to_string(),
                "amazon.jobs".to_string(),
            ])
            .build()
            .unwrap();

        // Allowed domains
        assert!(client
            .is_domain_allowed("https://careers.microsoft.com/search")
            .is_ok());
        assert!(client.is_domain_allowed("https://www.amazon.jobs/en/search.json").is_ok());

        // Subdomain matching
        assert!(client
            .is_domain_allowed("https://gcsservices.careers.microsoft.com/search/api/v1/search")
            .is_ok());

        // Not allowed
        assert!(matches!(
            client.is_domain_allowed("https://evil.com/steal"),
            Err(FetchError::DomainNotAllowed(_))
        ));
        assert!(client.is_domain_allowed("not-a-valid-url").is_err());
    }

    #[test]
    fn test_no_domain_restrictions() {
        let client = HttpClient::new().unwrap();
        assert!(client.is_domain_allowed("https://any.domain.com").is_ok());
    }

    #[tokio::test]
    async fn test_get_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 40 })))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response = client
            .execute(&HttpRequest::get(format!("{}/api/search?page=2", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.json_value().unwrap()["count"], json!(40));
    }

    #[tokio::test]
    async fn test_non_success_is_not_an_error_at_transport_level() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response = client
            .execute(&HttpRequest::get(server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 429);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_post_form_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header_eq("x-friendly-name", "JobSearch"))
            .and(header_eq("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("page=1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let request = HttpRequest::post(format!("{}/graphql", server.uri()))
            .header("x-friendly-name", "JobSearch")
            .form("page=1");

        let response = client.execute(&request).await.unwrap();
        assert_eq!(response.status, 200);
    }
}
