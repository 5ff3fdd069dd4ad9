use std::time::Duration;

use ravenfleet_domain::constants::{DEFAULT_API_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use ravenfleet_domain::FleetError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with timeout and user-agent defaults.
///
/// Sends each request exactly once; failures are reported to the caller and
/// never retried here.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, FleetError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, FleetError> {
        let request = builder.build().map_err(|err| FleetError::from(InfraError::from(err)))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(InfraError::from(err).into())
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, FleetError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| FleetError::from(InfraError::from(err)))?;

        Ok(HttpClient { client })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::StatusCode;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sends_user_agent_and_default_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "ravenfleet-test"))
            .and(header("x-fleet", "1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("x-fleet", HeaderValue::from_static("1"));
        let client = HttpClient::builder()
            .user_agent("ravenfleet-test")
            .default_headers(headers)
            .build()
            .expect("http client");

        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn timeout_surfaces_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;

        let client =
            HttpClient::builder().timeout(Duration::from_millis(50)).build().expect("http client");
        let err = client.send(client.request(Method::GET, server.uri())).await.unwrap_err();

        assert!(matches!(err, FleetError::Network { .. }));
    }
}
