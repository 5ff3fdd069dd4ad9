//! Audited HTTP exchange
//!
//! Performs one network call and records exactly one audit entry for it,
//! whether the call succeeds, comes back with an error status, or never gets
//! a response. The entry is appended before the result is handed back.

use std::sync::Arc;
use std::time::Instant;

use ravenfleet_core::AuditLog;
use ravenfleet_domain::{AuditRecord, AuditRequest, AuditResponse, FleetError, Result};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::client::HttpClient;

/// One outbound call.
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    method: Method,
    url: String,
    body: Option<Value>,
    audit_body: Option<Value>,
    bearer: Option<String>,
}

impl ExchangeRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), body: None, audit_body: None, bearer: None }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, url).json(body)
    }

    /// JSON request body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Body to record in the audit log instead of the one sent, for
    /// requests that carry secrets.
    pub fn audit_body(mut self, body: Value) -> Self {
        self.audit_body = Some(body);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Sends requests and feeds the audit log.
#[derive(Debug, Clone)]
pub struct HttpExchange {
    client: HttpClient,
    audit: Arc<AuditLog>,
}

impl HttpExchange {
    pub fn new(client: HttpClient, audit: Arc<AuditLog>) -> Self {
        Self { client, audit }
    }

    pub fn audit_log(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// Send `request` and return the parsed JSON body.
    ///
    /// An empty success body is returned as `Value::Null`.
    ///
    /// # Errors
    /// - `FleetError::Http` for a non-2xx status, whatever the body shape
    /// - `FleetError::Network` when no response arrived
    /// - `FleetError::Validation` when a 2xx body is not JSON
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, request: ExchangeRequest) -> Result<Value> {
        let started = Instant::now();
        let ExchangeRequest { method, url, body, audit_body, bearer } = request;

        let mut builder = self.client.request(method.clone(), url.as_str());
        if let Some(token) = &bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }
        let logged_request = AuditRequest { method: method.to_string(), body: audit_body.or(body) };

        let response = match self.client.send(builder).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "request failed without a response");
                self.record(&url, logged_request, transport_failure(&err), started);
                return Err(err);
            }
        };

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                let err = FleetError::network(format!("failed to read response body: {err}"));
                let logged_response = AuditResponse {
                    status: status.as_u16(),
                    status_text: status_text.clone(),
                    ok: false,
                    body: None,
                };
                self.record(&url, logged_request, logged_response, started);
                return Err(err);
            }
        };

        let parsed = if text.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str::<Value>(&text)
        };
        let logged_body = match &parsed {
            Ok(Value::Null) if text.trim().is_empty() => None,
            Ok(value) => Some(value.clone()),
            Err(_) => Some(Value::String(text.clone())),
        };

        self.record(
            &url,
            logged_request,
            AuditResponse {
                status: status.as_u16(),
                status_text: status_text.clone(),
                ok: status.is_success(),
                body: logged_body,
            },
            started,
        );

        if !status.is_success() {
            debug!(status = status.as_u16(), "non-success status");
            return Err(FleetError::Http { status: status.as_u16(), status_text, body: text });
        }

        parsed.map_err(|e| FleetError::validation(format!("response from {url} is not JSON: {e}")))
    }

    fn record(
        &self,
        endpoint: &str,
        request: AuditRequest,
        response: AuditResponse,
        started: Instant,
    ) {
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.audit.append(AuditRecord {
            endpoint: endpoint.to_string(),
            request,
            response,
            duration_ms,
        });
    }
}

fn transport_failure(err: &FleetError) -> AuditResponse {
    let status_text = match err {
        FleetError::Network { message } | FleetError::Validation { message } => message.clone(),
        other => other.to_string(),
    };
    AuditResponse { status: 0, status_text, ok: false, body: None }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn exchange() -> HttpExchange {
        HttpExchange::new(HttpClient::new().expect("http client"), Arc::new(AuditLog::new()))
    }

    #[tokio::test]
    async fn success_returns_json_and_logs_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ravens"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"uuid": "a"}])))
            .mount(&server)
            .await;

        let exchange = exchange();
        let url = format!("{}/ravens", server.uri());
        let value = exchange.execute(ExchangeRequest::get(&url).bearer("tok")).await.unwrap();

        assert_eq!(value, json!([{"uuid": "a"}]));
        let entries = exchange.audit_log().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].endpoint(), url);
        assert_eq!(entries[0].method(), "GET");
        assert_eq!(entries[0].status(), 200);
        assert!(entries[0].is_ok());
        assert_eq!(entries[0].record.response.body, Some(json!([{"uuid": "a"}])));
    }

    #[tokio::test]
    async fn error_status_is_logged_then_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such raven"))
            .mount(&server)
            .await;

        let exchange = exchange();
        let err = exchange.execute(ExchangeRequest::get(server.uri())).await.unwrap_err();

        match err {
            FleetError::Http { status, status_text, body } => {
                assert_eq!(status, 404);
                assert_eq!(status_text, "Not Found");
                assert_eq!(body, "no such raven");
            }
            other => panic!("expected http error, got {other:?}"),
        }
        let entries = exchange.audit_log().entries();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_ok());
        assert_eq!(entries[0].record.response.body, Some(json!("no such raven")));
    }

    #[tokio::test]
    async fn transport_failure_is_logged_with_status_zero() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let exchange = exchange();
        let err =
            exchange.execute(ExchangeRequest::get(format!("http://{addr}/ravens"))).await.unwrap_err();

        assert!(matches!(err, FleetError::Network { .. }));
        let entries = exchange.audit_log().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status(), 0);
        assert!(!entries[0].is_ok());
    }

    #[tokio::test]
    async fn audit_body_replaces_sent_body_in_log() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"api_key": "k", "api_secret": "s"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("token")))
            .mount(&server)
            .await;

        let exchange = exchange();
        let request = ExchangeRequest::post(server.uri(), json!({"api_key": "k", "api_secret": "s"}))
            .audit_body(json!({"api_key": "k", "api_secret": "***"}));
        assert_eq!(exchange.execute(request).await.unwrap(), json!("token"));

        let logged = exchange.audit_log().entries()[0].record.request.body.clone();
        assert_eq!(logged, Some(json!({"api_key": "k", "api_secret": "***"})));
    }

    #[tokio::test]
    async fn empty_and_non_json_success_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let exchange = exchange();
        let empty =
            exchange.execute(ExchangeRequest::get(format!("{}/empty", server.uri()))).await.unwrap();
        assert_eq!(empty, Value::Null);

        let err = exchange
            .execute(ExchangeRequest::get(format!("{}/html", server.uri())))
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::Validation { .. }));
        assert_eq!(exchange.audit_log().len(), 2);
    }

    #[tokio::test]
    async fn every_call_in_a_mixed_batch_is_logged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fail"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let exchange = exchange();
        let calls = (0..9).map(|i| {
            let route = if i % 3 == 0 { "fail" } else { "ok" };
            exchange.execute(ExchangeRequest::get(format!("{}/{route}", server.uri())))
        });
        let results = futures::future::join_all(calls).await;

        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 3);
        assert_eq!(exchange.audit_log().len(), 9);
    }
}
