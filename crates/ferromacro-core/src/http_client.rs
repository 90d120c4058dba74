//! HTTP transport seam used by the provider adapters.
//!
//! Adapters only see the [`HttpClient`] trait. Production code plugs in
//! [`ReqwestHttpClient`]; tests plug in [`FixtureHttpClient`], which serves
//! canned bodies and records every request it received.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Boxed future returned by transports.
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// GET request with ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Full URL with percent-encoded query string.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.url, query)
    }

    /// URL safe to log: secrets in the query string are masked.
    pub fn redacted_url(&self) -> String {
        let masked = Self {
            query: self
                .query
                .iter()
                .map(|(key, value)| {
                    if key.eq_ignore_ascii_case("api_key") {
                        (key.clone(), String::from("***"))
                    } else {
                        (key.clone(), value.clone())
                    }
                })
                .collect(),
            ..self.clone()
        };
        masked.full_url()
    }
}

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Why a transport call failed before any HTTP status was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    Timeout,
    Connect,
    Body,
    Other,
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    kind: HttpErrorKind,
    message: String,
}

impl HttpError {
    pub fn new(kind: HttpErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Timeout, message)
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Connect, message)
    }

    pub const fn kind(&self) -> HttpErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Adapter transport contract.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a>;
}

/// Production HTTP client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(concat!("ferromacro/", env!("CARGO_PKG_VERSION")))
                    .cookie_store(true)
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let mut builder = self
                .client
                .get(&request.url)
                .query(&request.query)
                .timeout(Duration::from_millis(request.timeout_ms));

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            // reqwest errors embed the request URL, query secrets included.
            let response = builder.send().await.map_err(|e| {
                let e = e.without_url();
                if e.is_timeout() {
                    HttpError::timeout(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::connect(format!("connection failed: {e}"))
                } else {
                    HttpError::new(HttpErrorKind::Other, format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                let e = e.without_url();
                HttpError::new(
                    HttpErrorKind::Body,
                    format!("failed to read response body: {e}"),
                )
            })?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
struct FixtureRoute {
    url_fragment: String,
    responses: Vec<Result<HttpResponse, HttpError>>,
}

/// Offline transport serving canned responses keyed by URL fragment.
///
/// A route with several responses serves them in order and then keeps
/// repeating the last one. Requests matching no route receive a 404.
#[derive(Debug, Default)]
pub struct FixtureHttpClient {
    routes: Mutex<Vec<FixtureRoute>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FixtureHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(self, url_fragment: impl Into<String>, response: HttpResponse) -> Self {
        self.with_sequence(url_fragment, vec![Ok(response)])
    }

    pub fn with_sequence(
        self,
        url_fragment: impl Into<String>,
        responses: Vec<Result<HttpResponse, HttpError>>,
    ) -> Self {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(FixtureRoute {
                url_fragment: url_fragment.into(),
                responses,
            });
        }
        self
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn respond(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = request.full_url();
        let Ok(mut routes) = self.routes.lock() else {
            return Err(HttpError::new(HttpErrorKind::Other, "fixture routes poisoned"));
        };
        let Some(route) = routes
            .iter_mut()
            .find(|route| url.contains(route.url_fragment.as_str()))
        else {
            return Ok(HttpResponse::new(404, "not found"));
        };

        if route.responses.len() > 1 {
            route.responses.remove(0)
        } else {
            route
                .responses
                .first()
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::new(404, "not found")))
        }
    }
}

impl HttpClient for FixtureHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let response = self.respond(&request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        Box::pin(async move { response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_url_encodes_query_values() {
        let request = HttpRequest::get("https://example.test/chart/%5EVIX")
            .with_query("events", "div,split")
            .with_query("period1", "0");

        assert_eq!(
            request.full_url(),
            "https://example.test/chart/%5EVIX?events=div%2Csplit&period1=0"
        );
    }

    #[test]
    fn redacted_url_masks_api_key() {
        let request = HttpRequest::get("https://example.test/observations")
            .with_query("series_id", "WALCL")
            .with_query("api_key", "secret-123");

        let redacted = request.redacted_url();
        assert!(!redacted.contains("secret-123"));
        assert!(redacted.contains("api_key=%2A%2A%2A"));
    }

    #[tokio::test]
    async fn fixture_serves_sequence_then_repeats_last() {
        let client = FixtureHttpClient::new().with_sequence(
            "/flaky",
            vec![
                Err(HttpError::timeout("slow")),
                Ok(HttpResponse::ok_json("{}")),
            ],
        );

        let first = client.execute(HttpRequest::get("https://x.test/flaky")).await;
        let second = client.execute(HttpRequest::get("https://x.test/flaky")).await;
        let third = client.execute(HttpRequest::get("https://x.test/flaky")).await;

        assert!(first.is_err());
        assert_eq!(second.expect("ok").status, 200);
        assert_eq!(third.expect("ok").status, 200);
        assert_eq!(client.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn fixture_returns_404_for_unknown_routes() {
        let client = FixtureHttpClient::new();
        let response = client
            .execute(HttpRequest::get("https://x.test/missing"))
            .await
            .expect("transport succeeds");
        assert_eq!(response.status, 404);
    }
}
