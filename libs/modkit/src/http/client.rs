//! Traced HTTP client
//!
//! This module provides a wrapper around reqwest::Client that opens a span per
//! outgoing request, stamps a correlation id header and records the response
//! status on the span.

use crate::http::correlation;
use std::time::Duration;
use tracing::{field, Instrument, Level};

/// A traced HTTP client: every request runs inside an `outgoing_http` span
/// carrying method, URL, correlation id and status code.
#[derive(Clone, Debug)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    /// Create a new TracedClient wrapping the provided reqwest::Client
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Build a client whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(inner))
    }

    /// Execute a built reqwest::Request inside an `outgoing_http` span.
    pub async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let request_id = correlation::ensure_request_id(req.headers_mut());

        // Query strings may carry filters with tenant data; log the path only.
        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url().path(),
            http.request_id = %request_id,
            http.status_code = field::Empty,
            error = field::Empty,
            otel.kind = "client",
        );

        let response = self
            .inner
            .execute(req)
            .instrument(span.clone())
            .await?;

        let status = response.status();
        span.record("http.status_code", status.as_u16());
        if status.is_client_error() || status.is_server_error() {
            span.record("error", true);
        }
        span.in_scope(|| tracing::debug!(status = status.as_u16(), "response received"));

        Ok(response)
    }

    /// Create a request builder; pass the built request to [`execute`](Self::execute).
    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn test_traced_client_injects_request_id() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/ping")
                .header_exists(correlation::CLIENT_REQUEST_ID);
            then.status(200).body("ok");
        });

        let client = TracedClient::new(reqwest::Client::new());
        let req = client
            .request(reqwest::Method::GET, &format!("{}/ping", server.base_url()))
            .build()
            .unwrap();
        let resp = client.execute(req).await.unwrap();

        assert!(resp.status().is_success());
        m.assert();
    }

    #[tokio::test]
    async fn test_caller_request_id_is_preserved() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/submit")
                .header(correlation::CLIENT_REQUEST_ID, "abc-123");
            then.status(202);
        });

        let client = TracedClient::new(reqwest::Client::new());
        let req = client
            .request(reqwest::Method::POST, &format!("{}/submit", server.base_url()))
            .header(correlation::CLIENT_REQUEST_ID, "abc-123")
            .build()
            .unwrap();
        let resp = client.execute(req).await.unwrap();

        assert_eq!(resp.status().as_u16(), 202);
        m.assert();
    }

    #[traced_test]
    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/fail");
            then.status(503);
        });

        let client = TracedClient::with_timeout(Duration::from_secs(5)).unwrap();
        let req = client
            .request(reqwest::Method::POST, &format!("{}/fail", server.base_url()))
            .build()
            .unwrap();
        let resp = client.execute(req).await.unwrap();

        assert_eq!(resp.status().as_u16(), 503);
        assert!(logs_contain("response received"));
    }
}
