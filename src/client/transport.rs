//! HTTP transport capability.
//!
//! # Responsibilities
//! - Resolve request paths against a base URL
//! - Perform the network call with the configured timeout
//! - Decode bodies to JSON and reject non-2xx statuses
//!
//! # Design Decisions
//! - No retries: a request is sent exactly once
//! - Bodies that are not JSON are surfaced as JSON strings

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::client::types::{TransportError, TransportRequest, TransportResponse};

/// Sends one request and reports its outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport for `base_url` with a whole-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::network(format!("failed to build HTTP client: {}", e)))?;
        Self::with_client(client, base_url)
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, TransportError> {
        let mut base_url: Url = base_url
            .parse()
            .map_err(|e| TransportError::network(format!("invalid base URL '{}': {}", base_url, e)))?;

        // Url::join replaces the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a request path.
    pub fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::network(format!("invalid request path '{}': {}", path, e)))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = self.resolve(&request.path)?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;
        let body = decode_body(&text);

        if !status.is_success() {
            return Err(TransportError::rejected(status, body));
        }

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// JSON if parseable, otherwise the raw text as a JSON string.
pub fn decode_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
