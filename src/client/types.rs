//! Request, response and error types exchanged with a transport.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;

use crate::trace::{HeaderError, TraceId};

/// Response header carrying the server-assigned trace id.
pub const X_BACKEND_TRACE_ID: &str = "x-backend-trace-id";

/// Per-request annotations stamped by the pre-send hook.
///
/// Travels with exactly one request and is read back once its outcome is known.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub trace_id: TraceId,
    pub operation: String,
    pub start_time: Instant,
}

/// An outgoing call, relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub metadata: Option<RequestMetadata>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            metadata: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A completed 2xx exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Value of the backend correlation header, if present and readable.
    pub fn backend_trace_id(&self) -> Option<&str> {
        self.headers
            .get(X_BACKEND_TRACE_ID)
            .and_then(|v| v.to_str().ok())
    }
}

/// A rejected exchange: network failure or non-2xx status.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub status: Option<StatusCode>,
    pub data: Option<Value>,
    pub message: String,
}

impl TransportError {
    /// Failure before any response arrived.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            data: None,
            message: message.into(),
        }
    }

    /// Response with a status outside 2xx.
    pub fn rejected(status: StatusCode, data: Value) -> Self {
        Self {
            status: Some(status),
            data: Some(data),
            message: format!("Request failed with status code {}", status.as_u16()),
        }
    }
}

/// Errors surfaced by the instrumented client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be built; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport rejected the call. The payload is passed through untouched.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<HeaderError> for ClientError {
    fn from(err: HeaderError) -> Self {
        ClientError::InvalidRequest(err.to_string())
    }
}

impl ClientError {
    /// HTTP status of a rejected response, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Transport(e) => e.status,
            ClientError::InvalidRequest(_) => None,
        }
    }
}
