//! Tracing headers attached to every outgoing request.

use rand::RngCore;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, CONTENT_TYPE};
use thiserror::Error;

use crate::trace::id::{generate_trace_id, TraceId};

pub const X_TRACE_ID: &str = "X-Trace-ID";
pub const X_REQUEST_ID: &str = "X-Request-ID";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Length of the secondary request id.
pub const REQUEST_ID_LEN: usize = 16;

/// A tracing value that cannot travel as an HTTP header.
#[derive(Debug, Error)]
#[error("invalid header value {value:?}: {source}")]
pub struct HeaderError {
    pub value: String,
    #[source]
    source: InvalidHeaderValue,
}

/// Header values produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingHeaders {
    pub trace_id: TraceId,
    pub content_type: &'static str,
    /// Prefix of an independently generated id, uncorrelated with `trace_id`.
    pub request_id: String,
}

impl TracingHeaders {
    /// Convert into a header map.
    ///
    /// Fails when a value is not a legal header value, which can happen when a
    /// trace id was read back from tampered storage.
    pub fn to_header_map(&self) -> Result<HeaderMap, HeaderError> {
        let mut map = HeaderMap::with_capacity(3);
        map.insert(
            HeaderName::from_static("x-trace-id"),
            header_value(self.trace_id.as_str())?,
        );
        map.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        map.insert(
            HeaderName::from_static("x-request-id"),
            header_value(&self.request_id)?,
        );
        Ok(map)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, HeaderError> {
    HeaderValue::from_str(value).map_err(|source| HeaderError {
        value: value.to_string(),
        source,
    })
}

/// Build tracing headers, generating a trace id when none is supplied.
pub fn create_tracing_headers<R: RngCore + ?Sized>(
    rng: &mut R,
    trace_id: Option<&TraceId>,
) -> TracingHeaders {
    let trace_id = match trace_id {
        Some(id) => id.clone(),
        None => generate_trace_id(rng),
    };
    let request_id = generate_trace_id(rng).prefix(REQUEST_ID_LEN).to_string();

    TracingHeaders {
        trace_id,
        content_type: CONTENT_TYPE_JSON,
        request_id,
    }
}
