//! Pre-send and post-receive interception.
//!
//! # Per-request lifecycle
//! ```text
//! CREATED → before_send (label, trace id, headers, metadata) → HEADERS_ATTACHED
//!         → REQUEST_START logged → SENT
//!         → after_receive → RESPONSE_SUCCESS | RESPONSE_ERROR logged
//! ```
//! A construction failure inside `before_send` is logged as `REQUEST_ERROR`
//! with trace id `unknown` and the request is never sent.

use reqwest::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::client::types::{
    ClientError, RequestMetadata, TransportError, TransportRequest, TransportResponse,
};
use crate::observability::metrics;
use crate::trace::{log_trace_info, IdentifierService, TraceSink};

/// Placeholder for trace ids and labels that cannot be recovered.
pub const UNKNOWN: &str = "unknown";

/// Runs before every outgoing call.
pub trait PreSendHook: Send + Sync {
    /// Annotate `request`. An error aborts the call before anything is sent.
    fn before_send(&self, request: TransportRequest) -> Result<TransportRequest, ClientError>;

    /// Observe a failure returned by [`PreSendHook::before_send`].
    fn on_request_error(&self, _error: &ClientError) {}
}

/// Runs after every outcome, success or failure.
pub trait PostReceiveHook: Send + Sync {
    fn after_receive(
        &self,
        metadata: Option<&RequestMetadata>,
        outcome: &Result<TransportResponse, TransportError>,
    );
}

/// Log-grouping label: uppercase method, `_`, path without its leading slash
/// and with every other slash turned into `_`.
pub fn operation_label(method: &Method, path: &str) -> String {
    let path = path.strip_prefix('/').unwrap_or(path).replace('/', "_");
    format!("{}_{}", method.as_str().to_uppercase(), path)
}

fn validate_path(path: &str) -> Result<(), ClientError> {
    if !path.starts_with('/') {
        return Err(ClientError::InvalidRequest(format!(
            "request path must start with '/': {:?}",
            path
        )));
    }
    if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ClientError::InvalidRequest(format!(
            "request path contains whitespace or control characters: {:?}",
            path
        )));
    }
    Ok(())
}

/// Elapsed wall time since `start`, zero when the start is unknown.
fn elapsed_ms(metadata: Option<&RequestMetadata>) -> u64 {
    metadata
        .map(|m| m.start_time.elapsed().as_millis() as u64)
        .unwrap_or(0)
}

/// Hooks that attach tracing headers and emit one trace record per transition.
#[derive(Clone)]
pub struct TracingHooks {
    identifiers: Arc<IdentifierService>,
    sink: Arc<dyn TraceSink>,
}

impl TracingHooks {
    pub fn new(identifiers: Arc<IdentifierService>, sink: Arc<dyn TraceSink>) -> Self {
        Self { identifiers, sink }
    }
}

impl PreSendHook for TracingHooks {
    fn before_send(&self, mut request: TransportRequest) -> Result<TransportRequest, ClientError> {
        validate_path(&request.path)?;

        let operation = operation_label(&request.method, &request.path);
        let trace_id = self.identifiers.create_operation_trace_id(&operation);

        let tracing_headers = self
            .identifiers
            .create_tracing_headers(Some(&trace_id))
            .to_header_map()?;
        // Tracing values win over caller-supplied headers of the same name.
        for (name, value) in tracing_headers.iter() {
            request.headers.insert(name.clone(), value.clone());
        }

        request.metadata = Some(RequestMetadata {
            trace_id: trace_id.clone(),
            operation: operation.clone(),
            start_time: Instant::now(),
        });

        let mut extra = Map::new();
        extra.insert("url".into(), json!(request.path));
        extra.insert("method".into(), json!(request.method.as_str()));
        extra.insert("data".into(), request.body.clone().unwrap_or(Value::Null));
        log_trace_info(
            self.sink.as_ref(),
            &format!("REQUEST_START: {}", operation),
            trace_id.as_str(),
            extra,
        );

        Ok(request)
    }

    fn on_request_error(&self, error: &ClientError) {
        let mut extra = Map::new();
        extra.insert("error".into(), json!(error.to_string()));
        log_trace_info(self.sink.as_ref(), "REQUEST_ERROR", UNKNOWN, extra);
        metrics::record_request_error(UNKNOWN, "request");
    }
}

impl PostReceiveHook for TracingHooks {
    fn after_receive(
        &self,
        metadata: Option<&RequestMetadata>,
        outcome: &Result<TransportResponse, TransportError>,
    ) {
        let trace_id = metadata.map(|m| m.trace_id.as_str()).unwrap_or(UNKNOWN);
        let operation = metadata.map(|m| m.operation.as_str()).unwrap_or(UNKNOWN);
        let duration_ms = elapsed_ms(metadata);

        let mut extra = Map::new();
        match outcome {
            Ok(response) => {
                extra.insert("status".into(), json!(response.status.as_u16()));
                extra.insert("duration".into(), json!(duration_ms));
                extra.insert("backendTraceId".into(), json!(response.backend_trace_id()));
                extra.insert("responseData".into(), response.body.clone());
                log_trace_info(
                    self.sink.as_ref(),
                    &format!("RESPONSE_SUCCESS: {}", operation),
                    trace_id,
                    extra,
                );
                metrics::record_request(operation, Some(response.status.as_u16()), duration_ms);
            }
            Err(error) => {
                let status = error.status.map(|s| s.as_u16());
                extra.insert("status".into(), json!(status));
                extra.insert("duration".into(), json!(duration_ms));
                extra.insert("error".into(), json!(error.message));
                extra.insert("responseData".into(), error.data.clone().unwrap_or(Value::Null));
                log_trace_info(
                    self.sink.as_ref(),
                    &format!("RESPONSE_ERROR: {}", operation),
                    trace_id,
                    extra,
                );
                metrics::record_request(operation, status, duration_ms);
                metrics::record_request_error(
                    operation,
                    if status.is_some() { "status" } else { "network" },
                );
            }
        }
    }
}
