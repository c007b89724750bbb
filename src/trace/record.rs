//! Structured trace log records and the sinks that receive them.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Mutex, PoisonError};

/// Marker carried by every record.
pub const TRACE_MARKER: &str = "TRACE";

/// Keys owned by the record itself; extra fields with these names are renamed.
const RESERVED_KEYS: [&str; 4] = ["marker", "label", "traceId", "timestamp"];

/// One trace log emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    pub marker: &'static str,
    pub label: String,
    #[serde(rename = "traceId")]
    pub trace_id: String,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TraceRecord {
    /// Build a record. Extra keys that clash with record fields get an `extra_` prefix.
    pub fn new(label: impl Into<String>, trace_id: impl Into<String>, extra: Map<String, Value>) -> Self {
        let extra = extra
            .into_iter()
            .map(|(k, v)| {
                if RESERVED_KEYS.contains(&k.as_str()) {
                    (format!("extra_{}", k), v)
                } else {
                    (k, v)
                }
            })
            .collect();
        Self {
            marker: TRACE_MARKER,
            label: label.into(),
            trace_id: trace_id.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            extra,
        }
    }

    /// Value of an extra field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Destination for trace records. Emission is infallible.
pub trait TraceSink: Send + Sync {
    fn emit(&self, record: &TraceRecord);
}

/// Emits each record as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&self, record: &TraceRecord) {
        let extra = Value::Object(record.extra.clone());
        tracing::info!(
            target: "traced_client::trace",
            trace_id = %record.trace_id,
            timestamp = %record.timestamp,
            extra = %extra,
            "[{}] {}",
            record.marker,
            record.label
        );
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<TraceRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TraceRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records whose label starts with `prefix`.
    pub fn with_label_prefix(&self, prefix: &str) -> Vec<TraceRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.label.starts_with(prefix))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TraceSink for MemorySink {
    fn emit(&self, record: &TraceRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

/// Build a record stamped with the current time and hand it to `sink`.
pub fn log_trace_info(sink: &dyn TraceSink, label: &str, trace_id: &str, extra: Map<String, Value>) {
    sink.emit(&TraceRecord::new(label, trace_id, extra));
}
