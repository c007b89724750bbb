//! Operation-scoped trace ids.

use crate::trace::id::{truncate, TraceId, TRACE_ID_LEN};

/// Characters kept from the session id and from the fresh operation id.
pub const SEGMENT_LEN: usize = 16;

pub const DEFAULT_OPERATION: &str = "default";

/// Compose `{session}-{operation_id}-{operation}` and cut the result to
/// [`TRACE_ID_LEN`] characters.
///
/// The cut is applied to the whole string, so the label (and even the last
/// delimiter) disappears whenever the first two segments are full length.
pub fn compose_operation_trace_id(session_id: &str, operation_id: &str, operation: &str) -> TraceId {
    let composite = format!(
        "{}-{}-{}",
        truncate(session_id, SEGMENT_LEN),
        truncate(operation_id, SEGMENT_LEN),
        operation
    );
    TraceId::from(truncate(&composite, TRACE_ID_LEN))
}
