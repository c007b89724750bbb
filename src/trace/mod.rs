//! Trace identifier subsystem.
//!
//! # Data Flow
//! ```text
//! injected RNG
//!     → id.rs (32-char version-4 style ids)
//!     → headers.rs (X-Trace-ID / Content-Type / X-Request-ID)
//!
//! SessionStore (memory or file)
//!     → service.rs (lazy session id, explicit clear)
//!     → operation.rs ({session16}-{op16}-{label}, cut to 32)
//!
//! record.rs: one TraceRecord per log emission → TraceSink
//! ```
//!
//! # Design Decisions
//! - Randomness is injected so ids are reproducible under a seeded RNG
//! - Session state lives behind a store trait owned by the service, not a global
//! - Storage failures degrade to unpersisted ids; they never reach callers

pub mod headers;
pub mod id;
pub mod operation;
pub mod record;
pub mod service;
pub mod store;

pub use headers::{create_tracing_headers, HeaderError, TracingHeaders, X_REQUEST_ID, X_TRACE_ID};
pub use id::{generate_trace_id, TraceId, TRACE_ID_LEN};
pub use operation::compose_operation_trace_id;
pub use record::{log_trace_info, MemorySink, TraceRecord, TraceSink, TracingSink};
pub use service::{IdentifierService, SESSION_TRACE_KEY};
pub use store::{open_store, FileStore, MemoryStore, SessionStore, StoreError};
