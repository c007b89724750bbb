//! Instrumented HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! api.rs (domain operation: fixed method + path)
//!     → instrumented.rs
//!         → hooks.rs before_send (label, trace id, headers, metadata, REQUEST_START)
//!         → transport.rs (reqwest, one attempt)
//!         → hooks.rs after_receive (duration, RESPONSE_SUCCESS | RESPONSE_ERROR)
//!     → caller receives the transport outcome unchanged
//! ```
//!
//! # Design Decisions
//! - Hooks are constructor parameters, not mutations of a shared client
//! - Metadata travels inside the request, one copy per round-trip
//! - No retries and no timeout of its own; the transport owns both concerns

pub mod api;
pub mod hooks;
pub mod instrumented;
pub mod transport;
pub mod types;

pub use api::{EntitiesApi, NewEntity, SetupError};
pub use hooks::{operation_label, PostReceiveHook, PreSendHook, TracingHooks};
pub use instrumented::InstrumentedClient;
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    ClientError, RequestMetadata, TransportError, TransportRequest, TransportResponse,
    X_BACKEND_TRACE_ID,
};
