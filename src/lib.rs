//! Traced HTTP client library.
//!
//! Wraps outbound HTTP calls with trace identifiers and structured
//! request/response logging.

pub mod client;
pub mod config;
pub mod observability;
pub mod trace;

pub use client::{EntitiesApi, InstrumentedClient};
pub use config::ClientConfig;
pub use trace::{IdentifierService, TraceId};
