//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Instrumented client produces:
//!     → trace records (TRACE marker, traceId, timestamp, extras) → TracingSink
//!     → metrics.rs (request counters, duration histogram)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Trace records are ordinary `tracing` events on target `traced_client::trace`
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
