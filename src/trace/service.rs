//! Identifier service: random source, session state and id composition.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};

use crate::trace::headers::{self, TracingHeaders};
use crate::trace::id::{self, TraceId};
use crate::trace::operation::{compose_operation_trace_id, DEFAULT_OPERATION, SEGMENT_LEN};
use crate::trace::store::SessionStore;

/// Storage key of the session trace id.
pub const SESSION_TRACE_KEY: &str = "app_session_trace_id";

/// Produces trace ids and owns the lifecycle of the session trace id.
///
/// The session id is created lazily by [`get_or_create_session_trace_id`]
/// and only replaced after an explicit [`clear_session_trace_id`].
///
/// [`get_or_create_session_trace_id`]: IdentifierService::get_or_create_session_trace_id
/// [`clear_session_trace_id`]: IdentifierService::clear_session_trace_id
pub struct IdentifierService {
    rng: Mutex<Box<dyn RngCore + Send>>,
    store: Arc<dyn SessionStore>,
    session_key: String,
}

impl IdentifierService {
    /// Create a service seeded from OS entropy.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// Create a service drawing randomness from `rng`.
    pub fn with_rng(store: Arc<dyn SessionStore>, rng: impl RngCore + Send + 'static) -> Self {
        let rng: Box<dyn RngCore + Send> = Box::new(rng);
        Self {
            rng: Mutex::new(rng),
            store,
            session_key: SESSION_TRACE_KEY.to_string(),
        }
    }

    /// Store the session id under `key` instead of the default.
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn generate_trace_id(&self) -> TraceId {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        id::generate_trace_id(&mut **rng)
    }

    pub fn create_tracing_headers(&self, trace_id: Option<&TraceId>) -> TracingHeaders {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        headers::create_tracing_headers(&mut **rng, trace_id)
    }

    /// Return the session trace id, creating and persisting one if absent.
    ///
    /// Storage failures never surface: a read failure yields a fresh id that is
    /// not persisted, a write failure still returns the generated id. A stored
    /// value that is not shaped like a generated id is replaced.
    pub fn get_or_create_session_trace_id(&self) -> TraceId {
        match self.store.get(&self.session_key) {
            Ok(Some(existing)) if id::is_generated_trace_id(&existing) => {
                return TraceId::from(existing)
            }
            Ok(Some(existing)) if !existing.is_empty() => {
                tracing::warn!(key = %self.session_key, stored = ?existing, "Discarding malformed session trace id");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(key = %self.session_key, error = %e, "Session store unreadable, using ephemeral session id");
                return self.generate_trace_id();
            }
        }

        let session_id = self.generate_trace_id();
        if let Err(e) = self.store.set(&self.session_key, session_id.as_str()) {
            tracing::warn!(key = %self.session_key, error = %e, "Failed to persist session trace id");
        } else {
            tracing::debug!(session_trace_id = %session_id, "Created session trace id");
        }
        session_id
    }

    /// Current session id without creating one. Malformed stored values read as absent.
    pub fn peek_session_trace_id(&self) -> Option<TraceId> {
        match self.store.get(&self.session_key) {
            Ok(Some(existing)) if id::is_generated_trace_id(&existing) => Some(TraceId::from(existing)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(key = %self.session_key, error = %e, "Session store unreadable");
                None
            }
        }
    }

    /// Drop the session id. Safe to call when none exists.
    pub fn clear_session_trace_id(&self) {
        match self.store.remove(&self.session_key) {
            Ok(()) => tracing::debug!(key = %self.session_key, "Cleared session trace id"),
            Err(e) => {
                tracing::warn!(key = %self.session_key, error = %e, "Failed to clear session trace id")
            }
        }
    }

    /// Operation id labelled [`DEFAULT_OPERATION`].
    pub fn create_default_operation_trace_id(&self) -> TraceId {
        self.create_operation_trace_id(DEFAULT_OPERATION)
    }

    /// Id for one operation: session prefix, fresh random prefix and label,
    /// cut to 32 characters as a whole.
    pub fn create_operation_trace_id(&self, operation: &str) -> TraceId {
        let session_id = self.get_or_create_session_trace_id();
        let operation_id = self.generate_trace_id();
        compose_operation_trace_id(
            session_id.prefix(SEGMENT_LEN),
            operation_id.prefix(SEGMENT_LEN),
            operation,
        )
    }
}
