//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → CLI overrides (--base-url)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an absent file means a usable config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ApiConfig, ClientConfig, LogFormat, ObservabilityConfig, SessionConfig, StoreKind};
pub use validation::{validate_config, ValidationError};
