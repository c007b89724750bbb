//! Configuration validation.
//!
//! Returns every problem found, not just the first.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{ClientConfig, StoreKind};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.base_url '{0}' is not a valid http(s) URL")]
    InvalidBaseUrl(String),

    #[error("api.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("session.storage_key must not be empty")]
    EmptyStorageKey,

    #[error("session.path is required when session.store = \"file\"")]
    MissingStorePath,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(config.api.base_url.clone())),
    }

    if config.api.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.session.storage_key.is_empty() {
        errors.push(ValidationError::EmptyStorageKey);
    }

    if config.session.store == StoreKind::File
        && config.session.path.as_deref().map_or(true, str::is_empty)
    {
        errors.push(ValidationError::MissingStorePath);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://example.com".into();
        config.api.timeout_ms = 0;
        config.session.storage_key.clear();
        config.session.path = None;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBaseUrl("ftp://example.com".into()),
                ValidationError::ZeroTimeout,
                ValidationError::EmptyStorageKey,
                ValidationError::MissingStorePath,
                ValidationError::InvalidMetricsAddress("nowhere".into()),
            ]
        );
    }

    #[test]
    fn test_memory_store_needs_no_path() {
        let mut config = ClientConfig::default();
        config.session.store = StoreKind::Memory;
        config.session.path = None;
        assert!(validate_config(&config).is_ok());
    }
}
