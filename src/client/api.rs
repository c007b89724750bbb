//! Domain operations over the instrumented client.
//!
//! Thin pass-through calls: fixed method and path, raw response body back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::client::instrumented::InstrumentedClient;
use crate::client::transport::ReqwestTransport;
use crate::client::types::{ClientError, TransportRequest};
use crate::config::ClientConfig;
use crate::trace::{open_store, IdentifierService, StoreError, TraceSink, TracingSink};

/// Payload for creating an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntity {
    pub name: String,
    pub description: String,
}

/// Errors building an [`EntitiesApi`] from configuration.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("session store: {0}")]
    Store(#[from] StoreError),

    #[error("transport: {0}")]
    Transport(#[from] crate::client::types::TransportError),
}

/// Entity, stored-value and diagnostic endpoints.
#[derive(Clone)]
pub struct EntitiesApi {
    client: InstrumentedClient,
    identifiers: Arc<IdentifierService>,
}

impl EntitiesApi {
    pub fn new(client: InstrumentedClient, identifiers: Arc<IdentifierService>) -> Self {
        Self { client, identifiers }
    }

    /// Build the full stack described by `config`, logging through `tracing`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, SetupError> {
        Self::from_config_with_sink(config, Arc::new(TracingSink))
    }

    pub fn from_config_with_sink(
        config: &ClientConfig,
        sink: Arc<dyn TraceSink>,
    ) -> Result<Self, SetupError> {
        let store = open_store(&config.session)?;
        let identifiers = Arc::new(
            IdentifierService::new(store).with_session_key(config.session.storage_key.clone()),
        );
        let transport = Arc::new(ReqwestTransport::new(
            &config.api.base_url,
            config.api.timeout(),
        )?);
        let client = InstrumentedClient::with_tracing(transport, identifiers.clone(), sink);

        tracing::debug!(base_url = %config.api.base_url, "Entities API ready");
        Ok(Self::new(client, identifiers))
    }

    pub fn client(&self) -> &InstrumentedClient {
        &self.client
    }

    pub fn identifiers(&self) -> &Arc<IdentifierService> {
        &self.identifiers
    }

    pub async fn get_all(&self) -> Result<Value, ClientError> {
        Ok(self.client.get("/entities/").await?.body)
    }

    pub async fn get_by_id(&self, entity_id: &str) -> Result<Value, ClientError> {
        Ok(self.client.get(&format!("/entities/{}/", entity_id)).await?.body)
    }

    pub async fn create(&self, entity: &NewEntity) -> Result<Value, ClientError> {
        let body = serde_json::to_value(entity)
            .map_err(|e| ClientError::InvalidRequest(format!("unserializable entity: {}", e)))?;
        Ok(self.client.post("/entities/", Some(body)).await?.body)
    }

    pub async fn get_stored_value(&self) -> Result<Value, ClientError> {
        Ok(self.client.get("/redis-get/").await?.body)
    }

    pub async fn set_stored_value(&self, value: &str) -> Result<Value, ClientError> {
        let request = TransportRequest::post("/redis-set/").with_query("value", value);
        Ok(self.client.send(request).await?.body)
    }

    pub async fn delete_stored_value(&self) -> Result<Value, ClientError> {
        Ok(self.client.post("/redis-delete/", None).await?.body)
    }

    pub async fn probe_random_status(&self) -> Result<Value, ClientError> {
        Ok(self.client.get("/random_status").await?.body)
    }

    pub async fn probe_random_sleep(&self) -> Result<Value, ClientError> {
        Ok(self.client.get("/random_sleep").await?.body)
    }

    pub async fn probe_chain(&self) -> Result<Value, ClientError> {
        Ok(self.client.get("/chain").await?.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreKind;

    #[test]
    fn test_from_config_with_memory_store() {
        let mut config = ClientConfig::default();
        config.session.store = StoreKind::Memory;

        let api = EntitiesApi::from_config(&config).unwrap();
        assert!(api.identifiers().peek_session_trace_id().is_none());
        assert_eq!(api.identifiers().session_key(), "app_session_trace_id");
    }

    #[test]
    fn test_from_config_survives_empty_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "").unwrap();

        let mut config = ClientConfig::default();
        config.session.store = StoreKind::File;
        config.session.path = Some(path.display().to_string());

        let api = EntitiesApi::from_config(&config).unwrap();
        assert!(api.identifiers().peek_session_trace_id().is_none());

        let id = api.identifiers().get_or_create_session_trace_id();
        assert!(std::fs::read_to_string(&path).unwrap().contains(id.as_str()));
    }

    #[test]
    fn test_from_config_rejects_bad_base_url() {
        let mut config = ClientConfig::default();
        config.session.store = StoreKind::Memory;
        config.api.base_url = "::nope".into();

        assert!(matches!(
            EntitiesApi::from_config(&config),
            Err(SetupError::Transport(_))
        ));
    }
}
