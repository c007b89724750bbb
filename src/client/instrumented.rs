//! Transport wrapper that runs the hooks around every call.

use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

use crate::client::hooks::{PostReceiveHook, PreSendHook, TracingHooks};
use crate::client::transport::Transport;
use crate::client::types::{ClientError, TransportRequest, TransportResponse};
use crate::trace::{IdentifierService, TraceSink};

/// A transport composed with a pre-send and a post-receive hook.
///
/// Outcomes reach the caller exactly as the transport produced them; the
/// hooks only observe.
#[derive(Clone)]
pub struct InstrumentedClient {
    transport: Arc<dyn Transport>,
    pre_send: Arc<dyn PreSendHook>,
    post_receive: Arc<dyn PostReceiveHook>,
}

impl InstrumentedClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        pre_send: Arc<dyn PreSendHook>,
        post_receive: Arc<dyn PostReceiveHook>,
    ) -> Self {
        Self {
            transport,
            pre_send,
            post_receive,
        }
    }

    /// Wire [`TracingHooks`] on both sides of `transport`.
    pub fn with_tracing(
        transport: Arc<dyn Transport>,
        identifiers: Arc<IdentifierService>,
        sink: Arc<dyn TraceSink>,
    ) -> Self {
        let hooks = Arc::new(TracingHooks::new(identifiers, sink));
        Self::new(transport, hooks.clone(), hooks)
    }

    pub async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
        let request = match self.pre_send.before_send(request) {
            Ok(request) => request,
            Err(e) => {
                self.pre_send.on_request_error(&e);
                return Err(e);
            }
        };

        let metadata = request.metadata.clone();
        let outcome = self.transport.send(request).await;
        self.post_receive.after_receive(metadata.as_ref(), &outcome);

        outcome.map_err(ClientError::Transport)
    }

    pub async fn get(&self, path: &str) -> Result<TransportResponse, ClientError> {
        self.send(TransportRequest::new(Method::GET, path)).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<TransportResponse, ClientError> {
        let mut request = TransportRequest::new(Method::POST, path);
        request.body = body;
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::{RequestMetadata, TransportError};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;

    /// Echoes the request headers count back as the body.
    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
            Ok(TransportResponse::new(
                StatusCode::OK,
                json!({ "headers": request.headers.len(), "path": request.path }),
            ))
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl PreSendHook for Recorder {
        fn before_send(&self, request: TransportRequest) -> Result<TransportRequest, ClientError> {
            self.events.lock().unwrap().push(format!("pre {}", request.path));
            if request.path == "/fail" {
                return Err(ClientError::InvalidRequest("refused".into()));
            }
            Ok(request)
        }

        fn on_request_error(&self, error: &ClientError) {
            self.events.lock().unwrap().push(format!("err {}", error));
        }
    }

    impl PostReceiveHook for Recorder {
        fn after_receive(
            &self,
            metadata: Option<&RequestMetadata>,
            outcome: &Result<TransportResponse, TransportError>,
        ) {
            self.events.lock().unwrap().push(format!(
                "post metadata={} ok={}",
                metadata.is_some(),
                outcome.is_ok()
            ));
        }
    }

    #[tokio::test]
    async fn test_custom_hooks_run_in_order() {
        let recorder = Arc::new(Recorder::default());
        let client = InstrumentedClient::new(Arc::new(EchoTransport), recorder.clone(), recorder.clone());

        let response = client.get("/ok").await.unwrap();
        assert_eq!(response.body["path"], "/ok");

        let err = client.get("/fail").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "pre /ok".to_string(),
                "post metadata=false ok=true".to_string(),
                "pre /fail".to_string(),
                "err invalid request: refused".to_string(),
            ]
        );
    }
}
