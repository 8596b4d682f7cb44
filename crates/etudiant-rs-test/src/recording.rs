//! A transport wrapper that records requests and can fail chosen paths.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use http::Method;

use etudiant_rs_client::{ApiRequest, ApiResponse, Transport};
use etudiant_rs_core::{AppError, AppResult};

/// One request as it left the client.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl RecordedCall {
    /// The path without its query string.
    pub fn resource(&self) -> &str {
        self.path.split('?').next().unwrap_or_default()
    }
}

/// Records every request before handing it to `inner`.
///
/// Requests whose path starts with a prefix passed to
/// [`fail_path`](Self::fail_path) are recorded and then fail with
/// [`AppError::Transport`] without reaching `inner`.
#[derive(Clone)]
pub struct RecordingTransport<T> {
    inner: T,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    failing: Arc<Mutex<Vec<String>>>,
}

impl<T> std::fmt::Debug for RecordingTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingTransport")
            .field("calls", &self.calls().len())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> RecordingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            calls: Arc::default(),
            failing: Arc::default(),
        }
    }
}

impl<T> RecordingTransport<T> {
    /// Makes requests under `prefix` fail until [`heal`](Self::heal).
    pub fn fail_path(&self, prefix: impl Into<String>) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prefix.into());
    }

    pub fn heal(&self) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// All requests so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests so far with this method.
    pub fn calls_with(&self, method: &Method) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == *method)
            .collect()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn is_failing(&self, path: &str) -> bool {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[async_trait]
impl<T: Transport> Transport for RecordingTransport<T> {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let call = RecordedCall {
            method: request.method.clone(),
            path: request.path.clone(),
            body: request.json_body(),
        };
        let failing = self.is_failing(&call.path);
        tracing::trace!(method = %call.method, path = %call.path, failing, "recorded request");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        if failing {
            return Err(AppError::Transport(format!(
                "connection refused: {}",
                request.path
            )));
        }
        self.inner.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};

    use super::*;

    struct Accepting;

    #[async_trait]
    impl Transport for Accepting {
        async fn send(&self, _request: ApiRequest) -> AppResult<ApiResponse> {
            Ok(ApiResponse {
                status: StatusCode::NO_CONTENT,
                headers: HeaderMap::new(),
                body: Bytes::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_records_method_path_and_body() {
        let transport = RecordingTransport::new(Accepting);
        let request = ApiRequest::new(Method::POST, "/api/pays")
            .with_json(&serde_json::json!({"nomPays": "Mali"}), "application/json")
            .unwrap();
        transport.send(request).await.unwrap();
        transport
            .send(ApiRequest::new(Method::GET, "/api/pays?page=0"))
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].body, Some(serde_json::json!({"nomPays": "Mali"})));
        assert_eq!(transport.calls_with(&Method::GET)[0].resource(), "/api/pays");
        assert_eq!(transport.last_call().unwrap().path, "/api/pays?page=0");
    }

    #[tokio::test]
    async fn test_failing_paths_until_healed() {
        let transport = RecordingTransport::new(Accepting);
        transport.fail_path("/api/niveaus");

        let err = transport
            .send(ApiRequest::new(Method::GET, "/api/niveaus?page=0"))
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(transport
            .send(ApiRequest::new(Method::GET, "/api/pays"))
            .await
            .is_ok());

        transport.heal();
        assert!(transport
            .send(ApiRequest::new(Method::GET, "/api/niveaus"))
            .await
            .is_ok());
        assert_eq!(transport.calls().len(), 3);
    }
}
