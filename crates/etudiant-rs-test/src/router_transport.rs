//! A [`Transport`] that drives an axum [`Router`] in-process.

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http::Request;
use http_body_util::BodyExt;
use tower::ServiceExt;

use etudiant_rs_client::{ApiRequest, ApiResponse, Transport};
use etudiant_rs_core::{AppError, AppResult};

/// Sends each request through a clone of `router` with `oneshot`.
///
/// Paths are used as-is, so the router must serve them at the same prefix
/// the collection services use.
#[derive(Clone)]
pub struct RouterTransport {
    router: Router,
}

impl std::fmt::Debug for RouterTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterTransport").finish_non_exhaustive()
    }
}

impl RouterTransport {
    pub const fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl Transport for RouterTransport {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let mut builder = Request::builder()
            .method(request.method)
            .uri(request.path.as_str());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(request.headers);
        }
        let body = request.body.map_or_else(Body::empty, Body::from);
        let request = builder
            .body(body)
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?
            .to_bytes();

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
