//! The transport seam between collection services and the backend.
//!
//! A [`Transport`] sends one [`ApiRequest`] and returns the raw
//! [`ApiResponse`], whatever its status. Failing to obtain a response at all
//! is reported as [`AppError::Transport`]; interpreting the status is left to
//! the caller. [`HttpTransport`] talks to a real backend over the network.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use etudiant_rs_core::{AppError, AppResult};

/// Content type for JSON bodies.
pub const JSON: &str = "application/json";
/// Content type for partial updates.
pub const MERGE_PATCH_JSON: &str = "application/merge-patch+json";

/// An outgoing request, addressed relative to the backend's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path plus query string, e.g. `/api/pays?page=0&size=20`.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ApiRequest {
    /// Creates a request without a body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Attaches a serialized body with the given content type.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T, content_type: &'static str) -> AppResult<Self> {
        let bytes = serde_json::to_vec(body).map_err(|e| AppError::Serialization(e.to_string()))?;
        self.headers
            .insert(http::header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }

    /// Sets the `Authorization: Bearer` header.
    pub fn with_bearer(mut self, token: &str) -> AppResult<Self> {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| AppError::ConfigurationError(format!("invalid token: {e}")))?;
        self.headers.insert(http::header::AUTHORIZATION, value);
        Ok(self)
    }

    /// The request body as JSON, if any.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_ref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// A response as received, before status interpretation.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    /// Returns the response body as a UTF-8 string.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Deserializes the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| AppError::Serialization(e.to_string()))
    }

    /// Returns the value of a header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Converts a non-success response into an error.
    pub fn error_for_status(self) -> AppResult<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(AppError::from_status(self.status.as_u16(), &self.text()))
        }
    }
}

/// Sends requests to a backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse>;
}

/// A [`Transport`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .http
            .request(request.method, &url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
