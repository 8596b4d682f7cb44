//! The authenticated-request wrapper.
//!
//! Logging in is somebody else's job; a [`SessionProvider`] only hands out
//! the bearer token to attach to each call, or `None` for anonymous calls.

use async_trait::async_trait;

use etudiant_rs_core::AppResult;

/// Supplies the bearer token for each request.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn token(&self) -> AppResult<Option<String>>;
}

/// Anonymous requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

#[async_trait]
impl SessionProvider for NoSession {
    async fn token(&self) -> AppResult<Option<String>> {
        Ok(None)
    }
}

/// A token obtained elsewhere.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl SessionProvider for StaticToken {
    async fn token(&self) -> AppResult<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}
