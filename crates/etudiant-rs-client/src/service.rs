//! Typed CRUD access to one entity kind's REST collection.
//!
//! [`CollectionApi`] is the seam the form controllers depend on;
//! [`CollectionService`] implements it over a [`Transport`]. Resources live
//! at `<prefix>/<resource>` (see [`EntityKind::resource`]).

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use tracing::Instrument;

use etudiant_rs_core::logging::request_span;
use etudiant_rs_core::{AppError, AppResult, Settings, ValidationError};
use etudiant_rs_model::{add_to_collection_if_missing, Entity, EntityKind, Id};

use crate::pagination::{Page, PageLinks, QueryCriteria, TOTAL_COUNT_HEADER};
use crate::session::{NoSession, SessionProvider};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport, JSON, MERGE_PATCH_JSON};

/// CRUD operations on one entity kind.
///
/// Every backend failure (transport, validation, not-found) comes back as an
/// [`AppError`]; nothing is retried.
#[async_trait]
pub trait CollectionApi<E: Entity>: Send + Sync {
    /// Fetches one page of records.
    async fn query(&self, criteria: &QueryCriteria) -> AppResult<Page<E>>;

    /// Fetches one record by identifier.
    async fn find(&self, id: Id) -> AppResult<E>;

    /// Persists a new record. The backend rejects records that already carry
    /// an identifier.
    async fn create(&self, record: &E) -> AppResult<E>;

    /// Replaces a persisted record wholesale.
    async fn update(&self, record: &E) -> AppResult<E>;

    /// Updates only the fields set on `record`.
    async fn partial_update(&self, record: &E) -> AppResult<E>;

    /// Deletes a record. A second delete of the same identifier fails.
    async fn delete(&self, id: Id) -> AppResult<()>;

    /// Merges `candidates` into a fetched collection so none is missing.
    ///
    /// See [`add_to_collection_if_missing`].
    fn add_to_collection_if_missing(&self, collection: Vec<E>, candidates: Vec<Option<E>>) -> Vec<E> {
        add_to_collection_if_missing(collection, candidates)
    }
}

/// [`CollectionApi`] over a [`Transport`].
///
/// # Examples
///
/// ```
/// use etudiant_rs_client::CollectionService;
/// use etudiant_rs_model::Country;
///
/// let service = CollectionService::<Country>::over_http("http://127.0.0.1:8080");
/// assert_eq!(service.resource_url(), "/api/pays");
/// ```
pub struct CollectionService<E: Entity> {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionProvider>,
    prefix: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for CollectionService<E> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            session: Arc::clone(&self.session),
            prefix: self.prefix.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> std::fmt::Debug for CollectionService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionService")
            .field("kind", &E::KIND)
            .field("resource_url", &self.resource_url())
            .finish_non_exhaustive()
    }
}

impl<E: Entity> CollectionService<E> {
    /// Creates a service with anonymous requests and the `/api` prefix.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            session: Arc::new(NoSession),
            prefix: "/api".to_string(),
            _entity: PhantomData,
        }
    }

    /// Creates a service talking HTTP to `base_url`.
    pub fn over_http(base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(HttpTransport::new(base_url)))
    }

    /// Creates a service configured from settings.
    pub fn from_settings(transport: Arc<dyn Transport>, settings: &Settings) -> Self {
        let service = Self::new(transport).with_prefix(&settings.api_prefix);
        match &settings.auth_token {
            Some(token) => service.with_session(Arc::new(crate::session::StaticToken::new(token))),
            None => service,
        }
    }

    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn SessionProvider>) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    /// The entity kind served.
    pub const fn kind(&self) -> EntityKind {
        E::KIND
    }

    /// Path of the collection resource.
    pub fn resource_url(&self) -> String {
        format!("{}/{}", self.prefix, E::KIND.resource())
    }

    fn item_url(&self, id: Id) -> String {
        format!("{}/{id}", self.resource_url())
    }

    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let request = match self.session.token().await? {
            Some(token) => request.with_bearer(&token)?,
            None => request,
        };
        let span = request_span(request.method.as_str(), &request.path);
        let response = self
            .transport
            .send(request)
            .instrument(span.clone())
            .await?;
        tracing::debug!(parent: &span, status = response.status.as_u16(), "response received");
        response.error_for_status()
    }

    fn require_id(record: &E) -> AppResult<Id> {
        record.id().ok_or_else(|| {
            AppError::Validation(
                ValidationError::new("Invalid id", "idnull").with_entity(E::KIND.entity_name()),
            )
        })
    }
}

#[async_trait]
impl<E: Entity> CollectionApi<E> for CollectionService<E> {
    async fn query(&self, criteria: &QueryCriteria) -> AppResult<Page<E>> {
        let mut path = self.resource_url();
        if !criteria.is_empty() {
            path.push('?');
            path.push_str(&criteria.to_query_string());
        }
        tracing::debug!(kind = %E::KIND, %path, "querying collection");

        let response = self.send(ApiRequest::new(Method::GET, path)).await?;
        let total_count = response
            .header(TOTAL_COUNT_HEADER)
            .and_then(|v| v.trim().parse().ok());
        let links = response
            .header(http::header::LINK.as_str())
            .map(PageLinks::parse)
            .unwrap_or_default();
        let items: Option<Vec<E>> = if response.body.is_empty() {
            None
        } else {
            response.json()?
        };

        Ok(Page {
            items: items.unwrap_or_default(),
            total_count,
            links,
        })
    }

    async fn find(&self, id: Id) -> AppResult<E> {
        tracing::debug!(kind = %E::KIND, id, "fetching record");
        self.send(ApiRequest::new(Method::GET, self.item_url(id)))
            .await?
            .json()
    }

    async fn create(&self, record: &E) -> AppResult<E> {
        let request =
            ApiRequest::new(Method::POST, self.resource_url()).with_json(record, JSON)?;
        let created: E = self.send(request).await?.json()?;
        tracing::info!(kind = %E::KIND, id = ?created.id(), "record created");
        Ok(created)
    }

    async fn update(&self, record: &E) -> AppResult<E> {
        let id = Self::require_id(record)?;
        let request = ApiRequest::new(Method::PUT, self.item_url(id)).with_json(record, JSON)?;
        let updated: E = self.send(request).await?.json()?;
        tracing::info!(kind = %E::KIND, id, "record updated");
        Ok(updated)
    }

    async fn partial_update(&self, record: &E) -> AppResult<E> {
        let id = Self::require_id(record)?;
        let request =
            ApiRequest::new(Method::PATCH, self.item_url(id)).with_json(record, MERGE_PATCH_JSON)?;
        let updated: E = self.send(request).await?.json()?;
        tracing::info!(kind = %E::KIND, id, "record partially updated");
        Ok(updated)
    }

    async fn delete(&self, id: Id) -> AppResult<()> {
        self.send(ApiRequest::new(Method::DELETE, self.item_url(id)))
            .await?;
        tracing::info!(kind = %E::KIND, id, "record deleted");
        Ok(())
    }
}
