//! The REST resource site and its axum router.
//!
//! Each kind is served under `<prefix>/<resource>`:
//!
//! - `GET /<resource>` - one page, with `X-Total-Count` and `Link`
//! - `POST /<resource>` - create; the body must not carry an `id`
//! - `GET /<resource>/{id}` - one record, 404 when missing
//! - `PUT /<resource>/{id}` - replace
//! - `PATCH /<resource>/{id}` - merge the non-null fields of the body
//! - `DELETE /<resource>/{id}` - 204, then 404 once gone
//!
//! Rejected writes answer 400 with a problem body carrying `title`,
//! `entityName` and `errorKey` (`idexists`, `idnull`, `idinvalid`,
//! `idnotfound`).
//!
//! Students store their level, field of study and country by identifier
//! only. Writes referencing a missing record are rejected; reads expand the
//! references to the current records.

use std::sync::Arc;

use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use etudiant_rs_core::{AppError, AppResult, Settings, ValidationError};
use etudiant_rs_model::{Country, Entity, EntityKind, FieldOfStudy, Id, Level, Student};

use crate::alerts::{entity_alert, failure_alert, pagination_headers, Mutation};
use crate::store::{InMemoryStore, ListParams, RecordStore};

/// Student fields that reference other kinds, with the kind referenced.
pub const STUDENT_REFERENCES: [(&str, EntityKind); 3] = [
    ("nomNiveau", EntityKind::Level),
    ("nomFiliere", EntityKind::FieldOfStudy),
    ("nomPays", EntityKind::Country),
];

/// Builds the resource router over a [`RecordStore`].
///
/// # Examples
///
/// ```
/// use etudiant_rs_server::ApiSite;
///
/// let site = ApiSite::new("etudiantetranger").prefix("/api");
/// assert_eq!(site.prefix_str(), "/api");
/// let router = site.into_axum_router();
/// ```
pub struct ApiSite {
    app_name: String,
    prefix: String,
    page_size: usize,
    store: Arc<dyn RecordStore>,
}

impl ApiSite {
    /// Creates a site over an empty in-memory store, under `/api`.
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            prefix: "/api".to_string(),
            page_size: 20,
            store: Arc::new(InMemoryStore::new()),
        }
    }

    /// Creates a site named and prefixed from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.application_name)
            .prefix(&settings.api_prefix)
            .page_size(settings.page_size)
    }

    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    /// Default page size when a list call sends none.
    #[must_use]
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = store;
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn prefix_str(&self) -> &str {
        &self.prefix
    }

    /// Converts the site into an axum router.
    pub fn into_axum_router(self) -> Router {
        let shared = Arc::new(SiteState {
            app_name: self.app_name,
            prefix: self.prefix.clone(),
            page_size: self.page_size,
            store: self.store,
        });

        let api = Router::new()
            .route("/{resource}", get(handle_list).post(handle_create))
            .route(
                "/{resource}/{id}",
                get(handle_detail)
                    .put(handle_update)
                    .patch(handle_partial_update)
                    .delete(handle_delete),
            )
            .with_state(shared);

        let router = if self.prefix.is_empty() {
            api
        } else {
            Router::new().nest(&self.prefix, api)
        };
        router.layer(TraceLayer::new_for_http())
    }
}

impl std::fmt::Debug for ApiSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSite")
            .field("app_name", &self.app_name)
            .field("prefix", &self.prefix)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

struct SiteState {
    app_name: String,
    prefix: String,
    page_size: usize,
    store: Arc<dyn RecordStore>,
}

fn rejection(message: &str, entity: &str, key: &str) -> AppError {
    AppError::Validation(ValidationError::new(message, key).with_entity(entity))
}

fn resolve_kind(resource: &str) -> AppResult<EntityKind> {
    EntityKind::from_resource(resource)
        .ok_or_else(|| AppError::NotFound(format!("no resource '{resource}'")))
}

fn parse_id(raw: &str) -> AppResult<Id> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("'{raw}' is not a valid identifier")))
}

fn parse_body(body: &Bytes) -> AppResult<Value> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("malformed JSON body: {e}")))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(AppError::BadRequest("body must be a JSON object".into()))
    }
}

fn body_id(body: &Value) -> Option<Id> {
    body.get("id").and_then(Value::as_i64)
}

/// Round-trips a body through the kind's record type, which rejects
/// ill-typed fields, drops unknown ones and drops nulls.
fn normalize(kind: EntityKind, body: Value) -> AppResult<Value> {
    fn through<E: Entity>(body: Value) -> AppResult<Value> {
        let record: E = serde_json::from_value(body)
            .map_err(|e| AppError::BadRequest(format!("invalid {} body: {e}", E::KIND)))?;
        serde_json::to_value(&record).map_err(|e| AppError::Serialization(e.to_string()))
    }
    match kind {
        EntityKind::Student => through::<Student>(body),
        EntityKind::Country => through::<Country>(body),
        EntityKind::FieldOfStudy => through::<FieldOfStudy>(body),
        EntityKind::Level => through::<Level>(body),
    }
}

impl SiteState {
    fn collection_path(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.prefix, kind.resource())
    }

    fn respond(&self, entity: &str, outcome: AppResult<Response>) -> Response {
        outcome.unwrap_or_else(|err| self.error_response(entity, &err))
    }

    fn error_response(&self, entity: &str, err: &AppError) -> Response {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            AppError::Validation(v) => {
                let entity = v.entity.as_deref().unwrap_or(entity);
                tracing::debug!(entity, key = %v.error_key, "request rejected");
                let body = json!({
                    "title": v.message,
                    "status": status.as_u16(),
                    "message": format!("error.{}", v.error_key),
                    "params": entity,
                    "entityName": entity,
                    "errorKey": v.error_key,
                });
                (
                    status,
                    failure_alert(&self.app_name, entity, &v.error_key),
                    Json(body),
                )
                    .into_response()
            }
            other => {
                if status.is_server_error() {
                    tracing::error!(error = %other, "request failed");
                }
                let body = json!({
                    "title": status.canonical_reason().unwrap_or("Error"),
                    "status": status.as_u16(),
                    "detail": other.to_string(),
                    "message": format!("error.http.{}", status.as_u16()),
                });
                (status, Json(body)).into_response()
            }
        }
    }

    /// Shrinks a student's references to `{"id": n}` after checking that
    /// each referenced record exists.
    async fn check_references(&self, record: &mut Value) -> AppResult<()> {
        let Some(fields) = record.as_object_mut() else {
            return Ok(());
        };
        for (key, kind) in STUDENT_REFERENCES {
            let Some(reference) = fields.get(key) else {
                continue;
            };
            let id = body_id(reference)
                .ok_or_else(|| rejection("Invalid id", kind.entity_name(), "idnull"))?;
            if !self.store.exists(kind, id).await? {
                return Err(rejection("Entity not found", kind.entity_name(), "idnotfound"));
            }
            fields.insert(key.to_string(), json!({ "id": id }));
        }
        Ok(())
    }

    /// Removes stored student references whose record no longer exists.
    async fn drop_dangling(&self, record: &mut Value) -> AppResult<()> {
        let Some(fields) = record.as_object_mut() else {
            return Ok(());
        };
        for (key, kind) in STUDENT_REFERENCES {
            let Some(id) = fields.get(key).and_then(body_id) else {
                continue;
            };
            if !self.store.exists(kind, id).await? {
                tracing::debug!(field = key, id, "dropping dangling reference");
                fields.remove(key);
            }
        }
        Ok(())
    }

    /// Replaces stored student references with the current records.
    async fn expand(&self, kind: EntityKind, mut record: Value) -> AppResult<Value> {
        if kind != EntityKind::Student {
            return Ok(record);
        }
        if let Some(fields) = record.as_object_mut() {
            for (key, referenced) in STUDENT_REFERENCES {
                let Some(id) = fields.get(key).and_then(body_id) else {
                    continue;
                };
                match self.store.get(referenced, id).await? {
                    Some(current) => {
                        fields.insert(key.to_string(), current);
                    }
                    None => {
                        fields.remove(key);
                    }
                }
            }
        }
        Ok(record)
    }

    async fn prepare_write(&self, kind: EntityKind, body: Value) -> AppResult<Value> {
        let mut record = normalize(kind, body)?;
        if kind == EntityKind::Student {
            self.check_references(&mut record).await?;
        }
        Ok(record)
    }

    /// Common checks of PUT and PATCH: the body names the record addressed
    /// by the path, and that record exists.
    async fn check_update_target(&self, kind: EntityKind, path_id: Id, body: &Value) -> AppResult<()> {
        let entity = kind.entity_name();
        let Some(id) = body_id(body) else {
            return Err(rejection("Invalid id", entity, "idnull"));
        };
        if id != path_id {
            return Err(rejection("Invalid ID", entity, "idinvalid"));
        }
        if !self.store.exists(kind, id).await? {
            return Err(rejection("Entity not found", entity, "idnotfound"));
        }
        Ok(())
    }

    fn saved_response(&self, status: StatusCode, kind: EntityKind, mutation: Mutation, record: Value) -> Response {
        let id = body_id(&record).map(|id| id.to_string()).unwrap_or_default();
        let mut headers = entity_alert(&self.app_name, mutation, kind.entity_name(), &id);
        if mutation == Mutation::Created {
            let location = format!("{}/{id}", self.collection_path(kind));
            if let Ok(value) = HeaderValue::from_str(&location) {
                headers.insert(header::LOCATION, value);
            }
        }
        (status, headers, Json(record)).into_response()
    }

    async fn list(&self, resource: &str, query: Option<&str>) -> AppResult<Response> {
        let kind = resolve_kind(resource)?;
        let mut params = ListParams::new().size(self.page_size);
        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let number = || {
                value
                    .parse::<usize>()
                    .map_err(|_| AppError::BadRequest(format!("invalid {key} '{value}'")))
            };
            match key.as_ref() {
                "page" => params.page = number()?,
                "size" => params.size = number()?.max(1),
                "sort" => params.sort.push(value.to_string()),
                _ => {}
            }
        }
        tracing::debug!(%kind, page = params.page, size = params.size, "REST request to get a page");

        let result = self.store.list(kind, &params).await?;
        let mut items = Vec::with_capacity(result.items.len());
        for item in result.items {
            items.push(self.expand(kind, item).await?);
        }
        let headers = pagination_headers(
            &self.collection_path(kind),
            params.page,
            params.size,
            result.total,
        );
        Ok((headers, Json(Value::Array(items))).into_response())
    }

    async fn detail(&self, resource: &str, id: &str) -> AppResult<Response> {
        let kind = resolve_kind(resource)?;
        let id = parse_id(id)?;
        tracing::debug!(%kind, id, "REST request to get");
        let record = self
            .store
            .get(kind, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{kind} {id}")))?;
        Ok(Json(self.expand(kind, record).await?).into_response())
    }

    async fn create(&self, resource: &str, body: &Bytes) -> AppResult<Response> {
        let kind = resolve_kind(resource)?;
        let body = parse_body(body)?;
        tracing::debug!(%kind, "REST request to save");
        if body.get("id").is_some_and(|id| !id.is_null()) {
            return Err(rejection(
                &format!("A new {} cannot already have an ID", kind.entity_name()),
                kind.entity_name(),
                "idexists",
            ));
        }
        let record = self.prepare_write(kind, body).await?;
        let saved = self.store.insert(kind, record).await?;
        let saved = self.expand(kind, saved).await?;
        Ok(self.saved_response(StatusCode::CREATED, kind, Mutation::Created, saved))
    }

    async fn update(&self, resource: &str, id: &str, body: &Bytes) -> AppResult<Response> {
        let kind = resolve_kind(resource)?;
        let id = parse_id(id)?;
        let body = parse_body(body)?;
        tracing::debug!(%kind, id, "REST request to update");
        self.check_update_target(kind, id, &body).await?;

        let record = self.prepare_write(kind, body).await?;
        let saved = self
            .store
            .replace(kind, id, record)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{kind} {id}")))?;
        let saved = self.expand(kind, saved).await?;
        Ok(self.saved_response(StatusCode::OK, kind, Mutation::Updated, saved))
    }

    async fn partial_update(&self, resource: &str, id: &str, body: &Bytes) -> AppResult<Response> {
        let kind = resolve_kind(resource)?;
        let id = parse_id(id)?;
        let body = parse_body(body)?;
        tracing::debug!(%kind, id, "REST request to partial update");
        self.check_update_target(kind, id, &body).await?;

        let patch = normalize(kind, body)?;
        let mut merged = self
            .store
            .get(kind, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{kind} {id}")))?;
        if kind == EntityKind::Student {
            self.drop_dangling(&mut merged).await?;
        }
        if let (Some(target), Value::Object(changes)) = (merged.as_object_mut(), patch) {
            for (key, value) in changes {
                target.insert(key, value);
            }
        }
        if kind == EntityKind::Student {
            self.check_references(&mut merged).await?;
        }
        let saved = self
            .store
            .replace(kind, id, merged)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{kind} {id}")))?;
        let saved = self.expand(kind, saved).await?;
        Ok(self.saved_response(StatusCode::OK, kind, Mutation::Updated, saved))
    }

    async fn delete(&self, resource: &str, id: &str) -> AppResult<Response> {
        let kind = resolve_kind(resource)?;
        let id = parse_id(id)?;
        tracing::debug!(%kind, id, "REST request to delete");
        if !self.store.delete(kind, id).await? {
            return Err(AppError::NotFound(format!("{kind} {id}")));
        }
        let headers: HeaderMap =
            entity_alert(&self.app_name, Mutation::Deleted, kind.entity_name(), &id.to_string());
        Ok((StatusCode::NO_CONTENT, headers).into_response())
    }
}

fn entity_of(resource: &str) -> &'static str {
    EntityKind::from_resource(resource).map_or("", EntityKind::entity_name)
}

async fn handle_list(
    State(state): State<Arc<SiteState>>,
    Path(resource): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let outcome = state.list(&resource, query.as_deref()).await;
    state.respond(entity_of(&resource), outcome)
}

async fn handle_detail(
    State(state): State<Arc<SiteState>>,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    let outcome = state.detail(&resource, &id).await;
    state.respond(entity_of(&resource), outcome)
}

async fn handle_create(
    State(state): State<Arc<SiteState>>,
    Path(resource): Path<String>,
    body: Bytes,
) -> Response {
    let outcome = state.create(&resource, &body).await;
    state.respond(entity_of(&resource), outcome)
}

async fn handle_update(
    State(state): State<Arc<SiteState>>,
    Path((resource, id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let outcome = state.update(&resource, &id, &body).await;
    state.respond(entity_of(&resource), outcome)
}

async fn handle_partial_update(
    State(state): State<Arc<SiteState>>,
    Path((resource, id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let outcome = state.partial_update(&resource, &id, &body).await;
    state.respond(entity_of(&resource), outcome)
}

async fn handle_delete(
    State(state): State<Arc<SiteState>>,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    let outcome = state.delete(&resource, &id).await;
    state.respond(entity_of(&resource), outcome)
}
