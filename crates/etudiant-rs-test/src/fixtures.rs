//! An in-memory backend wired to typed services, plus sample records.

use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;
use serde_json::json;

use etudiant_rs_client::{CollectionApi, CollectionService, Transport};
use etudiant_rs_core::{AppError, AppResult};
use etudiant_rs_forms::{FormData, StudentUpdateController};
use etudiant_rs_model::{Country, Entity, EntityKind, FieldOfStudy, Level, Student};
use etudiant_rs_routing::Navigator;
use etudiant_rs_server::{ApiSite, InMemoryStore, RecordStore};

use crate::recording::RecordingTransport;
use crate::router_transport::RouterTransport;

/// Application name used by the fixture backend's alert headers.
pub const APP_NAME: &str = "etudiantetranger";

/// The reference backend over an [`InMemoryStore`], reachable through a
/// [`RecordingTransport`].
///
/// Seeding goes straight to the store and is not recorded.
#[derive(Debug, Clone)]
pub struct TestApp {
    store: InMemoryStore,
    router: Router,
    transport: Arc<RecordingTransport<RouterTransport>>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let router = ApiSite::new(APP_NAME)
            .store(Arc::new(store.clone()))
            .into_axum_router();
        let transport = Arc::new(RecordingTransport::new(RouterTransport::new(router.clone())));
        Self {
            store,
            router,
            transport,
        }
    }

    pub const fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// The backend router, e.g. for [`LiveServer`](crate::LiveServer).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn transport(&self) -> &RecordingTransport<RouterTransport> {
        &self.transport
    }

    pub fn service<E: Entity>(&self) -> CollectionService<E> {
        let transport: Arc<dyn Transport> = self.transport.clone();
        CollectionService::new(transport)
    }

    pub fn api<E: Entity>(&self) -> Arc<dyn CollectionApi<E>> {
        Arc::new(self.service::<E>())
    }

    /// A student controller over this backend.
    pub fn student_controller(&self, navigator: Arc<dyn Navigator>) -> StudentUpdateController {
        StudentUpdateController::new(
            self.api::<Student>(),
            self.api::<Level>(),
            self.api::<FieldOfStudy>(),
            self.api::<Country>(),
            navigator,
        )
    }

    /// Inserts `record` directly into the store.
    pub async fn seed<E: Entity>(&self, record: &E) -> AppResult<E> {
        let value = serde_json::to_value(record).map_err(|e| AppError::Serialization(e.to_string()))?;
        let stored = self.store.insert(E::KIND, value).await?;
        serde_json::from_value(stored).map_err(|e| AppError::Serialization(e.to_string()))
    }

    pub async fn seed_country(&self, name: &str) -> AppResult<Country> {
        self.seed(&Country::new().name(name)).await
    }

    pub async fn seed_level(&self, name: &str) -> AppResult<Level> {
        self.seed(&Level::new().name(name)).await
    }

    pub async fn seed_field_of_study(&self, name: &str) -> AppResult<FieldOfStudy> {
        self.seed(&FieldOfStudy::new().name(name)).await
    }

    /// Inserts `count` countries named `Pays 0`, `Pays 1`, ...
    pub async fn seed_countries(&self, count: usize) -> AppResult<Vec<Country>> {
        let mut seeded = Vec::with_capacity(count);
        for i in 0..count {
            seeded.push(self.seed_country(&format!("Pays {i}")).await?);
        }
        Ok(seeded)
    }

    /// Number of stored records of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.store.count(kind)
    }
}

/// The form values of the sample student.
pub fn sample_student_form() -> FormData {
    [
        ("nom", "open-source ADP RAM"),
        ("prenom", "Generic"),
        ("matricule", "83638"),
        ("date", "2023-04-15"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// The sample student as a record pending its first save.
pub fn sample_student() -> Student {
    Student {
        last_name: Some("open-source ADP RAM".to_string()),
        first_name: Some("Generic".to_string()),
        registration_number: Some(83638),
        enrollment_date: NaiveDate::from_ymd_opt(2023, 4, 15),
        ..Student::default()
    }
}

/// The wire body of [`sample_student`].
pub fn sample_student_json() -> serde_json::Value {
    json!({
        "nom": "open-source ADP RAM",
        "prenom": "Generic",
        "matricule": 83638,
        "date": "2023-04-15"
    })
}
