//! The student edit screen's controller.
//!
//! A student points at a level, a field of study and a country. Each
//! selection widget is fed from a shared collection holding the first page
//! of that kind plus the record's current reference, so the current choice
//! is always selectable even when it falls outside that page.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use etudiant_rs_client::{CollectionApi, Page, QueryCriteria};
use etudiant_rs_core::{AppError, AppResult, ValidationError};
use etudiant_rs_model::{add_to_collection_if_missing, Country, Entity, FieldOfStudy, Id, Level, Student};
use etudiant_rs_routing::Navigator;

use crate::controller::{FormState, UpdateController};
use crate::form::FormData;
use crate::student_form::StudentForm;

/// Identity of an option row: the record's identifier, whatever its position.
pub fn track_by_id<E: Entity>(_index: usize, item: &E) -> Option<Id> {
    item.id()
}

/// [`UpdateController`] for students, with reference options.
pub struct StudentUpdateController {
    inner: UpdateController<StudentForm>,
    levels: Arc<dyn CollectionApi<Level>>,
    fields_of_study: Arc<dyn CollectionApi<FieldOfStudy>>,
    countries: Arc<dyn CollectionApi<Country>>,
    levels_shared_collection: Vec<Level>,
    fields_of_study_shared_collection: Vec<FieldOfStudy>,
    countries_shared_collection: Vec<Country>,
}

impl fmt::Debug for StudentUpdateController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudentUpdateController")
            .field("inner", &self.inner)
            .field("levels", &self.levels_shared_collection.len())
            .field("fields_of_study", &self.fields_of_study_shared_collection.len())
            .field("countries", &self.countries_shared_collection.len())
            .finish_non_exhaustive()
    }
}

impl StudentUpdateController {
    pub fn new(
        students: Arc<dyn CollectionApi<Student>>,
        levels: Arc<dyn CollectionApi<Level>>,
        fields_of_study: Arc<dyn CollectionApi<FieldOfStudy>>,
        countries: Arc<dyn CollectionApi<Country>>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: UpdateController::new(students, navigator),
            levels,
            fields_of_study,
            countries,
            levels_shared_collection: Vec::new(),
            fields_of_study_shared_collection: Vec::new(),
            countries_shared_collection: Vec::new(),
        }
    }

    /// Shows `student` and loads the reference options.
    ///
    /// The three option queries run concurrently and each one lands
    /// independently. If any fails, the options of the others are still
    /// updated, the failed one keeps its previous content, and the first
    /// failure is returned. The controller is ready to save either way.
    pub async fn activate(&mut self, student: &Student) -> AppResult<()> {
        self.inner.set_state(FormState::LoadingReferences);
        self.update_form(student);
        let loaded = self.load_relationships_options().await;
        self.inner.set_state(FormState::Ready);
        loaded
    }

    /// Resets the form and drops the options.
    pub fn deactivate(&mut self) {
        self.inner.deactivate();
        self.levels_shared_collection.clear();
        self.fields_of_study_shared_collection.clear();
        self.countries_shared_collection.clear();
    }

    /// Copies `student` onto the form and makes its references selectable.
    pub fn update_form(&mut self, student: &Student) {
        self.inner.update_form(student);
        self.levels_shared_collection = add_to_collection_if_missing(
            std::mem::take(&mut self.levels_shared_collection),
            [student.level.clone()],
        );
        self.fields_of_study_shared_collection = add_to_collection_if_missing(
            std::mem::take(&mut self.fields_of_study_shared_collection),
            [student.field_of_study.clone()],
        );
        self.countries_shared_collection = add_to_collection_if_missing(
            std::mem::take(&mut self.countries_shared_collection),
            [student.country.clone()],
        );
    }

    /// Fetches the first page of each reference kind.
    pub async fn load_relationships_options(&mut self) -> AppResult<()> {
        let criteria = QueryCriteria::default();
        let (levels, fields_of_study, countries) = tokio::join!(
            self.levels.query(&criteria),
            self.fields_of_study.query(&criteria),
            self.countries.query(&criteria),
        );

        let form = self.inner.form();
        let mut first_error = None;
        land(
            self.levels.as_ref(),
            levels,
            form.level.clone(),
            &mut self.levels_shared_collection,
            &mut first_error,
        );
        land(
            self.fields_of_study.as_ref(),
            fields_of_study,
            form.field_of_study.clone(),
            &mut self.fields_of_study_shared_collection,
            &mut first_error,
        );
        land(
            self.countries.as_ref(),
            countries,
            form.country.clone(),
            &mut self.countries_shared_collection,
            &mut first_error,
        );

        first_error.map_or(Ok(()), Err)
    }

    pub fn levels_shared_collection(&self) -> &[Level] {
        &self.levels_shared_collection
    }

    pub fn fields_of_study_shared_collection(&self) -> &[FieldOfStudy] {
        &self.fields_of_study_shared_collection
    }

    pub fn countries_shared_collection(&self) -> &[Country] {
        &self.countries_shared_collection
    }

    /// Picks the level with this identifier among the options, or clears it.
    pub fn select_level(&mut self, id: Option<Id>) -> AppResult<()> {
        let level = pick(&self.levels_shared_collection, id)?;
        self.inner.form_mut().level = level;
        Ok(())
    }

    /// Picks the field of study with this identifier among the options, or
    /// clears it.
    pub fn select_field_of_study(&mut self, id: Option<Id>) -> AppResult<()> {
        let field = pick(&self.fields_of_study_shared_collection, id)?;
        self.inner.form_mut().field_of_study = field;
        Ok(())
    }

    /// Picks the country with this identifier among the options, or clears it.
    pub fn select_country(&mut self, id: Option<Id>) -> AppResult<()> {
        let country = pick(&self.countries_shared_collection, id)?;
        self.inner.form_mut().country = country;
        Ok(())
    }

    pub fn track_level_by_id(&self, index: usize, item: &Level) -> Option<Id> {
        track_by_id(index, item)
    }

    pub fn track_field_of_study_by_id(&self, index: usize, item: &FieldOfStudy) -> Option<Id> {
        track_by_id(index, item)
    }

    pub fn track_country_by_id(&self, index: usize, item: &Country) -> Option<Id> {
        track_by_id(index, item)
    }

    pub const fn form(&self) -> &StudentForm {
        self.inner.form()
    }

    pub fn form_mut(&mut self) -> &mut StudentForm {
        self.inner.form_mut()
    }

    pub fn bind(&mut self, data: &FormData) -> Result<(), ValidationError> {
        self.inner.bind(data)
    }

    pub fn state(&self) -> FormState {
        self.inner.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.inner.subscribe()
    }

    pub fn is_saving(&self) -> bool {
        self.inner.is_saving()
    }

    pub fn previous_state(&self) {
        self.inner.previous_state();
    }

    /// See [`UpdateController::save`].
    pub async fn save(&mut self) -> AppResult<Student> {
        self.inner.save().await
    }
}

fn land<E: Entity>(
    service: &dyn CollectionApi<E>,
    result: AppResult<Page<E>>,
    current: Option<E>,
    options: &mut Vec<E>,
    first_error: &mut Option<AppError>,
) {
    match result {
        Ok(page) => {
            *options = service.add_to_collection_if_missing(page.items, vec![current]);
        }
        Err(err) => {
            tracing::warn!(kind = %E::KIND, error = %err, "could not load options");
            first_error.get_or_insert(err);
        }
    }
}

fn pick<E: Entity>(options: &[E], id: Option<Id>) -> AppResult<Option<E>> {
    let Some(id) = id else { return Ok(None) };
    options
        .iter()
        .find(|option| option.id() == Some(id))
        .cloned()
        .map(Some)
        .ok_or_else(|| {
            AppError::Validation(
                ValidationError::new(format!("no {} option with id {id}", E::KIND), "idnotfound")
                    .with_entity(E::KIND.entity_name()),
            )
        })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;

    #[derive(Default)]
    struct CountingNavigator(AtomicUsize);

    impl Navigator for CountingNavigator {
        fn previous_state(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// A kind's collection held in memory. Queries take a little while so
    /// that concurrent loading is observable.
    struct MemoryApi<E> {
        items: Mutex<Vec<E>>,
        fail_queries: bool,
        calls: Mutex<Vec<&'static str>>,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl<E: Entity> MemoryApi<E> {
        fn with(items: Vec<E>, gauge: &(Arc<AtomicUsize>, Arc<AtomicUsize>)) -> Arc<Self> {
            Arc::new(Self {
                items: Mutex::new(items),
                fail_queries: false,
                calls: Mutex::new(Vec::new()),
                in_flight: gauge.0.clone(),
                peak: gauge.1.clone(),
            })
        }

        fn failing(gauge: &(Arc<AtomicUsize>, Arc<AtomicUsize>)) -> Arc<Self> {
            Arc::new(Self {
                items: Mutex::new(Vec::new()),
                fail_queries: true,
                calls: Mutex::new(Vec::new()),
                in_flight: gauge.0.clone(),
                peak: gauge.1.clone(),
            })
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<E: Entity> CollectionApi<E> for MemoryApi<E> {
        async fn query(&self, _criteria: &QueryCriteria) -> AppResult<Page<E>> {
            self.calls.lock().unwrap().push("query");
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.fail_queries {
                return Err(AppError::Transport("unreachable".into()));
            }
            Ok(Page::from_items(self.items.lock().unwrap().clone()))
        }

        async fn find(&self, id: Id) -> AppResult<E> {
            self.items
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.id() == Some(id))
                .cloned()
                .ok_or_else(|| AppError::NotFound(id.to_string()))
        }

        async fn create(&self, record: &E) -> AppResult<E> {
            self.calls.lock().unwrap().push("create");
            let mut items = self.items.lock().unwrap();
            let mut saved = record.clone();
            saved.set_id(Some(1000 + items.len() as Id));
            items.push(saved.clone());
            Ok(saved)
        }

        async fn update(&self, record: &E) -> AppResult<E> {
            self.calls.lock().unwrap().push("update");
            Ok(record.clone())
        }

        async fn partial_update(&self, record: &E) -> AppResult<E> {
            Ok(record.clone())
        }

        async fn delete(&self, _id: Id) -> AppResult<()> {
            Ok(())
        }
    }

    struct Fixture {
        students: Arc<MemoryApi<Student>>,
        levels: Arc<MemoryApi<Level>>,
        fields: Arc<MemoryApi<FieldOfStudy>>,
        countries: Arc<MemoryApi<Country>>,
        navigator: Arc<CountingNavigator>,
        peak: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn new(countries_fail: bool) -> Self {
            let gauge = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
            Self {
                students: MemoryApi::with(Vec::new(), &gauge),
                levels: MemoryApi::with(vec![Level::with_id(6802).name("Licence")], &gauge),
                fields: MemoryApi::with(vec![FieldOfStudy::with_id(1).name("Droit")], &gauge),
                countries: if countries_fail {
                    MemoryApi::failing(&gauge)
                } else {
                    MemoryApi::with(vec![Country::with_id(7).name("Comores")], &gauge)
                },
                navigator: Arc::new(CountingNavigator::default()),
                peak: gauge.1,
            }
        }

        fn controller(&self) -> StudentUpdateController {
            StudentUpdateController::new(
                self.students.clone(),
                self.levels.clone(),
                self.fields.clone(),
                self.countries.clone(),
                self.navigator.clone(),
            )
        }
    }

    #[tokio::test]
    async fn test_activate_populates_options_with_current_references() {
        let fixture = Fixture::new(false);
        let mut controller = fixture.controller();
        let student = Student::with_id(456)
            .level(Level::with_id(39467))
            .field_of_study(FieldOfStudy::with_id(1))
            .country(Country::with_id(55474));

        controller.activate(&student).await.unwrap();

        let level_ids: Vec<_> = controller.levels_shared_collection().iter().map(|l| l.id).collect();
        assert_eq!(level_ids, vec![Some(39467), Some(6802)]);
        assert_eq!(controller.fields_of_study_shared_collection().len(), 1);
        let country_ids: Vec<_> = controller.countries_shared_collection().iter().map(|c| c.id).collect();
        assert_eq!(country_ids, vec![Some(55474), Some(7)]);
        assert_eq!(controller.form().id, Some(456));
        assert_eq!(controller.state(), FormState::Ready);
        assert_eq!(fixture.levels.calls(), vec!["query"]);
        assert_eq!(fixture.countries.calls(), vec!["query"]);
    }

    #[tokio::test]
    async fn test_option_queries_run_concurrently() {
        let fixture = Fixture::new(false);
        let mut controller = fixture.controller();
        controller.activate(&Student::new()).await.unwrap();
        assert_eq!(fixture.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_option_query_is_isolated() {
        let fixture = Fixture::new(true);
        let mut controller = fixture.controller();
        let student = Student::new().country(Country::with_id(3));

        let err = controller.activate(&student).await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(controller.levels_shared_collection().len(), 1);
        assert_eq!(controller.fields_of_study_shared_collection().len(), 1);
        let country_ids: Vec<_> = controller.countries_shared_collection().iter().map(|c| c.id).collect();
        assert_eq!(country_ids, vec![Some(3)]);
        assert_eq!(controller.state(), FormState::Ready);
    }

    #[tokio::test]
    async fn test_create_student_from_typed_values_and_selection() {
        let fixture = Fixture::new(false);
        let mut controller = fixture.controller();
        controller.activate(&Student::new()).await.unwrap();
        controller
            .bind(
                &[
                    ("nom", "open-source ADP RAM"),
                    ("prenom", "Generic"),
                    ("matricule", "83638"),
                    ("date", "2023-04-15"),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            )
            .unwrap();
        controller.select_country(Some(7)).unwrap();

        let saved = controller.save().await.unwrap();

        assert_eq!(saved.id, Some(1000));
        assert_eq!(saved.enrollment_date, NaiveDate::from_ymd_opt(2023, 4, 15));
        assert_eq!(saved.country_id(), Some(7));
        assert_eq!(fixture.students.calls(), vec!["create"]);
        assert_eq!(fixture.navigator.0.load(Ordering::SeqCst), 1);
        assert!(!controller.is_saving());
    }

    #[tokio::test]
    async fn test_edit_existing_student_updates() {
        let fixture = Fixture::new(false);
        let mut controller = fixture.controller();
        controller
            .activate(&Student::with_id(123).last_name("Rabe"))
            .await
            .unwrap();

        controller.save().await.unwrap();

        assert_eq!(fixture.students.calls(), vec!["update"]);
        assert_eq!(fixture.navigator.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_select_rejects_unknown_option() {
        let fixture = Fixture::new(false);
        let mut controller = fixture.controller();
        controller.activate(&Student::new()).await.unwrap();

        let err = controller.select_level(Some(42)).unwrap_err();
        assert!(err.is_validation());
        assert!(controller.form().level.is_none());

        controller.select_level(Some(6802)).unwrap();
        assert_eq!(controller.form().level.as_ref().and_then(|l| l.id), Some(6802));
        controller.select_level(None).unwrap();
        assert!(controller.form().level.is_none());
    }

    #[tokio::test]
    async fn test_deactivate_clears_options() {
        let fixture = Fixture::new(false);
        let mut controller = fixture.controller();
        controller.activate(&Student::new()).await.unwrap();
        controller.deactivate();
        assert!(controller.levels_shared_collection().is_empty());
        assert_eq!(controller.state(), FormState::LoadingReferences);
    }

    #[test]
    fn test_track_by_id_ignores_index() {
        let fixture = Fixture::new(false);
        let controller = fixture.controller();
        assert_eq!(controller.track_level_by_id(0, &Level::with_id(5)), Some(5));
        assert_eq!(controller.track_country_by_id(9, &Country::with_id(5)), Some(5));
        assert_eq!(
            controller.track_field_of_study_by_id(3, &FieldOfStudy::new()),
            None
        );
    }
}
