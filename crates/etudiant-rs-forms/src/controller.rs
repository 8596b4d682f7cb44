//! The update controller shared by every kind's edit screen.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use etudiant_rs_client::CollectionApi;
use etudiant_rs_core::{AppResult, ValidationError};
use etudiant_rs_model::Entity;
use etudiant_rs_routing::Navigator;

use crate::form::{EditForm, FormData};

/// Where an edit screen is in its life.
///
/// `LoadingReferences -> Ready -> Saving -> Saved`, or back to `Ready` when
/// a save fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormState {
    LoadingReferences,
    Ready,
    Saving,
    Saved,
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LoadingReferences => "loading-references",
            Self::Ready => "ready",
            Self::Saving => "saving",
            Self::Saved => "saved",
        })
    }
}

/// Drives one edit screen: shows a record, saves it, and navigates back.
///
/// `save` takes `&mut self`, so a second save cannot start while one is in
/// flight.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use etudiant_rs_client::CollectionService;
/// use etudiant_rs_forms::{CountryForm, UpdateController};
/// use etudiant_rs_model::Country;
/// use etudiant_rs_routing::History;
///
/// # async fn demo() -> etudiant_rs_core::AppResult<()> {
/// let service = Arc::new(CollectionService::<Country>::over_http("http://127.0.0.1:8080"));
/// let mut controller = UpdateController::<CountryForm>::new(service, Arc::new(History::new()));
/// controller.activate(&Country::new().name("Mali"));
/// let saved = controller.save().await?;
/// assert!(saved.id.is_some());
/// # Ok(())
/// # }
/// ```
pub struct UpdateController<F: EditForm> {
    form: F,
    service: Arc<dyn CollectionApi<F::Record>>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<FormState>,
}

impl<F: EditForm> fmt::Debug for UpdateController<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateController")
            .field("kind", &<F::Record as Entity>::KIND)
            .field("form", &self.form)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<F: EditForm> UpdateController<F> {
    /// Creates an inactive controller.
    pub fn new(service: Arc<dyn CollectionApi<F::Record>>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(FormState::LoadingReferences);
        Self {
            form: F::default(),
            service,
            navigator,
            state,
        }
    }

    /// Shows `record` and becomes ready to save.
    pub fn activate(&mut self, record: &F::Record) {
        self.update_form(record);
        self.set_state(FormState::Ready);
    }

    /// Resets the form when the screen goes away.
    pub fn deactivate(&mut self) {
        self.form = F::default();
        self.set_state(FormState::LoadingReferences);
    }

    /// Copies `record` onto the form.
    pub fn update_form(&mut self, record: &F::Record) {
        self.form.patch_from(record);
    }

    pub const fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    /// Applies user-typed values to the form.
    pub fn bind(&mut self, data: &FormData) -> Result<(), ValidationError> {
        self.form.bind(data)
    }

    pub fn state(&self) -> FormState {
        *self.state.borrow()
    }

    /// Watches state changes.
    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    /// `true` from the start of a save until it completes.
    pub fn is_saving(&self) -> bool {
        self.state() == FormState::Saving
    }

    /// Leaves the screen without saving.
    pub fn previous_state(&self) {
        self.navigator.previous_state();
    }

    /// Saves the form: an update when the record has an identifier, a create
    /// otherwise.
    ///
    /// On success the saved record is returned and the navigator is sent back
    /// once. On failure the form is left as it was, the controller returns to
    /// [`FormState::Ready`] and the error is handed to the caller.
    pub async fn save(&mut self) -> AppResult<F::Record> {
        self.set_state(FormState::Saving);
        let record = self.form.to_record();
        let kind = <F::Record as Entity>::KIND;

        let result = match record.id() {
            Some(id) => {
                tracing::debug!(%kind, id, "saving existing record");
                self.service.update(&record).await
            }
            None => {
                tracing::debug!(%kind, "saving new record");
                self.service.create(&record).await
            }
        };

        match result {
            Ok(saved) => {
                self.set_state(FormState::Saved);
                tracing::info!(%kind, id = ?saved.id(), "save succeeded");
                self.navigator.previous_state();
                Ok(saved)
            }
            Err(err) => {
                self.set_state(FormState::Ready);
                tracing::warn!(%kind, error = %err, "save failed");
                Err(err)
            }
        }
    }

    pub(crate) fn set_state(&self, state: FormState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            tracing::trace!(from = %previous, to = %state, "form state");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, OnceLock};

    use async_trait::async_trait;

    use etudiant_rs_client::{Page, QueryCriteria};
    use etudiant_rs_core::AppError;
    use etudiant_rs_model::{Country, Id};

    use super::*;
    use crate::form::CountryForm;

    #[derive(Default)]
    struct CountingNavigator(AtomicUsize);

    impl CountingNavigator {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl Navigator for CountingNavigator {
        fn previous_state(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Records which operation ran and the state seen while it ran.
    #[derive(Default)]
    struct ProbeService {
        fail: bool,
        calls: Mutex<Vec<&'static str>>,
        seen: Mutex<Vec<FormState>>,
        probe: OnceLock<watch::Receiver<FormState>>,
    }

    impl ProbeService {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
            if let Some(rx) = self.probe.get() {
                self.seen.lock().unwrap().push(*rx.borrow());
            }
        }

        fn reply(&self, record: &Country, id: Id) -> AppResult<Country> {
            if self.fail {
                return Err(AppError::Transport("connection reset".into()));
            }
            let mut saved = record.clone();
            saved.id = Some(id);
            Ok(saved)
        }
    }

    #[async_trait]
    impl CollectionApi<Country> for ProbeService {
        async fn query(&self, _criteria: &QueryCriteria) -> AppResult<Page<Country>> {
            Ok(Page::from_items(Vec::new()))
        }

        async fn find(&self, id: Id) -> AppResult<Country> {
            Ok(Country::with_id(id))
        }

        async fn create(&self, record: &Country) -> AppResult<Country> {
            self.record("create");
            self.reply(record, 100)
        }

        async fn update(&self, record: &Country) -> AppResult<Country> {
            self.record("update");
            let id = record.id.unwrap_or_default();
            self.reply(record, id)
        }

        async fn partial_update(&self, record: &Country) -> AppResult<Country> {
            self.record("partial_update");
            self.reply(record, record.id.unwrap_or_default())
        }

        async fn delete(&self, _id: Id) -> AppResult<()> {
            Ok(())
        }
    }

    fn controller(
        fail: bool,
    ) -> (UpdateController<CountryForm>, Arc<ProbeService>, Arc<CountingNavigator>) {
        let service = Arc::new(ProbeService {
            fail,
            ..ProbeService::default()
        });
        let navigator = Arc::new(CountingNavigator::default());
        let controller = UpdateController::new(service.clone(), navigator.clone());
        let _ = service.probe.set(controller.subscribe());
        (controller, service, navigator)
    }

    #[tokio::test]
    async fn test_save_with_id_updates() {
        let (mut controller, service, navigator) = controller(false);
        controller.activate(&Country::with_id(123).name("Mali"));

        let saved = controller.save().await.unwrap();

        assert_eq!(saved.id, Some(123));
        assert_eq!(*service.calls.lock().unwrap(), vec!["update"]);
        assert_eq!(*service.seen.lock().unwrap(), vec![FormState::Saving]);
        assert!(!controller.is_saving());
        assert_eq!(controller.state(), FormState::Saved);
        assert_eq!(navigator.count(), 1);
    }

    #[tokio::test]
    async fn test_save_without_id_creates() {
        let (mut controller, service, navigator) = controller(false);
        controller.activate(&Country::new());
        controller
            .bind(&[("nomPays".to_string(), "Tchad".to_string())].into())
            .unwrap();

        let saved = controller.save().await.unwrap();

        assert_eq!(saved.name.as_deref(), Some("Tchad"));
        assert_eq!(*service.calls.lock().unwrap(), vec!["create"]);
        assert_eq!(*service.seen.lock().unwrap(), vec![FormState::Saving]);
        assert!(!controller.is_saving());
        assert_eq!(navigator.count(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_form_and_stays() {
        let (mut controller, _service, navigator) = controller(true);
        controller.activate(&Country::with_id(9).name("Niger"));

        let err = controller.save().await.unwrap_err();

        assert!(err.is_transport());
        assert!(!controller.is_saving());
        assert_eq!(controller.state(), FormState::Ready);
        assert_eq!(navigator.count(), 0);
        assert_eq!(controller.form().name.as_deref(), Some("Niger"));
    }

    #[tokio::test]
    async fn test_state_settles_once_after_save() {
        let (mut controller, _service, _navigator) = controller(false);
        let mut rx = controller.subscribe();
        controller.activate(&Country::new());
        let _ = rx.borrow_and_update();

        controller.save().await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), FormState::Saved);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_lifecycle_states() {
        let (mut controller, _service, navigator) = controller(false);
        assert_eq!(controller.state(), FormState::LoadingReferences);
        controller.activate(&Country::with_id(1).name("Benin"));
        assert_eq!(controller.state(), FormState::Ready);
        assert_eq!(controller.form().id, Some(1));

        controller.previous_state();
        assert_eq!(navigator.count(), 1);

        controller.deactivate();
        assert_eq!(controller.form(), &CountryForm::default());
        assert_eq!(controller.state(), FormState::LoadingReferences);
    }
}
