//! Resolves the record a form or detail screen works on.

use std::sync::Arc;

use etudiant_rs_client::CollectionApi;
use etudiant_rs_core::{AppError, AppResult};
use etudiant_rs_model::Entity;

use crate::route::{Route, Screen};

/// Supplies the record for a screen before its controller is activated.
///
/// `Create` yields a blank record. `View` and `Edit` fetch by identifier;
/// a missing record surfaces as the service's not-found error.
pub struct RecordResolver<E: Entity> {
    service: Arc<dyn CollectionApi<E>>,
}

impl<E: Entity> Clone for RecordResolver<E> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<E: Entity> RecordResolver<E> {
    pub fn new(service: Arc<dyn CollectionApi<E>>) -> Self {
        Self { service }
    }

    /// Resolves the record for `screen`.
    pub async fn resolve(&self, screen: Screen) -> AppResult<E> {
        match screen {
            Screen::Create => Ok(E::default()),
            Screen::View(id) | Screen::Edit(id) => {
                tracing::debug!(kind = %E::KIND, id, "resolving record");
                self.service.find(id).await
            }
            Screen::List => Err(AppError::InvalidRoute(format!(
                "the {} list screen has no single record",
                E::KIND
            ))),
        }
    }

    /// Resolves the record for `route`, which must address this kind.
    pub async fn resolve_route(&self, route: &Route) -> AppResult<E> {
        if route.kind != E::KIND {
            return Err(AppError::InvalidRoute(format!(
                "route {route} does not address {}",
                E::KIND
            )));
        }
        self.resolve(route.screen).await
    }
}
