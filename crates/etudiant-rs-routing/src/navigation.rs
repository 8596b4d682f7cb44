//! Navigation back to the previous screen.

use std::sync::RwLock;

use crate::route::Route;

/// Returns the user to wherever they came from.
///
/// Form controllers call [`Navigator::previous_state`] exactly once after a
/// successful save and never after a failed one.
pub trait Navigator: Send + Sync {
    fn previous_state(&self);
}

/// A back stack of visited routes.
///
/// Going back from the first route leaves it in place, the way a browser
/// stays put when its history is exhausted.
#[derive(Debug, Default)]
pub struct History {
    stack: RwLock<Vec<Route>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a history at `route`.
    pub fn starting_at(route: Route) -> Self {
        Self {
            stack: RwLock::new(vec![route]),
        }
    }

    /// Pushes a route.
    pub fn navigate(&self, route: Route) {
        tracing::debug!(%route, "navigate");
        self.stack
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(route);
    }

    /// Pops the current route and returns the one now shown.
    pub fn back(&self) -> Option<Route> {
        let mut stack = self
            .stack
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if stack.len() > 1 {
            stack.pop();
        }
        let current = stack.last().copied();
        tracing::debug!(route = ?current, "back");
        current
    }

    /// The route currently shown.
    pub fn current(&self) -> Option<Route> {
        self.stack
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .last()
            .copied()
    }

    /// Number of routes on the stack.
    pub fn depth(&self) -> usize {
        self.stack
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl Navigator for History {
    fn previous_state(&self) {
        self.back();
    }
}
