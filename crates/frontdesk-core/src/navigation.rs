//! Navigation requests issued by the session pipeline.
//!
//! The core never renders anything; it tells the front end where to go and
//! how. A rejected credential forces a full reload of the login view, while
//! the route guard only swaps the current history entry.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Path of the public login view
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Replace the current history entry without reloading.
    Replace(String),
    /// Hard navigation: discard in-memory view state and load the route fresh,
    /// replacing the current history entry.
    Reload(String),
}

impl Navigation {
    pub fn route(&self) -> &str {
        match self {
            Navigation::Replace(route) | Navigation::Reload(route) => route,
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Navigation);
}

/// Keeps every navigation request so the front end can act on them after a
/// call returns.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<Navigation> {
        self.visits.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drain recorded navigations.
    pub fn take(&self) -> Vec<Navigation> {
        std::mem::take(&mut *self.visits.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Whether a forced navigation to the login view was requested.
    pub fn forced_login(&self) -> bool {
        self.visits()
            .iter()
            .any(|nav| matches!(nav, Navigation::Reload(route) if route == LOGIN_ROUTE))
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, to: Navigation) {
        debug!(?to, "Navigation requested");
        self.visits.lock().unwrap_or_else(PoisonError::into_inner).push(to);
    }
}
