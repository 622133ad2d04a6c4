//! Access gate evaluated before a protected view renders.

use crate::auth::SessionStore;
use crate::navigation::{Navigation, LOGIN_ROUTE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(Navigation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<V> {
    View(V),
    Redirect(Navigation),
}

impl<V> Rendered<V> {
    pub fn view(self) -> Option<V> {
        match self {
            Rendered::View(view) => Some(view),
            Rendered::Redirect(_) => None,
        }
    }
}

/// Gate in front of the protected views.
///
/// Every evaluation re-validates the session: the credential can expire
/// between two renders, and validating may log the session out.
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionStore,
    login_route: String,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            login_route: LOGIN_ROUTE.to_string(),
        }
    }

    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Redirects replace the current history entry so "back" cannot return
    /// into the protected area.
    pub fn evaluate(&self) -> Access {
        if self.session.check_auth() {
            Access::Granted
        } else {
            Access::Redirect(Navigation::Replace(self.login_route.clone()))
        }
    }

    /// Render `view` only if the session is valid right now.
    pub fn render<V>(&self, view: impl FnOnce() -> V) -> Rendered<V> {
        match self.evaluate() {
            Access::Granted => Rendered::View(view()),
            Access::Redirect(to) => Rendered::Redirect(to),
        }
    }
}
