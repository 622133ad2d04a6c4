//! The console's route table.

use crate::guard::{Rendered, RouteGuard};
use crate::navigation::{Navigation, LOGIN_ROUTE};

pub const DASHBOARD_ROUTE: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
    Reservations,
    Rooms,
    Guests,
    Finances,
    Settings,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Dashboard => "Dashboard",
            View::Reservations => "Reservas",
            View::Rooms => "Habitaciones",
            View::Guests => "Huéspedes",
            View::Finances => "Finanzas",
            View::Settings => "Configuración",
        }
    }
}

/// Protected routes, all rendered behind the route guard
const PROTECTED: &[(&str, View)] = &[
    ("/dashboard", View::Dashboard),
    ("/dashboard/reservas", View::Reservations),
    ("/dashboard/habitaciones", View::Rooms),
    ("/dashboard/huespedes", View::Guests),
    ("/dashboard/finanzas", View::Finances),
    ("/dashboard/configuracion", View::Settings),
];

/// Resolve a path to the view it renders or the redirect it triggers.
///
/// The root only looks at the authenticated flag; protected routes go
/// through the full guard. Unknown paths fall back to the login view.
pub fn resolve(path: &str, guard: &RouteGuard) -> Rendered<View> {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    if path == "/" {
        let target = if guard.session().is_authenticated() {
            DASHBOARD_ROUTE
        } else {
            LOGIN_ROUTE
        };
        return Rendered::Redirect(Navigation::Replace(target.to_string()));
    }

    if path == LOGIN_ROUTE {
        return Rendered::View(View::Login);
    }

    match PROTECTED.iter().find(|(route, _)| *route == path) {
        Some((_, view)) => guard.render(|| *view),
        None => Rendered::Redirect(Navigation::Replace(LOGIN_ROUTE.to_string())),
    }
}
