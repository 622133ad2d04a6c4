//! Core library for frontdesk, the hotel administration console.
//!
//! The session pipeline: structural token validation, a persisted session
//! store, an authorized HTTP transport shared by every backend resource, the
//! route guard in front of protected views, and the login/logout gateway.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod routes;

pub use api::{ApiError, AuthorizedTransport, Resource};
pub use auth::{AuthGateway, SessionData, SessionStore};
pub use config::Config;
pub use context::AppContext;
pub use guard::{Access, Rendered, RouteGuard};
pub use navigation::{Navigation, Navigator, RecordingNavigator, LOGIN_ROUTE};
