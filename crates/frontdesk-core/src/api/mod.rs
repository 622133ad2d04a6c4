//! REST client for the hotel backend.
//!
//! This module provides the `AuthorizedTransport`, which attaches the
//! session's bearer credential to every request and ends the session when
//! the backend rejects it, and typed `Resource` handles for each endpoint
//! family (hotels, rooms, reservations, dashboard, users).

pub mod error;
pub mod resources;
pub mod transport;

pub use error::ApiError;
pub use transport::{AuthorizedTransport, Resource};
