//! Data models for the hotel backend.
//!
//! - `UserProfile`: the authenticated staff member held by the session
//! - `Hotel`, `Room`: property inventory
//! - `Reservation`, `ReservationStatus`: bookings and their states
//! - `KpiResponse`: dashboard figures

pub mod dashboard;
pub mod hotel;
pub mod reservation;
pub mod room;
pub mod user;

pub use dashboard::{KpiResponse, KpiValues};
pub use hotel::Hotel;
pub use reservation::{Reservation, ReservationStatus};
pub use room::Room;
pub use user::UserProfile;
