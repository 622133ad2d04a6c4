//! Typed handles for the console's backend resources.

use super::{ApiError, AuthorizedTransport, Resource};
use crate::models::{Hotel, KpiResponse, Reservation, ReservationStatus, Room, UserProfile};

pub const HOTELS: &str = "hotel";
pub const ROOMS: &str = "rooms";
pub const RESERVATIONS: &str = "reservation";
pub const RESERVATION_STATUSES: &str = "reservation-status";
pub const DASHBOARD: &str = "dashboard";
pub const USERS: &str = "users";

impl AuthorizedTransport {
    pub fn hotels(&self) -> Resource<Hotel> {
        self.resource(HOTELS)
    }

    pub fn rooms(&self) -> Resource<Room> {
        self.resource(ROOMS)
    }

    pub fn reservations(&self) -> Resource<Reservation> {
        self.resource(RESERVATIONS)
    }

    pub fn reservation_statuses(&self) -> Resource<ReservationStatus> {
        self.resource(RESERVATION_STATUSES)
    }

    pub fn users(&self) -> Resource<UserProfile> {
        self.resource(USERS)
    }

    /// Most recent reservations for the dashboard history panel
    pub async fn last_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.reservations().get_path("last-reservations").await
    }

    pub async fn kpi_values(&self) -> Result<KpiResponse, ApiError> {
        self.resource::<KpiResponse>(DASHBOARD)
            .get_path("kpi-values")
            .await
    }
}
