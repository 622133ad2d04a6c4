//! Plain-text rendering of backend records.

use anyhow::Result;
use frontdesk_core::models::{Hotel, KpiValues, Reservation, ReservationStatus, Room};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_hotels(hotels: &[Hotel]) {
    if hotels.is_empty() {
        println!("No hotels.");
    }
    for hotel in hotels {
        println!("{:>5}  {:<30}  {}", hotel.hotel_id, hotel.hotel_name, hotel.location());
    }
}

pub fn print_rooms(rooms: &[Room]) {
    if rooms.is_empty() {
        println!("No rooms.");
    }
    for room in rooms {
        println!(
            "{:>6}  {:<14}  {:>9.2}  {}",
            room.room_number,
            room.room_type,
            room.price,
            room.availability()
        );
    }
}

pub fn print_reservations(reservations: &[Reservation]) {
    if reservations.is_empty() {
        println!("No reservations.");
    }
    for r in reservations {
        let nights = r
            .nights()
            .map(|n| format!("{} nights", n))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12}  room {:<6}  {} → {}  {:>10}  {:>10.2}",
            r.reservation_number,
            r.room_number.as_deref().unwrap_or("?"),
            day(&r.check_in),
            day(&r.check_out),
            nights,
            r.total
        );
    }
}

pub fn print_statuses(statuses: &[ReservationStatus]) {
    for status in statuses {
        println!("{:>3}  {}", status.reservation_status_id, status.reservation_status_nm);
    }
}

pub fn print_kpis(kpis: &KpiValues) {
    println!("Reservations:     {}", kpis.reservations_count);
    println!("Occupancy:        {}", kpis.ocupation_count);
    println!("Month summary:    {}", kpis.month_summary);
    println!("Pending invoices: {}", kpis.pending_invoices);
}

/// Date part of an ISO timestamp
fn day(value: &str) -> &str {
    value.get(..10).unwrap_or(value)
}
