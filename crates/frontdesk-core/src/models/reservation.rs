use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Reservation {
    pub reservation_id: i64,
    pub reservation_number: String,
    pub user_id: i64,
    pub hotel_id: i64,
    pub room_id: i64,
    pub check_in: String,
    pub check_out: String,
    pub reservation_status_id: i64,
    /// The backend sends decimals either as numbers or as strings.
    #[serde(deserialize_with = "number_or_string")]
    pub total: f64,
    pub created_at: Option<String>,
    pub room_number: Option<String>,
    pub room_type: Option<String>,
    pub payment_method_nm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ReservationStatus {
    pub reservation_status_id: i64,
    pub reservation_status_nm: String,
    #[serde(default)]
    pub icon: String,
}

impl Reservation {
    /// Nights between check-in and check-out, if both dates parse.
    pub fn nights(&self) -> Option<i64> {
        let check_in = parse_day(&self.check_in)?;
        let check_out = parse_day(&self.check_out)?;
        Some((check_out - check_in).num_days())
    }
}

/// Accepts `2024-05-01` and full RFC 3339 timestamps.
fn parse_day(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    value
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(n) => Ok(n),
        Amount::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
