use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Room {
    pub room_id: i64,
    pub room_number: String,
    pub room_type: String,
    pub price: f64,
    pub is_available: bool,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    pub site_url: Option<String>,
    pub hotel_id: i64,
}

impl Room {
    pub fn availability(&self) -> &'static str {
        if self.is_available {
            "available"
        } else {
            "occupied"
        }
    }
}
