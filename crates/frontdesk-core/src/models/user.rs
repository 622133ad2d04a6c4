use serde::{Deserialize, Serialize};

/// The authenticated staff member.
///
/// The backend reports users as `user_id`/`user_nm`/`role_id`/`is_active`;
/// those names are accepted on input while the persisted session uses the
/// console's own field names. The backend's password hash is never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    #[serde(alias = "user_id")]
    pub id: i64,
    #[serde(rename = "displayName", alias = "user_nm")]
    pub display_name: String,
    pub email: String,
    #[serde(alias = "role_id")]
    pub role: i64,
    #[serde(alias = "is_active")]
    pub active: bool,
}

impl UserProfile {
    pub fn label(&self) -> String {
        if self.display_name.is_empty() {
            self.email.clone()
        } else {
            format!("{} <{}>", self.display_name, self.email)
        }
    }
}
