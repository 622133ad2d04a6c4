use serde::{Deserialize, Serialize};

/// Headline figures shown on the dashboard. The backend pre-formats them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct KpiValues {
    pub reservations_count: String,
    pub ocupation_count: String,
    pub month_summary: String,
    pub pending_invoices: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct KpiResponse {
    pub status: u16,
    #[serde(default)]
    pub message: String,
    pub data: KpiValues,
}
