use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryType {
        Gps => "gps",
        Qr => "qr",
        GpsQr => "gps_qr",
        Remote => "remote",
        // Entries imported or corrected by hand; never produced by start().
        Manual => "manual",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// Null while the entry is active (the user is clocked in).
    pub stop_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub entry_type: EntryType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_comment: Option<String>,
    pub stop_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTimeEntryInput {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub qr_code: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTimeEntryInput {
    pub pin_code: Option<String>,
    pub comment: Option<String>,
}

/// Durations aggregated over a user's closed entries.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSummary {
    pub total_seconds: i64,
    pub today_seconds: i64,
    pub week_seconds: i64,
    pub month_seconds: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub entries: i64,
    pub minutes: i64,
    pub hours: f64,
}

/// Company-wide aggregates for the manager dashboard.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStatistics {
    pub total_seconds: i64,
    pub active_entries: i64,
    pub active_employees: i64,
    pub today: PeriodStats,
    pub week: PeriodStats,
    pub month: PeriodStats,
}
