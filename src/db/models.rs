use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database representation of a job with all fields
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub address: Option<String>,
    pub status: String,
    pub additional_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scheduled time window bound to a job.
///
/// `calendar_entry_id` holds the external calendar entry created for this
/// event on first push; while present, calendar sync updates that entry
/// instead of inserting a new one.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow {
    pub id: i64,
    pub job_id: i64,
    #[serde(rename = "start")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "end")]
    pub end_time: DateTime<Utc>,
    pub calendar_entry_id: Option<String>,
}

/// A captured inbox message.
///
/// `message_id` is the transport-level identifier and is unique; ingesting
/// the same message twice stores a single row. `processed` flips to true
/// once extraction has produced a job from this email.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRow {
    pub id: i64,
    pub message_id: String,
    pub subject: String,
    pub sender: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
    pub processed: bool,
}

/// Single-row user profile backing GET/PUT /api/user
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
}
