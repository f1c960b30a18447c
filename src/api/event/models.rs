use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Payload for booking an event against a job
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookEventPayload {
    pub job_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
