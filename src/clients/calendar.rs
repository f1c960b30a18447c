//! Calendar service boundary: insert and update entries keyed by the
//! external entry id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from the calendar service.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A calendar entry as pushed to the external service.
#[derive(Debug, Clone)]
pub struct CalendarEntry {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub time_zone: String,
}

/// Trait for the calendar service.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Cheap availability probe, run once before a batch push so a full
    /// outage fails the batch before any entry is attempted.
    async fn check_available(&self) -> Result<(), CalendarError>;

    /// Insert a new entry and return its external id.
    async fn insert_entry(&self, entry: &CalendarEntry) -> Result<String, CalendarError>;

    /// Update an existing entry in place.
    async fn update_entry(&self, entry_id: &str, entry: &CalendarEntry)
        -> Result<(), CalendarError>;
}

/// Google Calendar v3 client.
pub struct GoogleCalendar {
    client: Client,
    base_url: String,
    token: String,
    calendar_id: String,
}

impl GoogleCalendar {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        calendar_id: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
            calendar_id: calendar_id.into(),
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, self.calendar_id)
    }
}

#[derive(Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    description: &'a str,
    start: EventTime<'a>,
    end: EventTime<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime<'a> {
    date_time: String,
    time_zone: &'a str,
}

#[derive(Deserialize)]
struct EventResource {
    id: String,
}

impl<'a> EventBody<'a> {
    fn from_entry(entry: &'a CalendarEntry) -> Self {
        Self {
            summary: &entry.summary,
            description: &entry.description,
            start: EventTime {
                date_time: entry.start.to_rfc3339(),
                time_zone: &entry.time_zone,
            },
            end: EventTime {
                date_time: entry.end.to_rfc3339(),
                time_zone: &entry.time_zone,
            },
        }
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendar {
    async fn check_available(&self) -> Result<(), CalendarError> {
        let url = format!("{}/calendars/{}", self.base_url, self.calendar_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| CalendarError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }

    async fn insert_entry(&self, entry: &CalendarEntry) -> Result<String, CalendarError> {
        debug!("Inserting calendar entry: {}", entry.summary);

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(&self.token)
            .json(&EventBody::from_entry(entry))
            .send()
            .await
            .map_err(|e| CalendarError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let resource: EventResource = response
            .json()
            .await
            .map_err(|e| CalendarError::InvalidResponse(format!("Failed to parse entry: {}", e)))?;

        Ok(resource.id)
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        entry: &CalendarEntry,
    ) -> Result<(), CalendarError> {
        debug!("Updating calendar entry {}", entry_id);

        let url = format!("{}/{}", self.events_url(), entry_id);
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&EventBody::from_entry(entry))
            .send()
            .await
            .map_err(|e| CalendarError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }
}
