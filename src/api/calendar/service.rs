use std::sync::Arc;

use serde::Serialize;
use sqlx::{Pool, Sqlite};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::error::ServiceError;
use crate::clients::calendar::{CalendarApi, CalendarEntry};
use crate::db::event_repository::EventRepository;
use crate::db::job_repository::JobRepository;
use crate::db::models::EventRow;

/// Result of one calendar sync run
#[derive(Debug, Serialize)]
pub struct CalendarSyncSummary {
    pub pushed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Pushes booked events to the external calendar, idempotently.
///
/// Each event maps to at most one external entry: the entry id returned by
/// the first push is persisted on the event, and later syncs update that
/// entry instead of inserting a new one.
pub struct CalendarSyncEngine {
    pool: Pool<Sqlite>,
    calendar: Arc<dyn CalendarApi>,
    time_zone: String,
    sync_gate: Mutex<()>,
}

impl CalendarSyncEngine {
    pub fn new(pool: Pool<Sqlite>, calendar: Arc<dyn CalendarApi>, time_zone: String) -> Self {
        Self {
            pool,
            calendar,
            time_zone,
            sync_gate: Mutex::new(()),
        }
    }

    /// Push every booked event to the calendar.
    ///
    /// Single-flight: an overlapping call is rejected. A full-service outage
    /// fails the batch before any entry is attempted; a failure on one entry
    /// is counted and the batch continues. Events whose job has disappeared
    /// are skipped with a warning rather than aborting the run.
    pub async fn sync_to_calendar(&self) -> Result<CalendarSyncSummary, ServiceError> {
        let _guard = self
            .sync_gate
            .try_lock()
            .map_err(|_| ServiceError::SyncInProgress("calendar"))?;

        self.calendar.check_available().await.map_err(|e| {
            ServiceError::ExternalService(format!("Calendar service unavailable: {}", e))
        })?;

        let events = EventRepository::list_all(&self.pool).await?;
        info!("Calendar sync: {} event(s) to reconcile", events.len());

        let mut pushed = 0;
        let mut skipped = 0;
        let mut failed = 0;
        for event in &events {
            let Some(job) = JobRepository::get_by_id(&self.pool, event.job_id).await? else {
                warn!(
                    "Event {} references missing job {}, skipping",
                    event.id, event.job_id
                );
                skipped += 1;
                continue;
            };

            let entry = CalendarEntry {
                summary: job.title,
                description: job.description,
                start: event.start_time,
                end: event.end_time,
                time_zone: self.time_zone.clone(),
            };

            match self.push_entry(event, &entry).await {
                Ok(()) => pushed += 1,
                Err(e) => {
                    warn!("Failed to push event {}: {}", event.id, e);
                    failed += 1;
                }
            }
        }

        info!(
            "Calendar sync finished: pushed={}, skipped={}, failed={}",
            pushed, skipped, failed
        );
        Ok(CalendarSyncSummary {
            pushed,
            skipped,
            failed,
        })
    }

    async fn push_entry(&self, event: &EventRow, entry: &CalendarEntry) -> Result<(), ServiceError> {
        match &event.calendar_entry_id {
            Some(entry_id) => {
                self.calendar
                    .update_entry(entry_id, entry)
                    .await
                    .map_err(|e| ServiceError::ExternalService(e.to_string()))?;
            }
            None => {
                let entry_id = self
                    .calendar
                    .insert_entry(entry)
                    .await
                    .map_err(|e| ServiceError::ExternalService(e.to_string()))?;
                EventRepository::set_calendar_entry_id(&self.pool, event.id, &entry_id).await?;
            }
        }
        Ok(())
    }
}
