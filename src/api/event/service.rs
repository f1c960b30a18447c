use sqlx::{Pool, Sqlite};
use tracing::info;

use super::models::BookEventPayload;
use crate::api::error::ServiceError;
use crate::db::event_repository::EventRepository;
use crate::db::job_repository::JobRepository;
use crate::db::models::EventRow;

/// Event service containing business logic
pub struct EventService {
    pool: Pool<Sqlite>,
}

impl EventService {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Book a time window for a job.
    ///
    /// The time window must be non-empty and the job reference must resolve;
    /// the reference check shares a transaction with the insert so a
    /// concurrent job deletion cannot slip in between.
    pub async fn book_event(&self, payload: &BookEventPayload) -> Result<EventRow, ServiceError> {
        if payload.start >= payload.end {
            return Err(ServiceError::Validation(
                "Event start must be before event end".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        if !JobRepository::exists(&mut tx, payload.job_id).await? {
            return Err(ServiceError::NotFound {
                kind: "Job",
                id: payload.job_id,
            });
        }

        let event =
            EventRepository::insert(&mut tx, payload.job_id, payload.start, payload.end).await?;
        tx.commit().await?;

        info!(
            "Service: Event {} booked for job {}",
            event.id, event.job_id
        );
        Ok(event)
    }

    pub async fn list_events(&self) -> Result<Vec<EventRow>, ServiceError> {
        Ok(EventRepository::list_all(&self.pool).await?)
    }

    pub async fn get_event(&self, id: i64) -> Result<EventRow, ServiceError> {
        EventRepository::get_by_id(&self.pool, id)
            .await?
            .ok_or(ServiceError::NotFound { kind: "Event", id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use chrono::{Duration, Utc};

    async fn create_job(pool: &Pool<Sqlite>) -> i64 {
        let mut conn = pool.acquire().await.unwrap();
        JobRepository::create(&mut conn, "Fix sink", "Kitchen leak", None)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn booking_a_valid_window_succeeds() {
        let pool = test_pool().await;
        let service = EventService::new(pool.clone());
        let job_id = create_job(&pool).await;

        let start = Utc::now();
        let event = service
            .book_event(&BookEventPayload {
                job_id,
                start,
                end: start + Duration::hours(2),
            })
            .await
            .unwrap();

        assert_eq!(event.job_id, job_id);
        assert_eq!(service.get_event(event.id).await.unwrap().id, event.id);
    }

    #[tokio::test]
    async fn empty_or_reversed_window_is_rejected_and_persists_nothing() {
        let pool = test_pool().await;
        let service = EventService::new(pool.clone());
        let job_id = create_job(&pool).await;
        let start = Utc::now();

        for end in [start, start - Duration::hours(1)] {
            let result = service
                .book_event(&BookEventPayload {
                    job_id,
                    start,
                    end,
                })
                .await;
            assert!(matches!(result, Err(ServiceError::Validation(_))));
        }

        assert!(service.list_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dangling_job_reference_is_rejected_and_persists_nothing() {
        let pool = test_pool().await;
        let service = EventService::new(pool.clone());
        let start = Utc::now();

        let result = service
            .book_event(&BookEventPayload {
                job_id: 999,
                start,
                end: start + Duration::hours(1),
            })
            .await;

        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
        assert!(service.list_events().await.unwrap().is_empty());
    }
}
