use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::debug;

use crate::db::models::EventRow;

const EVENT_COLUMNS: &str = "id, job_id, start_time, end_time, calendar_entry_id";

/// Repository for Event database operations
pub struct EventRepository;

impl EventRepository {
    /// Insert an event for a job. The caller is responsible for having
    /// verified the job reference and the time window inside the same
    /// transaction.
    pub async fn insert(
        conn: &mut SqliteConnection,
        job_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<EventRow, sqlx::Error> {
        debug!("Creating event: job_id={}", job_id);

        sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (job_id, start_time, end_time)
            VALUES (?1, ?2, ?3)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(conn)
        .await
    }

    pub async fn list_all(pool: &Pool<Sqlite>) -> Result<Vec<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(&format!("SELECT {EVENT_COLUMNS} FROM events"))
            .fetch_all(pool)
            .await
    }

    pub async fn get_by_id(pool: &Pool<Sqlite>, id: i64) -> Result<Option<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Number of events referencing a job. Guards job deletion.
    pub async fn count_for_job(
        conn: &mut SqliteConnection,
        job_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE job_id = ?1")
            .bind(job_id)
            .fetch_one(conn)
            .await
    }

    /// Record the external calendar entry id returned by the first push, so
    /// later syncs update that entry instead of inserting a duplicate.
    pub async fn set_calendar_entry_id(
        pool: &Pool<Sqlite>,
        id: i64,
        entry_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE events SET calendar_entry_id = ?1 WHERE id = ?2")
            .bind(entry_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::job_repository::JobRepository;
    use crate::db::test_pool;
    use chrono::Duration;

    #[tokio::test]
    async fn insert_and_tag_with_calendar_entry() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let job = JobRepository::create(&mut conn, "Fix sink", "leak", None)
            .await
            .unwrap();

        let start = Utc::now();
        let event = EventRepository::insert(&mut conn, job.id, start, start + Duration::hours(2))
            .await
            .unwrap();
        drop(conn);

        assert_eq!(event.job_id, job.id);
        assert!(event.calendar_entry_id.is_none());

        EventRepository::set_calendar_entry_id(&pool, event.id, "cal-entry-1")
            .await
            .unwrap();

        let reloaded = EventRepository::get_by_id(&pool, event.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.calendar_entry_id.as_deref(), Some("cal-entry-1"));
        assert_eq!(reloaded.start_time, event.start_time);
    }

    #[tokio::test]
    async fn count_for_job_reflects_references() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let job = JobRepository::create(&mut conn, "Fix sink", "leak", None)
            .await
            .unwrap();

        assert_eq!(
            EventRepository::count_for_job(&mut conn, job.id)
                .await
                .unwrap(),
            0
        );

        let start = Utc::now();
        EventRepository::insert(&mut conn, job.id, start, start + Duration::hours(1))
            .await
            .unwrap();
        EventRepository::insert(&mut conn, job.id, start, start + Duration::hours(3))
            .await
            .unwrap();

        assert_eq!(
            EventRepository::count_for_job(&mut conn, job.id)
                .await
                .unwrap(),
            2
        );
    }
}
