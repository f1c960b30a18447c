use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::debug;

use crate::db::models::JobRow;

const JOB_COLUMNS: &str =
    "id, title, description, address, status, additional_data, created_at, updated_at";

/// Query-time classification for job listing. "Active" is not a stored
/// status; it groups pending and in-progress at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Exact(String),
}

/// Repository for Job database operations
pub struct JobRepository;

impl JobRepository {
    /// Insert a new job and return the full record.
    ///
    /// New jobs always start as `pending` with created_at == updated_at.
    pub async fn create(
        conn: &mut SqliteConnection,
        title: &str,
        description: &str,
        address: Option<&str>,
    ) -> Result<JobRow, sqlx::Error> {
        debug!("Creating job: title={}", title);

        let now = Utc::now();
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs (title, description, address, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, 'pending', ?4, ?4)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(title)
        .bind(description)
        .bind(address)
        .bind(now)
        .fetch_one(conn)
        .await?;

        debug!("Job created with id={}", row.id);
        Ok(row)
    }

    pub async fn get_by_id(pool: &Pool<Sqlite>, id: i64) -> Result<Option<JobRow>, sqlx::Error> {
        sqlx::query_as::<_, JobRow>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List jobs ordered by creation time, newest first.
    ///
    /// The query is assembled dynamically: an optional status filter and an
    /// optional LIMIT clause, bound in order of appearance.
    pub async fn list(
        pool: &Pool<Sqlite>,
        filter: Option<&StatusFilter>,
        limit: Option<i64>,
    ) -> Result<Vec<JobRow>, sqlx::Error> {
        let mut sql = format!("SELECT {JOB_COLUMNS} FROM jobs");

        match filter {
            Some(StatusFilter::Active) => {
                sql.push_str(" WHERE status IN ('pending', 'in-progress')")
            }
            Some(StatusFilter::Exact(_)) => sql.push_str(" WHERE status = ?"),
            None => {}
        }

        sql.push_str(" ORDER BY created_at DESC");
        if limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query_as::<_, JobRow>(&sql);
        if let Some(StatusFilter::Exact(status)) = filter {
            query = query.bind(status.as_str());
        }
        if let Some(n) = limit {
            query = query.bind(n);
        }

        query.fetch_all(pool).await
    }

    /// Case-insensitive substring search over title, description and address.
    /// An empty term matches every job.
    pub async fn search(pool: &Pool<Sqlite>, term: &str) -> Result<Vec<JobRow>, sqlx::Error> {
        sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE lower(title) LIKE '%' || lower(?1) || '%'
               OR lower(description) LIKE '%' || lower(?1) || '%'
               OR lower(coalesce(address, '')) LIKE '%' || lower(?1) || '%'
            "#
        ))
        .bind(term)
        .fetch_all(pool)
        .await
    }

    /// Check that a job id resolves to a live record. Used inside the event
    /// booking transaction so the reference check and the insert commit
    /// together.
    pub async fn exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT EXISTS (SELECT 1 FROM jobs WHERE id = ?1)")
            .bind(id)
            .fetch_one(conn)
            .await
            .map(|n| n != 0)
    }

    /// Read the current status of a job, if it exists. Used inside the
    /// status-update transaction so the transition check and the write see
    /// the same record.
    pub async fn fetch_status(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT status FROM jobs WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Write a new status and bump updated_at. Returns None if the id is
    /// unknown.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: i64,
        status: &str,
    ) -> Result<Option<JobRow>, sqlx::Error> {
        sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs SET status = ?1, updated_at = ?2 WHERE id = ?3
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Attach free-text annotation to a job and bump updated_at.
    pub async fn set_additional_data(
        pool: &Pool<Sqlite>,
        id: i64,
        additional_data: &str,
    ) -> Result<Option<JobRow>, sqlx::Error> {
        sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs SET additional_data = ?1, updated_at = ?2 WHERE id = ?3
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(additional_data)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Delete a job. Returns whether a record existed.
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use std::time::Duration;

    async fn create(pool: &Pool<Sqlite>, title: &str, address: Option<&str>) -> JobRow {
        let mut conn = pool.acquire().await.unwrap();
        JobRepository::create(&mut conn, title, "some description", address)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_starts_pending_with_equal_timestamps() {
        let pool = test_pool().await;
        let job = create(&pool, "Fix sink", Some("1 Elm St")).await;

        assert_eq!(job.status, "pending");
        assert_eq!(job.created_at, job.updated_at);
        assert_eq!(job.address.as_deref(), Some("1 Elm St"));
        assert!(job.additional_data.is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_respects_limit() {
        let pool = test_pool().await;
        for title in ["first", "second", "third"] {
            create(&pool, title, None).await;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let all = JobRepository::list(&pool, None, None).await.unwrap();
        let titles: Vec<_> = all.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        let limited = JobRepository::list(&pool, None, Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].title, "third");
    }

    #[tokio::test]
    async fn list_active_filter_excludes_completed_and_inactive() {
        let pool = test_pool().await;
        let a = create(&pool, "a", None).await;
        let b = create(&pool, "b", None).await;
        create(&pool, "c", None).await;

        let mut conn = pool.acquire().await.unwrap();
        JobRepository::set_status(&mut conn, a.id, "in-progress")
            .await
            .unwrap();
        JobRepository::set_status(&mut conn, b.id, "inactive")
            .await
            .unwrap();
        drop(conn);

        let active = JobRepository::list(&pool, Some(&StatusFilter::Active), None)
            .await
            .unwrap();
        let titles: Vec<_> = active.iter().map(|j| j.title.as_str()).collect();
        assert!(titles.contains(&"a") && titles.contains(&"c"));
        assert_eq!(active.len(), 2);

        let inactive = JobRepository::list(
            &pool,
            Some(&StatusFilter::Exact("inactive".to_string())),
            None,
        )
        .await
        .unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].title, "b");
    }

    #[tokio::test]
    async fn search_matches_all_text_fields_case_insensitively() {
        let pool = test_pool().await;
        create(&pool, "Fix kitchen sink", None).await;
        let mut conn = pool.acquire().await.unwrap();
        JobRepository::create(&mut conn, "Paint fence", "white PAINT, two coats", None)
            .await
            .unwrap();
        JobRepository::create(&mut conn, "Mow lawn", "weekly", Some("12 Elm Street"))
            .await
            .unwrap();
        drop(conn);

        let by_title = JobRepository::search(&pool, "KITCHEN").await.unwrap();
        assert_eq!(by_title.len(), 1);

        let by_description = JobRepository::search(&pool, "paint").await.unwrap();
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].title, "Paint fence");

        let by_address = JobRepository::search(&pool, "elm str").await.unwrap();
        assert_eq!(by_address.len(), 1);

        let everything = JobRepository::search(&pool, "").await.unwrap();
        assert_eq!(everything.len(), 3);

        let nothing = JobRepository::search(&pool, "plumbing").await.unwrap();
        assert!(nothing.is_empty());
    }

    #[tokio::test]
    async fn set_status_bumps_updated_at() {
        let pool = test_pool().await;
        let job = create(&pool, "Fix sink", None).await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        let mut conn = pool.acquire().await.unwrap();
        let updated = JobRepository::set_status(&mut conn, job.id, "in-progress")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, "in-progress");
        assert!(updated.updated_at > job.updated_at);
        assert_eq!(updated.created_at, job.created_at);
    }

    #[tokio::test]
    async fn set_status_on_unknown_id_returns_none() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let result = JobRepository::set_status(&mut conn, 999, "inactive")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn additional_data_is_persisted() {
        let pool = test_pool().await;
        let job = create(&pool, "Fix sink", None).await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = JobRepository::set_additional_data(&pool, job.id, "bring spare washers")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.additional_data.as_deref(), Some("bring spare washers"));
        assert!(updated.updated_at > job.updated_at);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_existed() {
        let pool = test_pool().await;
        let job = create(&pool, "Fix sink", None).await;

        let mut conn = pool.acquire().await.unwrap();
        assert!(JobRepository::delete(&mut conn, job.id).await.unwrap());
        assert!(!JobRepository::delete(&mut conn, job.id).await.unwrap());
        drop(conn);

        assert!(JobRepository::get_by_id(&pool, job.id)
            .await
            .unwrap()
            .is_none());
    }
}
