use sqlx::{Pool, Sqlite};
use tracing::{info, warn};

use super::dto::ListJobsQuery;
use super::models::{CreateJobPayload, JobStatus};
use crate::api::error::ServiceError;
use crate::db::event_repository::EventRepository;
use crate::db::job_repository::{JobRepository, StatusFilter};
use crate::db::models::JobRow;

/// Job service containing business logic
pub struct JobService {
    pool: Pool<Sqlite>,
}

impl JobService {
    /// Create a new JobService instance
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Create a single job; new jobs always start as pending.
    pub async fn create_job(&self, payload: &CreateJobPayload) -> Result<JobRow, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let job = JobRepository::create(
            &mut conn,
            &payload.title,
            &payload.description,
            payload.address.as_deref(),
        )
        .await?;

        info!("Service: Job created with id={}", job.id);
        Ok(job)
    }

    pub async fn get_job(&self, id: i64) -> Result<JobRow, ServiceError> {
        JobRepository::get_by_id(&self.pool, id)
            .await?
            .ok_or(ServiceError::NotFound { kind: "Job", id })
    }

    /// List jobs, newest first, with an optional bound and an optional
    /// status filter. "active" is a derived grouping resolved at query time,
    /// never a stored value.
    pub async fn list_jobs(&self, query: &ListJobsQuery) -> Result<Vec<JobRow>, ServiceError> {
        let filter = match query.status.as_deref() {
            None => None,
            Some("active") => Some(StatusFilter::Active),
            Some(other) => match JobStatus::parse(other) {
                Some(status) => Some(StatusFilter::Exact(status.as_str().to_string())),
                None => {
                    return Err(ServiceError::Validation(format!(
                        "Unknown status filter: {}",
                        other
                    )))
                }
            },
        };

        Ok(JobRepository::list(&self.pool, filter.as_ref(), query.limit).await?)
    }

    pub async fn search_jobs(&self, term: &str) -> Result<Vec<JobRow>, ServiceError> {
        Ok(JobRepository::search(&self.pool, term).await?)
    }

    /// Apply a status transition.
    ///
    /// The current status is read and the new one written inside one
    /// transaction, so two concurrent updates to the same job cannot
    /// interleave between check and write.
    pub async fn update_status(
        &self,
        id: i64,
        new_status: JobStatus,
    ) -> Result<JobRow, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let current = JobRepository::fetch_status(&mut tx, id)
            .await?
            .ok_or(ServiceError::NotFound { kind: "Job", id })?;

        let from = JobStatus::parse(&current).ok_or_else(|| {
            ServiceError::Validation(format!("Stored status '{}' is not recognized", current))
        })?;

        if !from.can_transition_to(new_status) {
            warn!(
                "Service: Rejected transition {} -> {} for job {}",
                current,
                new_status.as_str(),
                id
            );
            return Err(ServiceError::InvalidTransition {
                from: current,
                to: new_status.as_str().to_string(),
            });
        }

        let job = JobRepository::set_status(&mut tx, id, new_status.as_str())
            .await?
            .ok_or(ServiceError::NotFound { kind: "Job", id })?;
        tx.commit().await?;

        info!("Service: Job {} moved to {}", id, new_status.as_str());
        Ok(job)
    }

    pub async fn annotate_job(&self, id: i64, additional_data: &str) -> Result<JobRow, ServiceError> {
        JobRepository::set_additional_data(&self.pool, id, additional_data)
            .await?
            .ok_or(ServiceError::NotFound { kind: "Job", id })
    }

    /// Delete a job. Rejected while booked events still reference it, so the
    /// events table never holds a dangling job id.
    pub async fn delete_job(&self, id: i64) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        let referencing = EventRepository::count_for_job(&mut tx, id).await?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Job {} still has {} booked event(s)",
                id, referencing
            )));
        }

        if !JobRepository::delete(&mut tx, id).await? {
            return Err(ServiceError::NotFound { kind: "Job", id });
        }
        tx.commit().await?;

        info!("Service: Job {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use chrono::{Duration, Utc};

    fn payload(title: &str) -> CreateJobPayload {
        CreateJobPayload {
            title: title.to_string(),
            description: "Kitchen leak".to_string(),
            address: Some("1 Elm St".to_string()),
        }
    }

    #[tokio::test]
    async fn lifecycle_create_update_delete() {
        let service = JobService::new(test_pool().await);

        let job = service.create_job(&payload("Fix sink")).await.unwrap();
        assert_eq!(job.status, "pending");

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let done = service
            .update_status(job.id, JobStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, "completed");
        assert!(done.updated_at > job.updated_at);

        service.delete_job(job.id).await.unwrap();
        assert!(matches!(
            service.get_job(job.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn backward_transition_is_rejected() {
        let service = JobService::new(test_pool().await);
        let job = service.create_job(&payload("Fix sink")).await.unwrap();

        service
            .update_status(job.id, JobStatus::InProgress)
            .await
            .unwrap();
        let reloaded = service.get_job(job.id).await.unwrap();

        let result = service.update_status(job.id, JobStatus::Pending).await;
        assert!(matches!(
            result,
            Err(ServiceError::InvalidTransition { .. })
        ));

        // the rejected write must not have touched the record
        let unchanged = service.get_job(job.id).await.unwrap();
        assert_eq!(unchanged.status, "in-progress");
        assert_eq!(unchanged.updated_at, reloaded.updated_at);
    }

    #[tokio::test]
    async fn any_status_can_be_parked_inactive() {
        let service = JobService::new(test_pool().await);
        let job = service.create_job(&payload("Fix sink")).await.unwrap();

        let parked = service
            .update_status(job.id, JobStatus::Inactive)
            .await
            .unwrap();
        assert_eq!(parked.status, "inactive");
    }

    #[tokio::test]
    async fn update_status_on_unknown_id_is_not_found() {
        let service = JobService::new(test_pool().await);
        assert!(matches!(
            service.update_status(42, JobStatus::Inactive).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_status_filter_is_a_validation_error() {
        let service = JobService::new(test_pool().await);
        let query = ListJobsQuery {
            limit: None,
            status: Some("done".to_string()),
        };
        assert!(matches!(
            service.list_jobs(&query).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_rejected_while_events_reference_the_job() {
        let pool = test_pool().await;
        let service = JobService::new(pool.clone());
        let job = service.create_job(&payload("Fix sink")).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let start = Utc::now();
        EventRepository::insert(&mut conn, job.id, start, start + Duration::hours(1))
            .await
            .unwrap();
        drop(conn);

        assert!(matches!(
            service.delete_job(job.id).await,
            Err(ServiceError::Conflict(_))
        ));
        // still present
        assert!(service.get_job(job.id).await.is_ok());
    }
}
