use std::sync::Arc;

use serde::Serialize;
use sqlx::{Pool, Sqlite};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::extraction::{build_prompt, parse_response};
use crate::api::error::ServiceError;
use crate::clients::ai::CompletionClient;
use crate::clients::mail::MailTransport;
use crate::db::email_repository::{EmailRepository, NewEmail};
use crate::db::job_repository::JobRepository;
use crate::db::models::{EmailRow, JobRow};

/// Result of one inbox sync run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxSyncSummary {
    pub stored_count: usize,
    pub failed_count: usize,
}

/// Pulls messages from the mail transport into the emails table and, on
/// demand, turns a stored email into a job via AI field extraction.
pub struct EmailIngestionPipeline {
    pool: Pool<Sqlite>,
    transport: Arc<dyn MailTransport>,
    ai: Arc<dyn CompletionClient>,
    sync_gate: Mutex<()>,
}

impl EmailIngestionPipeline {
    pub fn new(
        pool: Pool<Sqlite>,
        transport: Arc<dyn MailTransport>,
        ai: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            pool,
            transport,
            ai,
            sync_gate: Mutex::new(()),
        }
    }

    /// Pull the mailbox into the emails table.
    ///
    /// Single-flight: an overlapping call is rejected instead of running a
    /// duplicate sync. A message that fails to fetch or store is counted and
    /// the run continues; only a failure to list the mailbox at all aborts
    /// the whole sync. Messages already stored (same transport message id)
    /// are left untouched.
    pub async fn sync_inbox(&self) -> Result<InboxSyncSummary, ServiceError> {
        let _guard = self
            .sync_gate
            .try_lock()
            .map_err(|_| ServiceError::SyncInProgress("inbox"))?;

        let messages = self.transport.list_messages().await.map_err(|e| {
            ServiceError::ExternalService(format!("Mailbox listing failed: {}", e))
        })?;
        info!("Inbox sync: {} message(s) listed", messages.len());

        let mut stored = 0;
        let mut failed = 0;
        for meta in &messages {
            match self.transport.fetch_message(&meta.id).await {
                Ok(message) => {
                    let email = NewEmail {
                        message_id: message.message_id,
                        subject: message.subject,
                        sender: message.sender,
                        content: message.content,
                        received_at: message.received_at,
                    };
                    match EmailRepository::insert_if_absent(&self.pool, &email).await {
                        Ok(true) => stored += 1,
                        Ok(false) => {}
                        Err(e) => {
                            error!("Failed to store message {}: {:?}", meta.id, e);
                            failed += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch message {}: {}", meta.id, e);
                    failed += 1;
                }
            }
        }

        info!("Inbox sync finished: stored={}, failed={}", stored, failed);
        Ok(InboxSyncSummary {
            stored_count: stored,
            failed_count: failed,
        })
    }

    pub async fn list_emails(&self) -> Result<Vec<EmailRow>, ServiceError> {
        Ok(EmailRepository::list_all(&self.pool).await?)
    }

    /// Create a job from a stored email via AI field extraction.
    ///
    /// A parse failure leaves the email unprocessed so the caller can retry
    /// or handle it manually. On success the job insert and the processed
    /// flag commit together; the compare-and-set claim makes a repeated or
    /// concurrent call fail with AlreadyProcessed instead of creating a
    /// second job.
    pub async fn extract_job_from_email(&self, email_id: i64) -> Result<JobRow, ServiceError> {
        let email = EmailRepository::get_by_id(&self.pool, email_id)
            .await?
            .ok_or(ServiceError::NotFound {
                kind: "Email",
                id: email_id,
            })?;

        if email.processed {
            return Err(ServiceError::AlreadyProcessed(email_id));
        }

        let prompt = build_prompt(&email.subject, &email.content);
        let completion = self.ai.complete(&prompt).await.map_err(|e| {
            ServiceError::ExternalService(format!("Completion request failed: {}", e))
        })?;

        let extracted = parse_response(&completion).map_err(ServiceError::ExtractionParse)?;

        let mut tx = self.pool.begin().await?;
        if !EmailRepository::claim_unprocessed(&mut tx, email_id).await? {
            return Err(ServiceError::AlreadyProcessed(email_id));
        }
        let job = JobRepository::create(
            &mut tx,
            &extracted.title,
            &extracted.description,
            Some(extracted.address.as_str()),
        )
        .await?;
        tx.commit().await?;

        info!("Created job {} from email {}", job.id, email_id);
        Ok(job)
    }
}
