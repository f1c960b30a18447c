use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::debug;

use crate::db::models::EmailRow;

const EMAIL_COLUMNS: &str = "id, message_id, subject, sender, content, received_at, processed";

/// An inbox message as captured from the mail transport, before storage.
#[derive(Debug, Clone)]
pub struct NewEmail {
    pub message_id: String,
    pub subject: String,
    pub sender: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

/// Repository for Email database operations
pub struct EmailRepository;

impl EmailRepository {
    /// Store a fetched message unless one with the same transport message id
    /// is already present. Returns whether a new row was inserted.
    pub async fn insert_if_absent(
        pool: &Pool<Sqlite>,
        email: &NewEmail,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO emails (message_id, subject, sender, content, received_at, processed)
            VALUES (?1, ?2, ?3, ?4, ?5, 0)
            ON CONFLICT (message_id) DO NOTHING
            "#,
        )
        .bind(&email.message_id)
        .bind(&email.subject)
        .bind(&email.sender)
        .bind(&email.content)
        .bind(email.received_at)
        .execute(pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        if !inserted {
            debug!("Message {} already stored, skipping", email.message_id);
        }
        Ok(inserted)
    }

    pub async fn list_all(pool: &Pool<Sqlite>) -> Result<Vec<EmailRow>, sqlx::Error> {
        sqlx::query_as::<_, EmailRow>(&format!(
            "SELECT {EMAIL_COLUMNS} FROM emails ORDER BY received_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn get_by_id(pool: &Pool<Sqlite>, id: i64) -> Result<Option<EmailRow>, sqlx::Error> {
        sqlx::query_as::<_, EmailRow>(&format!("SELECT {EMAIL_COLUMNS} FROM emails WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Flip `processed` from false to true. Returns false when the email was
    /// already processed, which makes the flag a compare-and-set guard
    /// against creating two jobs from one message.
    pub async fn claim_unprocessed(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE emails SET processed = 1 WHERE id = ?1 AND processed = 0")
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

    fn sample(message_id: &str) -> NewEmail {
        NewEmail {
            message_id: message_id.to_string(),
            subject: "Leaking sink".to_string(),
            sender: "customer@example.com".to_string(),
            content: "The kitchen sink has been dripping for days.".to_string(),
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn same_message_id_is_stored_once() {
        let pool = test_pool().await;

        assert!(EmailRepository::insert_if_absent(&pool, &sample("msg-1"))
            .await
            .unwrap());
        assert!(!EmailRepository::insert_if_absent(&pool, &sample("msg-1"))
            .await
            .unwrap());
        assert!(EmailRepository::insert_if_absent(&pool, &sample("msg-2"))
            .await
            .unwrap());

        let all = EmailRepository::list_all(&pool).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|e| !e.processed));
    }

    #[tokio::test]
    async fn claim_unprocessed_succeeds_exactly_once() {
        let pool = test_pool().await;
        EmailRepository::insert_if_absent(&pool, &sample("msg-1"))
            .await
            .unwrap();
        let email = &EmailRepository::list_all(&pool).await.unwrap()[0];

        let mut conn = pool.acquire().await.unwrap();
        assert!(EmailRepository::claim_unprocessed(&mut conn, email.id)
            .await
            .unwrap());
        assert!(!EmailRepository::claim_unprocessed(&mut conn, email.id)
            .await
            .unwrap());
        drop(conn);

        let reloaded = EmailRepository::get_by_id(&pool, email.id)
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.processed);
    }
}
