//! Mail transport boundary: list pending messages, fetch full content.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors from the mail transport.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Listing entry for a message waiting in the mailbox.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageMeta {
    pub id: String,
}

/// A fully fetched inbox message.
#[derive(Debug, Clone)]
pub struct FetchedMessage {
    /// Transport-level message identifier; stable across repeated syncs.
    pub message_id: String,
    pub subject: String,
    pub sender: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

/// Trait for the inbox side of a mail transport.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// List the messages currently available in the mailbox.
    async fn list_messages(&self) -> Result<Vec<MessageMeta>, MailError>;

    /// Fetch one message with its full content.
    async fn fetch_message(&self, id: &str) -> Result<FetchedMessage, MailError>;
}

/// HTTP mailbox gateway client.
///
/// Talks to a JSON gateway in front of the actual mailbox:
/// `GET /messages` lists message ids, `GET /messages/{id}` returns the
/// decoded message.
pub struct HttpMailbox {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpMailbox {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }
}

#[derive(Deserialize)]
struct MessageJson {
    id: String,
    #[serde(default)]
    subject: Option<String>,
    from: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

#[async_trait]
impl MailTransport for HttpMailbox {
    async fn list_messages(&self) -> Result<Vec<MessageMeta>, MailError> {
        let url = format!("{}/messages", self.base_url);
        debug!("Listing mailbox messages from {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| MailError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<Vec<MessageMeta>>()
            .await
            .map_err(|e| MailError::InvalidResponse(format!("Failed to parse listing: {}", e)))
    }

    async fn fetch_message(&self, id: &str) -> Result<FetchedMessage, MailError> {
        let url = format!("{}/messages/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| MailError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let message: MessageJson = response
            .json()
            .await
            .map_err(|e| MailError::InvalidResponse(format!("Failed to parse message: {}", e)))?;

        Ok(FetchedMessage {
            message_id: message.id,
            subject: message.subject.unwrap_or_default(),
            sender: message.from,
            content: message.text.unwrap_or_default(),
            received_at: message.date.unwrap_or_else(Utc::now),
        })
    }
}
