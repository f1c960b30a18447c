use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use tracing::{error, warn};

use crate::api::validation::ErrorResponse;

/// Service-level errors shared by every domain
#[derive(Debug)]
pub enum ServiceError {
    /// Database operation failed
    Database(sqlx::Error),

    /// Malformed input: bad time window, unknown status value, bad filter
    Validation(String),

    /// Status change not permitted by the transition table
    InvalidTransition { from: String, to: String },

    /// Record not found
    NotFound { kind: &'static str, id: i64 },

    /// Referential integrity would be violated
    Conflict(String),

    /// Extraction already produced a job from this email
    AlreadyProcessed(i64),

    /// A sync of this kind is already running
    SyncInProgress(&'static str),

    /// AI response did not match the expected shape
    ExtractionParse(String),

    /// A call to an external collaborator failed
    ExternalService(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Database(e) => write!(f, "Database error: {}", e),
            ServiceError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ServiceError::InvalidTransition { from, to } => {
                write!(f, "Invalid status transition: {} -> {}", from, to)
            }
            ServiceError::NotFound { kind, id } => write!(f, "{} not found: {}", kind, id),
            ServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServiceError::AlreadyProcessed(id) => {
                write!(f, "Email {} has already been processed", id)
            }
            ServiceError::SyncInProgress(what) => {
                write!(f, "A {} sync is already in progress", what)
            }
            ServiceError::ExtractionParse(msg) => write!(f, "Extraction parse error: {}", msg),
            ServiceError::ExternalService(msg) => write!(f, "External service error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Database(e)
    }
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Database(e) => {
                error!("Database error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to process request".to_string(),
                    fields: serde_json::json!({"message": "Database error occurred"}),
                })
            }
            ServiceError::Validation(msg) => {
                warn!("Validation error: {}", msg);
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    fields: serde_json::json!({"message": msg}),
                })
            }
            ServiceError::InvalidTransition { from, to } => {
                warn!("Invalid status transition: {} -> {}", from, to);
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Invalid status transition".to_string(),
                    fields: serde_json::json!({"from": from, "to": to}),
                })
            }
            ServiceError::NotFound { kind, id } => {
                warn!("{} not found: {}", kind, id);
                HttpResponse::NotFound().json(ErrorResponse {
                    error: "Not found".to_string(),
                    fields: serde_json::json!({
                        "message": format!("{} with id {} not found", kind, id)
                    }),
                })
            }
            ServiceError::Conflict(msg) => {
                warn!("Conflict: {}", msg);
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Conflict".to_string(),
                    fields: serde_json::json!({"message": msg}),
                })
            }
            ServiceError::AlreadyProcessed(id) => {
                warn!("Email {} already processed", id);
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Email already processed".to_string(),
                    fields: serde_json::json!({
                        "message": format!("A job was already created from email {}", id)
                    }),
                })
            }
            ServiceError::SyncInProgress(what) => {
                warn!("{} sync already in progress", what);
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Sync already in progress".to_string(),
                    fields: serde_json::json!({
                        "message": format!("A {} sync is already running, try again later", what)
                    }),
                })
            }
            ServiceError::ExtractionParse(msg) => {
                warn!("Extraction parse error: {}", msg);
                HttpResponse::UnprocessableEntity().json(ErrorResponse {
                    error: "Could not extract job fields".to_string(),
                    fields: serde_json::json!({"message": msg}),
                })
            }
            ServiceError::ExternalService(msg) => {
                error!("External service error: {}", msg);
                HttpResponse::BadGateway().json(ErrorResponse {
                    error: "External service failure".to_string(),
                    fields: serde_json::json!({"message": msg}),
                })
            }
        }
    }
}
