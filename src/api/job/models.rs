use serde::{Deserialize, Serialize};
use validator::Validate;

/// Job status enum representing the lifecycle of a job
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Inactive,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in-progress",
            JobStatus::Completed => "completed",
            JobStatus::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(JobStatus::Pending),
            "in-progress" => Some(JobStatus::InProgress),
            "completed" => Some(JobStatus::Completed),
            "inactive" => Some(JobStatus::Inactive),
            _ => None,
        }
    }

    /// Closed transition table: the lifecycle only moves forward
    /// (pending → in-progress → completed, skipping ahead allowed), and any
    /// state can be parked as inactive.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::InProgress)
                | (JobStatus::Pending, JobStatus::Completed)
                | (JobStatus::InProgress, JobStatus::Completed)
                | (_, JobStatus::Inactive)
        )
    }
}

/// Payload for creating a job manually
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 2000,
        message = "Description must be between 1 and 2000 characters"
    ))]
    pub description: String,

    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,
}

/// Payload for a status update; unknown values are rejected at
/// deserialization
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusPayload {
    pub status: JobStatus,
}

/// Payload for attaching free-text annotation to a job
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatePayload {
    #[validate(length(
        min = 1,
        max = 2000,
        message = "additionalData must be between 1 and 2000 characters"
    ))]
    pub additional_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            JobStatus::Pending,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Inactive,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("done"), None);
    }

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&JobStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
    }

    #[test]
    fn transition_table_only_moves_forward() {
        use JobStatus::*;

        assert!(Pending.can_transition_to(InProgress));
        assert!(Pending.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
        for from in [Pending, InProgress, Completed, Inactive] {
            assert!(from.can_transition_to(Inactive));
        }

        assert!(!Completed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Inactive.can_transition_to(Pending));
        assert!(!Inactive.can_transition_to(InProgress));
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }
}
