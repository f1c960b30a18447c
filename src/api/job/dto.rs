use serde::Deserialize;

/// Query parameters for GET /jobs
///
/// `status` accepts the four stored statuses plus the derived "active"
/// grouping (pending + in-progress).
#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub limit: Option<i64>,
    pub status: Option<String>,
}

/// Query parameters for GET /jobs/search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub term: String,
}
