use grader::ReconcileSummary;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RunGraderRequest {
    #[validate(email(message = "a valid student email is required"))]
    pub email: String,

    /// Service-principal credentials document, passed to the suite verbatim.
    #[validate(length(min = 1, message = "credentials must not be empty"))]
    pub credentials: String,

    /// Catalog task name or raw filter expression; empty grades the whole suite.
    #[serde(default)]
    pub task: String,

    /// Correlation token for logs and the working directory; generated when absent.
    #[serde(default)]
    pub trace: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GradeRunResponse {
    pub trace: String,
    pub task: String,
    pub filter: String,
    pub summary: ReconcileSummary,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MarksQuery {
    #[validate(email(message = "a valid student email is required"))]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarkEntry {
    pub test: String,
    pub mark: u32,
}

#[derive(Debug, Serialize)]
pub struct MarksResponse {
    pub email: String,
    pub total: u32,
    pub marks: Vec<MarkEntry>,
}
