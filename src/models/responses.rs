use serde::{Deserialize, Serialize};
use crate::report::AssignmentReport;

/// Response for the assignment endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub report: AssignmentReport,
    pub participants: usize,
    pub explored: usize,
    pub rollbacks: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
