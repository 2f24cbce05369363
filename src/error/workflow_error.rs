//! Workflow-level error types.

use thiserror::Error;

use crate::graph::validator::ValidationReport;

/// Top-level errors that abort a run.
///
/// Node failures are not represented here; they are recorded per node in
/// the [`ExecutionContext`](crate::core::ExecutionContext) error map while
/// the run keeps going.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Validation failed: {}", .0.errors.join("; "))]
    ValidationFailed(Box<ValidationReport>),
    #[error("No progress possible: {remaining} node(s) can never become ready")]
    NoProgress { remaining: usize },
    #[error("Graph build error: {0}")]
    GraphBuildError(String),
    #[error("Workflow cancelled")]
    Cancelled,
    #[error("Internal error: {0}")]
    InternalError(String),
}
