use thiserror::Error;

/// Node-level errors. Isolated to the failing node: the scheduler records
/// them in the execution context and the run continues.
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Template error: {0}")]
    TemplateError(String),
    #[error("Code evaluation error: {0}")]
    EvalError(String),
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("Service error: {0}")]
    ServiceError(String),
    #[error("Execution error: {0}")]
    ExecutionError(String),
    #[error("Type error: {0}")]
    TypeError(String),
    #[error("Loop exceeded maximum iterations ({0})")]
    MaxIterationsExceeded(usize),
    #[error("Node cancelled")]
    Cancelled,
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for NodeError {
    fn from(e: serde_json::Error) -> Self {
        NodeError::SerializationError(e.to_string())
    }
}

impl From<reqwest::Error> for NodeError {
    fn from(e: reqwest::Error) -> Self {
        NodeError::HttpError(e.to_string())
    }
}
