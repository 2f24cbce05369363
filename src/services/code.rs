//! Code evaluation capability.
//!
//! Transform, conditional, and loop nodes run user-supplied snippets
//! through this injected seam. The engine does not embed a language
//! runtime and does not specify the sandboxing mechanism, only that
//! invocation is awaitable and can fail.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::NodeError;

#[async_trait]
pub trait CodeEvaluator: Send + Sync {
    /// Invoke `source` with `input` as its sole argument; the return value
    /// becomes the node's result.
    async fn invoke(&self, source: &str, input: Value) -> Result<Value, NodeError>;
}

/// Placeholder wired in when the caller configures no evaluator.
#[derive(Debug, Default)]
pub struct NullCodeEvaluator;

#[async_trait]
impl CodeEvaluator for NullCodeEvaluator {
    async fn invoke(&self, _source: &str, _input: Value) -> Result<Value, NodeError> {
        Err(NodeError::ServiceError(
            "no code evaluator configured".to_string(),
        ))
    }
}
