//! Cache executor: get/set against the run-scoped store.

use serde_json::Value;

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{CacheConfig, CacheOperation, Node};
use crate::nodes::NodeRunResult;
use crate::template;

/// Keys are resolved template strings, so one graph can address the store
/// by upstream content. Concurrent get/set on the same key within a wave
/// is unspecified; the store is the one piece of state shared between
/// node operations.
pub fn execute(
    node: &Node,
    config: &CacheConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let key = template::resolve(&config.key, &node.id, rc.graph, rc.results);
    if key.is_empty() {
        return Err(NodeError::ConfigError("Cache key is required".to_string()));
    }

    let value = match config.operation {
        CacheOperation::Get => match rc.cache.get(&key) {
            Some(hit) => hit.value().clone(),
            None => {
                let input = rc.first_input(&node.id).cloned().unwrap_or(Value::Null);
                if config.write_through && !input.is_null() {
                    rc.cache.insert(key, input.clone());
                    input
                } else {
                    Value::Null
                }
            }
        },
        CacheOperation::Set => {
            let input = rc.first_input(&node.id).cloned().unwrap_or(Value::Null);
            rc.cache.insert(key, input.clone());
            input
        }
    };

    Ok(NodeRunResult::success(value))
}
