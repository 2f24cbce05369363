//! Merge executor: combines multiple upstream inputs.

use serde_json::{Map, Value};

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{MergeConfig, MergeStrategy, Node};
use crate::nodes::utils::display_string;
use crate::nodes::NodeRunResult;

/// Combine upstream values in edge declaration order. Absent inputs (failed
/// upstreams) become null in positional strategies so positions stay
/// stable, and are skipped in concatenation.
pub fn execute(
    node: &Node,
    config: &MergeConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let upstream = rc.upstream_values(&node.id);

    let value = match config.merge_strategy {
        MergeStrategy::Array => Value::Array(
            upstream
                .into_iter()
                .map(|v| v.cloned().unwrap_or(Value::Null))
                .collect(),
        ),
        MergeStrategy::Concat => Value::String(
            upstream
                .into_iter()
                .flatten()
                .map(display_string)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        MergeStrategy::Object => {
            let mut map = Map::new();
            for (i, v) in upstream.into_iter().enumerate() {
                map.insert(
                    format!("input{}", i + 1),
                    v.cloned().unwrap_or(Value::Null),
                );
            }
            Value::Object(map)
        }
    };

    Ok(NodeRunResult::success(value))
}
