//! Entry, terminal, and passthrough executors.

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{EntryConfig, Node};
use crate::nodes::NodeRunResult;
use serde_json::Value;

/// Entry nodes return their configured literal value verbatim.
pub fn entry(config: &EntryConfig) -> Result<NodeRunResult, NodeError> {
    Ok(NodeRunResult::success(config.value.clone()))
}

/// Terminal nodes pass through their first input so the run's observable
/// outputs live on them. A settled null is a legal output; an absent input
/// (failed or missing upstream) fails the terminal on its own contract.
pub fn terminal(node: &Node, rc: &RunContext<'_>) -> Result<NodeRunResult, NodeError> {
    match rc.first_input(&node.id) {
        Some(value) => Ok(NodeRunResult::success(value.clone())),
        None => Err(NodeError::ExecutionError(
            "Terminal input is required but no upstream value settled".to_string(),
        )),
    }
}

/// Identity on the first input; exists so users can rename/fan out a value.
pub fn passthrough(node: &Node, rc: &RunContext<'_>) -> Result<NodeRunResult, NodeError> {
    Ok(NodeRunResult::success(
        rc.first_input(&node.id).cloned().unwrap_or(Value::Null),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::testing::{edge, node_from, TestHarness};
    use serde_json::json;

    #[test]
    fn test_entry_literal_verbatim() {
        let cfg = EntryConfig {
            value: json!({"nested": [1, 2]}),
        };
        let result = entry(&cfg).unwrap();
        assert_eq!(result.value, json!({"nested": [1, 2]}));
    }

    #[test]
    fn test_terminal_passthrough() {
        let nodes = vec![
            node_from(json!({"id": "a", "kind": "entry", "config": {"value": 10}, "label": "A"})),
            node_from(json!({"id": "stop", "kind": "terminal", "label": "Stop"})),
        ];
        let harness =
            TestHarness::new(nodes, vec![edge("e1", "a", "stop")]).with_result("a", json!(10));
        let stop = harness.graph.get_node("stop").unwrap().clone();

        let result = terminal(&stop, &harness.ctx()).unwrap();
        assert_eq!(result.value, json!(10));
    }

    #[test]
    fn test_terminal_absent_input_fails() {
        let nodes = vec![
            node_from(json!({"id": "a", "kind": "entry", "config": {"value": 10}, "label": "A"})),
            node_from(json!({"id": "stop", "kind": "terminal", "label": "Stop"})),
        ];
        let harness = TestHarness::new(nodes, vec![edge("e1", "a", "stop")]);
        let stop = harness.graph.get_node("stop").unwrap().clone();

        assert!(matches!(
            terminal(&stop, &harness.ctx()),
            Err(NodeError::ExecutionError(_))
        ));
    }

    #[test]
    fn test_terminal_settled_null_is_success() {
        let nodes = vec![
            node_from(json!({"id": "a", "kind": "entry", "config": {"value": null}, "label": "A"})),
            node_from(json!({"id": "stop", "kind": "terminal", "label": "Stop"})),
        ];
        let harness =
            TestHarness::new(nodes, vec![edge("e1", "a", "stop")]).with_result("a", json!(null));
        let stop = harness.graph.get_node("stop").unwrap().clone();

        let result = terminal(&stop, &harness.ctx()).unwrap();
        assert_eq!(result.value, json!(null));
    }
}
