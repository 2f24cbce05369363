//! Transform executor: user code over the merged upstream input.

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{Node, TransformConfig};
use crate::nodes::NodeRunResult;

/// Invoke the user snippet with the merged upstream input as its sole
/// argument. The evaluator's return value becomes the node's result;
/// anything it raises propagates as this node's failure.
pub async fn execute(
    node: &Node,
    config: &TransformConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    if config.code.trim().is_empty() {
        return Err(NodeError::ConfigError(
            "Transform code is required".to_string(),
        ));
    }

    let input = rc.merged_input(&node.id);
    let value = rc.code.invoke(&config.code, input).await?;
    Ok(NodeRunResult::success(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::testing::{edge, node_from, TestHarness};
    use crate::services::CodeEvaluator;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Doubles numeric input; errors on the magic string "boom".
    struct Doubler;

    #[async_trait]
    impl CodeEvaluator for Doubler {
        async fn invoke(&self, source: &str, input: Value) -> Result<Value, NodeError> {
            if source.contains("boom") {
                return Err(NodeError::EvalError("boom".to_string()));
            }
            let n = crate::nodes::utils::as_f64(&input)
                .ok_or_else(|| NodeError::TypeError("not a number".to_string()))?;
            Ok(json!(n * 2.0))
        }
    }

    fn harness(code_errors: bool) -> (TestHarness, Node, TransformConfig) {
        let code = if code_errors { "boom" } else { "return Number(input)*2" };
        let nodes = vec![
            node_from(json!({"id": "a", "kind": "entry", "config": {"value": "5"}, "label": "A"})),
            node_from(json!({"id": "t", "kind": "transform", "config": {"code": code}, "label": "T"})),
        ];
        let mut h = TestHarness::new(nodes, vec![edge("e1", "a", "t")]).with_result("a", json!("5"));
        h.code = Box::new(Doubler);
        let node = h.graph.get_node("t").unwrap().clone();
        let cfg = TransformConfig { code: code.into() };
        (h, node, cfg)
    }

    #[tokio::test]
    async fn test_transform_doubles_input() {
        let (h, node, cfg) = harness(false);
        let result = execute(&node, &cfg, &h.ctx()).await.unwrap();
        assert_eq!(result.value, json!(10.0));
    }

    #[tokio::test]
    async fn test_evaluator_error_propagates() {
        let (h, node, cfg) = harness(true);
        assert!(matches!(
            execute(&node, &cfg, &h.ctx()).await,
            Err(NodeError::EvalError(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_code_rejected() {
        let (h, node, _) = harness(false);
        let cfg = TransformConfig { code: "  ".into() };
        assert!(matches!(
            execute(&node, &cfg, &h.ctx()).await,
            Err(NodeError::ConfigError(_))
        ));
    }
}
