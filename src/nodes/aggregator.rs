//! Aggregator executor: the splitter's inverse.

use serde_json::{Map, Value};

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{AggregateStrategy, AggregatorConfig, Node};
use crate::nodes::utils::display_string;
use crate::nodes::NodeRunResult;

/// Aggregate over the node's items: a single array input contributes its
/// elements, otherwise each upstream value is one item (edge order, absent
/// inputs skipped).
pub fn execute(
    node: &Node,
    config: &AggregatorConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let upstream: Vec<Value> = rc
        .upstream_values(&node.id)
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    let items: Vec<Value> = if upstream.len() == 1 {
        match upstream.into_iter().next() {
            Some(Value::Array(elems)) => elems,
            Some(other) => vec![other],
            None => Vec::new(),
        }
    } else {
        upstream
    };

    let value = match config.aggregate_strategy {
        AggregateStrategy::Concatenate => {
            let sep = config.separator.as_deref().unwrap_or("\n");
            Value::String(
                items
                    .iter()
                    .map(display_string)
                    .collect::<Vec<_>>()
                    .join(sep),
            )
        }
        AggregateStrategy::Flatten => {
            let mut flat = Vec::new();
            for item in items {
                match item {
                    Value::Array(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            Value::Array(flat)
        }
        AggregateStrategy::Merge => {
            let mut merged = Map::new();
            for item in items {
                if let Value::Object(obj) = item {
                    for (k, v) in obj {
                        merged.insert(k, v);
                    }
                }
            }
            Value::Object(merged)
        }
    };

    Ok(NodeRunResult::success(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::testing::{edge, node_from, TestHarness};
    use serde_json::json;

    fn run(strategy: &str, separator: Option<&str>, inputs: Vec<Value>) -> Value {
        let mut nodes = vec![node_from(json!({
            "id": "agg", "kind": "aggregator",
            "config": {"aggregateStrategy": strategy, "separator": separator},
            "label": "Agg"
        }))];
        let mut edges = Vec::new();
        let mut h_inputs = Vec::new();
        for (i, input) in inputs.into_iter().enumerate() {
            let id = format!("in{}", i);
            nodes.push(node_from(json!({
                "id": id, "kind": "entry", "config": {"value": null}, "label": id
            })));
            edges.push(edge(&format!("e{}", i), &id, "agg"));
            h_inputs.push((id, input));
        }
        let mut h = TestHarness::new(nodes, edges);
        for (id, input) in h_inputs {
            h = h.with_result(&id, input);
        }
        let node = h.graph.get_node("agg").unwrap().clone();
        let cfg = match &node.kind {
            crate::graph::types::NodeKind::Aggregator(cfg) => cfg.clone(),
            _ => unreachable!(),
        };
        execute(&node, &cfg, &h.ctx()).unwrap().value
    }

    #[test]
    fn test_concatenate_single_array_input() {
        let out = run("concatenate", Some(" "), vec![json!(["a", "b", "c"])]);
        assert_eq!(out, json!("a b c"));
    }

    #[test]
    fn test_concatenate_multiple_inputs_default_separator() {
        let out = run("concatenate", None, vec![json!("a"), json!("b")]);
        assert_eq!(out, json!("a\nb"));
    }

    #[test]
    fn test_flatten() {
        let out = run(
            "flatten",
            None,
            vec![json!([["a"], ["b", "c"], "d"])],
        );
        assert_eq!(out, json!(["a", "b", "c", "d"]));
    }

    #[test]
    fn test_shallow_merge_later_wins() {
        let out = run(
            "merge",
            None,
            vec![json!({"a": 1, "b": 1}), json!({"b": 2})],
        );
        assert_eq!(out, json!({"a": 1, "b": 2}));
    }
}
