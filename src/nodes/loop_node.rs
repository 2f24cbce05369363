//! Loop executor.
//!
//! Three strategies: fixed count, array iteration, and a user-code
//! continuation predicate. A hard iteration ceiling converts an unbounded
//! loop into a node error instead of hanging the run.

use serde_json::{json, Value};

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{LoopConfig, LoopType, Node};
use crate::nodes::NodeRunResult;

pub async fn execute(
    node: &Node,
    config: &LoopConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let input = rc.first_input(&node.id).cloned().unwrap_or(Value::Null);
    let ceiling = config
        .max_iterations
        .map(|m| m.min(rc.config.max_loop_iterations))
        .unwrap_or(rc.config.max_loop_iterations);

    let mut results: Vec<Value> = Vec::new();
    let mut value = input.clone();
    let mut iteration = 0usize;

    match config.loop_type {
        LoopType::Count => {
            let count = config.count.ok_or_else(|| {
                NodeError::ConfigError("Count loop requires count".to_string())
            })?;
            while iteration < count {
                guard(iteration, ceiling)?;
                value = step(config, rc, iteration, &input, &value, None).await?;
                results.push(value.clone());
                iteration += 1;
            }
        }
        LoopType::ForEach => {
            let items = input
                .as_array()
                .cloned()
                .ok_or_else(|| NodeError::TypeError("ForEach loop requires an array input".to_string()))?;
            for item in items {
                guard(iteration, ceiling)?;
                value = step(config, rc, iteration, &input, &value, Some(&item)).await?;
                results.push(value.clone());
                iteration += 1;
            }
        }
        LoopType::Condition => {
            let condition = config.condition_code.as_deref().ok_or_else(|| {
                NodeError::ConfigError("Condition loop requires conditionCode".to_string())
            })?;
            loop {
                guard(iteration, ceiling)?;
                let scope = scope_value(iteration, &input, &value, None);
                match rc.code.invoke(condition, scope).await? {
                    Value::Bool(true) => {}
                    Value::Bool(false) => break,
                    other => {
                        return Err(NodeError::TypeError(format!(
                            "Loop condition must return a boolean, got {}",
                            other
                        )))
                    }
                }
                value = step(config, rc, iteration, &input, &value, None).await?;
                results.push(value.clone());
                iteration += 1;
            }
        }
    }

    Ok(NodeRunResult::success(json!({
        "iterations": iteration,
        "results": results,
        "value": value,
    })))
}

fn guard(iteration: usize, ceiling: usize) -> Result<(), NodeError> {
    if iteration >= ceiling {
        Err(NodeError::MaxIterationsExceeded(ceiling))
    } else {
        Ok(())
    }
}

/// One iteration: run the body code if configured, else pass the item (or
/// iteration index) through.
async fn step(
    config: &LoopConfig,
    rc: &RunContext<'_>,
    iteration: usize,
    input: &Value,
    value: &Value,
    item: Option<&Value>,
) -> Result<Value, NodeError> {
    match config.body_code.as_deref() {
        Some(body) => {
            let scope = scope_value(iteration, input, value, item);
            rc.code.invoke(body, scope).await
        }
        None => Ok(match item {
            Some(item) => item.clone(),
            None => json!(iteration),
        }),
    }
}

fn scope_value(iteration: usize, input: &Value, value: &Value, item: Option<&Value>) -> Value {
    let mut scope = json!({
        "iteration": iteration,
        "input": input,
        "value": value,
    });
    if let Some(item) = item {
        scope["item"] = item.clone();
    }
    scope
}
