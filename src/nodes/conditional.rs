//! Conditional executor: strategy-tagged boolean checks.

use regex::Regex;
use serde_json::{json, Value};

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{ComparisonOperator, ConditionType, ConditionalConfig, Node};
use crate::nodes::utils::{as_f64, display_string};
use crate::nodes::NodeRunResult;

/// Evaluate the configured strategy over the node's first input, producing
/// the boolean under `result`, mirrored into `conditionMet` and `passed`
/// for downstream references.
pub async fn execute(
    node: &Node,
    config: &ConditionalConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let input = rc.first_input(&node.id).cloned().unwrap_or(Value::Null);
    let met = evaluate(config, &input, rc).await?;

    Ok(NodeRunResult::success(json!({
        "result": met,
        "conditionMet": met,
        "passed": met,
    })))
}

async fn evaluate(
    config: &ConditionalConfig,
    input: &Value,
    rc: &RunContext<'_>,
) -> Result<bool, NodeError> {
    match config.condition_type {
        ConditionType::Length => {
            let len = display_string(input).chars().count();
            let min_ok = config.min_length.map_or(true, |min| len >= min);
            let max_ok = config.max_length.map_or(true, |max| len <= max);
            Ok(min_ok && max_ok)
        }
        ConditionType::Contains => {
            let needle = config.substring.as_deref().ok_or_else(|| {
                NodeError::ConfigError("Contains condition requires substring".to_string())
            })?;
            let haystack = display_string(input);
            if config.case_sensitive {
                Ok(haystack.contains(needle))
            } else {
                Ok(haystack.to_lowercase().contains(&needle.to_lowercase()))
            }
        }
        ConditionType::Regex => {
            let pattern = config.pattern.as_deref().ok_or_else(|| {
                NodeError::ConfigError("Regex condition requires pattern".to_string())
            })?;
            let re = Regex::new(pattern)
                .map_err(|e| NodeError::ConfigError(format!("Invalid pattern: {}", e)))?;
            Ok(re.is_match(&display_string(input)))
        }
        ConditionType::Numeric => {
            let operator = config.operator.ok_or_else(|| {
                NodeError::ConfigError("Numeric condition requires operator".to_string())
            })?;
            let expected = config.value.ok_or_else(|| {
                NodeError::ConfigError("Numeric condition requires value".to_string())
            })?;
            // Non-numeric input compares false rather than erroring, so a
            // failed upstream does not cascade.
            Ok(match as_f64(input) {
                Some(actual) => compare(operator, actual, expected),
                None => false,
            })
        }
        ConditionType::Code => {
            let code = config.code.as_deref().ok_or_else(|| {
                NodeError::ConfigError("Code condition requires code".to_string())
            })?;
            match rc.code.invoke(code, input.clone()).await? {
                Value::Bool(b) => Ok(b),
                other => Err(NodeError::TypeError(format!(
                    "Condition code must return a boolean, got {}",
                    display_string(&other)
                ))),
            }
        }
    }
}

fn compare(operator: ComparisonOperator, actual: f64, expected: f64) -> bool {
    match operator {
        ComparisonOperator::Equal => (actual - expected).abs() < f64::EPSILON,
        ComparisonOperator::NotEqual => (actual - expected).abs() >= f64::EPSILON,
        ComparisonOperator::GreaterThan => actual > expected,
        ComparisonOperator::GreaterOrEqual => actual >= expected,
        ComparisonOperator::LessThan => actual < expected,
        ComparisonOperator::LessOrEqual => actual <= expected,
    }
}
