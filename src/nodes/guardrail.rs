//! Guardrail executor: configurable content checks.
//!
//! Failure is data, not control flow: the node never throws on a failed
//! check; it settles with `{passed, violations}` and the `Warning` status.

use regex::Regex;
use serde_json::{json, Value};

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{GuardrailConfig, Node};
use crate::nodes::utils::display_string;
use crate::nodes::NodeRunResult;

/// Coarse PII patterns: emails, US-style phone numbers, SSNs.
const PII_PATTERNS: [(&str, &str); 3] = [
    ("email", r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"),
    ("phone", r"\b(?:\+?1[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b"),
    ("ssn", r"\b\d{3}-\d{2}-\d{4}\b"),
];

/// Token heuristic, not a classifier; matched on lowercased word bounds.
const TOXIC_TOKENS: [&str; 6] = ["idiot", "stupid", "moron", "hate", "kill", "worthless"];

pub fn execute(
    node: &Node,
    config: &GuardrailConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let input = rc
        .first_input(&node.id)
        .map(display_string)
        .unwrap_or_default();

    let mut violations: Vec<Value> = Vec::new();

    for term in &config.blocklist {
        if !term.is_empty() && input.to_lowercase().contains(&term.to_lowercase()) {
            violations.push(json!({"check": "blocklist", "detail": term}));
        }
    }

    for pattern in &config.patterns {
        let re = Regex::new(pattern)
            .map_err(|e| NodeError::ConfigError(format!("Invalid guardrail pattern: {}", e)))?;
        if re.is_match(&input) {
            violations.push(json!({"check": "pattern", "detail": pattern}));
        }
    }

    if config.check_pii {
        for (kind, pattern) in PII_PATTERNS {
            let re = Regex::new(pattern).unwrap();
            if re.is_match(&input) {
                violations.push(json!({"check": "pii", "detail": kind}));
            }
        }
    }

    if config.check_toxicity {
        let lowered = input.to_lowercase();
        for token in TOXIC_TOKENS {
            let re = Regex::new(&format!(r"\b{}\b", token)).unwrap();
            if re.is_match(&lowered) {
                violations.push(json!({"check": "toxicity", "detail": token}));
            }
        }
    }

    let passed = violations.is_empty();
    let value = json!({"passed": passed, "violations": violations});

    if passed {
        Ok(NodeRunResult::success(value))
    } else {
        tracing::warn!(node = %node.id, count = value["violations"].as_array().map(Vec::len).unwrap_or(0), "guardrail checks failed");
        Ok(NodeRunResult::warning(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::NodeStatus;
    use crate::nodes::testing::{edge, node_from, TestHarness};
    use serde_json::json;

    fn run(config: Value, input: &str) -> NodeRunResult {
        let nodes = vec![
            node_from(json!({"id": "a", "kind": "entry", "config": {"value": input}, "label": "A"})),
            node_from(json!({"id": "g", "kind": "guardrail", "config": config, "label": "Guard"})),
        ];
        let h = TestHarness::new(nodes, vec![edge("e1", "a", "g")]).with_result("a", json!(input));
        let node = h.graph.get_node("g").unwrap().clone();
        let cfg = match &node.kind {
            crate::graph::types::NodeKind::Guardrail(cfg) => cfg.clone(),
            _ => unreachable!(),
        };
        execute(&node, &cfg, &h.ctx()).unwrap()
    }

    #[test]
    fn test_clean_input_passes() {
        let result = run(json!({"blocklist": ["secret"], "checkPii": true}), "all fine here");
        assert_eq!(result.value["passed"], json!(true));
        assert_eq!(result.status, NodeStatus::Success);
    }

    #[test]
    fn test_blocklist_violation_is_warning_not_error() {
        let result = run(json!({"blocklist": ["Secret"]}), "a SECRET plan");
        assert_eq!(result.value["passed"], json!(false));
        assert_eq!(result.status, NodeStatus::Warning);
        assert_eq!(result.value["violations"][0]["check"], json!("blocklist"));
    }

    #[test]
    fn test_pii_detection() {
        let result = run(
            json!({"checkPii": true}),
            "reach me at jane@example.com or 555-123-4567",
        );
        let violations = result.value["violations"].as_array().unwrap();
        let kinds: Vec<&str> = violations
            .iter()
            .map(|v| v["detail"].as_str().unwrap())
            .collect();
        assert!(kinds.contains(&"email"));
        assert!(kinds.contains(&"phone"));
    }

    #[test]
    fn test_toxicity_heuristic() {
        let result = run(json!({"checkToxicity": true}), "you absolute IDIOT");
        assert_eq!(result.value["passed"], json!(false));
    }

    #[test]
    fn test_custom_pattern() {
        let result = run(json!({"patterns": ["\\bAPIKEY-\\d+\\b"]}), "token APIKEY-123");
        assert_eq!(result.value["violations"][0]["check"], json!("pattern"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let nodes = vec![
            node_from(json!({"id": "a", "kind": "entry", "config": {"value": "x"}, "label": "A"})),
            node_from(json!({"id": "g", "kind": "guardrail", "config": {"patterns": ["("]}, "label": "G"})),
        ];
        let h = TestHarness::new(nodes, vec![edge("e1", "a", "g")]).with_result("a", json!("x"));
        let node = h.graph.get_node("g").unwrap().clone();
        let cfg = match &node.kind {
            crate::graph::types::NodeKind::Guardrail(cfg) => cfg.clone(),
            _ => unreachable!(),
        };
        assert!(matches!(
            execute(&node, &cfg, &h.ctx()),
            Err(NodeError::ConfigError(_))
        ));
    }
}
