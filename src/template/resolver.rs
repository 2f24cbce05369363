//! `{{token}}` variable resolution.
//!
//! Tokens reference upstream node results by alias (`name`, `label`, or raw
//! id, in that precedence), with optional dotted property access and the
//! `input` shorthand for the first connected upstream. Unresolvable tokens
//! are left verbatim so partially-configured graphs remain inspectable.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use crate::graph::builder::WorkflowGraph;

/// Resolve every `{{token}}` in `template` against the settled results of
/// `for_node_id`'s graph. Textual substitution, run once per node
/// invocation, never cached across waves.
pub fn resolve(
    template: &str,
    for_node_id: &str,
    graph: &WorkflowGraph,
    results: &HashMap<String, Value>,
) -> String {
    let re = Regex::new(r"\{\{([^{}]+)\}\}").unwrap();
    re.replace_all(template, |caps: &regex::Captures| {
        let token = caps[1].trim();
        match resolve_reference(token, for_node_id, graph, results) {
            Some(text) => text,
            None => {
                tracing::warn!(token, node = for_node_id, "unresolved template token");
                caps[0].to_string()
            }
        }
    })
    .into_owned()
}

/// Extract all token references from a template, trimmed, in order.
pub fn extract_references(template: &str) -> Vec<String> {
    let re = Regex::new(r"\{\{([^{}]+)\}\}").unwrap();
    re.captures_iter(template)
        .map(|cap| cap[1].trim().to_string())
        .collect()
}

fn resolve_reference(
    token: &str,
    for_node_id: &str,
    graph: &WorkflowGraph,
    results: &HashMap<String, Value>,
) -> Option<String> {
    if token == "input" {
        let upstream = graph.first_upstream(for_node_id)?;
        return results.get(&upstream.id).map(display);
    }

    let (alias, path) = match token.split_once('.') {
        Some((alias, path)) => (alias, Some(path)),
        None => (token, None),
    };

    let node = graph.find_by_alias(alias)?;
    let value = results.get(&node.id)?;

    match path {
        None => Some(display(value)),
        Some(path) => access(value, path).map(|v| display(&v)),
    }
}

/// Dotted property access. Plain-string results answer `result`/`data`
/// with themselves; media-typed values unwrap to their payload.
fn access(value: &Value, path: &str) -> Option<Value> {
    let mut current = value.clone();
    for segment in path.split('.') {
        let next = match &current {
            Value::String(_) => {
                if segment == "result" || segment == "data" {
                    current.clone()
                } else {
                    return None;
                }
            }
            Value::Object(map) => {
                if let Some(found) = map.get(segment) {
                    unwrap_media(found)
                } else if media_type(&current) == Some(segment) {
                    // `.image` on a result that *is* the tagged media value.
                    map.get("data").cloned()?
                } else {
                    return None;
                }
            }
            _ => return None,
        };
        current = next;
    }
    Some(current)
}

fn media_type(value: &Value) -> Option<&str> {
    let obj = value.as_object()?;
    if obj.contains_key("data") {
        obj.get("type").and_then(Value::as_str)
    } else {
        None
    }
}

fn unwrap_media(value: &Value) -> Value {
    if media_type(value).is_some() {
        value.get("data").cloned().unwrap_or(Value::Null)
    } else {
        value.clone()
    }
}

/// Render a settled value into template text.
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{Edge, Node};
    use serde_json::json;

    fn node(id: &str, label: &str, name: Option<&str>) -> Node {
        let mut n: Node = serde_json::from_value(json!({
            "id": id, "kind": "passthrough", "label": label
        }))
        .unwrap();
        n.name = name.map(|s| s.to_string());
        n
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    fn graph(nodes: Vec<Node>, edges: Vec<Edge>) -> WorkflowGraph {
        WorkflowGraph::build(nodes, edges).unwrap()
    }

    #[test]
    fn test_alias_and_property() {
        let g = graph(
            vec![node("n1", "Summary", None), node("n2", "Sink", None)],
            vec![edge("e1", "n1", "n2")],
        );
        let mut results = HashMap::new();
        results.insert("n1".to_string(), json!({"text": "hello"}));

        assert_eq!(resolve("got: {{Summary.text}}", "n2", &g, &results), "got: hello");
    }

    #[test]
    fn test_input_shorthand_uses_first_edge() {
        let g = graph(
            vec![
                node("a", "A", None),
                node("b", "B", None),
                node("sink", "Sink", None),
            ],
            vec![edge("e1", "b", "sink"), edge("e2", "a", "sink")],
        );
        let mut results = HashMap::new();
        results.insert("a".to_string(), json!("from a"));
        results.insert("b".to_string(), json!("from b"));

        assert_eq!(resolve("{{input}}", "sink", &g, &results), "from b");
    }

    #[test]
    fn test_unresolvable_left_verbatim() {
        let g = graph(vec![node("n1", "Only", None)], vec![]);
        let results = HashMap::new();
        assert_eq!(
            resolve("x {{nope}} y {{Only}} z", "n1", &g, &results),
            "x {{nope}} y {{Only}} z"
        );
    }

    #[test]
    fn test_name_beats_label() {
        let g = graph(
            vec![
                node("n1", "Writer", None),
                node("n2", "Writer", Some("Writer")),
            ],
            vec![],
        );
        let mut results = HashMap::new();
        results.insert("n1".to_string(), json!("first"));
        results.insert("n2".to_string(), json!("named"));

        assert_eq!(resolve("{{Writer}}", "n1", &g, &results), "named");
    }

    #[test]
    fn test_plain_string_result_and_data() {
        let g = graph(vec![node("n1", "Gen", None)], vec![]);
        let mut results = HashMap::new();
        results.insert("n1".to_string(), json!("plain"));

        assert_eq!(resolve("{{Gen}}", "n1", &g, &results), "plain");
        assert_eq!(resolve("{{Gen.result}}", "n1", &g, &results), "plain");
        assert_eq!(resolve("{{Gen.data}}", "n1", &g, &results), "plain");
        // Any other property on a plain string stays unresolved.
        assert_eq!(resolve("{{Gen.other}}", "n1", &g, &results), "{{Gen.other}}");
    }

    #[test]
    fn test_media_unwrap() {
        let g = graph(vec![node("n1", "Pic", None)], vec![]);
        let mut results = HashMap::new();
        results.insert(
            "n1".to_string(),
            json!({"type": "image", "data": "base64bytes"}),
        );

        assert_eq!(resolve("{{Pic.image}}", "n1", &g, &results), "base64bytes");
        assert_eq!(resolve("{{Pic.data}}", "n1", &g, &results), "base64bytes");
    }

    #[test]
    fn test_media_sub_key_unwrap() {
        let g = graph(vec![node("n1", "Gen", None)], vec![]);
        let mut results = HashMap::new();
        results.insert(
            "n1".to_string(),
            json!({"image": {"type": "image", "data": "imgdata"}, "caption": "a cat"}),
        );

        assert_eq!(resolve("{{Gen.image}}", "n1", &g, &results), "imgdata");
        assert_eq!(resolve("{{Gen.caption}}", "n1", &g, &results), "a cat");
    }

    #[test]
    fn test_idempotent_against_unchanged_results() {
        let g = graph(vec![node("n1", "N", None)], vec![]);
        let mut results = HashMap::new();
        results.insert("n1".to_string(), json!(42));

        let once = resolve("n = {{N}}", "n1", &g, &results);
        let twice = resolve("n = {{N}}", "n1", &g, &results);
        assert_eq!(once, twice);
        assert_eq!(once, "n = 42");
    }

    #[test]
    fn test_raw_id_fallback_and_numbers() {
        let g = graph(vec![node("n1", "", None)], vec![]);
        let mut results = HashMap::new();
        results.insert("n1".to_string(), json!({"score": 0.5, "ok": true}));

        assert_eq!(resolve("{{n1.score}}/{{n1.ok}}", "n1", &g, &results), "0.5/true");
    }

    #[test]
    fn test_extract_references() {
        let refs = extract_references("a {{ x }} b {{y.z}}");
        assert_eq!(refs, vec!["x", "y.z"]);
    }

    #[test]
    fn test_object_without_property_renders_json() {
        let g = graph(vec![node("n1", "Obj", None)], vec![]);
        let mut results = HashMap::new();
        results.insert("n1".to_string(), json!({"a": 1}));
        assert_eq!(resolve("{{Obj}}", "n1", &g, &results), r#"{"a":1}"#);
    }
}
