//! Static graph validation.
//!
//! All checks are accumulated into one report rather than short-circuiting,
//! so a half-built canvas surfaces every structural problem at once. The
//! scheduler refuses to start on an invalid report.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::graph::types::{Edge, Node};

/// Outcome of [`validate`]. `valid` is false iff `errors` is non-empty.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Validate a graph document before execution.
///
/// Checks, all accumulated:
/// 1. at least one entry node and at least one terminal node exist;
/// 2. every edge endpoint references a known node id;
/// 3. self-loops and duplicate edges between the same pair are rejected as
///    degenerate;
/// 4. every non-entry node appears as a source or target of some edge;
/// 5. no cycle exists in the dependency relation.
pub fn validate(nodes: &[Node], edges: &[Edge]) -> ValidationReport {
    let mut errors = Vec::new();

    if !nodes.iter().any(|n| n.kind.is_entry()) {
        errors.push("Workflow has no entry node".to_string());
    }
    if !nodes.iter().any(|n| n.kind.is_terminal()) {
        errors.push("Workflow has no terminal node".to_string());
    }

    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut seen_pairs: HashSet<(&str, &str)> = HashSet::new();
    for edge in edges {
        for endpoint in [&edge.source, &edge.target] {
            if !known.contains(endpoint.as_str()) {
                errors.push(format!(
                    "Edge {} references unknown node: {}",
                    edge.id, endpoint
                ));
            }
        }
        if edge.source == edge.target {
            errors.push(format!(
                "Edge {} is a self-loop on node {}",
                edge.id, edge.source
            ));
        }
        if !seen_pairs.insert((edge.source.as_str(), edge.target.as_str())) {
            errors.push(format!(
                "Duplicate edge from {} to {}",
                edge.source, edge.target
            ));
        }
    }

    let mut connected: HashSet<&str> = HashSet::new();
    for edge in edges {
        connected.insert(edge.source.as_str());
        connected.insert(edge.target.as_str());
    }
    for node in nodes {
        if !node.kind.is_entry() && !connected.contains(node.id.as_str()) {
            errors.push(format!("Node {} is not connected", node.id));
        }
    }

    errors.extend(find_cycles(nodes, edges));

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// DFS with a recursion stack. The first cycle found from each DFS root is
/// reported with its node path; the scan then continues over remaining
/// unvisited nodes so independent cycles all surface.
fn find_cycles(nodes: &[Node], edges: &[Edge]) -> Vec<String> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in edges {
        if known.contains(edge.source.as_str()) && known.contains(edge.target.as_str()) {
            adjacency
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }
    }

    let mut color: HashMap<&str, Color> =
        nodes.iter().map(|n| (n.id.as_str(), Color::White)).collect();
    let mut errors = Vec::new();

    for node in nodes {
        if color[node.id.as_str()] == Color::White {
            let mut stack: Vec<&str> = Vec::new();
            if let Some(cycle) = visit(node.id.as_str(), &adjacency, &mut color, &mut stack) {
                errors.push(format!("Cycle detected: {}", cycle.join(" -> ")));
            }
        }
    }

    errors
}

fn visit<'a>(
    node: &'a str,
    adjacency: &HashMap<&'a str, Vec<&'a str>>,
    color: &mut HashMap<&'a str, Color>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    color.insert(node, Color::Gray);
    stack.push(node);

    if let Some(successors) = adjacency.get(node) {
        for &next in successors {
            match color[next] {
                Color::Gray => {
                    // Found the back edge; report the stack slice from the
                    // re-entered node, closed with it.
                    let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                    let mut path: Vec<String> =
                        stack[start..].iter().map(|s| s.to_string()).collect();
                    path.push(next.to_string());
                    stack.pop();
                    color.insert(node, Color::Black);
                    return Some(path);
                }
                Color::White => {
                    if let Some(cycle) = visit(next, adjacency, color, stack) {
                        stack.pop();
                        color.insert(node, Color::Black);
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }
    }

    stack.pop();
    color.insert(node, Color::Black);
    None
}
