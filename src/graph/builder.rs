//! Workflow graph construction.
//!
//! [`WorkflowGraph`] is the immutable structural view built once per run:
//! a petgraph [`StableDiGraph`] for traversal plus the dependency map the
//! scheduler drives ready-set computation from. Edges are fixed for the
//! duration of a run, so none of this is recomputed after construction.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::error::WorkflowError;
use crate::graph::types::{Edge, Node};

/// Node id → petgraph index.
pub type NodeIndexMap = HashMap<String, NodeIndex>;

/// Immutable per-run graph structure.
#[derive(Debug)]
pub struct WorkflowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    graph: StableDiGraph<usize, usize>,
    node_index_map: NodeIndexMap,
    dependencies: HashMap<String, HashSet<String>>,
}

impl WorkflowGraph {
    /// Build the graph structure from a node/edge document.
    ///
    /// Fails on edges referencing unknown node ids; everything else is the
    /// validator's concern.
    pub fn build(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, WorkflowError> {
        let mut graph = StableDiGraph::new();
        let mut node_index_map = HashMap::new();

        for (pos, node) in nodes.iter().enumerate() {
            let idx = graph.add_node(pos);
            node_index_map.insert(node.id.clone(), idx);
        }

        for (pos, edge) in edges.iter().enumerate() {
            let source_idx = node_index_map.get(&edge.source).ok_or_else(|| {
                WorkflowError::GraphBuildError(format!("Source node not found: {}", edge.source))
            })?;
            let target_idx = node_index_map.get(&edge.target).ok_or_else(|| {
                WorkflowError::GraphBuildError(format!("Target node not found: {}", edge.target))
            })?;
            graph.add_edge(*source_idx, *target_idx, pos);
        }

        // Every node id is a key so the scheduler never needs a fallback.
        let dependencies: HashMap<String, HashSet<String>> = nodes
            .iter()
            .map(|node| {
                let idx = node_index_map[&node.id];
                let deps = graph
                    .neighbors_directed(idx, petgraph::Direction::Incoming)
                    .filter_map(|n| graph.node_weight(n).map(|pos| nodes[*pos].id.clone()))
                    .collect();
                (node.id.clone(), deps)
            })
            .collect();

        Ok(Self {
            nodes,
            edges,
            graph,
            node_index_map,
            dependencies,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node id → set of upstream node ids. Every node id is present.
    pub fn dependencies(&self) -> &HashMap<String, HashSet<String>> {
        &self.dependencies
    }

    pub fn get_node(&self, node_id: &str) -> Option<&Node> {
        self.node_index_map
            .get(node_id)
            .and_then(|idx| self.graph.node_weight(*idx))
            .map(|pos| &self.nodes[*pos])
    }

    /// Upstream node ids in edge declaration order, duplicates preserved.
    pub fn upstream_ids(&self, node_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.target == node_id)
            .map(|e| e.source.as_str())
            .collect()
    }

    /// The first node connected as a direct upstream dependency, by edge
    /// declaration order. This backs the `{{input}}` shorthand.
    pub fn first_upstream(&self, node_id: &str) -> Option<&Node> {
        self.edges
            .iter()
            .find(|e| e.target == node_id)
            .and_then(|e| self.get_node(&e.source))
    }

    /// Resolve an alias to a node, by precedence: explicit `name` first,
    /// then `label`, then raw id. Within a tier the first match in node
    /// declaration order wins.
    pub fn find_by_alias(&self, alias: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.name.as_deref() == Some(alias))
            .or_else(|| self.nodes.iter().find(|n| n.label == alias))
            .or_else(|| self.nodes.iter().find(|n| n.id == alias))
    }
}

/// Derive the dependency map alone, without the petgraph structure.
///
/// Exposed for callers that want to inspect readiness relationships outside
/// a run.
pub fn build_dependency_map(
    nodes: &[Node],
    edges: &[Edge],
) -> HashMap<String, HashSet<String>> {
    let mut map: HashMap<String, HashSet<String>> = nodes
        .iter()
        .map(|n| (n.id.clone(), HashSet::new()))
        .collect();
    for edge in edges {
        if let Some(deps) = map.get_mut(&edge.target) {
            deps.insert(edge.source.clone());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::NodeKind;
    use serde_json::json;

    fn node(id: &str, kind: &str) -> Node {
        serde_json::from_value(json!({
            "id": id,
            "kind": kind,
            "config": if kind == "entry" { json!({"value": ""}) } else { json!(null) },
            "label": id.to_uppercase()
        }))
        .unwrap()
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

    #[test]
    fn test_build_simple_graph() {
        let nodes = vec![node("start", "entry"), node("stop", "terminal")];
        let edges = vec![edge("e1", "start", "stop")];
        let graph = WorkflowGraph::build(nodes, edges).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert!(graph.dependencies()["start"].is_empty());
        assert!(graph.dependencies()["stop"].contains("start"));
    }

    #[test]
    fn test_unknown_edge_endpoint() {
        let nodes = vec![node("start", "entry")];
        let edges = vec![edge("e1", "start", "ghost")];
        assert!(matches!(
            WorkflowGraph::build(nodes, edges),
            Err(WorkflowError::GraphBuildError(_))
        ));
    }

    #[test]
    fn test_first_upstream_declaration_order() {
        let nodes = vec![
            node("a", "entry"),
            node("b", "entry"),
            node("m", "terminal"),
        ];
        let edges = vec![edge("e2", "b", "m"), edge("e1", "a", "m")];
        let graph = WorkflowGraph::build(nodes, edges).unwrap();

        // Edge declaration order decides, not node order.
        assert_eq!(graph.first_upstream("m").unwrap().id, "b");
        assert_eq!(graph.upstream_ids("m"), vec!["b", "a"]);
    }

    #[test]
    fn test_find_by_alias_precedence() {
        let mut a = node("a", "passthrough");
        a.label = "shared".into();
        let mut b = node("b", "passthrough");
        b.label = "shared".into();
        b.name = Some("shared".into());
        let graph = WorkflowGraph::build(vec![a, b], vec![]).unwrap();

        // `name` beats `label` even though "a" is declared first.
        assert_eq!(graph.find_by_alias("shared").unwrap().id, "b");
        assert_eq!(graph.find_by_alias("a").unwrap().id, "a");
        assert!(graph.find_by_alias("missing").is_none());
    }

    #[test]
    fn test_dependency_map_has_all_keys() {
        let nodes = vec![node("a", "entry"), node("b", "terminal")];
        let map = build_dependency_map(&nodes, &[]);
        assert_eq!(map.len(), 2);
        assert!(map["a"].is_empty());
        assert!(map["b"].is_empty());
    }

    #[test]
    fn test_entry_kind_flag() {
        let n = node("start", "entry");
        assert!(matches!(n.kind, NodeKind::Entry(_)));
    }
}
