//! Node operation dispatch.
//!
//! One executor per [`NodeKind`] variant behind a single exhaustive match,
//! so the compiler guarantees every kind is handled. Executors consume
//! resolved inputs from the [`RunContext`] and communicate only through
//! their return value or error; the scheduler owns all bookkeeping.

pub mod aggregator;
pub mod cache;
pub mod conditional;
pub mod control_flow;
pub mod generate;
pub mod guardrail;
pub mod http;
pub mod loop_node;
pub mod merge;
pub mod retrieval;
pub mod splitter;
pub mod transform;
pub mod utils;

use serde_json::Value;

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{Node, NodeKind, NodeStatus};

/// What a node executor hands back to the scheduler.
#[derive(Debug, Clone)]
pub struct NodeRunResult {
    pub value: Value,
    /// `Success` for most kinds; `Warning` when a kind completes but wants
    /// the terminal-adjacent state (guardrail with failed checks).
    pub status: NodeStatus,
}

impl NodeRunResult {
    pub fn success(value: Value) -> Self {
        Self {
            value,
            status: NodeStatus::Success,
        }
    }

    pub fn warning(value: Value) -> Self {
        Self {
            value,
            status: NodeStatus::Warning,
        }
    }
}

/// Execute one node. Never mutates node identity or edges.
pub async fn dispatch(node: &Node, rc: &RunContext<'_>) -> Result<NodeRunResult, NodeError> {
    match &node.kind {
        NodeKind::Entry(cfg) => control_flow::entry(cfg),
        NodeKind::Terminal => control_flow::terminal(node, rc),
        NodeKind::Passthrough => control_flow::passthrough(node, rc),
        NodeKind::GenerateText(cfg) => generate::text(node, cfg, rc).await,
        NodeKind::GenerateStructured(cfg) => generate::structured(node, cfg, rc).await,
        NodeKind::GenerateImage(cfg) => generate::image(node, cfg, rc).await,
        NodeKind::Transform(cfg) => transform::execute(node, cfg, rc).await,
        NodeKind::Conditional(cfg) => conditional::execute(node, cfg, rc).await,
        NodeKind::Merge(cfg) => merge::execute(node, cfg, rc),
        NodeKind::HttpRequest(cfg) => http::request(node, cfg, rc).await,
        NodeKind::WebScrape(cfg) => http::scrape(node, cfg, rc).await,
        NodeKind::Loop(cfg) => loop_node::execute(node, cfg, rc).await,
        NodeKind::Splitter(cfg) => splitter::execute(node, cfg, rc),
        NodeKind::Aggregator(cfg) => aggregator::execute(node, cfg, rc),
        NodeKind::Cache(cfg) => cache::execute(node, cfg, rc),
        NodeKind::Guardrail(cfg) => guardrail::execute(node, cfg, rc),
        NodeKind::RetrievalQa(cfg) => retrieval::execute(node, cfg, rc).await,
    }
}
