//! Splitter executor: deterministic text chunking.

use regex::Regex;
use serde_json::Value;

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{Node, SplitStrategy, SplitterConfig};
use crate::nodes::utils::display_string;
use crate::nodes::NodeRunResult;

pub fn execute(
    node: &Node,
    config: &SplitterConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let input = rc
        .first_input(&node.id)
        .map(display_string)
        .unwrap_or_default();

    let chunks = match &config.split {
        SplitStrategy::FixedLength {
            chunk_size,
            overlap,
        } => fixed_length(&input, *chunk_size, *overlap)?,
        SplitStrategy::Line => input
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        SplitStrategy::Sentence => sentences(&input),
        SplitStrategy::Regex { pattern } => {
            let re = Regex::new(pattern)
                .map_err(|e| NodeError::ConfigError(format!("Invalid split pattern: {}", e)))?;
            re.split(&input)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        }
    };

    Ok(NodeRunResult::success(Value::Array(
        chunks.into_iter().map(Value::String).collect(),
    )))
}

/// Character-based chunks so multi-byte text never splits inside a code
/// point. Overlap must be smaller than the chunk size or the cursor would
/// not advance.
fn fixed_length(input: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>, NodeError> {
    if chunk_size == 0 {
        return Err(NodeError::ConfigError(
            "chunkSize must be greater than zero".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(NodeError::ConfigError(
            "overlap must be smaller than chunkSize".to_string(),
        ));
    }

    let chars: Vec<char> = input.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start = end - overlap;
    }
    Ok(chunks)
}

/// Split after `.`, `!`, or `?` runs followed by whitespace.
fn sentences(input: &str) -> Vec<String> {
    let re = Regex::new(r"[^.!?]*[.!?]+|[^.!?]+").unwrap();
    re.find_iter(input)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
