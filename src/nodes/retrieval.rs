//! Retrieval-QA executor.
//!
//! Ranks an upstream document collection against a query (cosine
//! similarity when embeddings are available on both sides, lexical token
//! overlap otherwise), then asks the generation service to answer with
//! the top-K snippets as context.

use serde_json::{json, Value};

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{Node, RetrievalQaConfig};
use crate::nodes::utils::display_string;
use crate::nodes::NodeRunResult;
use crate::services::GenerationRequest;
use crate::template;

struct Document {
    text: String,
    embedding: Option<Vec<f32>>,
}

pub async fn execute(
    node: &Node,
    config: &RetrievalQaConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let query = template::resolve(&config.query, &node.id, rc.graph, rc.results);
    if query.trim().is_empty() {
        return Err(NodeError::ConfigError("Query is required".to_string()));
    }

    let documents = collect_documents(rc.first_input(&node.id))?;
    if documents.is_empty() {
        return Err(NodeError::ConfigError(
            "Retrieval requires an upstream document collection".to_string(),
        ));
    }

    let ranked = rank(&documents, &query, config.query_embedding.as_deref());
    let top: Vec<(usize, &Document)> = ranked
        .into_iter()
        .take(config.top_k.max(1))
        .map(|(idx, _)| (idx, &documents[idx]))
        .collect();

    let context_block = top
        .iter()
        .enumerate()
        .map(|(rank, (_, doc))| format!("[{}] {}", rank + 1, doc.text))
        .collect::<Vec<_>>()
        .join("\n");

    let request = GenerationRequest {
        prompt: format!(
            "Answer the question using only the context snippets.\n\nContext:\n{}\n\nQuestion: {}",
            context_block, query
        ),
        system_prompt: None,
        model: config
            .model
            .clone()
            .unwrap_or_else(|| rc.config.default_model.clone()),
        temperature: rc.config.default_temperature,
        max_tokens: rc.config.default_max_tokens,
    };

    let reply = tokio::select! {
        _ = rc.cancellation.cancelled() => return Err(NodeError::Cancelled),
        reply = rc.generation.generate_text(request) => reply?,
    };

    let citations: Vec<usize> = top.iter().map(|(idx, _)| *idx).collect();
    Ok(NodeRunResult::success(json!({
        "answer": reply.text,
        "citations": citations,
    })))
}

/// Accept an array of strings or of `{text, embedding?}` objects.
fn collect_documents(input: Option<&Value>) -> Result<Vec<Document>, NodeError> {
    let Some(Value::Array(items)) = input else {
        return Ok(Vec::new());
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(Document {
                text: s.clone(),
                embedding: None,
            }),
            Value::Object(obj) => {
                let text = obj
                    .get("text")
                    .map(display_string)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        NodeError::TypeError("Document object requires text".to_string())
                    })?;
                let embedding = obj.get("embedding").and_then(Value::as_array).map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_f64)
                        .map(|f| f as f32)
                        .collect()
                });
                Ok(Document { text, embedding })
            }
            other => Err(NodeError::TypeError(format!(
                "Unsupported document value: {}",
                display_string(other)
            ))),
        })
        .collect()
}

/// Indices with scores, best first. Falls back to lexical overlap when the
/// query embedding is missing or any document lacks one.
fn rank(documents: &[Document], query: &str, query_embedding: Option<&[f32]>) -> Vec<(usize, f64)> {
    let embeddings_usable = query_embedding.is_some()
        && documents.iter().all(|d| d.embedding.is_some());

    let mut scored: Vec<(usize, f64)> = documents
        .iter()
        .enumerate()
        .map(|(idx, doc)| {
            let score = if embeddings_usable {
                cosine(
                    query_embedding.unwrap_or_default(),
                    doc.embedding.as_deref().unwrap_or_default(),
                )
            } else {
                token_overlap(query, &doc.text)
            };
            (idx, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Share of query tokens present in the document, case-insensitive.
fn token_overlap(query: &str, text: &str) -> f64 {
    let query_tokens: Vec<String> = tokens(query);
    if query_tokens.is_empty() {
        return 0.0;
    }
    let doc_tokens: std::collections::HashSet<String> = tokens(text).into_iter().collect();
    let hits = query_tokens
        .iter()
        .filter(|t| doc_tokens.contains(*t))
        .count();
    hits as f64 / query_tokens.len() as f64
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
