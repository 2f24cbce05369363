//! Generation executors: text, structured, and image output through the
//! injected [`GenerationService`].

use serde_json::{json, Value};

use crate::core::update::WorkflowEvent;
use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{
    GenerateImageConfig, GenerateStructuredConfig, GenerateTextConfig, Node,
};
use crate::nodes::NodeRunResult;
use crate::services::GenerationRequest;
use crate::template;

/// An empty resolved prompt is an invocation-time config error, not a
/// graph-build error: the template may legitimately resolve to empty only
/// once upstream values are known.
fn resolved_prompt(template_str: &str, node: &Node, rc: &RunContext<'_>) -> Result<String, NodeError> {
    let prompt = template::resolve(template_str, &node.id, rc.graph, rc.results);
    if prompt.trim().is_empty() {
        return Err(NodeError::ConfigError("Prompt is required".to_string()));
    }
    Ok(prompt)
}

pub async fn text(
    node: &Node,
    config: &GenerateTextConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let prompt = resolved_prompt(&config.prompt, node, rc)?;
    let system_prompt = config
        .system_prompt
        .as_deref()
        .map(|s| template::resolve(s, &node.id, rc.graph, rc.results));

    let request = GenerationRequest {
        prompt,
        system_prompt,
        model: config
            .model
            .clone()
            .unwrap_or_else(|| rc.config.default_model.clone()),
        temperature: config.temperature.unwrap_or(rc.config.default_temperature),
        max_tokens: config.max_tokens.unwrap_or(rc.config.default_max_tokens),
    };

    let reply = if config.stream {
        // Incremental chunks go out on a secondary channel; settlement
        // depends only on the final reply.
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        if let Some(updates) = rc.updates {
            let updates = updates.clone();
            let node_id = node.id.clone();
            tokio::spawn(async move {
                let mut index = 0usize;
                while let Some(chunk) = rx.recv().await {
                    let _ = updates.send(WorkflowEvent::StreamingChunk {
                        node_id: node_id.clone(),
                        chunk,
                        index,
                    });
                    index += 1;
                }
            });
        }
        tokio::select! {
            _ = rc.cancellation.cancelled() => return Err(NodeError::Cancelled),
            reply = rc.generation.generate_text_stream(request, tx) => reply?,
        }
    } else {
        tokio::select! {
            _ = rc.cancellation.cancelled() => return Err(NodeError::Cancelled),
            reply = rc.generation.generate_text(request) => reply?,
        }
    };

    Ok(NodeRunResult::success(Value::String(reply.text)))
}

pub async fn structured(
    node: &Node,
    config: &GenerateStructuredConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let prompt = resolved_prompt(&config.prompt, node, rc)?;
    let request = GenerationRequest {
        prompt,
        system_prompt: None,
        model: config
            .model
            .clone()
            .unwrap_or_else(|| rc.config.default_model.clone()),
        temperature: config.temperature.unwrap_or(rc.config.default_temperature),
        max_tokens: rc.config.default_max_tokens,
    };

    let reply = tokio::select! {
        _ = rc.cancellation.cancelled() => return Err(NodeError::Cancelled),
        reply = rc.generation.generate_structured(request, &config.schema_description) => reply?,
    };

    Ok(NodeRunResult::success(reply.object))
}

pub async fn image(
    node: &Node,
    config: &GenerateImageConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let prompt = resolved_prompt(&config.prompt, node, rc)?;
    let request = GenerationRequest {
        prompt,
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
        reply = rc.generation.generate_image(request) => reply?,
    };

    Ok(NodeRunResult::success(json!({
        "type": reply.media_type,
        "data": reply.data,
    })))
}
