//! Generation service contract.
//!
//! Backed by any generative-text provider; the engine only requires
//! success/failure plus a result payload.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::NodeError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Fully resolved prompt; template substitution happens before the
    /// service is reached.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReply {
    pub text: String,
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredReply {
    pub object: Value,
    #[serde(default)]
    pub usage: Usage,
}

/// Tagged media payload, e.g. `{"type": "image", "data": ...}` once
/// converted to a node result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaReply {
    pub media_type: String,
    pub data: Value,
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_text(&self, request: GenerationRequest)
        -> Result<GenerationReply, NodeError>;

    /// Streaming variant: implementations push incremental chunks into
    /// `chunks` before returning the final reply. The default forwards the
    /// whole reply as one chunk, so non-streaming providers need nothing
    /// extra.
    async fn generate_text_stream(
        &self,
        request: GenerationRequest,
        chunks: mpsc::UnboundedSender<String>,
    ) -> Result<GenerationReply, NodeError> {
        let reply = self.generate_text(request).await?;
        let _ = chunks.send(reply.text.clone());
        Ok(reply)
    }

    async fn generate_structured(
        &self,
        request: GenerationRequest,
        schema_description: &str,
    ) -> Result<StructuredReply, NodeError>;

    async fn generate_image(
        &self,
        request: GenerationRequest,
    ) -> Result<MediaReply, NodeError> {
        let _ = request;
        Err(NodeError::ServiceError(
            "generation service does not support image output".to_string(),
        ))
    }
}

/// Placeholder wired in when the caller configures no generation service.
/// Generation-backed nodes fail with a service error; everything else runs.
#[derive(Debug, Default)]
pub struct NullGenerationService;

#[async_trait]
impl GenerationService for NullGenerationService {
    async fn generate_text(
        &self,
        _request: GenerationRequest,
    ) -> Result<GenerationReply, NodeError> {
        Err(NodeError::ServiceError(
            "no generation service configured".to_string(),
        ))
    }

    async fn generate_structured(
        &self,
        _request: GenerationRequest,
        _schema_description: &str,
    ) -> Result<StructuredReply, NodeError> {
        Err(NodeError::ServiceError(
            "no generation service configured".to_string(),
        ))
    }
}
