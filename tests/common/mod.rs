//! Shared test doubles: a scripted code evaluator and a canned generation
//! service. These stand in for the external collaborators so runs stay
//! offline and deterministic.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use waveflow::{
    CodeEvaluator, GenerationReply, GenerationRequest, GenerationService, NodeError,
    StructuredReply, Usage,
};

/// Interprets the handful of snippets the scenarios use. The engine treats
/// code as an opaque capability, so a lookup-table evaluator is a faithful
/// stand-in for a real sandbox.
pub struct ScriptedCode;

#[async_trait]
impl CodeEvaluator for ScriptedCode {
    async fn invoke(&self, source: &str, input: Value) -> Result<Value, NodeError> {
        let source = source.trim();

        if source.contains("throw") {
            return Err(NodeError::EvalError("broken".to_string()));
        }

        if source == "return Number(input)*2" || source == "return Number(input)*2;" {
            let n = match &input {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            }
            .ok_or_else(|| NodeError::EvalError("input is not a number".to_string()))?;
            let doubled = n * 2.0;
            return Ok(if doubled.fract() == 0.0 {
                json!(doubled as i64)
            } else {
                json!(doubled)
            });
        }

        if let Some(rest) = source.strip_prefix("return iteration < ") {
            let bound: u64 = rest
                .trim_end_matches(';')
                .trim()
                .parse()
                .map_err(|_| NodeError::EvalError("bad bound".to_string()))?;
            let iteration = input["iteration"].as_u64().unwrap_or(0);
            return Ok(json!(iteration < bound));
        }

        Err(NodeError::EvalError(format!("unknown snippet: {}", source)))
    }
}

/// Sleeps per invocation and records each node's running window so tests
/// can assert concurrency by overlap.
pub struct SlowCode {
    pub delay: Duration,
    pub windows: Arc<Mutex<Vec<(Instant, Instant)>>>,
}

impl SlowCode {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            windows: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CodeEvaluator for SlowCode {
    async fn invoke(&self, _source: &str, input: Value) -> Result<Value, NodeError> {
        let started = Instant::now();
        tokio::time::sleep(self.delay).await;
        self.windows.lock().unwrap().push((started, Instant::now()));
        Ok(input)
    }
}

/// Echoes prompts back so assertions can see exactly what the engine sent.
pub struct EchoGeneration;

#[async_trait]
impl GenerationService for EchoGeneration {
    async fn generate_text(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationReply, NodeError> {
        Ok(GenerationReply {
            text: format!("[{}] {}", request.model, request.prompt),
            usage: Usage {
                prompt_tokens: request.prompt.len() as u32,
                completion_tokens: 0,
            },
        })
    }

    async fn generate_structured(
        &self,
        request: GenerationRequest,
        schema_description: &str,
    ) -> Result<StructuredReply, NodeError> {
        Ok(StructuredReply {
            object: json!({"prompt": request.prompt, "schema": schema_description}),
            usage: Usage::default(),
        })
    }
}
