/// Engine-wide knobs, threaded through the runner builder.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard ceiling on loop iterations; an unbounded loop becomes a node
    /// error instead of hanging the run.
    pub max_loop_iterations: usize,
    /// Default timeout for HTTP-backed nodes, overridable per node.
    pub http_timeout_secs: u64,
    /// Model used when a generation node does not name one.
    pub default_model: String,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_loop_iterations: 1000,
            http_timeout_secs: 30,
            default_model: "default".to_string(),
            default_temperature: 0.7,
            default_max_tokens: 1024,
        }
    }
}
