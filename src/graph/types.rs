//! Graph data model: nodes, edges, node kinds, and per-node status.
//!
//! The engine reads the structural shape and per-kind config of these types
//! and never mutates the caller's collections. Run observables (status,
//! error, execution time) are emitted through the update channel instead of
//! being written back into the graph document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed unit of work in the workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Immutable unique id, assigned by the graph-editing layer.
    pub id: String,

    /// Kind tag plus kind-specific config.
    #[serde(flatten)]
    pub kind: NodeKind,

    /// Optional user alias. Takes precedence over `label` in variable lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Display label / default alias. Need not be unique.
    #[serde(default)]
    pub label: String,
}

impl Node {
    /// Alias used for `{{alias}}` references: `name` if set, else `label`
    /// if non-empty, else the raw id.
    pub fn alias(&self) -> &str {
        if let Some(name) = &self.name {
            if !name.is_empty() {
                return name;
            }
        }
        if !self.label.is_empty() {
            return &self.label;
        }
        &self.id
    }
}

/// A directed dependency link from a producing node to a consuming node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

/// Per-node execution status.
///
/// `Idle → Running → {Success, Error}`; `Warning` is a terminal-adjacent
/// state some kinds (guardrail) settle into after completing with failed
/// checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Idle,
    Running,
    Success,
    Warning,
    Error,
}

impl NodeStatus {
    /// Whether the node will not transition further within the run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NodeStatus::Success | NodeStatus::Warning | NodeStatus::Error
        )
    }
}

/// Closed set of node kinds, each carrying its config.
///
/// The dispatcher matches exhaustively over this enum, so adding a kind is a
/// compile-enforced change everywhere it matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "config", rename_all = "camelCase")]
pub enum NodeKind {
    /// Designated entry point; produces its configured literal value.
    Entry(EntryConfig),
    /// Designated terminal; passes through its first input as a run output.
    Terminal,
    /// Identity on the first input.
    Passthrough,
    GenerateText(GenerateTextConfig),
    GenerateStructured(GenerateStructuredConfig),
    GenerateImage(GenerateImageConfig),
    Transform(TransformConfig),
    Conditional(ConditionalConfig),
    Merge(MergeConfig),
    HttpRequest(HttpRequestConfig),
    WebScrape(WebScrapeConfig),
    Loop(LoopConfig),
    Splitter(SplitterConfig),
    Aggregator(AggregatorConfig),
    Cache(CacheConfig),
    Guardrail(GuardrailConfig),
    RetrievalQa(RetrievalQaConfig),
}

impl NodeKind {
    pub fn is_entry(&self) -> bool {
        matches!(self, NodeKind::Entry(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeKind::Terminal)
    }

    /// Kind tag as it appears in serialized graph documents.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Entry(_) => "entry",
            NodeKind::Terminal => "terminal",
            NodeKind::Passthrough => "passthrough",
            NodeKind::GenerateText(_) => "generateText",
            NodeKind::GenerateStructured(_) => "generateStructured",
            NodeKind::GenerateImage(_) => "generateImage",
            NodeKind::Transform(_) => "transform",
            NodeKind::Conditional(_) => "conditional",
            NodeKind::Merge(_) => "merge",
            NodeKind::HttpRequest(_) => "httpRequest",
            NodeKind::WebScrape(_) => "webScrape",
            NodeKind::Loop(_) => "loop",
            NodeKind::Splitter(_) => "splitter",
            NodeKind::Aggregator(_) => "aggregator",
            NodeKind::Cache(_) => "cache",
            NodeKind::Guardrail(_) => "guardrail",
            NodeKind::RetrievalQa(_) => "retrievalQa",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryConfig {
    /// Literal value returned verbatim when the run starts.
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTextConfig {
    /// Prompt template; `{{token}}` references are resolved at invocation.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Forward streamed chunks through the update channel before settlement.
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStructuredConfig {
    pub prompt: String,
    /// Free-form description of the expected object shape.
    pub schema_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageConfig {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformConfig {
    /// User code invoked with the merged upstream input as sole argument.
    pub code: String,
}

/// Strategy tag for [`ConditionalConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionType {
    Length,
    Contains,
    Regex,
    Numeric,
    Code,
}

/// Numeric comparison operators for `ConditionType::Numeric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessOrEqual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalConfig {
    pub condition_type: ConditionType,
    /// Length bounds (either side optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Substring for `Contains`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substring: Option<String>,
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    /// Pattern for `Regex`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Operator and operand for `Numeric`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ComparisonOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// User code for `Code`; must return a boolean.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeStrategy {
    /// Positional array of upstream values.
    Array,
    /// Newline-joined concatenation.
    Concat,
    /// Keyed object: `input1`, `input2`, ...
    Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConfig {
    pub merge_strategy: MergeStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderEntry {
    pub key: String,
    /// Value template; resolved at invocation.
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum AuthConfig {
    BearerToken { token: String },
    BasicAuth { username: String, password: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestConfig {
    #[serde(default = "default_method")]
    pub method: String,
    /// URL template.
    pub url: String,
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
    /// Raw body template, sent as-is after resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<AuthConfig>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebScrapeConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoopType {
    /// Fixed number of iterations.
    Count,
    /// One iteration per element of the array input.
    ForEach,
    /// Continue while the condition code returns `true`.
    Condition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopConfig {
    pub loop_type: LoopType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Predicate evaluated before each iteration for `Condition`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_code: Option<String>,
    /// Optional per-iteration body code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_code: Option<String>,
    /// Overrides the engine-wide iteration ceiling, never exceeding it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "strategy")]
pub enum SplitStrategy {
    /// Fixed-length character chunks with overlap.
    #[serde(rename_all = "camelCase")]
    FixedLength {
        chunk_size: usize,
        #[serde(default)]
        overlap: usize,
    },
    Line,
    Sentence,
    Regex { pattern: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitterConfig {
    #[serde(flatten)]
    pub split: SplitStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregateStrategy {
    /// Join display strings with a separator.
    Concatenate,
    /// Flatten nested arrays one level.
    Flatten,
    /// Shallow-merge objects, later keys winning.
    Merge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorConfig {
    pub aggregate_strategy: AggregateStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CacheOperation {
    Get,
    Set,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    pub operation: CacheOperation,
    /// Key template; resolved at invocation.
    pub key: String,
    /// On `Get` miss, store the node's input under the key and return it.
    #[serde(default)]
    pub write_through: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailConfig {
    #[serde(default)]
    pub blocklist: Vec<String>,
    /// Regex patterns flagged as violations when they match.
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub check_pii: bool,
    #[serde(default)]
    pub check_toxicity: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalQaConfig {
    /// Query template.
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Precomputed query embedding; without it ranking falls back to
    /// lexical token overlap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

fn default_top_k() -> usize {
    3
}
