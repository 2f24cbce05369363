//! External collaborator contracts.
//!
//! The engine's boundary is this small set of injected traits, not a wire
//! protocol. Runs work without them: nodes that need a missing service
//! fail individually with a service error while the rest of the graph
//! completes.

pub mod code;
pub mod generation;
pub mod http;

pub use code::{CodeEvaluator, NullCodeEvaluator};
pub use generation::{
    GenerationReply, GenerationRequest, GenerationService, MediaReply, NullGenerationService,
    StructuredReply, Usage,
};
pub use http::build_http_client;
