//! Graph model, construction, and validation.

pub mod builder;
pub mod types;
pub mod validator;

pub use builder::{build_dependency_map, WorkflowGraph};
pub use types::{Edge, Node, NodeKind, NodeStatus};
pub use validator::{validate, ValidationReport};
