//! Template variable resolution.

pub mod resolver;

pub use resolver::{extract_references, resolve};
