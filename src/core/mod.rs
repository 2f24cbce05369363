//! Run-scoped state and plumbing: execution context, cancellation,
//! update channel, and engine configuration.

pub mod cancellation;
pub mod config;
pub mod execution_context;
pub mod runtime_context;
pub mod update;

pub use cancellation::CancellationSignal;
pub use config::EngineConfig;
pub use execution_context::ExecutionContext;
pub use runtime_context::RunContext;
pub use update::{create_update_channel, UpdateReceiver, UpdateSender, WorkflowEvent};
