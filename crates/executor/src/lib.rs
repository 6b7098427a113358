//! Plan executor: runs tool calls under a per-execution budget, merges
//! parallel results in declared order and renders the final answer.

pub mod budget;
pub mod executor;
pub mod metrics;
pub mod outcome;
pub mod render;

pub use budget::CallBudget;
pub use executor::{Executor, ExecutorConfig, ExecutorError, DEFAULT_MAX_TOOL_CALLS};
pub use outcome::{CallOutcome, ContextEntry};
pub use render::{render, RenderContext, Template, DEFAULT_OUTPUT};
