pub mod planner;
pub mod planning;
pub mod trace;

pub use planner::{make_call_id, templates, RulesPlanner, DEFAULT_CITY};
pub use planning::{Plan, PlanStep, ToolCall};
pub use trace::{
    CallTrace, ErrorDetail, ExecutionResult, PlanStepTrace, PlanTrace, ToolCallTrace, TraceRecord,
};
