//! Structured execution trace returned alongside the rendered output.

use crate::planning::{Plan, PlanStep, ToolCall};
use agent_runtime_tools::Arguments;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceRecord {
    Plan(PlanTrace),
    ToolCall(ToolCallTrace),
}

impl TraceRecord {
    pub fn as_tool_call(&self) -> Option<&ToolCallTrace> {
        match self {
            TraceRecord::ToolCall(t) => Some(t),
            TraceRecord::Plan(_) => None,
        }
    }
}

/// Snapshot of the plan, recorded before any tool runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTrace {
    pub user_input: String,
    pub steps: Vec<PlanStepTrace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStepTrace {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Arguments>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls: Option<Vec<CallTrace>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTrace {
    pub tool: String,
    pub call_id: String,
    pub arguments: Arguments,
}

impl From<&ToolCall> for CallTrace {
    fn from(call: &ToolCall) -> Self {
        Self {
            tool: call.tool_name.clone(),
            call_id: call.call_id.clone(),
            arguments: call.arguments.clone(),
        }
    }
}

impl From<&PlanStep> for PlanStepTrace {
    fn from(step: &PlanStep) -> Self {
        let mut trace = PlanStepTrace {
            kind: step.kind().to_string(),
            tool: None,
            call_id: None,
            arguments: None,
            calls: None,
            template: None,
        };
        match step {
            PlanStep::ToolCall { call } => {
                trace.tool = Some(call.tool_name.clone());
                trace.call_id = Some(call.call_id.clone());
                trace.arguments = Some(call.arguments.clone());
            }
            PlanStep::ParallelToolCalls { calls } => {
                trace.calls = Some(calls.iter().map(CallTrace::from).collect());
            }
            PlanStep::Final { template } => {
                trace.template = Some(template.clone());
            }
        }
        trace
    }
}

impl From<&Plan> for PlanTrace {
    fn from(plan: &Plan) -> Self {
        Self {
            user_input: plan.user_input.clone(),
            steps: plan.steps.iter().map(PlanStepTrace::from).collect(),
        }
    }
}

/// One attempted tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallTrace {
    pub call_id: String,
    pub tool: String,
    pub ok: bool,
    pub ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub output: String,
    pub trace: Vec<TraceRecord>,
}

impl ExecutionResult {
    pub fn tool_call_records(&self) -> impl Iterator<Item = &ToolCallTrace> {
        self.trace.iter().filter_map(TraceRecord::as_tool_call)
    }
}
