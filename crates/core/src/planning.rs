use agent_runtime_tools::Arguments;
use serde::{Deserialize, Serialize};

/// One tool invocation inside a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    pub arguments: Arguments,
    pub call_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanStep {
    ToolCall { call: ToolCall },
    /// Calls run concurrently; their order here is the merge order.
    ParallelToolCalls { calls: Vec<ToolCall> },
    /// Terminal step naming the render template.
    Final { template: String },
}

impl PlanStep {
    pub fn kind(&self) -> &'static str {
        match self {
            PlanStep::ToolCall { .. } => "tool_call",
            PlanStep::ParallelToolCalls { .. } => "parallel_tool_calls",
            PlanStep::Final { .. } => "final",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub user_input: String,
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn new(user_input: impl Into<String>, steps: Vec<PlanStep>) -> Self {
        Self {
            user_input: user_input.into(),
            steps,
        }
    }

    /// Every tool call in step order, parallel members in declared order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.steps.iter().flat_map(|step| match step {
            PlanStep::ToolCall { call } => std::slice::from_ref(call).iter(),
            PlanStep::ParallelToolCalls { calls } => calls.iter(),
            PlanStep::Final { .. } => (&[] as &[ToolCall]).iter(),
        })
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_calls().map(|c| c.tool_name.as_str()).collect()
    }

    /// Template of the first `final` step, if any.
    pub fn final_template(&self) -> Option<&str> {
        self.steps.iter().find_map(|step| match step {
            PlanStep::Final { template } => Some(template.as_str()),
            _ => None,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
