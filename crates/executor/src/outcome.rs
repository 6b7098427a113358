use agent_runtime_core::{ErrorDetail, ToolCall};
use agent_runtime_tools::ToolError;
use serde_json::{json, Value};

/// What a single call resolved to. Tool errors, panics and malformed results
/// all end up as `Failure`; nothing escapes the call boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Success(Value),
    Failure(ErrorDetail),
}

impl CallOutcome {
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        CallOutcome::Failure(ErrorDetail {
            code: code.into(),
            message: message.into(),
        })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&ErrorDetail> {
        match self {
            CallOutcome::Failure(detail) => Some(detail),
            CallOutcome::Success(_) => None,
        }
    }

    /// Result mapping, or `{"error": {"code", "message"}}` on failure.
    pub fn to_value(&self) -> Value {
        match self {
            CallOutcome::Success(value) => value.clone(),
            CallOutcome::Failure(detail) => json!({
                "error": { "code": detail.code, "message": detail.message }
            }),
        }
    }
}

impl From<&ToolError> for CallOutcome {
    fn from(err: &ToolError) -> Self {
        CallOutcome::failure(err.code(), err.to_string())
    }
}

/// A call paired with its outcome, in merge order.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextEntry {
    pub call: ToolCall,
    pub outcome: CallOutcome,
}
