use crate::error::ToolError;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

/// Arguments passed to a tool. Keys iterate in sorted order.
pub type Arguments = Map<String, Value>;

/// A named capability the executor can invoke.
///
/// Name and description are for display and discovery only; the planner
/// never inspects them beyond the name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn input_schema(&self) -> Value {
        json!({ "type": "object" })
    }

    fn output_schema(&self) -> Value {
        json!({ "type": "object" })
    }

    /// Run the tool. A successful result is expected to be a JSON object.
    async fn run(&self, arguments: &Arguments) -> Result<Value, ToolError>;
}

/// Read an argument as a trimmed string.
///
/// Missing and null values read as empty; scalars are stringified so that
/// `{"expression": 5}` behaves like `{"expression": "5"}`.
pub fn string_arg(arguments: &Arguments, key: &str) -> String {
    match arguments.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}
