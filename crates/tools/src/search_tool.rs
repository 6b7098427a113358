use crate::error::ToolError;
use crate::traits::{string_arg, Arguments, Tool};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Stub search tool returning a single canned result.
pub struct WebSearchTool;

struct SearchArgs {
    query: String,
}

impl SearchArgs {
    fn from_arguments(arguments: &Arguments) -> Result<Self, ToolError> {
        let query = string_arg(arguments, "query");
        if query.is_empty() {
            return Err(ToolError::BadInput("Missing query".to_string()));
        }
        Ok(Self { query })
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Stub search tool. Replace with a real search provider."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" }
            },
            "required": ["query"]
        })
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "results": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "snippet": { "type": "string" }
                        },
                        "required": ["title", "snippet"]
                    }
                }
            },
            "required": ["query", "results"]
        })
    }

    async fn run(&self, arguments: &Arguments) -> Result<Value, ToolError> {
        let args = SearchArgs::from_arguments(arguments)?;
        let snippet = format!("Search results for: {}", args.query);
        Ok(json!({
            "query": args.query,
            "results": [{ "title": "Stub result", "snippet": snippet }],
        }))
    }
}
