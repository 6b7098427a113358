use crate::error::ToolError;
use crate::traits::{Arguments, Tool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub server: String,
    pub tool: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Placeholder for an MCP-backed tool.
///
/// No transport is wired yet, so every call fails with `not_implemented`.
pub struct McpTool {
    config: McpToolConfig,
}

impl McpTool {
    pub fn new(config: McpToolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &McpToolConfig {
        &self.config
    }
}

#[async_trait]
impl Tool for McpTool {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        &self.config.description
    }

    async fn run(&self, _arguments: &Arguments) -> Result<Value, ToolError> {
        Err(ToolError::NotImplemented(format!(
            "MCP adapter not implemented for {}/{}. Wire an MCP transport here.",
            self.config.server, self.config.tool
        )))
    }
}
