use agent_runtime_executor::{ExecutorConfig, DEFAULT_MAX_TOOL_CALLS};
use agent_runtime_tools::{
    default_registry_builder, HttpTool, HttpToolConfig, McpTool, McpToolConfig, ToolRegistry,
};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

pub const CONFIG_ENV: &str = "AGENT_RUNTIME_CONFIG";
pub const BUILTIN_TOOLS: [&str; 3] = ["math", "weather", "web_search"];

fn default_max_tool_calls() -> usize {
    DEFAULT_MAX_TOOL_CALLS
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls: usize,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub http_tools: Vec<HttpToolConfig>,
    #[serde(default)]
    pub mcp_tools: Vec<McpToolConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_tool_calls: default_max_tool_calls(),
            log_filter: default_log_filter(),
            http_tools: Vec::new(),
            mcp_tools: Vec::new(),
        }
    }
}

impl Config {
    /// Load from `path` if given, otherwise use defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(content).context("Failed to parse YAML config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tool_calls == 0 {
            bail!("max_tool_calls must be at least 1");
        }

        let mut seen: HashSet<&str> = BUILTIN_TOOLS.iter().copied().collect();
        let names = self
            .http_tools
            .iter()
            .map(|tool| tool.name.as_str())
            .chain(self.mcp_tools.iter().map(|tool| tool.name.as_str()));
        for name in names {
            if name.trim().is_empty() {
                bail!("Tool names must not be empty");
            }
            if BUILTIN_TOOLS.contains(&name) {
                bail!("Tool '{}' would shadow a built-in tool", name);
            }
            if !seen.insert(name) {
                bail!("Tool '{}' is configured more than once", name);
            }
        }

        for tool in &self.http_tools {
            if !(tool.url.starts_with("http://") || tool.url.starts_with("https://")) {
                bail!(
                    "HTTP tool '{}' has unsupported url '{}': expected http:// or https://",
                    tool.name,
                    tool.url
                );
            }
        }
        Ok(())
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_tool_calls: self.max_tool_calls,
        }
    }

    /// Built-in tools plus every configured HTTP and MCP tool.
    pub fn build_registry(&self) -> Result<ToolRegistry> {
        let mut builder = default_registry_builder();
        for tool in &self.http_tools {
            let http = HttpTool::new(tool.clone())
                .with_context(|| format!("Failed to build HTTP client for '{}'", tool.name))?;
            builder = builder.register(Arc::new(http));
        }
        for tool in &self.mcp_tools {
            builder = builder.register(Arc::new(McpTool::new(tool.clone())));
        }
        Ok(builder.build())
    }
}
