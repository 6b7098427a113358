use crate::error::RegistryError;
use crate::math_tool::MathTool;
use crate::search_tool::WebSearchTool;
use crate::traits::Tool;
use crate::weather_tool::WeatherTool;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Immutable name to tool mapping. Build one with [`ToolRegistry::builder`].
#[derive(Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Look up a tool; unknown names are an error.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Discovery document: `{name: {description, input_schema, output_schema}}`.
    pub fn schemas(&self) -> Value {
        let mut out = Map::new();
        for (name, tool) in &self.tools {
            out.insert(
                name.clone(),
                json!({
                    "description": tool.description(),
                    "input_schema": tool.input_schema(),
                    "output_schema": tool.output_schema(),
                }),
            );
        }
        Value::Object(out)
    }
}

#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!("Tool registered twice, keeping the latest: {}", name);
        }
        self
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

/// Registry with the built-in `math`, `weather` and `web_search` tools.
pub fn default_registry_builder() -> ToolRegistryBuilder {
    ToolRegistry::builder()
        .register(Arc::new(MathTool))
        .register(Arc::new(WeatherTool))
        .register(Arc::new(WebSearchTool))
}

pub fn build_default_registry() -> ToolRegistry {
    default_registry_builder().build()
}
