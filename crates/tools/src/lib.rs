pub mod error;
pub mod http_tool;
pub mod math_tool;
pub mod mcp_tool;
pub mod registry;
pub mod search_tool;
pub mod traits;
pub mod weather_tool;

pub use error::{RegistryError, ToolError};
pub use http_tool::{HttpTool, HttpToolConfig};
pub use math_tool::MathTool;
pub use mcp_tool::{McpTool, McpToolConfig};
pub use registry::{build_default_registry, default_registry_builder, ToolRegistry, ToolRegistryBuilder};
pub use search_tool::WebSearchTool;
pub use traits::{string_arg, Arguments, Tool};
pub use weather_tool::WeatherTool;
