use crate::bootstrap::Runtime;
use anyhow::Result;

/// Print `{name: {description, input_schema, output_schema}}` for every tool.
pub fn run(runtime: &Runtime) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&runtime.registry().schemas())?);
    Ok(())
}
