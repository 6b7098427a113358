use crate::bootstrap::Runtime;
use anyhow::Result;

pub fn run(runtime: &Runtime, input: &str) -> Result<()> {
    let plan = runtime.plan(input);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
