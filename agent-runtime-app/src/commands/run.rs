use crate::bootstrap::Runtime;
use agent_runtime_core::{ExecutionResult, Plan, TraceRecord};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `{output, trace?}`; the trace is only attached in debug mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<TraceRecord>>,
}

impl RunResponse {
    pub fn from_result(result: ExecutionResult, debug: bool) -> Self {
        Self {
            output: result.output,
            trace: debug.then_some(result.trace),
        }
    }
}

pub fn load_plan(path: &Path) -> Result<Plan> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    Plan::from_json(&content).with_context(|| format!("Invalid plan file {}", path.display()))
}

pub async fn execute(
    runtime: &Runtime,
    input: Option<&str>,
    plan_path: Option<&Path>,
    debug: bool,
) -> Result<RunResponse> {
    let plan = match (input, plan_path) {
        (_, Some(path)) => load_plan(path)?,
        (Some(input), None) => runtime.plan(input),
        (None, None) => bail!("Provide an input or --plan <file>"),
    };
    let result = runtime.execute(&plan).await?;
    Ok(RunResponse::from_result(result, debug))
}

pub async fn run(
    runtime: &Runtime,
    input: Option<&str>,
    plan_path: Option<&Path>,
    debug: bool,
) -> Result<()> {
    let response = execute(runtime, input, plan_path, debug).await?;
    if debug {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.output);
    }
    Ok(())
}
