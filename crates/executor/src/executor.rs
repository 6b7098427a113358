use crate::budget::CallBudget;
use crate::metrics;
use crate::outcome::{CallOutcome, ContextEntry};
use crate::render::{render, RenderContext};
use agent_runtime_core::{
    templates, ExecutionResult, Plan, PlanStep, PlanTrace, ToolCall, ToolCallTrace, TraceRecord,
};
use agent_runtime_tools::{RegistryError, Tool, ToolError, ToolRegistry};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

pub const DEFAULT_MAX_TOOL_CALLS: usize = 8;

/// Errors that abort a whole execution. Tool failures never show up here.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum tool invocations per `execute` call.
    pub max_tool_calls: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_tool_calls: DEFAULT_MAX_TOOL_CALLS,
        }
    }
}

/// Runs plans against a shared, read-only registry.
///
/// The executor itself holds no per-request state: every `execute` call owns
/// its own budget, trace buffer and result context, so one executor can serve
/// concurrent executions.
#[derive(Clone)]
pub struct Executor {
    registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

/// A resolved call: its outcome plus its self-contained trace record.
struct Finished {
    call: ToolCall,
    outcome: CallOutcome,
    record: ToolCallTrace,
}

enum Admission {
    Run(Arc<dyn Tool>),
    Rejected(ToolError),
}

struct ExecutionState {
    budget: CallBudget,
    trace: Vec<TraceRecord>,
    results: Vec<ContextEntry>,
}

impl ExecutionState {
    fn new(plan: &Plan, max_tool_calls: usize) -> Self {
        Self {
            budget: CallBudget::new(max_tool_calls),
            trace: vec![TraceRecord::Plan(PlanTrace::from(plan))],
            results: Vec::new(),
        }
    }

    fn record(&mut self, finished: Finished) {
        self.trace.push(TraceRecord::ToolCall(finished.record));
        self.results.push(ContextEntry {
            call: finished.call,
            outcome: finished.outcome,
        });
    }

    fn finish(self, user_input: &str, template: &str) -> ExecutionResult {
        let output = render(template, &RenderContext::new(user_input, &self.results));
        info!(
            "Execution finished: {} tool call(s), template '{}'",
            self.results.len(),
            template
        );
        ExecutionResult {
            output,
            trace: self.trace,
        }
    }
}

impl Executor {
    pub fn new(registry: Arc<ToolRegistry>, config: ExecutorConfig) -> Self {
        Self { registry, config }
    }

    pub fn with_defaults(registry: Arc<ToolRegistry>) -> Self {
        Self::new(registry, ExecutorConfig::default())
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn config(&self) -> ExecutorConfig {
        self.config
    }

    /// Execute `plan` step by step and render the final output.
    ///
    /// Only an unknown tool name fails the execution; every tool-level
    /// failure is traced and rendered instead.
    pub async fn execute(&self, plan: &Plan) -> Result<ExecutionResult, ExecutorError> {
        info!(
            "Executing plan: {} step(s), budget {} call(s)",
            plan.steps.len(),
            self.config.max_tool_calls
        );
        let mut state = ExecutionState::new(plan, self.config.max_tool_calls);

        for step in &plan.steps {
            match step {
                PlanStep::ToolCall { call } => {
                    let finished = self.run_one(call, &mut state.budget).await?;
                    state.record(finished);
                }
                PlanStep::ParallelToolCalls { calls } => {
                    for finished in self.run_parallel(calls, &mut state.budget).await? {
                        state.record(finished);
                    }
                }
                PlanStep::Final { template } => {
                    return Ok(state.finish(&plan.user_input, template));
                }
            }
        }

        Ok(state.finish(&plan.user_input, templates::DEFAULT))
    }

    async fn run_one(
        &self,
        call: &ToolCall,
        budget: &mut CallBudget,
    ) -> Result<Finished, ExecutorError> {
        let tool = self.registry.get(&call.tool_name)?;
        let admission = admit(tool, call, budget);
        Ok(dispatch(call.clone(), admission).await)
    }

    /// Fan out `calls` and join them. The returned order is the declared
    /// order, whatever order the calls complete in.
    async fn run_parallel(
        &self,
        calls: &[ToolCall],
        budget: &mut CallBudget,
    ) -> Result<Vec<Finished>, ExecutorError> {
        let tools = calls
            .iter()
            .map(|call| self.registry.get(&call.tool_name))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Launching {} parallel tool call(s)", calls.len());
        let pending: Vec<_> = calls
            .iter()
            .zip(tools)
            .map(|(call, tool)| {
                let admission = admit(tool, call, budget);
                dispatch(call.clone(), admission)
            })
            .collect();

        Ok(join_all(pending).await)
    }
}

fn admit(tool: Arc<dyn Tool>, call: &ToolCall, budget: &mut CallBudget) -> Admission {
    match budget.try_consume() {
        Ok(()) => Admission::Run(tool),
        Err(err) => {
            warn!("Rejecting {} ({}): {}", call.tool_name, call.call_id, err);
            metrics::increment_rate_limited(&call.tool_name);
            Admission::Rejected(err)
        }
    }
}

async fn dispatch(call: ToolCall, admission: Admission) -> Finished {
    match admission {
        Admission::Run(tool) => invoke(tool, call).await,
        Admission::Rejected(err) => finish(call, CallOutcome::from(&err), 0),
    }
}

/// Run one tool in its own task so a panic stays inside the call boundary.
async fn invoke(tool: Arc<dyn Tool>, call: ToolCall) -> Finished {
    debug!("Invoking tool: {} ({})", call.tool_name, call.call_id);
    let started = Instant::now();
    let arguments = call.arguments.clone();
    let task = tokio::spawn(async move { tool.run(&arguments).await });

    let outcome = match task.await {
        Ok(Ok(value)) if value.is_object() => CallOutcome::Success(value),
        Ok(Ok(_)) => CallOutcome::failure("exception", "Tool returned a non-object result"),
        Ok(Err(err)) => CallOutcome::from(&err),
        Err(join_err) => {
            error!("Tool {} did not complete: {}", call.tool_name, join_err);
            CallOutcome::failure("exception", join_error_message(join_err))
        }
    };

    let ms = started.elapsed().as_millis() as u64;
    metrics::record_tool_latency(&call.tool_name, ms as f64);
    finish(call, outcome, ms)
}

fn finish(call: ToolCall, outcome: CallOutcome, ms: u64) -> Finished {
    match outcome.error() {
        Some(err) => {
            warn!(
                "Tool {} failed in {}ms: {} ({})",
                call.tool_name, ms, err.message, err.code
            );
            metrics::increment_tool_failures(&call.tool_name, &err.code);
        }
        None => debug!("Tool {} succeeded in {}ms", call.tool_name, ms),
    }

    let record = ToolCallTrace {
        call_id: call.call_id.clone(),
        tool: call.tool_name.clone(),
        ok: outcome.is_ok(),
        ms,
        error: outcome.error().cloned(),
    };
    Finished {
        call,
        outcome,
        record,
    }
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return "Tool task was cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("Tool panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("Tool panicked: {}", message)
    } else {
        "Tool panicked".to_string()
    }
}
