use crate::config::Config;
use agent_runtime_core::{ExecutionResult, Plan, RulesPlanner};
use agent_runtime_executor::Executor;
use agent_runtime_tools::ToolRegistry;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Registry, planner and executor wired from one config.
pub struct Runtime {
    registry: Arc<ToolRegistry>,
    planner: RulesPlanner,
    executor: Executor,
}

impl Runtime {
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Arc::new(config.build_registry()?);
        info!(
            "Runtime ready: {} tool(s) [{}], budget {}",
            registry.count(),
            registry.names().join(", "),
            config.max_tool_calls
        );
        Ok(Self {
            planner: RulesPlanner::new(&registry),
            executor: Executor::new(registry.clone(), config.executor_config()),
            registry,
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn plan(&self, input: &str) -> Plan {
        self.planner.plan(input)
    }

    pub async fn run(&self, input: &str) -> Result<ExecutionResult> {
        let plan = self.plan(input);
        self.execute(&plan).await
    }

    pub async fn execute(&self, plan: &Plan) -> Result<ExecutionResult> {
        self.executor
            .execute(plan)
            .await
            .context("Plan execution failed")
    }
}
