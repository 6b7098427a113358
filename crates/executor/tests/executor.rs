//! End-to-end execution: ordering, budget, failure isolation and rendering.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use agent_runtime_core::{templates, Plan, PlanStep, RulesPlanner, ToolCall, TraceRecord};
use agent_runtime_executor::{Executor, ExecutorConfig, ExecutorError, DEFAULT_OUTPUT};
use agent_runtime_tools::{
    build_default_registry, default_registry_builder, Arguments, RegistryError, Tool, ToolError,
    ToolRegistry,
};
use async_trait::async_trait;
use futures::future::join_all;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Sleeps, counts its invocations and echoes its name.
struct DelayedTool {
    name: String,
    delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

impl DelayedTool {
    fn new(name: &str, delay_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            delay_ms,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Tool for DelayedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Sleeps then echoes its name"
    }

    async fn run(&self, _arguments: &Arguments) -> Result<Value, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        Ok(json!({ "tool": self.name }))
    }
}

struct PanickingTool;

#[async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        "math"
    }

    fn description(&self) -> &str {
        "Always panics"
    }

    async fn run(&self, _arguments: &Arguments) -> Result<Value, ToolError> {
        panic!("division by zero in tool");
    }
}

struct ScalarTool;

#[async_trait]
impl Tool for ScalarTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Returns a bare string"
    }

    async fn run(&self, _arguments: &Arguments) -> Result<Value, ToolError> {
        Ok(json!("sunny"))
    }
}

/// Math stand-in whose delay and result come from its arguments.
struct ScriptedMath;

#[async_trait]
impl Tool for ScriptedMath {
    fn name(&self) -> &str {
        "math"
    }

    fn description(&self) -> &str {
        "Sleeps delay_ms then returns value as the result"
    }

    async fn run(&self, arguments: &Arguments) -> Result<Value, ToolError> {
        let delay_ms = arguments.get("delay_ms").and_then(Value::as_u64).unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(json!({ "result": arguments.get("value").cloned().unwrap_or(Value::Null) }))
    }
}

fn call(tool: &str, ordinal: usize) -> ToolCall {
    ToolCall {
        tool_name: tool.to_string(),
        arguments: Arguments::new(),
        call_id: format!("{}_{}_test", tool, ordinal),
    }
}

fn single(tool: &str, ordinal: usize) -> PlanStep {
    PlanStep::ToolCall {
        call: call(tool, ordinal),
    }
}

fn final_step(template: &str) -> PlanStep {
    PlanStep::Final {
        template: template.to_string(),
    }
}

fn executor_with(registry: ToolRegistry, max_tool_calls: usize) -> Executor {
    Executor::new(Arc::new(registry), ExecutorConfig { max_tool_calls })
}

fn tool_order(trace: &[TraceRecord]) -> Vec<String> {
    trace
        .iter()
        .filter_map(TraceRecord::as_tool_call)
        .map(|record| record.tool.clone())
        .collect()
}

async fn run_input(input: &str) -> String {
    let registry = Arc::new(build_default_registry());
    let plan = RulesPlanner::new(&registry).plan(input);
    Executor::with_defaults(registry)
        .execute(&plan)
        .await
        .unwrap()
        .output
}

#[tokio::test]
async fn test_math_question_end_to_end() {
    assert_eq!(run_input("12*13").await, "12*13 = 156");
    assert_eq!(run_input("what is 2 ** 10").await, "what is 2 ** 10 = 1024");
    assert_eq!(run_input("what is -2^2").await, "what is -2^2 = -4");
}

#[tokio::test]
async fn test_weather_question_end_to_end() {
    assert_eq!(
        run_input("What's the weather?").await,
        "Weather for San Francisco: Stub: 72F, clear skies."
    );
}

#[tokio::test]
async fn test_weather_plus_math_end_to_end() {
    let output = run_input("weather in Seattle and 12*13").await;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Weather for Seattle"));
    assert_eq!(lines[1], "weather in Seattle and 12*13 = 156");
}

#[tokio::test]
async fn test_search_fallback_end_to_end() {
    assert_eq!(
        run_input("tell me about rust").await,
        "Stub result\nSearch results for: tell me about rust"
    );
}

#[tokio::test]
async fn test_trace_starts_with_plan_record() {
    let registry = Arc::new(build_default_registry());
    let plan = RulesPlanner::new(&registry).plan("weather in Oslo and 1+1");
    let result = Executor::with_defaults(registry).execute(&plan).await.unwrap();

    assert_eq!(result.trace.len(), 3);
    match &result.trace[0] {
        TraceRecord::Plan(record) => {
            assert_eq!(record.user_input, "weather in Oslo and 1+1");
            assert_eq!(record.steps.len(), 2);
            assert_eq!(record.steps[0].kind, "parallel_tool_calls");
        }
        other => panic!("expected plan record, got {:?}", other),
    }

    let calls = plan.tool_calls().collect::<Vec<_>>();
    for (record, call) in result.tool_call_records().zip(calls) {
        assert_eq!(record.call_id, call.call_id);
        assert!(record.ok);
        assert!(record.error.is_none());
    }

    let json = serde_json::to_value(&result.trace).unwrap();
    assert_eq!(json[0]["type"], "plan");
    assert_eq!(json[1]["type"], "tool_call");
    assert_eq!(json[1]["tool"], "weather");
}

#[tokio::test]
async fn test_parallel_results_merge_in_declared_order() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(DelayedTool::new("slow", 80)))
        .register(Arc::new(DelayedTool::new("fast", 0)))
        .build();
    let plan = Plan::new(
        "x",
        vec![PlanStep::ParallelToolCalls {
            calls: vec![call("slow", 0), call("fast", 1)],
        }],
    );

    let result = executor_with(registry, 8).execute(&plan).await.unwrap();
    assert_eq!(tool_order(&result.trace), vec!["slow", "fast"]);
}

#[tokio::test]
async fn test_parallel_members_overlap() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(DelayedTool::new("a", 150)))
        .register(Arc::new(DelayedTool::new("b", 150)))
        .build();
    let plan = Plan::new(
        "x",
        vec![PlanStep::ParallelToolCalls {
            calls: vec![call("a", 0), call("b", 1)],
        }],
    );

    let started = std::time::Instant::now();
    executor_with(registry, 8).execute(&plan).await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(290));
}

#[tokio::test]
async fn test_failing_member_does_not_cancel_slow_sibling() {
    let slow = DelayedTool::new("slow", 100);
    let counter = slow.calls.clone();
    let registry = ToolRegistry::builder()
        .register(Arc::new(slow))
        .register(Arc::new(PanickingTool))
        .build();
    let plan = Plan::new(
        "x",
        vec![PlanStep::ParallelToolCalls {
            calls: vec![call("slow", 0), call("math", 1)],
        }],
    );

    let result = executor_with(registry, 8).execute(&plan).await.unwrap();
    let records: Vec<_> = result.tool_call_records().collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].tool, "slow");
    assert!(records[0].ok);
    assert!(records[0].ms >= 90);
    assert_eq!(records[1].error.as_ref().unwrap().code, "exception");
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_same_tool_in_parallel_renders_first_declared() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(ScriptedMath))
        .build();
    let scripted = |ordinal: usize, delay_ms: u64, value: i64| {
        let mut arguments = Arguments::new();
        arguments.insert("delay_ms".to_string(), json!(delay_ms));
        arguments.insert("value".to_string(), json!(value));
        ToolCall {
            tool_name: "math".to_string(),
            arguments,
            call_id: format!("math_{}_test", ordinal),
        }
    };
    let plan = Plan::new(
        "x",
        vec![
            PlanStep::ParallelToolCalls {
                calls: vec![scripted(0, 80, 1), scripted(1, 0, 2)],
            },
            final_step(templates::MATH),
        ],
    );

    let result = executor_with(registry, 8).execute(&plan).await.unwrap();
    assert_eq!(result.output, "x = 1");
    let ids: Vec<_> = result
        .tool_call_records()
        .map(|record| record.call_id.as_str())
        .collect();
    assert_eq!(ids, vec!["math_0_test", "math_1_test"]);
}

#[tokio::test]
async fn test_budget_allows_exactly_max_calls() {
    let tool = DelayedTool::new("count", 0);
    let counter = tool.calls.clone();
    let registry = ToolRegistry::builder().register(Arc::new(tool)).build();
    let plan = Plan::new("x", (0..3).map(|i| single("count", i)).collect());

    let result = executor_with(registry, 3).execute(&plan).await.unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    assert!(result.tool_call_records().all(|record| record.ok));
}

#[tokio::test]
async fn test_call_over_budget_is_rate_limited_without_running() {
    let tool = DelayedTool::new("count", 0);
    let counter = tool.calls.clone();
    let registry = ToolRegistry::builder().register(Arc::new(tool)).build();
    let plan = Plan::new("x", (0..4).map(|i| single("count", i)).collect());

    let result = executor_with(registry, 3).execute(&plan).await.unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 3);

    let records: Vec<_> = result.tool_call_records().collect();
    assert_eq!(records.len(), 4);
    let last = records[3];
    assert!(!last.ok);
    assert_eq!(last.ms, 0);
    assert_eq!(last.error.as_ref().unwrap().code, "rate_limit");
}

#[tokio::test]
async fn test_budget_applies_to_parallel_members_in_declared_order() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(DelayedTool::new("a", 0)))
        .register(Arc::new(DelayedTool::new("b", 0)))
        .build();
    let plan = Plan::new(
        "x",
        vec![PlanStep::ParallelToolCalls {
            calls: vec![call("a", 0), call("b", 1)],
        }],
    );

    let result = executor_with(registry, 1).execute(&plan).await.unwrap();
    let records: Vec<_> = result.tool_call_records().collect();
    assert!(records[0].ok);
    assert_eq!(records[1].error.as_ref().unwrap().code, "rate_limit");
}

#[tokio::test]
async fn test_rate_limited_math_renders_failure() {
    let registry = build_default_registry();
    let plan = RulesPlanner::new(&registry).plan("weather in Oslo and 1+1");
    let result = executor_with(registry, 1).execute(&plan).await.unwrap();

    let lines: Vec<&str> = result.output.lines().collect();
    assert!(lines[0].starts_with("Weather for Oslo"));
    assert!(lines[1].starts_with("Math tool failed: Rate limit exceeded"));
}

#[tokio::test]
async fn test_panicking_tool_becomes_exception() {
    let registry = default_registry_builder()
        .register(Arc::new(PanickingTool))
        .build();
    let plan = Plan::new("1+1", vec![single("math", 0), final_step(templates::MATH)]);

    let result = executor_with(registry, 8).execute(&plan).await.unwrap();
    let record = result.tool_call_records().next().unwrap();
    let error = record.error.as_ref().unwrap();
    assert_eq!(error.code, "exception");
    assert!(error.message.contains("division by zero in tool"));
    assert!(result.output.starts_with("Math tool failed:"));
}

#[tokio::test]
async fn test_non_object_result_becomes_exception() {
    let registry = default_registry_builder()
        .register(Arc::new(ScalarTool))
        .build();
    let plan = Plan::new(
        "weather",
        vec![single("weather", 0), final_step(templates::WEATHER)],
    );

    let result = executor_with(registry, 8).execute(&plan).await.unwrap();
    let record = result.tool_call_records().next().unwrap();
    assert_eq!(record.error.as_ref().unwrap().code, "exception");
    assert_eq!(
        result.output,
        "Weather tool failed: Tool returned a non-object result"
    );
}

#[tokio::test]
async fn test_tool_error_is_traced_not_raised() {
    let registry = build_default_registry();
    let mut arguments = Arguments::new();
    arguments.insert("expression".to_string(), json!("import os"));
    let plan = Plan::new(
        "import os",
        vec![
            PlanStep::ToolCall {
                call: ToolCall {
                    tool_name: "math".to_string(),
                    arguments,
                    call_id: "math_0_test".to_string(),
                },
            },
            final_step(templates::MATH),
        ],
    );

    let result = executor_with(registry, 8).execute(&plan).await.unwrap();
    let record = result.tool_call_records().next().unwrap();
    assert_eq!(record.error.as_ref().unwrap().code, "bad_input");
    assert!(result.output.starts_with("Math tool failed:"));
}

#[tokio::test]
async fn test_unknown_tool_fails_execution() {
    let plan = Plan::new("x", vec![single("nope", 0)]);
    let err = executor_with(build_default_registry(), 8)
        .execute(&plan)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExecutorError::Registry(RegistryError::UnknownTool(ref name)) if name == "nope"
    ));
    assert_eq!(err.to_string(), "Unknown tool: nope");
}

#[tokio::test]
async fn test_unknown_parallel_member_launches_nothing() {
    let tool = DelayedTool::new("count", 0);
    let counter = tool.calls.clone();
    let registry = ToolRegistry::builder().register(Arc::new(tool)).build();
    let plan = Plan::new(
        "x",
        vec![PlanStep::ParallelToolCalls {
            calls: vec![call("count", 0), call("nope", 1)],
        }],
    );

    assert!(executor_with(registry, 8).execute(&plan).await.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_final_step_stops_execution() {
    let tool = DelayedTool::new("count", 0);
    let counter = tool.calls.clone();
    let registry = ToolRegistry::builder().register(Arc::new(tool)).build();
    let plan = Plan::new(
        "x",
        vec![
            single("count", 0),
            final_step("default"),
            single("count", 1),
        ],
    );

    let result = executor_with(registry, 8).execute(&plan).await.unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(result.tool_call_records().count(), 1);
    assert_eq!(result.output, DEFAULT_OUTPUT);
}

#[tokio::test]
async fn test_plan_without_final_renders_default() {
    let registry = build_default_registry();
    let plan = Plan::new("x", vec![single("weather", 0)]);
    let result = executor_with(registry, 8).execute(&plan).await.unwrap();
    assert_eq!(result.output, "Done.");

    let empty = Plan::new("x", Vec::new());
    let result = executor_with(build_default_registry(), 8)
        .execute(&empty)
        .await
        .unwrap();
    assert_eq!(result.output, "Done.");
    assert_eq!(result.trace.len(), 1);
}

#[tokio::test]
async fn test_concurrent_executions_have_separate_budgets() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(DelayedTool::new("count", 20)))
        .build();
    let executor = executor_with(registry, 2);
    let plan = Plan::new("x", (0..2).map(|i| single("count", i)).collect());

    let runs: Vec<_> = (0..4)
        .map(|_| {
            let executor = executor.clone();
            let plan = plan.clone();
            tokio::spawn(async move { executor.execute(&plan).await })
        })
        .collect();
    for run in join_all(runs).await {
        let result = run.unwrap().unwrap();
        assert_eq!(result.tool_call_records().count(), 2);
        assert!(result.tool_call_records().all(|record| record.ok));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_merge_order_ignores_completion_order(delays in proptest::collection::vec(0u64..25, 2..5)) {
        let mut builder = ToolRegistry::builder();
        let mut calls = Vec::new();
        for (i, delay) in delays.iter().enumerate() {
            let name = format!("t{}", i);
            builder = builder.register(Arc::new(DelayedTool::new(&name, *delay)));
            calls.push(call(&name, i));
        }
        let expected: Vec<String> = calls.iter().map(|c| c.tool_name.clone()).collect();
        let plan = Plan::new("x", vec![PlanStep::ParallelToolCalls { calls }]);
        let executor = executor_with(builder.build(), 8);

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(executor.execute(&plan)).unwrap();
        prop_assert_eq!(tool_order(&result.trace), expected);
    }
}
