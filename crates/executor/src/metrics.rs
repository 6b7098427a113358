//! Metrics instrumentation for tool execution.
//!
//! Recorded through the `metrics` facade; without an installed recorder these
//! calls are no-ops.

/// Record tool execution latency.
pub fn record_tool_latency(tool: &str, duration_ms: f64) {
    metrics::histogram!("tool_execution_latency", duration_ms, "tool" => tool.to_string());
}

/// Increment the failure counter for a tool and error code.
pub fn increment_tool_failures(tool: &str, code: &str) {
    metrics::counter!(
        "tool_failures",
        1,
        "tool" => tool.to_string(),
        "code" => code.to_string()
    );
}

/// Increment the counter of calls rejected by the call budget.
pub fn increment_rate_limited(tool: &str) {
    metrics::counter!("tool_rate_limited", 1, "tool" => tool.to_string());
}
