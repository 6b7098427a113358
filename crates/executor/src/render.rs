//! Final output rendering from accumulated tool outcomes.

use crate::outcome::{CallOutcome, ContextEntry};
use agent_runtime_core::templates;
use serde_json::Value;

pub const DEFAULT_OUTPUT: &str = "Done.";
pub const NO_RESULTS: &str = "No results.";
pub const NO_MATH_RESULT: &str = "No math result.";

const MAX_ECHOED_INPUT_CHARS: usize = 80;
const ELIDED_INPUT: &str = "expression";
const INTEGRAL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Math,
    Weather,
    WeatherPlusMath,
    SearchSummary,
    Default,
}

impl Template {
    /// Unknown names render as `Default`.
    pub fn parse(name: &str) -> Self {
        match name {
            templates::MATH => Template::Math,
            templates::WEATHER => Template::Weather,
            templates::WEATHER_PLUS_MATH => Template::WeatherPlusMath,
            templates::SEARCH_SUMMARY => Template::SearchSummary,
            _ => Template::Default,
        }
    }
}

pub struct RenderContext<'a> {
    pub user_input: &'a str,
    pub results: &'a [ContextEntry],
}

impl<'a> RenderContext<'a> {
    pub fn new(user_input: &'a str, results: &'a [ContextEntry]) -> Self {
        Self {
            user_input,
            results,
        }
    }

    /// First outcome recorded for `tool_name`, in merge order.
    pub fn find(&self, tool_name: &str) -> Option<&'a CallOutcome> {
        self.results
            .iter()
            .find(|entry| entry.call.tool_name == tool_name)
            .map(|entry| &entry.outcome)
    }
}

pub fn render(template: &str, ctx: &RenderContext<'_>) -> String {
    match Template::parse(template) {
        Template::Math => math_line(ctx),
        Template::Weather => weather_line(ctx),
        Template::WeatherPlusMath => [weather_line(ctx), math_line(ctx)]
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Template::SearchSummary => search_summary(ctx),
        Template::Default => DEFAULT_OUTPUT.to_string(),
    }
}

fn text_field(value: &Value, key: &str, default: &str) -> String {
    match value.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn math_line(ctx: &RenderContext<'_>) -> String {
    let value = match ctx.find("math") {
        None => return "Math tool was not called.".to_string(),
        Some(CallOutcome::Failure(err)) => return format!("Math tool failed: {}", err.message),
        Some(CallOutcome::Success(value)) => value,
    };
    let Some(number) = value.get("result").and_then(Value::as_f64) else {
        return NO_MATH_RESULT.to_string();
    };

    let input = ctx.user_input.trim();
    let shown = if input.chars().count() > MAX_ECHOED_INPUT_CHARS {
        ELIDED_INPUT
    } else {
        input
    };
    format!("{} = {}", shown, format_number(number))
}

fn weather_line(ctx: &RenderContext<'_>) -> String {
    match ctx.find("weather") {
        None => "Weather tool was not called.".to_string(),
        Some(CallOutcome::Failure(err)) => format!("Weather tool failed: {}", err.message),
        Some(CallOutcome::Success(value)) => format!(
            "Weather for {}: {}",
            text_field(value, "location", "Unknown"),
            text_field(value, "summary", "")
        )
        .trim()
        .to_string(),
    }
}

fn search_summary(ctx: &RenderContext<'_>) -> String {
    let value = match ctx.find("web_search") {
        None => return "Search tool was not called.".to_string(),
        Some(CallOutcome::Failure(err)) => return format!("Search tool failed: {}", err.message),
        Some(CallOutcome::Success(value)) => value,
    };
    let Some(top) = value
        .get("results")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
    else {
        return NO_RESULTS.to_string();
    };
    format!(
        "{}\n{}",
        text_field(top, "title", "Top result"),
        text_field(top, "snippet", "")
    )
    .trim()
    .to_string()
}

/// Integral values (within 1e-9 of their truncation) print without a fraction.
pub fn format_number(value: f64) -> String {
    let truncated = value.trunc();
    if (value - truncated).abs() < INTEGRAL_EPSILON {
        if truncated.abs() < 1e15 {
            return format!("{}", truncated as i64);
        }
        return format!("{:.0}", truncated);
    }
    format_fraction(value)
}

/// Shortest round-trip digits; exponent form below 1e-4 or from 1e16 up,
/// with a signed two-digit exponent (`1.5e-07`).
fn format_fraction(value: f64) -> String {
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{}", value);
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{}", value);
    };
    if (-4..16).contains(&exponent) {
        return format!("{}", value);
    }
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.abs())
}
