//! Deterministic rules-first planner.
//!
//! Produces content-addressed call ids so plans can be compared and audited
//! without running them.

use crate::planning::{Plan, PlanStep, ToolCall};
use agent_runtime_tools::{Arguments, ToolRegistry};
use regex::Regex;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use tracing::{debug, error};

pub const DEFAULT_CITY: &str = "San Francisco";

const CALL_ID_DIGEST_LEN: usize = 12;
const WEATHER_KEYWORDS: [&str; 3] = ["weather", "forecast", "temperature"];
const OPERATORS: [char; 5] = ['+', '-', '*', '/', '^'];

pub mod templates {
    pub const WEATHER_PLUS_MATH: &str = "weather_plus_math";
    pub const MATH: &str = "math";
    pub const WEATHER: &str = "weather";
    pub const SEARCH_SUMMARY: &str = "search_summary";
    pub const DEFAULT: &str = "default";
}

/// A pattern that fails to compile is logged once and then never matches.
fn pattern(cell: &'static OnceLock<Option<Regex>>, source: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(source) {
        Ok(re) => Some(re),
        Err(e) => {
            error!("Planner pattern {:?} failed to compile: {}", source, e);
            None
        }
    })
    .as_ref()
}

fn matches(cell: &'static OnceLock<Option<Regex>>, source: &str, text: &str) -> bool {
    pattern(cell, source).is_some_and(|re| re.is_match(text))
}

static MATH_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static DIGIT_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static RUN_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static NUMBER_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static CITY_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Digit, operator, digit with optional whitespace in between.
pub fn looks_like_math(text: &str) -> bool {
    matches(&MATH_PATTERN, r"\d\s*[+\-*/^]\s*\d", text)
}

pub fn contains_number(text: &str) -> bool {
    matches(&DIGIT_PATTERN, r"\d", text)
}

pub fn mentions_weather(text: &str) -> bool {
    let lower = text.to_lowercase();
    WEATHER_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// City following "weather/forecast/temperature in|for", if any.
pub fn extract_city(text: &str) -> Option<String> {
    let re = pattern(
        &CITY_PATTERN,
        r"(?i)(?:weather|forecast|temperature)\s+(?:in|for)\s+([A-Za-z .'-]+)",
    )?;
    let city = re.captures(text)?.get(1)?.as_str().trim();
    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}

/// Best arithmetic candidate in `text`; never empty.
pub fn extract_math_expr(text: &str) -> String {
    if let Some(re) = pattern(&RUN_PATTERN, r"[0-9\s+\-*/^().]+") {
        let found = re
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|run| !run.is_empty())
            .find(|run| run.contains(&OPERATORS[..]) && run.chars().any(|c| c.is_ascii_digit()));
        if let Some(run) = found {
            return run.to_string();
        }
    }
    pattern(&NUMBER_PATTERN, r"\d+(?:\.\d+)?")
        .and_then(|re| re.find(text))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "0".to_string())
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key.clone(), canonical(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

/// `{tool}_{ordinal}_{digest}` where the digest covers the whole call tuple.
pub fn make_call_id(user_input: &str, ordinal: usize, tool_name: &str, arguments: &Arguments) -> String {
    let payload = canonical(&json!({
        "user_input": user_input,
        "ordinal": ordinal,
        "tool": tool_name,
        "arguments": Value::Object(arguments.clone()),
    }));
    let blob = payload.to_string();
    let digest = hex::encode(Sha256::digest(blob.as_bytes()));
    format!("{}_{}_{}", tool_name, ordinal, &digest[..CALL_ID_DIGEST_LEN])
}

fn single_arg(key: &str, value: &str) -> Arguments {
    let mut arguments = Arguments::new();
    arguments.insert(key.to_string(), Value::String(value.to_string()));
    arguments
}

/// Rule-based planner over the `weather`, `math` and `web_search` tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesPlanner {
    weather_available: bool,
    math_available: bool,
}

impl RulesPlanner {
    pub fn new(registry: &ToolRegistry) -> Self {
        Self {
            weather_available: registry.contains("weather"),
            math_available: registry.contains("math"),
        }
    }

    pub fn from_tool_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut planner = Self {
            weather_available: false,
            math_available: false,
        };
        for name in names {
            match name.as_ref() {
                "weather" => planner.weather_available = true,
                "math" => planner.math_available = true,
                _ => {}
            }
        }
        planner
    }

    pub fn plan(&self, user_input: &str) -> Plan {
        let text = user_input.trim();

        let wants_weather = self.weather_available && mentions_weather(text);
        let wants_math = self.math_available && (looks_like_math(text) || contains_number(text));

        let plan = if wants_weather && wants_math {
            let city = extract_city(text).unwrap_or_else(|| DEFAULT_CITY.to_string());
            let expression = extract_math_expr(text);
            let weather = self.call(text, 0, "weather", single_arg("location", &city));
            let math = self.call(text, 1, "math", single_arg("expression", &expression));
            Plan::new(
                text,
                vec![
                    PlanStep::ParallelToolCalls {
                        calls: vec![weather, math],
                    },
                    final_step(templates::WEATHER_PLUS_MATH),
                ],
            )
        } else if wants_math {
            let expression = extract_math_expr(text);
            let call = self.call(text, 0, "math", single_arg("expression", &expression));
            Plan::new(
                text,
                vec![PlanStep::ToolCall { call }, final_step(templates::MATH)],
            )
        } else if wants_weather {
            let city = extract_city(text).unwrap_or_else(|| DEFAULT_CITY.to_string());
            let call = self.call(text, 0, "weather", single_arg("location", &city));
            Plan::new(
                text,
                vec![PlanStep::ToolCall { call }, final_step(templates::WEATHER)],
            )
        } else {
            let call = self.call(text, 0, "web_search", single_arg("query", text));
            Plan::new(
                text,
                vec![
                    PlanStep::ToolCall { call },
                    final_step(templates::SEARCH_SUMMARY),
                ],
            )
        };

        debug!("Planned {:?} for input of {} chars", plan.tool_names(), text.len());
        plan
    }

    fn call(&self, user_input: &str, ordinal: usize, tool_name: &str, arguments: Arguments) -> ToolCall {
        let call_id = make_call_id(user_input, ordinal, tool_name, &arguments);
        ToolCall {
            tool_name: tool_name.to_string(),
            arguments,
            call_id,
        }
    }
}

fn final_step(template: &str) -> PlanStep {
    PlanStep::Final {
        template: template.to_string(),
    }
}
