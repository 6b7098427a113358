use crate::error::ToolError;
use crate::traits::{string_arg, Arguments, Tool};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Stub weather tool. Swap for a real API adapter behind the same name.
pub struct WeatherTool;

struct WeatherArgs {
    location: String,
}

impl WeatherArgs {
    fn from_arguments(arguments: &Arguments) -> Result<Self, ToolError> {
        let location = string_arg(arguments, "location");
        if location.is_empty() {
            return Err(ToolError::BadInput("Missing location".to_string()));
        }
        Ok(Self { location })
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Stub weather tool. Replace with a real API adapter."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": { "type": "string", "description": "City name" }
            },
            "required": ["location"]
        })
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": { "type": "string" },
                "summary": { "type": "string" }
            },
            "required": ["location", "summary"]
        })
    }

    async fn run(&self, arguments: &Arguments) -> Result<Value, ToolError> {
        let args = WeatherArgs::from_arguments(arguments)?;
        Ok(json!({
            "location": args.location,
            "summary": "Stub: 72F, clear skies.",
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_weather_stub() {
        let args = json!({"location": " Seattle "});
        let result = WeatherTool.run(args.as_object().unwrap()).await.unwrap();
        assert_eq!(result["location"], "Seattle");
        assert_eq!(result["summary"], "Stub: 72F, clear skies.");
    }

    #[tokio::test]
    async fn test_missing_location() {
        let args = json!({"location": "   "});
        let err = WeatherTool.run(args.as_object().unwrap()).await.unwrap_err();
        assert_eq!(err, ToolError::BadInput("Missing location".to_string()));
    }
}
