use crate::error::ToolError;
use crate::traits::{Arguments, Tool};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retries() -> u32 {
    1
}

/// Settings for a remote tool reached over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpToolConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Extra attempts after the first one.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default)]
    pub input_schema: Option<Value>,
    #[serde(default)]
    pub output_schema: Option<Value>,
}

impl HttpToolConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            url: url.into(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            input_schema: None,
            output_schema: None,
        }
    }
}

/// Tool that POSTs its arguments as JSON and returns the JSON object reply.
///
/// Timeouts, transport errors and 5xx responses are retried; 4xx responses
/// and non-object success bodies fail immediately.
pub struct HttpTool {
    config: HttpToolConfig,
    client: Client,
}

impl HttpTool {
    pub fn new(config: HttpToolConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpToolConfig {
        &self.config
    }

    async fn attempt(&self, arguments: &Arguments) -> Attempt {
        let response = match self.client.post(&self.config.url).json(arguments).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Attempt::Retry(ToolError::Timeout(format!(
                    "no response within {}ms",
                    self.config.timeout_ms
                )))
            }
            Err(e) => return Attempt::Retry(ToolError::Exception(e.to_string())),
        };

        let status = response.status();
        if status.is_client_error() {
            return Attempt::Done(Err(ToolError::HttpClientError {
                status: status.as_u16(),
            }));
        }
        if status.is_server_error() {
            return Attempt::Retry(ToolError::custom(
                "http_server_error",
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                return Attempt::Retry(ToolError::Timeout("timed out reading body".to_string()))
            }
            Err(e) => return Attempt::Retry(ToolError::Exception(e.to_string())),
        };

        match serde_json::from_slice::<Value>(&body) {
            Ok(value) if value.is_object() => Attempt::Done(Ok(value)),
            Ok(_) => Attempt::Done(Err(ToolError::HttpInvalidResponse(
                "expected a JSON object".to_string(),
            ))),
            Err(e) => Attempt::Done(Err(ToolError::HttpInvalidResponse(e.to_string()))),
        }
    }
}

enum Attempt {
    Done(Result<Value, ToolError>),
    Retry(ToolError),
}

#[async_trait]
impl Tool for HttpTool {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        &self.config.description
    }

    fn input_schema(&self) -> Value {
        self.config
            .input_schema
            .clone()
            .unwrap_or_else(|| json!({ "type": "object" }))
    }

    fn output_schema(&self) -> Value {
        self.config
            .output_schema
            .clone()
            .unwrap_or_else(|| json!({ "type": "object" }))
    }

    async fn run(&self, arguments: &Arguments) -> Result<Value, ToolError> {
        let attempts = self.config.retries + 1;
        let mut last_err = None;

        for attempt in 1..=attempts {
            debug!("POST {} (attempt {}/{})", self.config.url, attempt, attempts);
            match self.attempt(arguments).await {
                Attempt::Done(result) => return result,
                Attempt::Retry(err) => {
                    warn!(
                        "HTTP tool {} attempt {}/{} failed: {} ({})",
                        self.config.name,
                        attempt,
                        attempts,
                        err,
                        err.code()
                    );
                    last_err = Some(err);
                }
            }
        }

        let reason = last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        Err(ToolError::HttpRetryExhausted(format!(
            "{} attempt(s): {}",
            attempts, reason
        )))
    }
}
