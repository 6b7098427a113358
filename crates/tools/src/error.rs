use thiserror::Error;

/// Recoverable tool failure. Every variant maps to a stable error code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("{0}")]
    BadInput(String),

    #[error("HTTP {status}")]
    HttpClientError { status: u16 },

    #[error("Invalid HTTP response: {0}")]
    HttpInvalidResponse(String),

    #[error("HTTP failed after retries: {0}")]
    HttpRetryExhausted(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    NotImplemented(String),

    #[error("{0}")]
    RateLimit(String),

    #[error("{0}")]
    Exception(String),

    #[error("{message}")]
    Custom { code: String, message: String },
}

impl ToolError {
    pub fn custom(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Custom {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::BadInput(_) => "bad_input",
            Self::HttpClientError { .. } => "http_client_error",
            Self::HttpInvalidResponse(_) => "http_invalid_response",
            Self::HttpRetryExhausted(_) => "http_retry_exhausted",
            Self::Timeout(_) => "timeout",
            Self::NotImplemented(_) => "not_implemented",
            Self::RateLimit(_) => "rate_limit",
            Self::Exception(_) => "exception",
            Self::Custom { code, .. } => code,
        }
    }
}

/// Registry lookup failures. These are configuration errors, not tool errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}
