use thiserror::Error;

/// Errors raised while turning raw settings into a validated configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for the common invalid-value case
    pub fn invalid(field: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidConfigValue { field, .. } => *field,
        }
    }
}

/// Structural decode failures in the invocation payload
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Payload is not a pub/sub envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("Payload is not a scheduled notification: {0}")]
    Notification(#[source] serde_json::Error),
}

/// Errors loading the instance type reference dataset
#[derive(Error, Debug)]
pub enum InstanceDataError {
    #[error("Failed to download instance data from {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Instance data source {url} answered with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to read instance data file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse instance data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Instance data from {0} contains no instance types")]
    Empty(String),
}

/// Errors talking to the serverless platform runtime API
#[derive(Error, Debug)]
pub enum RuntimeApiError {
    #[error("Runtime API request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Runtime API answered {endpoint} with status {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    #[error("Runtime API invocation is missing the request id header")]
    MissingRequestId,

    #[error("Runtime API endpoint is not configured (AWS_LAMBDA_RUNTIME_API unset)")]
    NotConfigured,
}
