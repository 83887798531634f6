use anyhow::Context;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::error::RuntimeApiError;

/// Host and port of the runtime API, provided by the platform
pub const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

const API_VERSION: &str = "2018-06-01";
const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";
const DEADLINE_HEADER: &str = "Lambda-Runtime-Deadline-Ms";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";
const INIT_ERROR_TYPE: &str = "Runtime.InitError";

/// One pending invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub request_id: String,
    /// Milliseconds since the epoch after which the platform gives up
    pub deadline_ms: Option<u64>,
    pub payload: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorReport<'a> {
    error_message: &'a str,
    error_type: &'a str,
}

/// Client for the platform's runtime API
///
/// The platform runs one invocation at a time per process: fetch the next
/// event, handle it, post the response, repeat.
pub struct RuntimeApiClient {
    http_client: ReqwestClient,
    base_url: String,
}

impl RuntimeApiClient {
    /// `endpoint` is either `host:port` as the platform provides it or a full URL
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        let endpoint = endpoint.trim_end_matches('/');
        let root = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("http://{endpoint}")
        };

        // no request timeout: fetching the next invocation is a long poll
        let http_client = ReqwestClient::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: format!("{root}/{API_VERSION}/runtime"),
        })
    }

    /// Build a client from the platform-provided environment
    pub fn from_env() -> anyhow::Result<Self> {
        let endpoint = std::env::var(RUNTIME_API_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or(RuntimeApiError::NotConfigured)?;
        Self::new(&endpoint)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Block until the platform hands over the next event
    #[instrument(skip(self))]
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeApiError> {
        let endpoint = format!("{}/invocation/next", self.base_url);
        let response = self.http_client.get(&endpoint).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RuntimeApiError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        let headers = response.headers();
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or(RuntimeApiError::MissingRequestId)?;
        let deadline_ms = headers
            .get(DEADLINE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok());

        let payload = response.bytes().await?.to_vec();
        debug!(request_id = %request_id, bytes = payload.len(), "invocation received");

        Ok(Invocation {
            request_id,
            deadline_ms,
            payload,
        })
    }

    /// Acknowledge an invocation; the handler has no result value
    #[instrument(skip(self))]
    pub async fn send_response(&self, request_id: &str) -> Result<(), RuntimeApiError> {
        let endpoint = format!("{}/invocation/{request_id}/response", self.base_url);
        let response = self
            .http_client
            .post(&endpoint)
            .header("content-type", "application/json")
            .body("null")
            .send()
            .await?;
        Self::expect_accepted(endpoint, response.status())
    }

    /// Tell the platform that startup failed before any event was handled
    #[instrument(skip(self))]
    pub async fn report_init_error(&self, message: &str) -> Result<(), RuntimeApiError> {
        let endpoint = format!("{}/init/error", self.base_url);
        let response = self
            .http_client
            .post(&endpoint)
            .header(ERROR_TYPE_HEADER, INIT_ERROR_TYPE)
            .json(&ErrorReport {
                error_message: message,
                error_type: INIT_ERROR_TYPE,
            })
            .send()
            .await?;
        Self::expect_accepted(endpoint, response.status())
    }

    fn expect_accepted(endpoint: String, status: StatusCode) -> Result<(), RuntimeApiError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(RuntimeApiError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
            })
        }
    }
}
