use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the query gateway, read once at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub admin_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway returned unexpected status: {0}")]
    UnexpectedStatus(StatusCode),
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    params: &'a [serde_json::Value],
}

/// Client for the gateway's `/query` endpoint, which executes parameterized
/// SQL against the actual datastore. The datastore itself is opaque to us;
/// all we see is the JSON payload the gateway answers with.
#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    query_url: String,
    admin_token: String,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let query_url = format!("{}/query", config.base_url.trim_end_matches('/'));

        Ok(GatewayClient {
            client,
            query_url,
            admin_token: config.admin_token.clone(),
        })
    }

    /// Execute a single statement. The timeout covers the whole
    /// request/response cycle including reading the body. Non-2xx replies
    /// and transport failures both abort the caller; there is no retry.
    pub async fn query(
        &self,
        sql: &str,
        params: &[serde_json::Value],
    ) -> Result<serde_json::Value, GatewayError> {
        let response = self
            .client
            .post(&self.query_url)
            .bearer_auth(&self.admin_token)
            .json(&QueryRequest { query: sql, params })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "gateway rejected query");
            return Err(GatewayError::UnexpectedStatus(status));
        }

        Ok(response.json().await?)
    }
}

/// The gateway reports matched rows in a `results` array; anything else
/// (missing field, non-array, empty array) counts as no rows.
pub fn has_rows(payload: &serde_json::Value) -> bool {
    payload
        .get("results")
        .and_then(|r| r.as_array())
        .is_some_and(|rows| !rows.is_empty())
}
