use super::{build_http_client, UpstreamError};
use crate::config::ChatKitConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CHATKIT_BETA: &str = "chatkit_beta=v1";

/// Body sent to the session issuance endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub workflow: WorkflowRef,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRef {
    pub id: String,
}

/// Raw upstream answer; the body is kept verbatim so it can be relayed
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Issue a new session. Any HTTP status is `Ok`; only transport failures are `Err`.
    async fn create_session(
        &self,
        payload: &SessionPayload,
    ) -> Result<UpstreamResponse, UpstreamError>;
}

/// reqwest-backed ChatKit session client
pub struct ChatKitClient {
    http_client: Client,
    endpoint: String,
    api_key: String,
    domain_key: Option<String>,
}

impl ChatKitClient {
    pub fn new(cfg: &ChatKitConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            http_client: build_http_client(cfg.request_timeout_secs)?,
            endpoint: format!("{}/chatkit/sessions", cfg.api_base.trim_end_matches('/')),
            api_key: cfg.api_key.clone(),
            domain_key: cfg.domain_key().map(str::to_string),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SessionApi for ChatKitClient {
    async fn create_session(
        &self,
        payload: &SessionPayload,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut request = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", CHATKIT_BETA)
            .json(payload);

        if let Some(domain_key) = &self.domain_key {
            request = request.header("OpenAI-Domain-Key", domain_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        debug!("ChatKit response headers: {:?}", response.headers());

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(UpstreamResponse { status, body })
    }
}
