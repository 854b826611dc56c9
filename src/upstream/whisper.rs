use super::{build_http_client, UpstreamError};
use crate::config::TranscriptionConfig;
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;

/// Audio received from the browser, forwarded as-is
#[derive(Debug, Clone)]
pub struct AudioUpload {
    /// Original file name; the upstream API sniffs the format from its extension
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait TranscriptionApi: Send + Sync {
    /// Return the recognized text for the uploaded audio
    async fn transcribe(&self, upload: AudioUpload) -> Result<String, UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// OpenAI-compatible `/audio/transcriptions` client
pub struct WhisperClient {
    http_client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl WhisperClient {
    /// Returns `Ok(None)` when no credential is configured.
    pub fn from_config(cfg: &TranscriptionConfig) -> Result<Option<Self>, UpstreamError> {
        let Some(api_key) = cfg.api_key() else {
            return Ok(None);
        };

        Ok(Some(Self {
            http_client: build_http_client(cfg.request_timeout_secs)?,
            endpoint: format!(
                "{}/audio/transcriptions",
                cfg.api_base.trim_end_matches('/')
            ),
            api_key: api_key.to_string(),
            model: cfg.model.clone(),
        }))
    }
}

#[async_trait]
impl TranscriptionApi for WhisperClient {
    async fn transcribe(&self, upload: AudioUpload) -> Result<String, UpstreamError> {
        let mut part = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| UpstreamError::InvalidRequest(e.to_string()))?;
        }

        let form = multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = response.json().await?;
        Ok(parsed.text.trim().to_string())
    }
}
