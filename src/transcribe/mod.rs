//! Speech-to-text relay for `POST /api/transcribe`

use crate::config::TranscriptionConfig;
use crate::upstream::{AudioUpload, TranscriptionApi, UpstreamError};
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

/// Multipart field holding the audio blob
pub const FILE_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "audio.webm";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranscriptionResult {
    Text { text: String },
    Failed { error: String },
}

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("Server configuration error: transcription API key not set")]
    NotConfigured,

    /// Malformed or oversized upload; `status` is the client-facing code
    #[error("Invalid upload: {message}")]
    BadUpload { status: StatusCode, message: String },

    #[error("Transcription failed: {0}")]
    Upstream(#[from] UpstreamError),
}

impl TranscribeError {
    fn bad_request(message: impl Into<String>) -> Self {
        TranscribeError::BadUpload {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            TranscribeError::BadUpload { status, .. } => *status,
            TranscribeError::NotConfigured | TranscribeError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// Keeps 413 for bodies over the upload limit
impl From<MultipartError> for TranscribeError {
    fn from(err: MultipartError) -> Self {
        TranscribeError::BadUpload {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<MultipartRejection> for TranscribeError {
    fn from(rejection: MultipartRejection) -> Self {
        TranscribeError::BadUpload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Pull the audio part out of a multipart upload; other fields are skipped.
pub async fn read_upload(mut multipart: Multipart) -> Result<AudioUpload, TranscribeError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        return Ok(AudioUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(TranscribeError::bad_request(format!(
        "missing '{}' field",
        FILE_FIELD
    )))
}

/// The upstream client, provided a credential is configured.
///
/// Called before the upload is read so an unconfigured server never buffers audio.
pub fn configured_api<'a>(
    cfg: &TranscriptionConfig,
    api: Option<&'a dyn TranscriptionApi>,
) -> Result<&'a dyn TranscriptionApi, TranscribeError> {
    match (cfg.api_key(), api) {
        (Some(_), Some(api)) => Ok(api),
        _ => {
            error!("Transcription requested but no API key is configured");
            Err(TranscribeError::NotConfigured)
        }
    }
}

/// Forward one upload to the speech-to-text API.
pub async fn transcribe(
    api: &dyn TranscriptionApi,
    upload: AudioUpload,
) -> Result<String, TranscribeError> {
    info!(
        "Transcribing {} ({} bytes, type={:?})",
        upload.file_name,
        upload.bytes.len(),
        upload.content_type
    );

    let text = api.transcribe(upload).await.map_err(|e| {
        error!("Transcription upstream error: {}", e);
        TranscribeError::from(e)
    })?;

    info!("Transcription complete ({} chars)", text.len());
    Ok(text)
}
