//! Clients for the third-party APIs this server forwards to
//!
//! - `ChatKitClient` issues ChatKit sessions (`POST /chatkit/sessions`)
//! - `WhisperClient` transcribes uploaded audio (`POST /audio/transcriptions`)
//!
//! Handlers depend on the `SessionApi` / `TranscriptionApi` traits so tests can
//! substitute doubles for the network.

mod chatkit;
mod error;
mod whisper;

pub use chatkit::{ChatKitClient, SessionApi, SessionPayload, UpstreamResponse, WorkflowRef};
pub use error::UpstreamError;
pub use whisper::{AudioUpload, TranscriptionApi, WhisperClient};

use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

fn build_http_client(request_timeout_secs: u64) -> Result<reqwest::Client, UpstreamError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(Duration::from_secs(request_timeout_secs))
        .build()
        .map_err(|e| UpstreamError::Build(e.to_string()))
}
