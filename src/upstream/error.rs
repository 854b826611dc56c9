use thiserror::Error;

/// Errors talking to an upstream API
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS or timeout failure before a response arrived
    #[error("Upstream request failed: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status
    #[error("Upstream API error (status {status}): {body}")]
    Http { status: u16, body: String },

    /// Request could not be assembled from the inbound data
    #[error("Invalid upstream request: {0}")]
    InvalidRequest(String),

    /// Response body could not be decoded
    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    /// HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Build(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            UpstreamError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}
