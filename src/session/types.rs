use serde::{Deserialize, Serialize};

/// Optional body of `POST /api/chatkit/session`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionRequest {
    /// Domain the ChatKit widget is embedded on
    #[serde(default)]
    pub origin: Option<String>,
}

/// Outcome of a session request, always answered with HTTP 200
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SessionResult {
    Created {
        client_secret: String,
        origin: Option<String>,
    },
    Failed(SessionFailure),
}

/// Error payload; the optional fields carry the raw upstream diagnostic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionFailure {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_response: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl SessionFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status_code: None,
            openai_response: None,
            raw_response: None,
        }
    }
}

impl SessionResult {
    pub fn is_created(&self) -> bool {
        matches!(self, SessionResult::Created { .. })
    }
}
