use super::{resolve_origin, SessionFailure, SessionRequest, SessionResult};
use crate::config::{redact, ChatKitConfig};
use crate::upstream::{SessionApi, SessionPayload, WorkflowRef};
use axum::http::HeaderMap;
use tracing::{error, info};

/// Upstream payload for the configured workflow and user
pub fn build_payload(cfg: &ChatKitConfig) -> SessionPayload {
    SessionPayload {
        workflow: WorkflowRef {
            id: cfg.workflow_id.clone(),
        },
        user: cfg.user_id.clone(),
    }
}

/// Create a ChatKit session. Never fails: upstream problems become `SessionResult::Failed`.
pub async fn create_session(
    api: &dyn SessionApi,
    cfg: &ChatKitConfig,
    request: &SessionRequest,
    headers: &HeaderMap,
) -> SessionResult {
    let origin = resolve_origin(request.origin.as_deref(), headers);

    info!(
        "Creating session for origin: {:?} (user={}, domain_key={})",
        origin,
        cfg.user_id,
        cfg.domain_key().map(redact).unwrap_or_else(|| "<none>".to_string())
    );

    let payload = build_payload(cfg);
    let response = match api.create_session(&payload).await {
        Ok(response) => response,
        Err(e) => {
            error!("ChatKit request failed: {}", e);
            return SessionResult::Failed(SessionFailure::new(format!(
                "OpenAI API request failed: {}",
                e
            )));
        }
    };

    info!("ChatKit API response: {}", response.status);

    if response.status != 200 {
        error!("ChatKit error response: {}", response.body);
        return SessionResult::Failed(SessionFailure {
            status_code: Some(response.status),
            ..SessionFailure::new(format!("OpenAI API error: {}", response.body))
        });
    }

    let data: serde_json::Value = match serde_json::from_str(&response.body) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to parse ChatKit response: {}", e);
            return SessionResult::Failed(SessionFailure {
                raw_response: Some(response.body),
                ..SessionFailure::new(format!("Failed to parse OpenAI response: {}", e))
            });
        }
    };

    match data.get("client_secret").and_then(|v| v.as_str()) {
        Some(secret) if !secret.is_empty() => {
            info!("Session created, client_secret: {}", redact(secret));
            SessionResult::Created {
                client_secret: secret.to_string(),
                origin,
            }
        }
        _ => {
            error!("No client_secret in ChatKit response: {}", data);
            SessionResult::Failed(SessionFailure {
                openai_response: Some(data),
                ..SessionFailure::new("No client_secret returned from OpenAI API")
            })
        }
    }
}
