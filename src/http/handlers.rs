use super::state::AppState;
use crate::assets::{AssetError, AssetKind};
use crate::session::{self, SessionRequest, SessionResult};
use crate::transcribe::{self, TranscriptionResult};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, Path, Request, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{debug, error, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/chatkit/session
/// Create a ChatKit session. Upstream failures are reported in the body with status 200.
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<SessionResult> {
    // Body is optional; anything unparsable counts as "no origin given"
    let request = if body.is_empty() {
        SessionRequest::default()
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            debug!("Ignoring unparsable session request body: {}", e);
            SessionRequest::default()
        })
    };

    let result = session::create_session(
        state.sessions.as_ref(),
        &state.config.chatkit,
        &request,
        &headers,
    )
    .await;

    Json(result)
}

/// POST /api/transcribe
/// Relay an uploaded audio file to the speech-to-text API
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    let outcome = async {
        // Credential first: the body is only read when it can be forwarded
        let api =
            transcribe::configured_api(&state.config.transcription, state.transcriber.as_deref())?;
        let upload = transcribe::read_upload(multipart?).await?;
        transcribe::transcribe(api, upload).await
    }
    .await;

    match outcome {
        Ok(text) => (StatusCode::OK, Json(TranscriptionResult::Text { text })),
        Err(e) => (
            e.status(),
            Json(TranscriptionResult::Failed {
                error: e.to_string(),
            }),
        ),
    }
}

/// GET /api/health
/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// GET /
pub async fn serve_index(State(state): State<AppState>, request: Request) -> Response {
    serve(&state, "", request).await
}

/// GET /{path}
/// Bundle file, or the entry document for client-side routes
pub async fn serve_asset(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: Request,
) -> Response {
    serve(&state, &path, request).await
}

async fn serve(state: &AppState, path: &str, request: Request) -> Response {
    let Some(assets) = state.assets.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let asset = match assets.resolve(path).await {
        Ok(asset) => asset,
        Err(e) if e.is_client_error() => {
            warn!("{}", e);
            return (StatusCode::NOT_FOUND, "Not Found").into_response();
        }
        Err(e) => {
            error!("Failed to resolve asset {}: {}", path, e);
            return asset_error_response(&e);
        }
    };

    if asset.kind == AssetKind::EntryDocument {
        debug!(
            "Serving entry document {} for /{}",
            assets.entry_document().display(),
            path
        );
    }

    match ServeFile::new(&asset.path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

fn asset_error_response(e: &AssetError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to serve asset: {}", e),
    )
        .into_response()
}
