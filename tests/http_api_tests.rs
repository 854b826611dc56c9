// HTTP-level tests: the full router driven with tower's `oneshot`,
// upstream APIs replaced by in-process doubles.

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chatkit_server::config::{
    AssetsConfig, ChatKitConfig, Config, ServerConfig, TranscriptionConfig,
};
use chatkit_server::upstream::{
    AudioUpload, SessionApi, SessionPayload, TranscriptionApi, UpstreamError, UpstreamResponse,
};
use chatkit_server::{create_router, AppState, AssetResolver};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "----chatkit-test-boundary";
const INDEX_HTML: &str = "<!doctype html><title>chat</title>";

struct FixedSessionApi {
    status: u16,
    body: String,
}

#[async_trait]
impl SessionApi for FixedSessionApi {
    async fn create_session(
        &self,
        _payload: &SessionPayload,
    ) -> Result<UpstreamResponse, UpstreamError> {
        Ok(UpstreamResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Counts calls and remembers the last upload
#[derive(Default)]
struct RecordingTranscriber {
    calls: AtomicUsize,
    last_upload: Mutex<Option<AudioUpload>>,
    fail: bool,
}

#[async_trait]
impl TranscriptionApi for RecordingTranscriber {
    async fn transcribe(&self, upload: AudioUpload) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_upload.lock().unwrap() = Some(upload);
        if self.fail {
            return Err(UpstreamError::Http {
                status: 400,
                body: "unsupported format".to_string(),
            });
        }
        Ok("hello world".to_string())
    }
}

fn test_config(assets_root: &Path, transcription_key: Option<&str>) -> Config {
    Config {
        server: ServerConfig {
            bind: "127.0.0.1".to_string(),
            port: 0,
        },
        chatkit: ChatKitConfig {
            api_key: "sk-test".to_string(),
            workflow_id: "wf_test".to_string(),
            domain_key: None,
            user_id: "deepspring".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 5,
        },
        transcription: TranscriptionConfig {
            api_key: transcription_key.map(str::to_string),
            model: "whisper-1".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 5,
            max_upload_bytes: 1024 * 1024,
        },
        assets: AssetsConfig {
            root: assets_root.to_path_buf(),
            index: "index.html".to_string(),
            static_prefix: "static".to_string(),
        },
    }
}

fn create_bundle() -> Result<TempDir> {
    let tmp = TempDir::new()?;
    fs::create_dir_all(tmp.path().join("static/js"))?;
    fs::write(tmp.path().join("index.html"), INDEX_HTML)?;
    fs::write(tmp.path().join("robots.txt"), "User-agent: *")?;
    fs::write(tmp.path().join("static/js/main.js"), "let x = 1;")?;
    Ok(tmp)
}

struct TestApp {
    router: Router,
    transcriber: Arc<RecordingTranscriber>,
    _bundle: TempDir,
}

fn build_app(
    session_status: u16,
    session_body: &str,
    transcription_key: Option<&str>,
    transcriber: RecordingTranscriber,
) -> Result<TestApp> {
    let bundle = create_bundle()?;
    let config = test_config(bundle.path(), transcription_key);
    let assets = AssetResolver::new(bundle.path(), "index.html", "static")?;
    let transcriber = Arc::new(transcriber);

    let state = AppState::new(
        config,
        Arc::new(FixedSessionApi {
            status: session_status,
            body: session_body.to_string(),
        }),
        Some(transcriber.clone() as Arc<dyn TranscriptionApi>),
        Some(assets),
    );

    Ok(TestApp {
        router: create_router(state),
        transcriber,
        _bundle: bundle,
    })
}

fn default_app() -> Result<TestApp> {
    build_app(
        200,
        r#"{"client_secret":"sk_abc"}"#,
        Some("sk-whisper"),
        RecordingTranscriber::default(),
    )
}

async fn send(router: &Router, request: Request<Body>) -> Result<(StatusCode, Vec<u8>)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, body.to_vec()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart_body(file_name: &str, audio: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: audio/webm\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(audio);
    body.extend_from_slice(
        format!(
            "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"model\"\r\n\r\nwhisper-1\r\n--{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );
    body
}

fn transcribe_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/transcribe")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let app = default_app()?;
    let (status, body) = send(&app.router, get("/api/health")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body)?, json!({"status": "healthy"}));
    Ok(())
}

#[tokio::test]
async fn test_session_success() -> Result<()> {
    let app = default_app()?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/chatkit/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"origin":"https://chat.example"}"#))?;

    let (status, body) = send(&app.router, request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_slice::<Value>(&body)?,
        json!({"client_secret": "sk_abc", "origin": "https://chat.example"})
    );
    Ok(())
}

#[tokio::test]
async fn test_session_without_body_uses_origin_header() -> Result<()> {
    let app = default_app()?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/chatkit/session")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())?;

    let (status, body) = send(&app.router, request).await?;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body)?;
    assert_eq!(value["origin"], "https://example.com");
    Ok(())
}

#[tokio::test]
async fn test_session_upstream_error_still_returns_200() -> Result<()> {
    let app = build_app(
        403,
        r#"{"error":"forbidden"}"#,
        None,
        RecordingTranscriber::default(),
    )?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/chatkit/session")
        .body(Body::from("not json"))?;

    let (status, body) = send(&app.router, request).await?;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body)?;
    assert_eq!(value["status_code"], 403);
    assert!(value["error"].as_str().unwrap().contains("forbidden"));
    Ok(())
}

#[tokio::test]
async fn test_cors_preflight() -> Result<()> {
    let app = default_app()?;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/chatkit/session")
        .header(header::ORIGIN, "https://somewhere.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())?;

    let response = app.router.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    Ok(())
}

#[tokio::test]
async fn test_transcribe_without_credential_makes_no_call() -> Result<()> {
    let app = build_app(
        200,
        r#"{"client_secret":"sk_abc"}"#,
        None,
        RecordingTranscriber::default(),
    )?;

    let (status, body) = send(
        &app.router,
        transcribe_request(multipart_body("clip.webm", b"RIFF....")),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_slice(&body)?;
    assert!(value["error"].as_str().unwrap().contains("not set"));
    assert_eq!(app.transcriber.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_transcribe_success_forwards_file_name() -> Result<()> {
    let app = default_app()?;

    let (status, body) = send(
        &app.router,
        transcribe_request(multipart_body("recording.webm", b"\x1a\x45\xdf\xa3audio")),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body)?, json!({"text": "hello world"}));
    assert_eq!(app.transcriber.calls.load(Ordering::SeqCst), 1);

    let upload = app.transcriber.last_upload.lock().unwrap().clone().unwrap();
    assert_eq!(upload.file_name, "recording.webm");
    assert_eq!(upload.content_type.as_deref(), Some("audio/webm"));
    assert_eq!(upload.bytes, b"\x1a\x45\xdf\xa3audio");
    Ok(())
}

#[tokio::test]
async fn test_transcribe_upstream_failure_is_500() -> Result<()> {
    let app = build_app(
        200,
        r#"{"client_secret":"sk_abc"}"#,
        Some("sk-whisper"),
        RecordingTranscriber {
            fail: true,
            ..Default::default()
        },
    )?;

    let (status, body) = send(
        &app.router,
        transcribe_request(multipart_body("clip.ogg", b"OggS")),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_slice(&body)?;
    assert!(value["error"].as_str().unwrap().contains("unsupported format"));
    assert_eq!(app.transcriber.calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_transcribe_without_credential_skips_body() -> Result<()> {
    let app = build_app(
        200,
        r#"{"client_secret":"sk_abc"}"#,
        None,
        RecordingTranscriber::default(),
    )?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/transcribe")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("not a multipart body"))?;

    let (status, body) = send(&app.router, request).await?;

    // Configuration error wins over the malformed body
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_slice(&body)?;
    assert!(value["error"].as_str().unwrap().contains("not set"));
    assert_eq!(app.transcriber.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_transcribe_oversized_upload_is_413() -> Result<()> {
    let bundle = create_bundle()?;
    let mut config = test_config(bundle.path(), Some("sk-whisper"));
    config.transcription.max_upload_bytes = 100;
    let transcriber = Arc::new(RecordingTranscriber::default());

    let state = AppState::new(
        config,
        Arc::new(FixedSessionApi {
            status: 200,
            body: r#"{"client_secret":"sk_abc"}"#.to_string(),
        }),
        Some(transcriber.clone() as Arc<dyn TranscriptionApi>),
        None,
    );
    let router = create_router(state);

    let (status, body) = send(
        &router,
        transcribe_request(multipart_body("long.webm", &[7u8; 1000])),
    )
    .await?;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let value: Value = serde_json::from_slice(&body)?;
    assert!(value["error"].is_string());
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_transcribe_without_file_field_is_bad_request() -> Result<()> {
    let app = default_app()?;
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"model\"\r\n\r\nwhisper-1\r\n--{BOUNDARY}--\r\n"
    );

    let (status, _) = send(&app.router, transcribe_request(body.into_bytes())).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.transcriber.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_static_asset_and_spa_fallback() -> Result<()> {
    let app = default_app()?;

    let response = app.router.clone().oneshot(get("/js/main.js")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str()?.to_string();
    assert!(content_type.contains("javascript"), "got {}", content_type);
    let js = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&js[..], b"let x = 1;");

    let (status, body) = send(&app.router, get("/robots.txt")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"User-agent: *");

    for uri in ["/", "/chat", "/settings/profile/edit", "/api/unknown"] {
        let (status, body) = send(&app.router, get(uri)).await?;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, INDEX_HTML.as_bytes(), "{}", uri);
    }

    Ok(())
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_colon_routes_get_entry_document() -> Result<()> {
    let app = default_app()?;

    for uri in ["/users/id:42", "/search/q:rust/page:2", "/users/id%3A42/edit"] {
        let (status, body) = send(&app.router, get(uri)).await?;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, INDEX_HTML.as_bytes(), "{}", uri);
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_category_asset_is_404() -> Result<()> {
    let app = default_app()?;

    for uri in ["/js/missing.js", "/css/app.css", "/media/logo.png"] {
        let (status, _) = send(&app.router, get(uri)).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
    }
    Ok(())
}

#[tokio::test]
async fn test_percent_encoded_traversal_is_rejected() -> Result<()> {
    let app = default_app()?;

    let (status, body) = send(&app.router, get("/js/%2E%2E/%2E%2E/index.html")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_ne!(body, INDEX_HTML.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_api_only_mode_without_assets() -> Result<()> {
    let tmp = TempDir::new()?;
    let state = AppState::new(
        test_config(&tmp.path().join("missing"), None),
        Arc::new(FixedSessionApi {
            status: 200,
            body: r#"{"client_secret":"sk_abc"}"#.to_string(),
        }),
        None,
        None,
    );
    let router = create_router(state);

    let (status, _) = send(&router, get("/chat")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, get("/api/health")).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
