use crate::assets::{AssetError, AssetResolver};
use crate::config::Config;
use crate::upstream::{ChatKitClient, SessionApi, TranscriptionApi, WhisperClient};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared, read-only application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Upstream session issuance
    pub sessions: Arc<dyn SessionApi>,

    /// Upstream speech-to-text (absent when no credential is configured)
    pub transcriber: Option<Arc<dyn TranscriptionApi>>,

    /// Static bundle (absent in API-only mode)
    pub assets: Option<Arc<AssetResolver>>,
}

impl AppState {
    pub fn new(
        config: Config,
        sessions: Arc<dyn SessionApi>,
        transcriber: Option<Arc<dyn TranscriptionApi>>,
        assets: Option<AssetResolver>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
            transcriber,
            assets: assets.map(Arc::new),
        }
    }

    /// Build the real upstream clients and asset resolver from config.
    pub fn from_config(config: Config) -> Result<Self> {
        let sessions = ChatKitClient::new(&config.chatkit)
            .context("Failed to create ChatKit client")?;
        info!("ChatKit sessions endpoint: {}", sessions.endpoint());

        let transcriber = WhisperClient::from_config(&config.transcription)
            .context("Failed to create transcription client")?
            .map(|client| Arc::new(client) as Arc<dyn TranscriptionApi>);
        if transcriber.is_none() {
            warn!("TRANSCRIPTION_API_KEY not set; /api/transcribe will return 500");
        }

        let assets = load_assets(&config)?;

        Ok(Self::new(config, Arc::new(sessions), transcriber, assets))
    }
}

fn load_assets(config: &Config) -> Result<Option<AssetResolver>> {
    let root = &config.assets.root;
    if !root.is_dir() {
        warn!(
            "Asset root {} not found; serving API routes only",
            root.display()
        );
        return Ok(None);
    }

    match AssetResolver::new(root, &config.assets.index, &config.assets.static_prefix) {
        Ok(resolver) => {
            info!("Serving static assets from {}", resolver.root().display());
            Ok(Some(resolver))
        }
        Err(e @ AssetError::EntryDocumentMissing(_)) => {
            Err(e).context("Asset root is present but incomplete")
        }
        Err(e) => Err(e).with_context(|| format!("Failed to open asset root {}", root.display())),
    }
}
