use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_WORKFLOW_ID: &str = "wf_68eca7578e9c8190a0085207d7b7ce84081ad591929c024f";
const DEFAULT_DOMAIN_KEY: &str = "domain_pk_68f899197ff48190a4f3ed7002a08dc10fdc9f3a5fb67a88";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variables that override config keys (env name, config key).
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HOST", "server.bind"),
    ("PORT", "server.port"),
    ("OPENAI_API_KEY", "chatkit.api_key"),
    ("CHATKIT_WORKFLOW_ID", "chatkit.workflow_id"),
    ("OPENAI_DOMAIN_KEY", "chatkit.domain_key"),
    ("CHATKIT_USER_ID", "chatkit.user_id"),
    ("CHATKIT_API_BASE", "chatkit.api_base"),
    ("TRANSCRIPTION_API_KEY", "transcription.api_key"),
    ("TRANSCRIPTION_MODEL", "transcription.model"),
    ("TRANSCRIPTION_API_BASE", "transcription.api_base"),
    ("STATIC_DIR", "assets.root"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub chatkit: ChatKitConfig,
    pub transcription: TranscriptionConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

/// Upstream ChatKit session API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChatKitConfig {
    /// Secret API key sent as a bearer token (required)
    #[serde(default)]
    pub api_key: String,

    pub workflow_id: String,

    /// Domain verification key; empty disables the header
    #[serde(default)]
    pub domain_key: Option<String>,

    /// User identifier every session is attributed to
    pub user_id: String,

    pub api_base: String,
    pub request_timeout_secs: u64,
}

/// Upstream speech-to-text settings
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    /// Feature is unavailable (500 on every request) while this is unset
    #[serde(default)]
    pub api_key: Option<String>,

    pub model: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    /// Directory holding the built single-page app
    pub root: PathBuf,

    /// Entry document served for client-side routes
    pub index: String,

    /// Bundle subdirectory holding js/, css/ and media/
    pub static_prefix: String,
}

impl Config {
    /// Load config from defaults, an optional file, then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    /// Same as [`Config::load`] but with a pluggable environment lookup.
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .set_default("server.bind", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("chatkit.workflow_id", DEFAULT_WORKFLOW_ID)?
            .set_default("chatkit.domain_key", DEFAULT_DOMAIN_KEY)?
            .set_default("chatkit.user_id", "deepspring")?
            .set_default("chatkit.api_base", OPENAI_API_BASE)?
            .set_default("chatkit.request_timeout_secs", 30)?
            .set_default("transcription.model", "whisper-1")?
            .set_default("transcription.api_base", OPENAI_API_BASE)?
            .set_default("transcription.request_timeout_secs", 120)?
            .set_default("transcription.max_upload_bytes", 25 * 1024 * 1024)?
            .set_default("assets.root", "build")?
            .set_default("assets.index", "index.html")?
            .set_default("assets.static_prefix", "static")?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        for &(var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, env(var))?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chatkit.api_key.trim().is_empty() {
            bail!("OPENAI_API_KEY must be set (chatkit.api_key)");
        }
        if self.chatkit.workflow_id.trim().is_empty() {
            bail!("chatkit.workflow_id must not be empty");
        }
        Ok(())
    }
}

impl ChatKitConfig {
    /// Domain key to send upstream, if one is configured
    pub fn domain_key(&self) -> Option<&str> {
        self.domain_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl TranscriptionConfig {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Shorten a secret for logging.
pub fn redact(secret: &str) -> String {
    const VISIBLE: usize = 20;
    match secret.char_indices().nth(VISIBLE) {
        Some((idx, _)) => format!("{}...", &secret[..idx]),
        None => secret.to_string(),
    }
}
