pub mod assets;
pub mod config;
pub mod http;
pub mod session;
pub mod transcribe;
pub mod upstream;

pub use assets::{AssetError, AssetKind, AssetResolver, ResolvedAsset};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{SessionRequest, SessionResult};
pub use transcribe::TranscriptionResult;
pub use upstream::{ChatKitClient, SessionApi, TranscriptionApi, UpstreamError, WhisperClient};
