//! Static asset serving for the pre-built single-page app
//!
//! Resolution picks a file on disk; `tower_http::services::ServeFile` then
//! streams it with a content type inferred from the extension.

mod resolver;

pub use resolver::{AssetCategory, AssetKind, AssetResolver, ResolvedAsset};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Invalid asset path: {0}")]
    InvalidPath(String),

    #[error("Entry document missing: {0}")]
    EntryDocumentMissing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssetError {
    /// True for errors caused by the request rather than the deployment
    pub fn is_client_error(&self) -> bool {
        matches!(self, AssetError::NotFound(_) | AssetError::InvalidPath(_))
    }
}
