use super::AssetError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bundle subdirectories that are served without SPA fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCategory {
    Js,
    Css,
    Media,
    /// The whole `static/` tree, mounted as-is
    Static,
}

impl AssetCategory {
    fn from_segment(segment: &str, static_prefix: &str) -> Option<Self> {
        match segment {
            "js" => Some(AssetCategory::Js),
            "css" => Some(AssetCategory::Css),
            "media" => Some(AssetCategory::Media),
            s if s == static_prefix => Some(AssetCategory::Static),
            _ => None,
        }
    }

    fn subdir(&self) -> Option<&'static str> {
        match self {
            AssetCategory::Js => Some("js"),
            AssetCategory::Css => Some("css"),
            AssetCategory::Media => Some("media"),
            AssetCategory::Static => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Category(AssetCategory),
    File,
    /// SPA fallback
    EntryDocument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub path: PathBuf,
    pub kind: AssetKind,
}

impl ResolvedAsset {
    pub async fn read(&self) -> Result<Vec<u8>, AssetError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// Maps request paths onto a built single-page app directory
#[derive(Debug, Clone)]
pub struct AssetResolver {
    root: PathBuf,
    static_dir: PathBuf,
    static_prefix: String,
    index: PathBuf,
}

impl AssetResolver {
    /// Fails when the entry document is missing; the fallback branch needs it.
    pub fn new(
        root: impl AsRef<Path>,
        index: &str,
        static_prefix: &str,
    ) -> Result<Self, AssetError> {
        let root = root.as_ref().canonicalize()?;
        let index = root.join(index);
        if !index.is_file() {
            return Err(AssetError::EntryDocumentMissing(index));
        }

        Ok(Self {
            static_dir: root.join(static_prefix),
            static_prefix: static_prefix.to_string(),
            root,
            index,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_document(&self) -> &Path {
        &self.index
    }

    /// Resolve a percent-decoded request path.
    ///
    /// 1. `js/`, `css/`, `media/` (and the static prefix) map into the bundle's
    ///    static directory; a missing file is `NotFound`.
    /// 2. Any other existing regular file under the root is served as-is.
    /// 3. Everything else gets the entry document.
    pub async fn resolve(&self, request_path: &str) -> Result<ResolvedAsset, AssetError> {
        let segments = sanitize(request_path)?;

        if let Some((first, rest)) = segments.split_first() {
            if let Some(category) = AssetCategory::from_segment(first, &self.static_prefix) {
                let mut path = self.static_dir.clone();
                if let Some(subdir) = category.subdir() {
                    path.push(subdir);
                }
                path.extend(rest);

                return match self.contained_file(&path).await {
                    Some(path) => Ok(ResolvedAsset {
                        path,
                        kind: AssetKind::Category(category),
                    }),
                    None => Err(AssetError::NotFound(request_path.to_string())),
                };
            }

            let candidate: PathBuf = segments.iter().fold(self.root.clone(), |p, s| p.join(s));
            if let Some(path) = self.contained_file(&candidate).await {
                return Ok(ResolvedAsset {
                    path,
                    kind: AssetKind::File,
                });
            }
        }

        debug!("SPA fallback for {}", request_path);
        if !tokio::fs::try_exists(&self.index).await.unwrap_or(false) {
            return Err(AssetError::EntryDocumentMissing(self.index.clone()));
        }

        Ok(ResolvedAsset {
            path: self.index.clone(),
            kind: AssetKind::EntryDocument,
        })
    }

    /// Canonical path of a regular file that stays inside the root, if any.
    async fn contained_file(&self, path: &Path) -> Option<PathBuf> {
        let canonical = tokio::fs::canonicalize(path).await.ok()?;
        if !canonical.starts_with(&self.root) {
            debug!("Rejecting {:?}: resolves outside asset root", path);
            return None;
        }

        let meta = tokio::fs::metadata(&canonical).await.ok()?;
        meta.is_file().then_some(canonical)
    }
}

/// Split a request path into segments; `..` and NUL are rejected.
///
/// Other characters stay literal, so client-side routes such as `users/id:42`
/// still reach the fallback. Containment is enforced by `contained_file`.
fn sanitize(request_path: &str) -> Result<Vec<&str>, AssetError> {
    let mut segments = Vec::new();

    for segment in request_path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(AssetError::InvalidPath(request_path.to_string())),
            s if s.contains('\0') || is_platform_special(s) => {
                return Err(AssetError::InvalidPath(request_path.to_string()))
            }
            s => segments.push(s),
        }
    }

    Ok(segments)
}

/// Separators and drive prefixes that `Path::join` would interpret on Windows
#[cfg(windows)]
fn is_platform_special(segment: &str) -> bool {
    segment.contains(['\\', ':'])
}

#[cfg(not(windows))]
fn is_platform_special(_segment: &str) -> bool {
    false
}
