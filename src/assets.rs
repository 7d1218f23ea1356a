//! Static files served from the public directory.
//!
//! A request path is resolved in three steps:
//!
//! 1. Lexical normalization. `.` is dropped and `..` pops one segment.
//!    Popping above the root, an absolute component, a drive prefix or a NUL
//!    byte is rejected outright.
//! 2. The result is joined onto the root and canonicalized, which resolves
//!    symlinks.
//! 3. The canonical path must still lie under the canonical root.
//!
//! The path is taken as it arrives on the wire, without percent-decoding, so
//! `%2e%2e` is just an odd file name.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::error::ApiError;

/// Document served for `/`.
pub const INDEX_DOCUMENT: &str = "index.html";

/// Document served for `/admin`.
pub const ADMIN_DOCUMENT: &str = "admin.html";

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("path escapes the public directory")]
    Forbidden,

    #[error("no such file")]
    NotFound,

    #[error("reading asset: {0}")]
    Io(#[from] io::Error),
}

impl From<AssetError> for ApiError {
    fn from(e: AssetError) -> Self {
        match e {
            AssetError::Forbidden => ApiError::Forbidden,
            AssetError::NotFound => ApiError::NotFound,
            AssetError::Io(e) => ApiError::AssetRead(e),
        }
    }
}

/// A file ready to be sent.
#[derive(Debug)]
pub struct Asset {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Resolver rooted at one directory.
#[derive(Debug)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Fails if `root` does not exist or cannot be canonicalized.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Maps `request_path` to a canonical file path under the root.
    pub async fn resolve(&self, request_path: &str) -> Result<PathBuf, AssetError> {
        let relative = if request_path == "/" { INDEX_DOCUMENT } else { request_path };
        let normalized = normalize(relative)?;

        let canonical = match tokio::fs::canonicalize(self.root.join(normalized)).await {
            Ok(p) => p,
            Err(e) if is_missing(&e) => return Err(AssetError::NotFound),
            Err(e) => return Err(e.into()),
        };
        if !canonical.starts_with(&self.root) {
            return Err(AssetError::Forbidden);
        }
        Ok(canonical)
    }

    /// Resolves and reads `request_path`.
    pub async fn load(&self, request_path: &str) -> Result<Asset, AssetError> {
        let path = self.resolve(request_path).await?;

        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(AssetError::NotFound);
        }
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if is_missing(&e) => return Err(AssetError::NotFound),
            Err(e) => return Err(e.into()),
        };

        Ok(Asset { content_type: media_type(&path), body })
    }
}

fn normalize(relative: &str) -> Result<PathBuf, AssetError> {
    if relative.contains('\0') {
        return Err(AssetError::Forbidden);
    }

    let mut normalized = PathBuf::new();
    for component in Path::new(relative.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(AssetError::Forbidden);
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(AssetError::Forbidden),
        }
    }
    Ok(normalized)
}

fn is_missing(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory)
}

/// Media type for `path`, chosen by lower-cased extension.
pub fn media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html")          => "text/html; charset=utf-8",
        Some("js")            => "application/javascript; charset=utf-8",
        Some("css")           => "text/css; charset=utf-8",
        Some("json")          => "application/json; charset=utf-8",
        Some("png")           => "image/png",
        Some("jpg" | "jpeg")  => "image/jpeg",
        Some("svg")           => "image/svg+xml",
        _                     => DEFAULT_MEDIA_TYPE,
    }
}
