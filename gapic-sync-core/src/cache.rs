//! Local cache root that fetches land in when the caller gives no destination.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::SyncError;

/// Returns the platform cache directory for gapic-sync, if one can be determined.
pub fn default_cache_root() -> Option<PathBuf> {
    ProjectDirs::from("com", "google", "gapic-sync").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// A cache root passed explicitly through the retrieval layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The platform cache directory, or `.gapic-sync-cache` in the working
    /// directory when the platform has none.
    pub fn platform_default() -> Self {
        Self::new(default_cache_root().unwrap_or_else(|| PathBuf::from(".gapic-sync-cache")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root on demand and returns it.
    pub fn ensure(&self) -> Result<&Path, SyncError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| SyncError::io(&self.root, e))?;
            debug!(path = %self.root.display(), "Created cache directory");
        }
        Ok(&self.root)
    }
}
