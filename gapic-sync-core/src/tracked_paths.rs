use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::contract::PathTracker;

/// Records every directory the workflow placed into the output tree.
#[derive(Debug, Default)]
pub struct TrackedPaths {
    paths: Mutex<Vec<PathBuf>>,
}

impl TrackedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PathTracker for TrackedPaths {
    fn track(&self, path: &Path) {
        let mut paths = self.paths.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !paths.iter().any(|p| p == path) {
            debug!(path = %path.display(), "Tracking output path");
            paths.push(path.to_path_buf());
        }
    }
}
