use std::path::PathBuf;

use tracing::{debug, info};

use crate::cache::CacheDir;

pub const CLOUD_BUILD_PROJECT: &str = "vkit-pipeline";
pub const DEFAULT_CLOUD_BUILD_URI: &str =
    "gs://vkit-pipeline-cloud-build-artifacts/github_googleapis_googleapis";
pub const CLOUD_BUILD_LATEST_SHA_FILE: &str = "cloud_build_latest";

/// Replaces the base bucket URI for every lookup.
pub const CLOUD_BUILD_URI_ENV: &str = "SYNTHTOOL_CLOUD_BUILD_URI";
/// Local googleapis checkout used for proto merge.
pub const GOOGLEAPIS_ENV: &str = "SYNTHTOOL_GOOGLEAPIS";
/// Replaces the platform cache root.
pub const CACHE_DIR_ENV: &str = "GAPIC_SYNC_CACHE_DIR";

/// Runtime settings shared by every fetch in one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub cloud_build_uri: String,
    pub googleapis_dir: Option<PathBuf>,
    pub cache: CacheDir,
    pub parallel: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            cloud_build_uri: DEFAULT_CLOUD_BUILD_URI.to_string(),
            googleapis_dir: None,
            cache: CacheDir::platform_default(),
            parallel: true,
        }
    }
}

impl SyncSettings {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `SYNTHTOOL_CLOUD_BUILD_URI`, `SYNTHTOOL_GOOGLEAPIS` and
    /// `GAPIC_SYNC_CACHE_DIR` on top of the current values. Empty values are
    /// ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(uri) = non_empty_env(CLOUD_BUILD_URI_ENV) {
            info!(uri = %uri, "Using cloud build URI override from environment");
            self.cloud_build_uri = uri;
        }
        if let Some(dir) = non_empty_env(GOOGLEAPIS_ENV) {
            info!(path = %dir, "Using local googleapis checkout from environment");
            self.googleapis_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = non_empty_env(CACHE_DIR_ENV) {
            self.cache = CacheDir::new(dir);
        }
        self
    }

    pub fn trace_loaded(&self) {
        info!(
            cloud_build_uri = %self.cloud_build_uri,
            cache_dir = %self.cache.root().display(),
            parallel = self.parallel,
            "Loaded sync settings"
        );
        debug!(?self, "Sync settings loaded (full debug)");
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
