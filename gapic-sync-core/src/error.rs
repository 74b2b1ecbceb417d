use std::path::PathBuf;

use thiserror::Error;

/// Every failure the fetch workflow can surface. None of them are retried.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("provided language unsupported: {0}")]
    UnsupportedLanguage(String),

    /// `source` carries the underlying transfer or read failure. An empty
    /// marker has no source and is described by `reason` instead.
    #[error(
        "failed to read latest googleapis revision from {uri}{}",
        .reason.map(|r| format!(": {r}")).unwrap_or_default()
    )]
    RevisionLookup {
        uri: String,
        reason: Option<&'static str>,
        #[source]
        source: Option<Box<SyncError>>,
    },

    #[error("unable to find files from gsutil: {} (source {uri})", .path.display())]
    ArtifactNotFound { uri: String, path: PathBuf },

    #[error("`{command}` exited with {status}")]
    ExternalTool { command: String, status: String },

    #[error("failed to launch `{command}`: {source}")]
    ToolLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("include_protos requested but no googleapis checkout is configured (set SYNTHTOOL_GOOGLEAPIS)")]
    MissingProtoSource,

    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures of the external transfer tool, whether it exited
    /// non-zero or never started.
    pub fn is_external_tool(&self) -> bool {
        matches!(
            self,
            SyncError::ExternalTool { .. } | SyncError::ToolLaunch { .. }
        )
    }
}
