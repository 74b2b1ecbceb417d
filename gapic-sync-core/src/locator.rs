//! Artifact locator: turns a (service, version, language, revision?) request
//! into the object-store directory holding the generated library.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::config::{SyncSettings, CLOUD_BUILD_LATEST_SHA_FILE};
use crate::error::SyncError;
use crate::gapic::ArtifactRequest;
use crate::language::Language;
use crate::retrieve::Retriever;
use crate::transfer::TransferTool;

/// Prefix under each revision that Cloud Build writes GAPIC output to.
pub const GAPIC_BUILD_DIR: &str = "gapic-cloud-build";

/// A fully determined remote directory: `base_uri/revision/relative_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub base_uri: String,
    pub revision: String,
    pub relative_dir: String,
}

impl ResolvedLocation {
    pub fn uri(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_uri.trim_end_matches('/'),
            self.revision,
            self.relative_dir.trim_matches('/')
        )
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    base_uri: String,
}

impl ArtifactLocator {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
        }
    }

    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self::new(settings.cloud_build_uri.clone())
    }

    pub fn latest_sha_uri(&self) -> String {
        format!("{}/{}", self.base_uri.trim_end_matches('/'), CLOUD_BUILD_LATEST_SHA_FILE)
    }

    /// Read the `cloud_build_latest` marker. Fails on any transfer or read
    /// error and on an empty marker.
    pub async fn latest_revision<T: TransferTool>(
        &self,
        retriever: &Retriever<T>,
    ) -> Result<String, SyncError> {
        let uri = self.latest_sha_uri();
        debug!(uri = %uri, "Reading latest googleapis revision");

        let revision = retriever.file_content(&uri, None).await.map_err(|e| {
            error!(error = %e, uri = %uri, "Revision lookup failed");
            SyncError::RevisionLookup {
                uri: uri.clone(),
                reason: None,
                source: Some(Box::new(e)),
            }
        })?;

        if revision.is_empty() {
            error!(uri = %uri, "Revision marker is empty");
            return Err(SyncError::RevisionLookup {
                uri,
                reason: Some("marker object is empty"),
                source: None,
            });
        }

        info!(revision = %revision, "Resolved latest googleapis revision");
        Ok(revision)
    }

    async fn pinned_or_latest<T: TransferTool>(
        &self,
        revision: Option<&str>,
        retriever: &Retriever<T>,
    ) -> Result<String, SyncError> {
        match revision {
            Some(r) => Ok(r.trim().to_string()),
            None => self.latest_revision(retriever).await,
        }
    }

    /// Build the location for an already known revision. Never touches the store.
    pub fn locate(
        &self,
        service: &str,
        version: &str,
        language: Language,
        revision: &str,
        gapic_dir: Option<&Path>,
    ) -> ResolvedLocation {
        let relative_dir = match gapic_dir {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from(GAPIC_BUILD_DIR).join(language.directory_name(service, version)),
        };
        ResolvedLocation {
            base_uri: self.base_uri.clone(),
            revision: revision.to_string(),
            relative_dir: to_uri_path(&relative_dir),
        }
    }

    /// Resolve a location, reading the revision marker when `revision` is `None`.
    pub async fn resolve<T: TransferTool>(
        &self,
        service: &str,
        version: &str,
        language: Language,
        revision: Option<&str>,
        retriever: &Retriever<T>,
    ) -> Result<ResolvedLocation, SyncError> {
        let revision = self.pinned_or_latest(revision, retriever).await?;
        Ok(self.locate(service, version, language, &revision, None))
    }

    /// Like [`ArtifactLocator::resolve`], honouring the request's `gapic_dir`.
    pub async fn resolve_request<T: TransferTool>(
        &self,
        request: &ArtifactRequest,
        retriever: &Retriever<T>,
    ) -> Result<ResolvedLocation, SyncError> {
        let revision = self
            .pinned_or_latest(request.revision.as_deref(), retriever)
            .await?;
        Ok(self.locate(
            &request.service,
            &request.version,
            request.language,
            &revision,
            request.gapic_dir.as_deref(),
        ))
    }
}

// Object-store paths always use '/', whatever the host separator is.
fn to_uri_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
