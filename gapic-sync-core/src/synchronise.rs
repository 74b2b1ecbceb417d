//! High-level pipeline: fetch every configured client library in order.
//!
//! Fail-fast: the first library that fails stops the run and its error is
//! returned; libraries fetched before it stay on disk and stay recorded.
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Supporting types: [`SyncReport`], [`LibraryReport`].

use std::path::PathBuf;

use tracing::{error, info};

use crate::error::SyncError;
use crate::gapic::{ArtifactRequest, GapicCloudBuild};
use crate::transfer::TransferTool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub libraries: Vec<LibraryReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryReport {
    pub api_name: String,
    pub api_version: String,
    pub language: String,
    pub source_uri: String,
    pub local_path: PathBuf,
    pub proto_files: usize,
}

pub async fn synchronise<T: TransferTool>(
    requests: &[ArtifactRequest],
    gapic: &GapicCloudBuild<'_, T>,
) -> Result<SyncReport, SyncError> {
    info!(libraries = requests.len(), "[SYNC] Starting synchronisation");

    let mut libraries = Vec::with_capacity(requests.len());
    for request in requests {
        let fetched = match gapic.fetch_library(request).await {
            Ok(fetched) => fetched,
            Err(e) => {
                error!(
                    service = %request.service,
                    version = %request.version,
                    language = %request.language,
                    error = %e,
                    "[SYNC][ERROR] Fetch failed"
                );
                return Err(e);
            }
        };

        info!(
            service = %request.service,
            path = %fetched.artifact.local_path.display(),
            proto_files = fetched.proto_files.len(),
            "[SYNC] Library fetched"
        );
        libraries.push(LibraryReport {
            api_name: request.service.clone(),
            api_version: request.version.clone(),
            language: request.language.to_string(),
            source_uri: fetched.artifact.source_uri,
            local_path: fetched.artifact.local_path,
            proto_files: fetched.proto_files.len(),
        });
    }

    Ok(SyncReport { libraries })
}
