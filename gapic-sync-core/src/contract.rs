//! # contract: collaborator seams for the fetch workflow
//!
//! The workflow reports what it fetched through two small traits instead of
//! process-wide registries:
//! - [`MetadataRecorder`] receives one [`ClientDestination`] per successful fetch.
//! - [`PathTracker`] is told about every local directory that became part of
//!   the output tree.
//!
//! Both are annotated for `mockall`; concrete collectors live in
//! [`crate::metadata`] and [`crate::tracked_paths`].

use std::path::Path;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::{Deserialize, Serialize};

/// Generator tag recorded for every artifact fetched from Cloud Build.
pub const GAPIC_GENERATOR: &str = "gapic";

/// Provenance of one fetched client library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDestination {
    pub source: String,
    pub api_name: String,
    pub api_version: String,
    pub language: String,
    pub generator: String,
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait MetadataRecorder: Send + Sync {
    fn add_client_destination(&self, destination: ClientDestination);
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait PathTracker: Send + Sync {
    fn track(&self, path: &Path);
}
