//! # gapic: the fetch workflow for one client library
//!
//! [`GapicCloudBuild`] strings the pieces together for a single
//! [`ArtifactRequest`]:
//!   1. resolve the remote directory (reading the revision marker if unpinned)
//!   2. copy it locally and check it arrived
//!   3. optionally merge `*.proto` files from a local googleapis checkout
//!   4. report the fetch to the injected [`MetadataRecorder`] and [`PathTracker`]
//!
//! Any failure returns immediately. Files the transfer tool already wrote are
//! left in place.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::SyncSettings;
use crate::contract::{ClientDestination, MetadataRecorder, PathTracker, GAPIC_GENERATOR};
use crate::error::SyncError;
use crate::language::Language;
use crate::locator::{ArtifactLocator, ResolvedLocation};
use crate::protos::{default_proto_scope, merge_protos};
use crate::retrieve::{RetrievedArtifact, Retriever};
use crate::transfer::TransferTool;

/// One client library to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRequest {
    pub service: String,
    pub version: String,
    pub language: Language,
    /// googleapis commit; the latest Cloud Build revision when `None`.
    pub revision: Option<String>,
    /// Local directory to copy into; the cache root when `None`.
    pub destination: Option<PathBuf>,
    pub include_protos: bool,
    /// Remote directory relative to the revision, replacing
    /// `gapic-cloud-build/<directory name>`.
    pub gapic_dir: Option<PathBuf>,
    /// Proto scope relative to the googleapis root, replacing
    /// `google/cloud/<service>/<version>`.
    pub proto_source: Option<PathBuf>,
}

impl ArtifactRequest {
    pub fn new(service: impl Into<String>, version: impl Into<String>, language: Language) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            language,
            revision: None,
            destination: None,
            include_protos: false,
            gapic_dir: None,
            proto_source: None,
        }
    }

    /// Build a request from an untyped language name.
    pub fn parse(service: &str, version: &str, language: &str) -> Result<Self, SyncError> {
        Ok(Self::new(service, version, language.parse()?))
    }

    pub fn revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn include_protos(mut self, include: bool) -> Self {
        self.include_protos = include;
        self
    }

    pub fn gapic_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.gapic_dir = Some(dir.into());
        self
    }

    pub fn proto_source(mut self, dir: impl Into<PathBuf>) -> Self {
        self.proto_source = Some(dir.into());
        self
    }

    fn proto_scope(&self) -> PathBuf {
        self.proto_source
            .clone()
            .unwrap_or_else(|| default_proto_scope(&self.service, &self.version))
    }
}

/// Everything the workflow learned while fetching one library.
#[derive(Debug, Clone)]
pub struct FetchedLibrary {
    pub location: ResolvedLocation,
    pub artifact: RetrievedArtifact,
    pub proto_files: Vec<PathBuf>,
}

pub struct GapicCloudBuild<'a, T> {
    locator: ArtifactLocator,
    retriever: Retriever<T>,
    googleapis_dir: Option<PathBuf>,
    recorder: &'a dyn MetadataRecorder,
    tracker: &'a dyn PathTracker,
}

impl<'a, T: TransferTool> GapicCloudBuild<'a, T> {
    pub fn new(
        settings: &SyncSettings,
        tool: T,
        recorder: &'a dyn MetadataRecorder,
        tracker: &'a dyn PathTracker,
    ) -> Self {
        Self {
            locator: ArtifactLocator::from_settings(settings),
            retriever: Retriever::new(tool, settings.cache.clone()).parallel(settings.parallel),
            googleapis_dir: settings.googleapis_dir.clone(),
            recorder,
            tracker,
        }
    }

    pub async fn go_library(&self, service: &str, version: &str) -> Result<RetrievedArtifact, SyncError> {
        self.fetch(&ArtifactRequest::new(service, version, Language::Go)).await
    }

    pub async fn java_library(&self, service: &str, version: &str) -> Result<RetrievedArtifact, SyncError> {
        self.fetch(&ArtifactRequest::new(service, version, Language::Java)).await
    }

    pub async fn php_library(&self, service: &str, version: &str) -> Result<RetrievedArtifact, SyncError> {
        self.fetch(&ArtifactRequest::new(service, version, Language::Php)).await
    }

    pub async fn python_library(&self, service: &str, version: &str) -> Result<RetrievedArtifact, SyncError> {
        self.fetch(&ArtifactRequest::new(service, version, Language::Python)).await
    }

    pub async fn fetch(&self, request: &ArtifactRequest) -> Result<RetrievedArtifact, SyncError> {
        Ok(self.fetch_library(request).await?.artifact)
    }

    pub async fn fetch_library(&self, request: &ArtifactRequest) -> Result<FetchedLibrary, SyncError> {
        info!(
            service = %request.service,
            version = %request.version,
            language = %request.language,
            generator_language = request.language.profile().generator_language,
            "Fetching GAPIC library"
        );

        let location = self.locator.resolve_request(request, &self.retriever).await?;
        let uri = location.uri();
        info!(uri = %uri, "Running gsutil to fetch gapic directory");

        let artifact = self
            .retriever
            .fetch_directory(&uri, request.destination.as_deref())
            .await?;
        info!(path = %artifact.local_path.display(), "Downloaded code");

        let proto_files = if request.include_protos {
            self.merge_request_protos(request, &artifact.local_path)?
        } else {
            Vec::new()
        };

        self.recorder.add_client_destination(ClientDestination {
            source: uri,
            api_name: request.service.clone(),
            api_version: request.version.clone(),
            language: request.language.to_string(),
            generator: GAPIC_GENERATOR.to_string(),
        });
        self.tracker.track(&artifact.local_path);

        Ok(FetchedLibrary {
            location,
            artifact,
            proto_files,
        })
    }

    fn merge_request_protos(
        &self,
        request: &ArtifactRequest,
        artifact_dir: &Path,
    ) -> Result<Vec<PathBuf>, SyncError> {
        let Some(googleapis) = self.googleapis_dir.as_deref() else {
            error!("include_protos requested without a googleapis checkout");
            return Err(SyncError::MissingProtoSource);
        };
        let source_dir = googleapis.join(request.proto_scope());
        let output_dir = artifact_dir.join(request.language.proto_subdir(&request.service, &request.version));
        merge_protos(&source_dir, &output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheDir;
    use crate::contract::{MockMetadataRecorder, MockPathTracker};
    use crate::transfer::MockTransferTool;
    use mockall::predicate::*;

    fn settings(cache: &Path, googleapis: Option<PathBuf>) -> SyncSettings {
        SyncSettings {
            cloud_build_uri: "gs://bucket/github_googleapis_googleapis".into(),
            googleapis_dir: googleapis,
            cache: CacheDir::new(cache),
            parallel: true,
        }
    }

    fn creating_tool() -> MockTransferTool {
        let mut tool = MockTransferTool::new();
        tool.expect_copy_dir().returning(|uri, cwd, _| {
            let name = uri.rsplit('/').next().unwrap();
            std::fs::create_dir_all(cwd.join(name)).unwrap();
            Ok(())
        });
        tool
    }

    #[test]
    fn parse_rejects_unsupported_language() {
        let err = ArtifactRequest::parse("vision", "v1", "cobol").unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedLanguage(_)));
    }

    #[tokio::test]
    async fn records_metadata_and_tracks_path() {
        let tmp = tempfile::tempdir().unwrap();
        let mut recorder = MockMetadataRecorder::new();
        recorder
            .expect_add_client_destination()
            .withf(|d| {
                d.source == "gs://bucket/github_googleapis_googleapis/abc/gapic-cloud-build/google-cloud-speech-v1-php"
                    && d.api_name == "speech"
                    && d.api_version == "v1"
                    && d.language == "php"
                    && d.generator == "gapic"
            })
            .times(1)
            .return_const(());
        let mut tracker = MockPathTracker::new();
        tracker
            .expect_track()
            .with(eq(tmp.path().join("google-cloud-speech-v1-php")))
            .times(1)
            .return_const(());

        let gapic = GapicCloudBuild::new(&settings(tmp.path(), None), creating_tool(), &recorder, &tracker);
        let request = ArtifactRequest::new("speech", "v1", Language::Php).revision("abc");
        let artifact = gapic.fetch(&request).await.unwrap();
        assert_eq!(artifact.local_path, tmp.path().join("google-cloud-speech-v1-php"));
    }

    #[tokio::test]
    async fn failed_fetch_records_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tool = MockTransferTool::new();
        tool.expect_copy_dir().returning(|_, _, _| Ok(()));
        // No expectations: any call panics.
        let recorder = MockMetadataRecorder::new();
        let tracker = MockPathTracker::new();

        let gapic = GapicCloudBuild::new(&settings(tmp.path(), None), tool, &recorder, &tracker);
        let err = gapic
            .fetch(&ArtifactRequest::new("vision", "v1", Language::Go).revision("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::ArtifactNotFound { .. }));
    }

    #[tokio::test]
    async fn include_protos_without_checkout_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = MockMetadataRecorder::new();
        let tracker = MockPathTracker::new();

        let gapic = GapicCloudBuild::new(&settings(tmp.path(), None), creating_tool(), &recorder, &tracker);
        let request = ArtifactRequest::new("vision", "v1", Language::Java)
            .revision("abc")
            .include_protos(true);
        let err = gapic.fetch(&request).await.unwrap_err();
        assert!(matches!(err, SyncError::MissingProtoSource));
    }

    #[tokio::test]
    async fn python_protos_land_beside_generated_modules() {
        let tmp = tempfile::tempdir().unwrap();
        let googleapis = tmp.path().join("googleapis");
        let scope = googleapis.join("google/cloud/vision/v1");
        std::fs::create_dir_all(&scope).unwrap();
        std::fs::write(scope.join("image_annotator.proto"), "syntax = \"proto3\";").unwrap();

        let mut recorder = MockMetadataRecorder::new();
        recorder.expect_add_client_destination().return_const(());
        let mut tracker = MockPathTracker::new();
        tracker.expect_track().return_const(());

        let cache = tmp.path().join("cache");
        let gapic = GapicCloudBuild::new(&settings(&cache, Some(googleapis)), creating_tool(), &recorder, &tracker);
        let request = ArtifactRequest::new("vision", "v1", Language::Python)
            .revision("abc")
            .include_protos(true);
        let fetched = gapic.fetch_library(&request).await.unwrap();

        let expected = cache
            .join("google-cloud-vision-v1-python/google/cloud/vision_v1/proto/image_annotator.proto");
        assert_eq!(fetched.proto_files, vec![expected.clone()]);
        assert!(expected.is_file());
    }
}
