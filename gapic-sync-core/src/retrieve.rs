//! Retrieval layer: copies remote directories and objects into a local
//! destination through a [`TransferTool`], defaulting to the cache root.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::cache::CacheDir;
use crate::error::SyncError;
use crate::transfer::TransferTool;

/// Result of a successful directory fetch. `local_path` exists when returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedArtifact {
    pub local_path: PathBuf,
    pub source_uri: String,
}

pub struct Retriever<T> {
    tool: T,
    cache: CacheDir,
    parallel: bool,
}

impl<T: TransferTool> Retriever<T> {
    pub fn new(tool: T, cache: CacheDir) -> Self {
        Self {
            tool,
            cache,
            parallel: true,
        }
    }

    /// Toggle the transfer tool's parallel copy mode for directory fetches.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create the destination and return it as an absolute path. The
    /// transfer tool runs with this directory as its working directory, so a
    /// relative path would be resolved a second time by the child.
    fn destination(&self, dest: Option<&Path>) -> Result<PathBuf, SyncError> {
        let dest = match dest {
            Some(dest) => {
                std::fs::create_dir_all(dest).map_err(|e| SyncError::io(dest, e))?;
                dest
            }
            None => self.cache.ensure()?,
        };
        absolute(dest)
    }

    /// Recursively copy the directory at `uri` and verify that a directory
    /// named after its last path segment now exists under the destination.
    pub async fn fetch_directory(
        &self,
        uri: &str,
        dest: Option<&Path>,
    ) -> Result<RetrievedArtifact, SyncError> {
        let dest = self.destination(dest)?;
        info!(uri = %uri, dest = %dest.display(), "Fetching directory");

        self.tool.copy_dir(uri, &dest, self.parallel).await?;

        let local_path = dest.join(last_segment(uri));
        if !local_path.exists() {
            error!(uri = %uri, path = %local_path.display(), "Transfer finished but no files arrived");
            return Err(SyncError::ArtifactNotFound {
                uri: uri.to_string(),
                path: local_path,
            });
        }

        info!(uri = %uri, path = %local_path.display(), "Fetched directory");
        Ok(RetrievedArtifact {
            local_path,
            source_uri: uri.to_string(),
        })
    }

    /// Copy a single object. The returned path is not checked for existence.
    pub async fn fetch_file(&self, uri: &str, dest: Option<&Path>) -> Result<PathBuf, SyncError> {
        let dest = self.destination(dest)?;
        info!(uri = %uri, dest = %dest.display(), "Fetching file");

        self.tool.copy_object(uri, &dest).await?;

        // TODO: verify the object landed, as fetch_directory does, once callers
        // agree that a silent zero-object copy should fail here too.
        Ok(dest.join(last_segment(uri)))
    }

    /// Fetch a small text object and return its contents with surrounding
    /// whitespace stripped.
    pub async fn file_content(&self, uri: &str, dest: Option<&Path>) -> Result<String, SyncError> {
        let path = self.fetch_file(uri, dest).await?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SyncError::io(&path, e))?;
        Ok(content.trim().to_string())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, SyncError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| SyncError::io(path, e))?;
    Ok(cwd.join(path))
}

/// Last non-empty `/`-separated segment of a URI.
pub(crate) fn last_segment(uri: &str) -> &str {
    uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::MockTransferTool;
    use mockall::predicate::*;

    #[test]
    fn last_segment_ignores_trailing_slash() {
        assert_eq!(last_segment("gs://b/x/google-cloud-vision-v1-java"), "google-cloud-vision-v1-java");
        assert_eq!(last_segment("gs://b/x/dir/"), "dir");
        assert_eq!(last_segment("plain"), "plain");
    }

    #[tokio::test]
    async fn fetch_directory_returns_existing_subdir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tool = MockTransferTool::new();
        tool.expect_copy_dir()
            .with(eq("gs://bucket/sha/lib"), always(), eq(true))
            .times(1)
            .returning(|_, cwd, _| {
                std::fs::create_dir_all(cwd.join("lib")).unwrap();
                Ok(())
            });

        let retriever = Retriever::new(tool, CacheDir::new(tmp.path()));
        let artifact = retriever.fetch_directory("gs://bucket/sha/lib", None).await.unwrap();
        assert_eq!(artifact.local_path, tmp.path().join("lib"));
        assert_eq!(artifact.source_uri, "gs://bucket/sha/lib");
    }

    #[tokio::test]
    async fn fetch_directory_without_output_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tool = MockTransferTool::new();
        tool.expect_copy_dir().returning(|_, _, _| Ok(()));

        let retriever = Retriever::new(tool, CacheDir::new(tmp.path()));
        let err = retriever.fetch_directory("gs://bucket/sha/lib", None).await.unwrap_err();
        assert!(matches!(err, SyncError::ArtifactNotFound { ref path, .. } if path == &tmp.path().join("lib")));
    }

    #[tokio::test]
    async fn explicit_destination_is_created_and_used() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("out");
        let expected_cwd = dest.clone();
        let mut tool = MockTransferTool::new();
        tool.expect_copy_dir()
            .withf(move |_, cwd, parallel| cwd == expected_cwd.as_path() && !*parallel)
            .returning(|_, cwd, _| {
                std::fs::create_dir_all(cwd.join("lib")).unwrap();
                Ok(())
            });

        let retriever = Retriever::new(tool, CacheDir::new(tmp.path().join("cache"))).parallel(false);
        let artifact = retriever.fetch_directory("gs://bucket/lib", Some(&dest)).await.unwrap();
        assert_eq!(artifact.local_path, dest.join("lib"));
        assert!(!tmp.path().join("cache").exists());
    }

    #[tokio::test]
    async fn tool_failure_propagates_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tool = MockTransferTool::new();
        tool.expect_copy_dir().returning(|_, _, _| {
            Err(SyncError::ExternalTool {
                command: "gsutil -m cp -r gs://b/lib .".into(),
                status: "exit status: 1".into(),
            })
        });

        let retriever = Retriever::new(tool, CacheDir::new(tmp.path()));
        let err = retriever.fetch_directory("gs://b/lib", None).await.unwrap_err();
        assert!(err.is_external_tool());
    }

    #[tokio::test]
    async fn fetch_file_does_not_verify_existence() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tool = MockTransferTool::new();
        tool.expect_copy_object().returning(|_, _| Ok(()));

        let retriever = Retriever::new(tool, CacheDir::new(tmp.path()));
        let path = retriever.fetch_file("gs://b/marker", None).await.unwrap();
        assert_eq!(path, tmp.path().join("marker"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn relative_cache_root_is_handed_to_the_tool_as_absolute() {
        let scratch = tempfile::tempdir_in(".").unwrap();
        let rel_root = scratch.path().join("cache");
        assert!(rel_root.is_relative());
        let expected = std::env::current_dir().unwrap().join(&rel_root);

        let seen = expected.clone();
        let mut tool = MockTransferTool::new();
        tool.expect_copy_object()
            .withf(move |_, dest| dest == seen.as_path())
            .times(1)
            .returning(|_, dest| {
                std::fs::write(dest.join("cloud_build_latest"), "abc123\n").unwrap();
                Ok(())
            });

        let retriever = Retriever::new(tool, CacheDir::new(&rel_root));
        let path = retriever.fetch_file("gs://b/cloud_build_latest", None).await.unwrap();
        assert_eq!(path, expected.join("cloud_build_latest"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc123\n");
    }

    #[tokio::test]
    async fn file_content_is_trimmed() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tool = MockTransferTool::new();
        tool.expect_copy_object()
            .with(eq("gs://b/cloud_build_latest"), always())
            .returning(|_, dest| {
                std::fs::write(dest.join("cloud_build_latest"), "  abc123\n").unwrap();
                Ok(())
            });

        let retriever = Retriever::new(tool, CacheDir::new(tmp.path()));
        let content = retriever.file_content("gs://b/cloud_build_latest", None).await.unwrap();
        assert_eq!(content, "abc123");
    }
}
