//! Proto merge: copy `*.proto` files from a local googleapis checkout into a
//! retrieved artifact.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::SyncError;

/// Default proto scope inside a googleapis checkout.
pub fn default_proto_scope(service: &str, version: &str) -> PathBuf {
    Path::new("google").join("cloud").join(service).join(version)
}

/// Copy every `*.proto` under `source_dir` (recursively) into `output_dir`,
/// flattened by file name. A missing `source_dir` copies nothing. Returns the
/// destination paths in walk order.
pub fn merge_protos(source_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    std::fs::create_dir_all(output_dir).map_err(|e| SyncError::io(output_dir, e))?;

    if !source_dir.is_dir() {
        warn!(path = %source_dir.display(), "Proto source directory not found, no protos copied");
        return Ok(Vec::new());
    }

    let mut copied = Vec::new();
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source_dir).to_path_buf();
            SyncError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() || entry.path().extension().map_or(true, |ext| ext != "proto") {
            continue;
        }

        let target = output_dir.join(entry.file_name());
        debug!(from = %entry.path().display(), to = %target.display(), "Copy proto");
        std::fs::copy(entry.path(), &target).map_err(|e| SyncError::io(entry.path(), e))?;
        copied.push(target);
    }

    info!(count = copied.len(), path = %output_dir.display(), "Placed proto files");
    Ok(copied)
}
