use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::info;

use crate::contract::{ClientDestination, MetadataRecorder};
use crate::error::SyncError;

/// In-memory [`MetadataRecorder`] that can be written out as JSON.
#[derive(Debug, Default)]
pub struct MetadataCollector {
    destinations: Mutex<Vec<ClientDestination>>,
}

#[derive(Serialize)]
struct MetadataFile<'a> {
    destinations: Vec<DestinationEntry<'a>>,
}

#[derive(Serialize)]
struct DestinationEntry<'a> {
    client: &'a ClientDestination,
}

impl MetadataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ClientDestination>> {
        self.destinations.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn destinations(&self) -> Vec<ClientDestination> {
        self.lock().clone()
    }

    pub fn to_json(&self) -> Result<String, SyncError> {
        let destinations = self.lock();
        let file = MetadataFile {
            destinations: destinations
                .iter()
                .map(|client| DestinationEntry { client })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Write `{"destinations": [{"client": {...}}, ...]}` to `path`.
    pub fn write_json(&self, path: &Path) -> Result<(), SyncError> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        std::fs::write(path, json).map_err(|e| SyncError::io(path, e))?;
        info!(path = %path.display(), count = self.lock().len(), "Wrote generation metadata");
        Ok(())
    }
}

impl MetadataRecorder for MetadataCollector {
    fn add_client_destination(&self, destination: ClientDestination) {
        self.lock().push(destination);
    }
}
