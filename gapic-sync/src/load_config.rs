/// `load_config` module: parses the YAML sync config into core settings and
/// typed fetch requests.
///
/// This is the only place untrusted YAML is parsed. Language names deserialize
/// straight into [`Language`], so an unsupported language fails while parsing,
/// before any `gsutil` process is started. Environment overrides
/// (`SYNTHTOOL_CLOUD_BUILD_URI`, `SYNTHTOOL_GOOGLEAPIS`, `GAPIC_SYNC_CACHE_DIR`)
/// are applied on top of the file.
use anyhow::{Context, Result};
use gapic_sync_core::cache::CacheDir;
use gapic_sync_core::config::SyncSettings;
use gapic_sync_core::gapic::ArtifactRequest;
use gapic_sync_core::Language;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub googleapis_dir: Option<PathBuf>,
    #[serde(default)]
    pub cloud_build_uri: Option<String>,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub metadata_out: Option<PathBuf>,
    #[serde(default)]
    pub libraries: Vec<LibrarySection>,
}

fn default_parallel() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct LibrarySection {
    pub service: String,
    pub version: String,
    pub language: Language,
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub include_protos: bool,
    #[serde(default)]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub gapic_dir: Option<PathBuf>,
    #[serde(default)]
    pub proto_source: Option<PathBuf>,
}

impl LibrarySection {
    fn into_request(self) -> ArtifactRequest {
        ArtifactRequest {
            service: self.service,
            version: self.version,
            language: self.language,
            revision: self.revision,
            destination: self.destination,
            include_protos: self.include_protos,
            gapic_dir: self.gapic_dir,
            proto_source: self.proto_source,
        }
    }
}

/// A loaded config, ready to hand to the core pipeline.
#[derive(Debug)]
pub struct LoadedConfig {
    pub settings: SyncSettings,
    pub requests: Vec<ArtifactRequest>,
    pub metadata_out: Option<PathBuf>,
}

impl CliConfig {
    pub fn into_loaded(self) -> Result<LoadedConfig> {
        let mut settings = SyncSettings::default();
        if let Some(uri) = self.cloud_build_uri {
            settings.cloud_build_uri = uri;
        }
        if let Some(dir) = self.cache_dir {
            settings.cache = CacheDir::new(dir);
        }
        settings.googleapis_dir = self.googleapis_dir;
        settings.parallel = self.parallel;
        let settings = settings.with_env_overrides();

        let requests = self
            .libraries
            .into_iter()
            .map(LibrarySection::into_request)
            .collect();

        Ok(LoadedConfig {
            settings,
            requests,
            metadata_out: self.metadata_out,
        })
    }
}

/// Loads a YAML config file and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LoadedConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    let raw: CliConfig = serde_yaml::from_str(&config_content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML: {e}")
    })?;
    info!(config_path = ?path_ref, libraries = raw.libraries.len(), "Parsed config YAML successfully");

    let loaded = raw
        .into_loaded()
        .with_context(|| format!("Invalid config file {:?}", path_ref))?;
    loaded.settings.trace_loaded();
    Ok(loaded)
}
