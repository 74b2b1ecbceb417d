/// CLI glue for gapic-sync: command parsing and wiring of the core pipeline.
///
/// All fetch logic lives in `gapic-sync-core`. This module builds the
/// settings, the `gsutil` transfer tool and the metadata/path collectors, runs
/// the requested fetches, and writes the collected metadata when asked to.
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gapic_sync_core::config::SyncSettings;
use gapic_sync_core::gapic::{ArtifactRequest, GapicCloudBuild};
use gapic_sync_core::metadata::MetadataCollector;
use gapic_sync_core::synchronise::{synchronise, SyncReport};
use gapic_sync_core::tracked_paths::TrackedPaths;
use gapic_sync_core::transfer::Gsutil;
use std::path::{Path, PathBuf};

/// CLI for gapic-sync: fetch pre-generated GAPIC client libraries.
#[derive(Parser)]
#[clap(
    name = "gapic-sync",
    version,
    about = "Fetch pre-generated GAPIC client libraries from Cloud Build artifacts"
)]
pub struct Cli {
    /// Transfer tool executable
    #[clap(long, global = true, env = "GAPIC_SYNC_GSUTIL", default_value = "gsutil")]
    pub gsutil: PathBuf,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every library listed in the given config file
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Fetch a single library
    Fetch {
        #[clap(long)]
        service: String,
        #[clap(long = "api-version")]
        api_version: String,
        /// go, java, php or python
        #[clap(long)]
        language: String,
        /// googleapis revision; defaults to the latest Cloud Build revision
        #[clap(long)]
        revision: Option<String>,
        /// Copy *.proto files from the googleapis checkout into the result
        #[clap(long)]
        include_protos: bool,
        /// Destination directory; defaults to the cache directory
        #[clap(long)]
        dest: Option<PathBuf>,
        /// Remote directory relative to the revision
        #[clap(long)]
        gapic_dir: Option<PathBuf>,
        /// Write generation metadata JSON here
        #[clap(long)]
        metadata_out: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let gsutil = Gsutil::with_program(cli.gsutil);
    match cli.command {
        Commands::Sync { config } => {
            let loaded = load_config(&config)?;
            tracing::info!(command = "sync", libraries = loaded.requests.len(), "Starting synchronisation");
            execute(&loaded.settings, gsutil, &loaded.requests, loaded.metadata_out.as_deref()).await
        }
        Commands::Fetch {
            service,
            api_version,
            language,
            revision,
            include_protos,
            dest,
            gapic_dir,
            metadata_out,
        } => {
            let mut request = ArtifactRequest::parse(&service, &api_version, &language)?
                .include_protos(include_protos);
            request.revision = revision;
            request.destination = dest;
            request.gapic_dir = gapic_dir;

            let settings = SyncSettings::from_env();
            settings.trace_loaded();
            tracing::info!(command = "fetch", service = %service, "Starting fetch");
            execute(&settings, gsutil, std::slice::from_ref(&request), metadata_out.as_deref()).await
        }
    }
}

async fn execute(
    settings: &SyncSettings,
    gsutil: Gsutil,
    requests: &[ArtifactRequest],
    metadata_out: Option<&Path>,
) -> Result<()> {
    let recorder = MetadataCollector::new();
    let tracker = TrackedPaths::new();
    let gapic = GapicCloudBuild::new(settings, gsutil, &recorder, &tracker);

    let outcome = synchronise(requests, &gapic).await;

    // Libraries fetched before a failure are still recorded.
    if let Some(path) = metadata_out {
        recorder
            .write_json(path)
            .with_context(|| format!("Failed to write metadata to {}", path.display()))?;
    }

    match outcome {
        Ok(report) => {
            print_report(&report);
            tracing::info!(?report, "Synchronisation complete");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Synchronisation failed");
            Err(anyhow::Error::new(e))
        }
    }
}

fn print_report(report: &SyncReport) {
    for library in &report.libraries {
        println!(
            "{} {} {} -> {} ({} protos)",
            library.api_name,
            library.api_version,
            library.language,
            library.local_path.display(),
            library.proto_files
        );
    }
}
