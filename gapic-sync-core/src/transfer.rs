//! # transfer: the external object-storage CLI seam
//!
//! [`TransferTool`] is the only place the crate touches the object store. The
//! production implementation, [`Gsutil`], shells out to `gsutil` and waits for
//! it to exit; tests either mock the trait or point [`Gsutil`] at a stub
//! program.
//!
//! A zero exit status is taken as success. `gsutil` can exit 0 after copying
//! nothing, so callers that need a result on disk must check for it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::SyncError;

/// Copies objects out of the store into the local filesystem.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TransferTool: Send + Sync {
    /// Recursively copy the directory at `uri` into `cwd`
    /// (`gsutil [-m] cp -r <uri> .`, run inside `cwd`).
    async fn copy_dir(&self, uri: &str, cwd: &Path, parallel: bool) -> Result<(), SyncError>;

    /// Copy the single object at `uri` into the directory `dest`
    /// (`gsutil cp <uri> <dest>`, run inside `dest`).
    async fn copy_object(&self, uri: &str, dest: &Path) -> Result<(), SyncError>;
}

/// `gsutil` invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct Gsutil {
    program: PathBuf,
}

impl Default for Gsutil {
    fn default() -> Self {
        Self::new()
    }
}

impl Gsutil {
    pub fn new() -> Self {
        Self::with_program("gsutil")
    }

    /// Use a different executable, e.g. a stub in tests.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: Vec<OsString>, cwd: &Path) -> Result<(), SyncError> {
        let command = render_command(&self.program, &args);
        debug!(command = %command, cwd = %cwd.display(), "Running transfer tool");

        let status = Command::new(&self.program)
            .args(&args)
            .current_dir(cwd)
            .status()
            .await;

        match status {
            Ok(s) if s.success() => {
                debug!(command = %command, status = ?s, "Transfer tool finished");
                Ok(())
            }
            Ok(s) => {
                error!(command = %command, "Transfer tool exited with non-zero code: {}", s);
                Err(SyncError::ExternalTool {
                    command,
                    status: s.to_string(),
                })
            }
            Err(e) => {
                error!(error = ?e, command = %command, "Failed to launch transfer tool");
                Err(SyncError::ToolLaunch { command, source: e })
            }
        }
    }
}

#[async_trait]
impl TransferTool for Gsutil {
    async fn copy_dir(&self, uri: &str, cwd: &Path, parallel: bool) -> Result<(), SyncError> {
        let mut args: Vec<OsString> = Vec::with_capacity(5);
        if parallel {
            args.push("-m".into());
        }
        args.extend(["cp", "-r", uri, "."].map(OsString::from));
        self.run(args, cwd).await
    }

    async fn copy_object(&self, uri: &str, dest: &Path) -> Result<(), SyncError> {
        let args = vec![OsString::from("cp"), OsString::from(uri), dest.as_os_str().to_owned()];
        self.run(args, dest).await
    }
}

fn render_command(program: &Path, args: &[OsString]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}
