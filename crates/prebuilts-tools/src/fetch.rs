//! Downloading build artifacts with `fetch_artifact`.

use std::path::{Path, PathBuf};

use crate::error::{Result, ToolError};
use crate::process::{Invocation, Runner};

/// Where `fetch_artifact` lives on corp machines.
pub const DEFAULT_FETCH_TOOL: &str = "/google/data/ro/projects/android/fetch_artifact";

/// Metadata some versions of `fetch_artifact` leave in the working directory.
const STRAY_METADATA: &str = ".fetch_artifact2.dat";

/// Identifies one artifact of one build.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactRequest<'a> {
    /// Build server branch, e.g. `aosp-binutils`.
    pub branch: &'a str,
    /// Build target, e.g. `linux_arm64`.
    pub target: &'a str,
    /// Build number.
    pub build: &'a str,
    /// Artifact file name.
    pub pattern: &'a str,
}

/// Downloads artifacts into a working directory.
pub struct ArtifactFetcher<'r> {
    runner: &'r dyn Runner,
    tool: PathBuf,
    work_dir: PathBuf,
}

impl<'r> ArtifactFetcher<'r> {
    pub fn new(runner: &'r dyn Runner, tool: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        ArtifactFetcher {
            runner,
            tool: tool.into(),
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Fetch `request` and return the path of the downloaded file.
    pub fn fetch(&self, request: &ArtifactRequest<'_>) -> Result<PathBuf> {
        tracing::info!(
            "Fetching {} from {} build {} ({})",
            request.pattern,
            request.target,
            request.build,
            request.branch
        );
        let invocation = Invocation::new(&self.tool)
            .arg("--branch")
            .arg(request.branch)
            .arg(format!("--target={}", request.target))
            .arg("--bid")
            .arg(request.build)
            .arg(request.pattern)
            .current_dir(&self.work_dir);
        self.runner.run(&invocation)?;

        self.remove_stray_metadata()?;
        Ok(self.work_dir.join(request.pattern))
    }

    fn remove_stray_metadata(&self) -> Result<()> {
        let path = self.work_dir.join(STRAY_METADATA);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("rm {}", path.display());
                Ok(())
            }
            // Current fetch_artifact versions no longer write it.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ToolError::Io { path, source }),
        }
    }
}
