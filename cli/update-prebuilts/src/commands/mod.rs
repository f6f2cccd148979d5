//! Update flows, one per prebuilt kind.
//!
//! Each flow is a straight line: start a topic branch, fetch, extract,
//! rearrange, stage, commit. Any error aborts the run before the commit.

pub mod binutils;
pub mod clang;
pub mod gcc;
pub mod platform;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use prebuilts_core::{branch_name, ArtifactKind, BuildSource, CommitMessage};
use prebuilts_tools::{ArchiveExpander, ArtifactFetcher, BranchTool, Runner, Stager};

use crate::config::PrebuiltsConfig;

/// The checkout an update runs against.
pub struct Workspace<'r> {
    /// The NDK prebuilts directory (`<top>/prebuilts/ndk`); all staging
    /// happens here.
    pub ndk_dir: PathBuf,
    /// Root of the Android checkout.
    pub android_top: PathBuf,
    pub config: PrebuiltsConfig,
    pub runner: &'r dyn Runner,
}

impl<'r> Workspace<'r> {
    /// Resolve the checkout for `ndk_dir`. Both directories must exist.
    pub fn new(ndk_dir: &Path, config: PrebuiltsConfig, runner: &'r dyn Runner) -> Result<Self> {
        let ndk_dir = ndk_dir
            .canonicalize()
            .with_context(|| format!("resolving NDK directory {}", ndk_dir.display()))?;
        let top = config.android_top(&ndk_dir);
        let android_top = top
            .canonicalize()
            .with_context(|| format!("resolving Android checkout {}", top.display()))?;
        Ok(Workspace {
            ndk_dir,
            android_top,
            config,
            runner,
        })
    }

    pub fn fetcher(&self) -> ArtifactFetcher<'r> {
        ArtifactFetcher::new(self.runner, &self.config.fetch.tool, &self.ndk_dir)
    }

    pub fn expander(&self) -> ArchiveExpander<'r> {
        ArchiveExpander::new(self.runner)
    }

    pub fn stager(&self) -> Result<Stager<'r>> {
        let branch_tool = BranchTool::detect(&self.android_top)?;
        Ok(Stager::new(self.runner, &self.ndk_dir, branch_tool))
    }
}

/// Options shared by every flow that control the branch and commit.
#[derive(Debug, Clone)]
pub struct CommitOptions {
    /// Bug reference for the commit message.
    pub bug: String,
    /// Commit on the current branch instead of starting a topic branch.
    pub use_current_branch: bool,
}

/// Start the topic branch for this update unless told not to.
fn begin(stager: &Stager<'_>, kind: ArtifactKind, source: &BuildSource, options: &CommitOptions) -> Result<()> {
    if options.use_current_branch {
        return Ok(());
    }
    let name = branch_name(kind, source);
    tracing::info!("Starting branch {name}...");
    stager
        .start_branch(&name)
        .with_context(|| format!("starting branch {name}"))
}

/// Commit everything staged for this update.
fn finish(stager: &Stager<'_>, kind: ArtifactKind, source: &BuildSource, options: &CommitOptions) -> Result<()> {
    let message = CommitMessage {
        kind,
        source,
        bug: &options.bug,
    };
    tracing::info!("Committing update...");
    stager
        .commit(&message.to_string())
        .context("committing update")
}

/// Delete `path` if it exists, file or directory.
fn remove_leftover(path: &Path) -> Result<()> {
    if path.symlink_metadata().is_err() {
        return Ok(());
    }
    tracing::debug!("rmtree {}", path.display());
    let result = if path.is_dir() && !path.is_symlink() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.with_context(|| format!("removing {}", path.display()))
}

/// Delete a downloaded package once it has been extracted.
fn remove_package(path: &Path) -> Result<()> {
    tracing::debug!("rm {}", path.display());
    std::fs::remove_file(path).with_context(|| format!("removing {}", path.display()))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the flow tests.

    use std::path::PathBuf;

    use prebuilts_tools::Runner;

    use super::Workspace;
    use crate::config::PrebuiltsConfig;

    /// A fake `<top>/prebuilts/ndk` checkout.
    pub struct Checkout {
        pub dir: tempfile::TempDir,
        pub ndk_dir: PathBuf,
    }

    impl Checkout {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let ndk_dir = dir.path().join("prebuilts/ndk");
            std::fs::create_dir_all(&ndk_dir).unwrap();
            Checkout { dir, ndk_dir }
        }

        pub fn workspace<'r>(&self, runner: &'r dyn Runner) -> Workspace<'r> {
            let config = PrebuiltsConfig {
                fetch: crate::config::FetchConfig {
                    tool: PathBuf::from("fetch_artifact"),
                },
                ..PrebuiltsConfig::default()
            };
            Workspace::new(&self.ndk_dir, config, runner).unwrap()
        }
    }

    pub fn options() -> super::CommitOptions {
        super::CommitOptions {
            bug: "b/1234".to_string(),
            use_current_branch: false,
        }
    }
}
