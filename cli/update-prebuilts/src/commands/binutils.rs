//! `update-prebuilts binutils` — replace `binutils/` with a new build.

use anyhow::{Context, Result};

use prebuilts_core::{ArtifactKind, BuildSource, Host, Package};
use prebuilts_tools::ArtifactRequest;

use super::{begin, finish, remove_leftover, remove_package, CommitOptions, Workspace};

const INSTALL_DIR: &str = "binutils";

/// Fetch every configured host/arch package of `build` and install it under
/// `binutils/<host>/`.
pub fn run(
    ws: &Workspace<'_>,
    build: &str,
    branch: Option<&str>,
    options: &CommitOptions,
) -> Result<()> {
    let branch = branch.unwrap_or(&ws.config.branches.binutils);
    let source = BuildSource::Build(build.to_string());

    let stager = ws.stager()?;
    begin(&stager, ArtifactKind::Binutils, &source, options)?;

    let fetcher = ws.fetcher();
    let mut packages: Vec<(Host, std::path::PathBuf)> = Vec::new();
    for &host in &ws.config.toolchains.binutils_hosts {
        for &arch in &ws.config.toolchains.arches {
            let package = Package::binutils(host, arch);
            let path = fetcher
                .fetch(&ArtifactRequest {
                    branch,
                    target: &package.target,
                    build,
                    pattern: &package.file_name,
                })
                .with_context(|| format!("fetching {}", package.file_name))?;
            packages.push((host, path));
        }
    }

    let install_dir = ws.ndk_dir.join(INSTALL_DIR);
    stager.remove_path(&install_dir)?;
    // git rm leaves untracked files and empty directories behind.
    remove_leftover(&install_dir)?;

    let expander = ws.expander();
    for (host, package) in &packages {
        tracing::info!("Extracting {}...", package.display());
        expander.extract(package, &install_dir.join(host.short_name()), false)?;
        remove_package(package)?;
    }

    tracing::info!("Adding files to index...");
    stager.add_path(&install_dir)?;

    finish(&stager, ArtifactKind::Binutils, &source, options)
}
