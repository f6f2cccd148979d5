//! `update-prebuilts gcc` — replace the GCC toolchains under
//! `current/toolchains/<host>/`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use prebuilts_core::{Arch, ArtifactKind, BuildSource, Host, Package};
use prebuilts_tools::ArtifactRequest;

use super::{begin, finish, remove_leftover, remove_package, CommitOptions, Workspace};

pub fn run(
    ws: &Workspace<'_>,
    build: &str,
    branch: Option<&str>,
    options: &CommitOptions,
) -> Result<()> {
    let branch = branch.unwrap_or(&ws.config.branches.gcc);
    let source = BuildSource::Build(build.to_string());

    let stager = ws.stager()?;
    begin(&stager, ArtifactKind::Gcc, &source, options)?;

    let fetcher = ws.fetcher();
    let mut packages: Vec<(Host, Arch, PathBuf)> = Vec::new();
    for &host in &ws.config.toolchains.gcc_hosts {
        for &arch in &ws.config.toolchains.arches {
            let package = Package::gcc(host, arch);
            let path = fetcher
                .fetch(&ArtifactRequest {
                    branch,
                    target: &package.target,
                    build,
                    pattern: &package.file_name,
                })
                .with_context(|| format!("fetching {}", package.file_name))?;
            packages.push((host, arch, path));
        }
    }

    let expander = ws.expander();
    for (host, arch, package) in &packages {
        let toolchain = arch.gcc_toolchain_dir();
        let toolchain_path = toolchain_path(ws, *host, *arch);
        if toolchain_path.exists() {
            tracing::info!("Removing old {toolchain}...");
            stager.remove_path(&toolchain_path)?;
            // git rm -rf can leave empty directories behind.
            remove_leftover(&toolchain_path)?;
        }

        tracing::info!("Extracting {}...", package.display());
        let host_dir = toolchain_path
            .parent()
            .context("toolchain path has no parent directory")?;
        expander.extract(package, host_dir, false)?;
        remove_package(package)?;

        tracing::info!("Adding {toolchain} files to index...");
        stager.add_path(&toolchain_path)?;
    }

    finish(&stager, ArtifactKind::Gcc, &source, options)
}

/// Install location of the `arch` GCC toolchain for `host`.
pub fn toolchain_path(ws: &Workspace<'_>, host: Host, arch: Arch) -> PathBuf {
    ws.ndk_dir
        .join("current/toolchains")
        .join(host.ndk_tag())
        .join(arch.gcc_toolchain_dir())
}
