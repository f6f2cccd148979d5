//! `update-prebuilts clang` — point the NDK at a prebuilt Clang.
//!
//! Clang is not copied into the NDK prebuilts. Each host's
//! `current/toolchains/<host>/llvm` is a relative symlink into the platform's
//! `prebuilts/clang/host/<host>/clang-<release>`, so an update only swaps links.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use prebuilts_core::{scan_release_dir, select_latest, ArtifactKind, BuildSource, Host, ReleaseId};

use super::{begin, finish, remove_leftover, CommitOptions, Workspace};

/// Link every host to `build`, or to the newest release on disk if `None`.
pub fn run(ws: &Workspace<'_>, build: Option<&str>, options: &CommitOptions) -> Result<()> {
    let release = match build {
        Some(build) => ReleaseId::parse_build(build)?,
        None => latest_release(ws)?,
    };
    let source = BuildSource::Build(release.to_string());

    let stager = ws.stager()?;
    begin(&stager, ArtifactKind::Clang, &source, options)?;

    for host in Host::ALL {
        let install_path = link_path(ws, host);
        if install_path.symlink_metadata().is_ok() {
            tracing::info!("Removing old Clang link for {host}...");
            stager.remove_path(&install_path)?;
            // git rm leaves untracked links behind.
            remove_leftover(&install_path)?;
        }

        let install_dir = install_path
            .parent()
            .context("llvm link has no parent directory")?;
        if !install_dir.is_dir() {
            tracing::debug!("mkdir -p {}", install_dir.display());
            std::fs::create_dir_all(install_dir)
                .with_context(|| format!("creating {}", install_dir.display()))?;
        }

        let target = relative_path(&prebuilt_path(ws, host, &release), install_dir);
        tracing::info!("Linking {host} {}...", release.dir_name());
        tracing::debug!("ln -s {} {}", target.display(), install_path.display());
        std::os::unix::fs::symlink(&target, &install_path)
            .with_context(|| format!("linking {}", install_path.display()))?;

        tracing::info!("Adding {host} link to index...");
        stager.add_path(&install_path)?;
    }

    finish(&stager, ArtifactKind::Clang, &source, options)
}

/// Newest release under the Linux Clang prebuilts.
fn latest_release(ws: &Workspace<'_>) -> Result<ReleaseId> {
    let dir = clang_host_dir(ws, Host::Linux);
    let names = scan_release_dir(&dir).with_context(|| format!("listing {}", dir.display()))?;
    let release =
        select_latest(&names).with_context(|| format!("finding latest Clang in {}", dir.display()))?;
    tracing::info!("Latest Clang release is {release}");
    Ok(release)
}

fn clang_host_dir(ws: &Workspace<'_>, host: Host) -> PathBuf {
    ws.android_top
        .join("prebuilts/clang/host")
        .join(host.prebuilt_tag())
}

/// The NDK's `llvm` link for `host`.
pub fn link_path(ws: &Workspace<'_>, host: Host) -> PathBuf {
    ws.ndk_dir
        .join("current/toolchains")
        .join(host.ndk_tag())
        .join("llvm")
}

/// Where `release` lives in the Clang prebuilts for `host`.
pub fn prebuilt_path(ws: &Workspace<'_>, host: Host, release: &ReleaseId) -> PathBuf {
    clang_host_dir(ws, host).join(release.dir_name())
}

/// `target` expressed relative to directory `base`. Both must be absolute and
/// free of `..` components.
fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target: Vec<Component<'_>> = target.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();
    let common = target
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component);
    }
    rel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{options, Checkout};
    use prebuilts_tools::RecordingRunner;

    fn with_clang_releases(checkout: &Checkout, names: &[&str]) {
        for name in names {
            let dir = checkout
                .dir
                .path()
                .join("prebuilts/clang/host/linux-x86")
                .join(name);
            std::fs::create_dir_all(dir).unwrap();
        }
    }

    #[test]
    fn links_every_host_to_latest_release() {
        let checkout = Checkout::new();
        with_clang_releases(&checkout, &["clang-r20", "clang-r20a", "clang-r19z", "clang-stable"]);
        let runner = RecordingRunner::new();
        let ws = checkout.workspace(&runner);

        run(&ws, None, &options()).unwrap();

        let link = link_path(&ws, Host::Linux);
        assert_eq!(
            std::fs::read_link(&link).unwrap(),
            PathBuf::from("../../../../clang/host/linux-x86/clang-r20a")
        );
        let windows = std::fs::read_link(link_path(&ws, Host::Windows)).unwrap();
        assert_eq!(
            windows,
            PathBuf::from("../../../../clang/host/windows-x86_32/clang-r20a")
        );

        let lines = runner.command_lines();
        assert_eq!(lines.first().unwrap(), "repo start update-clang-r20a .");
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("git add ")).count(),
            Host::ALL.len()
        );
        assert!(lines
            .last()
            .unwrap()
            .starts_with("git commit -m Update prebuilt Clang to build r20a."));
    }

    #[test]
    fn links_to_release_directory_as_named_on_disk() {
        let checkout = Checkout::new();
        with_clang_releases(&checkout, &["clang-r007", "clang-r6"]);
        let runner = RecordingRunner::new();
        let ws = checkout.workspace(&runner);

        run(&ws, None, &options()).unwrap();

        let link = link_path(&ws, Host::Linux);
        assert_eq!(
            std::fs::read_link(&link).unwrap(),
            PathBuf::from("../../../../clang/host/linux-x86/clang-r007")
        );
        assert!(link.is_dir(), "link should resolve to the release on disk");
        assert_eq!(runner.command_lines()[0], "repo start update-clang-r007 .");
    }

    #[test]
    fn replaces_existing_link() {
        let checkout = Checkout::new();
        let runner = RecordingRunner::new();
        let ws = checkout.workspace(&runner);
        let old = link_path(&ws, Host::Darwin);
        std::fs::create_dir_all(old.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink("../../../../clang/host/darwin-x86/clang-r1", &old).unwrap();

        run(&ws, Some("r365631c"), &options()).unwrap();

        assert_eq!(
            std::fs::read_link(&old).unwrap(),
            PathBuf::from("../../../../clang/host/darwin-x86/clang-r365631c")
        );
        let lines = runner.command_lines();
        assert_eq!(
            lines[1],
            format!("git rm -rf --ignore-unmatch {}", old.display())
        );
    }

    #[test]
    fn invalid_build_fails_before_touching_anything() {
        let checkout = Checkout::new();
        let runner = RecordingRunner::new();
        let ws = checkout.workspace(&runner);

        assert!(run(&ws, Some("365631C"), &options()).is_err());
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn no_releases_on_disk_is_an_error() {
        let checkout = Checkout::new();
        with_clang_releases(&checkout, &["clang-stable"]);
        let runner = RecordingRunner::new();
        let ws = checkout.workspace(&runner);

        let err = run(&ws, None, &options()).unwrap_err();
        assert!(format!("{err:#}").contains("no clang-r* release found"));
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn current_branch_skips_repo_start() {
        let checkout = Checkout::new();
        let runner = RecordingRunner::new();
        let ws = checkout.workspace(&runner);
        let mut opts = options();
        opts.use_current_branch = true;

        run(&ws, Some("r10"), &opts).unwrap();

        assert!(!runner
            .command_lines()
            .iter()
            .any(|l| l.starts_with("repo ")));
    }

    #[test]
    fn relative_path_between_siblings() {
        assert_eq!(
            relative_path(Path::new("/a/b/c/d"), Path::new("/a/x/y")),
            PathBuf::from("../../b/c/d")
        );
        assert_eq!(
            relative_path(Path::new("/a/b"), Path::new("/a")),
            PathBuf::from("b")
        );
    }
}
