//! `update-prebuilts platform` — replace `platform/` with a new sysroot
//! package, from the build server or from local disk.
//!
//! The extracted package is normalized before staging so that no codenamed
//! API level is ever committed.

use anyhow::{Context, Result};

use prebuilts_core::{ArtifactKind, BuildSource, NormalizeOptions, Package, PlatformTree};
use prebuilts_tools::ArtifactRequest;

use super::{begin, finish, remove_leftover, remove_package, CommitOptions, Workspace};

const INSTALL_DIR: &str = "platform";

/// Install the platform package described by `source`.
///
/// A [`BuildSource::Local`] path must already be absolute; it is never
/// deleted.
pub fn run(
    ws: &Workspace<'_>,
    source: &BuildSource,
    branch: Option<&str>,
    normalize: &NormalizeOptions,
    options: &CommitOptions,
) -> Result<()> {
    if let BuildSource::Local(package) = source {
        tracing::info!("Using local artifact at {}", package.display());
    }

    let stager = ws.stager()?;
    begin(&stager, ArtifactKind::Platform, source, options)?;

    let install_dir = ws.ndk_dir.join(INSTALL_DIR);
    stager.remove_path(&install_dir)?;
    remove_leftover(&install_dir)?;
    tracing::debug!("mkdir -p {}", install_dir.display());
    std::fs::create_dir_all(&install_dir)
        .with_context(|| format!("creating {}", install_dir.display()))?;

    let (archive, downloaded) = match source {
        BuildSource::Build(build) => {
            let package = Package::platform();
            let branch = branch.unwrap_or(&ws.config.branches.platform);
            let path = ws
                .fetcher()
                .fetch(&ArtifactRequest {
                    branch,
                    target: &package.target,
                    build,
                    pattern: &package.file_name,
                })
                .with_context(|| format!("fetching {}", package.file_name))?;
            (path, true)
        }
        BuildSource::Local(path) => (path.clone(), false),
    };

    tracing::info!("Extracting {}...", archive.display());
    ws.expander().extract(&archive, &install_dir, true)?;
    if downloaded {
        remove_package(&archive)?;
    }

    let report = PlatformTree::new(&install_dir)
        .normalize(normalize)
        .context("normalizing platform package")?;
    for level in &report.removed {
        tracing::info!("Removed android-{level}");
    }
    for (codename, new_name) in &report.renamed {
        tracing::info!("Renamed android-{codename} to android-{new_name}");
    }
    tracing::info!("Platform levels: {:?}", report.levels);

    tracing::info!("Adding files to index...");
    stager.add_path(&install_dir)?;

    finish(&stager, ArtifactKind::Platform, source, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{options, Checkout};
    use prebuilts_core::RenameRequest;
    use prebuilts_tools::{Invocation, RecordingRunner, ToolError};
    use std::path::PathBuf;

    fn io_err(path: PathBuf) -> impl FnOnce(std::io::Error) -> ToolError {
        move |source| ToolError::Io { path, source }
    }

    /// Lay out a platform package with the given levels in `tar`'s destination.
    fn fake_extract(invocation: &Invocation, levels: &[&str]) -> prebuilts_tools::Result<()> {
        let dest = PathBuf::from(invocation.get_args().last().unwrap());
        std::fs::write(dest.join("NOTICE"), b"license").map_err(io_err(dest.join("NOTICE")))?;
        std::fs::create_dir_all(dest.join("sysroot/usr/include"))
            .map_err(io_err(dest.join("sysroot")))?;
        for level in levels {
            let dir = dest.join(format!("platforms/android-{level}"));
            std::fs::create_dir_all(&dir).map_err(io_err(dir))?;
        }
        Ok(())
    }

    fn fake_tools(levels: &'static [&'static str]) -> RecordingRunner {
        RecordingRunner::with_hook(move |invocation| {
            if invocation.program() == "fetch_artifact" {
                let dir = invocation.get_current_dir().unwrap();
                let pattern = invocation.get_args().last().unwrap();
                std::fs::write(dir.join(pattern), b"").map_err(io_err(dir.join(pattern)))?;
            } else if invocation.program() == "tar" {
                fake_extract(invocation, levels)?;
            }
            Ok(())
        })
    }

    #[test]
    fn downloads_normalizes_and_commits() {
        let checkout = Checkout::new();
        let stale = checkout.ndk_dir.join("platform/platforms/android-9");
        std::fs::create_dir_all(&stale).unwrap();
        let runner = fake_tools(&["21", "28", "P", "Q", "current", "REL"]);
        let ws = checkout.workspace(&runner);
        let normalize = NormalizeOptions {
            remove: vec!["P".to_string()],
            renames: [("Q", "29")].into_iter().collect::<RenameRequest>(),
        };

        run(&ws, &BuildSource::Build("6000".to_string()), None, &normalize, &options()).unwrap();

        let install_dir = ws.ndk_dir.join("platform");
        let tree = PlatformTree::new(&install_dir);
        assert_eq!(tree.numeric_levels().unwrap(), vec![21, 28, 29]);
        assert!(install_dir.join("sysroot/NOTICE").is_file());
        assert!(!install_dir.join("NOTICE").exists());
        assert!(!stale.exists());
        assert!(!ws.ndk_dir.join("ndk_platform.tar.bz2").exists());

        let lines = runner.command_lines();
        assert_eq!(lines[0], "repo start update-platform-6000 .");
        assert_eq!(
            lines[1],
            format!("git rm -rf --ignore-unmatch {}", install_dir.display())
        );
        assert_eq!(
            lines[2],
            "fetch_artifact --branch aosp-master --target=ndk --bid 6000 ndk_platform.tar.bz2"
        );
        assert_eq!(
            lines[3],
            format!(
                "tar xf {} --strip-components=1 -C {}",
                ws.ndk_dir.join("ndk_platform.tar.bz2").display(),
                install_dir.display()
            )
        );
        assert_eq!(lines[4], format!("git add {}", install_dir.display()));
        assert!(lines[5].starts_with("git commit -m Update NDK platform prebuilts to build 6000."));
    }

    #[test]
    fn local_artifact_is_kept() {
        let checkout = Checkout::new();
        let local = checkout.dir.path().join("out/ndk_platform.tar.bz2");
        std::fs::create_dir_all(local.parent().unwrap()).unwrap();
        std::fs::write(&local, b"").unwrap();
        let runner = fake_tools(&["21", "current"]);
        let ws = checkout.workspace(&runner);

        run(
            &ws,
            &BuildSource::Local(local.clone()),
            None,
            &NormalizeOptions::default(),
            &options(),
        )
        .unwrap();

        assert!(local.exists());
        let lines = runner.command_lines();
        assert_eq!(lines[0], "repo start update-platform-local .");
        assert!(!lines.iter().any(|l| l.starts_with("fetch_artifact")));
        assert!(lines
            .last()
            .unwrap()
            .starts_with("git commit -m Update NDK platform prebuilts with local artifact."));
    }

    #[test]
    fn residual_codename_aborts_before_staging() {
        let checkout = Checkout::new();
        let runner = fake_tools(&["21", "O", "current"]);
        let ws = checkout.workspace(&runner);

        let err = run(
            &ws,
            &BuildSource::Build("1".to_string()),
            Some("aosp-ndk"),
            &NormalizeOptions::default(),
            &options(),
        )
        .unwrap_err();

        let message = format!("{err:#}");
        assert!(message.contains("Found unhandled codenamed releases"));
        assert!(message.contains("android-O"));
        let lines = runner.command_lines();
        assert!(lines[2].starts_with("fetch_artifact --branch aosp-ndk "));
        assert!(!lines.iter().any(|l| l.starts_with("git add") || l.starts_with("git commit")));
    }

    #[test]
    fn rename_onto_existing_level_fails() {
        let checkout = Checkout::new();
        let runner = fake_tools(&["26", "O", "current"]);
        let ws = checkout.workspace(&runner);
        let normalize = NormalizeOptions {
            remove: Vec::new(),
            renames: [("O", "26")].into_iter().collect(),
        };

        let err = run(
            &ws,
            &BuildSource::Build("1".to_string()),
            None,
            &normalize,
            &options(),
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("could not rename android-O to android-26"));
    }
}
