//! Extracting downloaded packages with `tar`.

use std::path::Path;

use crate::error::{Result, ToolError};
use crate::process::{Invocation, Runner};

/// Extracts archives into directories.
pub struct ArchiveExpander<'r> {
    runner: &'r dyn Runner,
}

impl<'r> ArchiveExpander<'r> {
    pub fn new(runner: &'r dyn Runner) -> Self {
        ArchiveExpander { runner }
    }

    /// Extract `archive` into `dest`, creating `dest` if needed.
    ///
    /// With `strip_first_component` the archive's top-level directory is
    /// dropped, so its contents land directly in `dest`.
    pub fn extract(&self, archive: &Path, dest: &Path, strip_first_component: bool) -> Result<()> {
        if !dest.is_dir() {
            tracing::debug!("mkdir -p {}", dest.display());
            std::fs::create_dir_all(dest).map_err(|source| ToolError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        }

        let mut invocation = Invocation::new("tar").arg("xf").arg(archive);
        if strip_first_component {
            invocation = invocation.arg("--strip-components=1");
        }
        let invocation = invocation.arg("-C").arg(dest);
        self.runner.run(&invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::RecordingRunner;

    #[test]
    fn extract_creates_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("binutils/linux");
        let runner = RecordingRunner::new();

        ArchiveExpander::new(&runner)
            .extract(Path::new("binutils-arm-linux.tar.bz2"), &dest, false)
            .unwrap();

        assert!(dest.is_dir());
        assert_eq!(
            runner.command_lines(),
            vec![format!(
                "tar xf binutils-arm-linux.tar.bz2 -C {}",
                dest.display()
            )]
        );
    }

    #[test]
    fn extract_can_strip_leading_component() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();

        ArchiveExpander::new(&runner)
            .extract(Path::new("ndk_platform.tar.bz2"), dir.path(), true)
            .unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![format!(
                "tar xf ndk_platform.tar.bz2 --strip-components=1 -C {}",
                dir.path().display()
            )]
        );
    }

    #[test]
    fn extract_real_tarball() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("pkg");
        std::fs::create_dir_all(src.join("platforms/android-21")).unwrap();
        std::fs::write(src.join("NOTICE"), b"license").unwrap();
        let archive = dir.path().join("pkg.tar");
        let status = std::process::Command::new("tar")
            .arg("cf")
            .arg(&archive)
            .arg("-C")
            .arg(dir.path())
            .arg("pkg")
            .status()
            .unwrap();
        assert!(status.success());

        let dest = dir.path().join("out");
        ArchiveExpander::new(&crate::process::SystemRunner)
            .extract(&archive, &dest, true)
            .unwrap();

        assert!(dest.join("NOTICE").is_file());
        assert!(dest.join("platforms/android-21").is_dir());
    }
}
