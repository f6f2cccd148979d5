//! Topic branch names and commit messages for prebuilt updates.

use std::fmt;
use std::path::PathBuf;

/// The kind of prebuilt an update run refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Clang,
    Binutils,
    Gcc,
    Platform,
}

impl ArtifactKind {
    /// Short name used in topic branch names.
    pub fn slug(self) -> &'static str {
        match self {
            ArtifactKind::Clang => "clang",
            ArtifactKind::Binutils => "binutils",
            ArtifactKind::Gcc => "gcc",
            ArtifactKind::Platform => "platform",
        }
    }

    fn subject(self) -> &'static str {
        match self {
            ArtifactKind::Clang => "prebuilt Clang",
            ArtifactKind::Binutils => "prebuilt binutils",
            ArtifactKind::Gcc => "prebuilt GCC",
            ArtifactKind::Platform => "NDK platform prebuilts",
        }
    }
}

/// Where the new prebuilts came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSource {
    /// A build number (or Clang release) on the build server.
    Build(String),
    /// An artifact already on local disk.
    Local(PathBuf),
}

impl BuildSource {
    fn branch_suffix(&self) -> &str {
        match self {
            BuildSource::Build(build) => build,
            BuildSource::Local(_) => "local",
        }
    }
}

/// Name of the topic branch an update is committed on.
pub fn branch_name(kind: ArtifactKind, source: &BuildSource) -> String {
    format!("update-{}-{}", kind.slug(), source.branch_suffix())
}

/// The commit message recorded for an update.
#[derive(Debug, Clone)]
pub struct CommitMessage<'a> {
    pub kind: ArtifactKind,
    pub source: &'a BuildSource,
    pub bug: &'a str,
}

impl fmt::Display for CommitMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            BuildSource::Build(build) => {
                writeln!(f, "Update {} to build {build}.", self.kind.subject())?
            }
            BuildSource::Local(_) => {
                writeln!(f, "Update {} with local artifact.", self.kind.subject())?
            }
        }
        writeln!(f)?;
        writeln!(f, "Test: ndk/checkbuild.py && ndk/run_tests.py")?;
        write!(f, "Bug: {}", self.bug)
    }
}
