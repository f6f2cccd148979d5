//! Clang release identifiers and "latest release" selection.
//!
//! Prebuilt Clang lives in directories named `clang-r<revision><patch>`, where
//! `<revision>` is the toolchain revision and `<patch>` is an optional single
//! lowercase letter for point releases cut from the same revision:
//!
//! ```text
//! clang-r45 < clang-r45a < clang-r45b < clang-r46
//! ```
//!
//! Ordering is a two-key comparison on `(revision, patch)` with a missing patch
//! sorting first. Rendered strings are never compared, but rendering gives
//! back the parsed name exactly, leading zeros included.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ReleaseError, ReleaseResult};

/// Prefix shared by every Clang release directory.
pub const RELEASE_PREFIX: &str = "clang-r";

static RELEASE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)([a-z]?)$").expect("release suffix pattern compiles"));

/// A parsed Clang release, e.g. `r365631c`.
///
/// Equality, ordering and hashing only look at `(revision, patch)`.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseId {
    revision: u64,
    patch: Option<char>,
    /// Digit count of the revision as written; 0 renders it without padding.
    digits: usize,
}

impl ReleaseId {
    /// Build an identifier from its parts.
    pub fn new(revision: u64, patch: Option<char>) -> Self {
        ReleaseId {
            revision,
            patch,
            digits: 0,
        }
    }

    fn key(&self) -> (u64, Option<char>) {
        (self.revision, self.patch)
    }

    /// The numeric toolchain revision.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The point-release letter, if any.
    pub fn patch(&self) -> Option<char> {
        self.patch
    }

    /// Parse a directory name such as `clang-r365631c`.
    pub fn parse_dir_name(name: &str) -> ReleaseResult<Self> {
        let rest = name
            .strip_prefix(RELEASE_PREFIX)
            .ok_or_else(|| ReleaseError::Format {
                name: name.to_string(),
                reason: format!("expected prefix '{RELEASE_PREFIX}'"),
            })?;

        let caps = RELEASE_SUFFIX
            .captures(rest)
            .ok_or_else(|| ReleaseError::Format {
                name: name.to_string(),
                reason: format!("expected name to match {}", RELEASE_SUFFIX.as_str()),
            })?;

        let revision = caps[1].parse::<u64>().map_err(|e| ReleaseError::Format {
            name: name.to_string(),
            reason: format!("revision out of range: {e}"),
        })?;
        let patch = caps[2].chars().next();

        Ok(ReleaseId {
            revision,
            patch,
            digits: caps[1].len(),
        })
    }

    /// Parse a build string as typed on the command line, e.g. `r365631c`.
    pub fn parse_build(build: &str) -> ReleaseResult<Self> {
        Self::parse_dir_name(&format!("clang-{build}"))
    }

    /// The directory name this release is installed under.
    pub fn dir_name(&self) -> String {
        format!("clang-{self}")
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{:0width$}", self.revision, width = self.digits)?;
        if let Some(patch) = self.patch {
            write!(f, "{patch}")?;
        }
        Ok(())
    }
}

impl PartialEq for ReleaseId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ReleaseId {}

impl PartialOrd for ReleaseId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for ReleaseId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl FromStr for ReleaseId {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReleaseId::parse_dir_name(s)
    }
}

/// Pick the newest release among `names`.
///
/// Names without the `clang-r` prefix are ignored, since a directory listing
/// usually holds unrelated entries. A prefixed name that does not parse is an
/// error rather than being skipped.
pub fn select_latest<I, S>(names: I) -> ReleaseResult<ReleaseId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut latest: Option<ReleaseId> = None;
    for name in names {
        let name = name.as_ref();
        if !name.starts_with(RELEASE_PREFIX) {
            continue;
        }
        let release = ReleaseId::parse_dir_name(name)?;
        latest = Some(match latest {
            Some(current) => current.max(release),
            None => release,
        });
    }

    let latest = latest.ok_or(ReleaseError::EmptyCandidateSet)?;
    tracing::debug!("latest clang release is {latest}");
    Ok(latest)
}

/// List the names of the subdirectories of `dir`.
pub fn scan_release_dir(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
