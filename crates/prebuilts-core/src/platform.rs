//! Platform sysroot layout normalization.
//!
//! A freshly extracted platform package looks like:
//!
//! ```text
//! <root>/
//!   NOTICE
//!   sysroot/...
//!   platforms/
//!     android-21/...
//!     android-O/...        — codenamed release
//!     android-current/...  — unreleased future API level
//!     android-REL/...      — transient release alias (some packages only)
//! ```
//!
//! Clang only understands numeric API levels, so before the tree can be
//! committed every codenamed level must be removed or renamed to a number.
//! Normalization runs these stages in order, stopping at the first failure:
//!
//! 1. relocate `NOTICE` into `sysroot/`
//! 2. remove the levels the caller asked to drop
//! 3. remove `android-current` (required) and `android-REL` (if present)
//! 4. apply codename renames in caller order
//! 5. verify no codenamed level is left, reporting all of them at once

use std::path::{Path, PathBuf};

use crate::error::{LayoutError, LayoutResult};

const PLATFORM_PREFIX: &str = "android-";

/// Ordered codename → level renames.
///
/// Re-inserting a codename replaces its target but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameRequest {
    pairs: Vec<(String, String)>,
}

impl RenameRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `codename` to be renamed to `new_name`.
    pub fn insert(&mut self, codename: impl Into<String>, new_name: impl Into<String>) {
        let codename = codename.into();
        let new_name = new_name.into();
        match self.pairs.iter_mut().find(|(c, _)| *c == codename) {
            Some(pair) => pair.1 = new_name,
            None => self.pairs.push((codename, new_name)),
        }
    }

    /// Iterate over `(codename, new_name)` pairs in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenameRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut request = RenameRequest::new();
        for (codename, new_name) in iter {
            request.insert(codename, new_name);
        }
        request
    }
}

/// Caller-supplied adjustments applied during normalization.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// API levels to delete outright (e.g. `"P"`, `"28"`).
    pub remove: Vec<String>,
    /// Codenames to rename to numeric levels.
    pub renames: RenameRequest,
}

/// What a successful normalization did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Levels that were present and removed at the caller's request.
    pub removed: Vec<String>,
    /// Renames that were applied, in order.
    pub renamed: Vec<(String, String)>,
    /// Numeric API levels left in the tree, ascending.
    pub levels: Vec<u64>,
}

/// An extracted platform package on disk.
#[derive(Debug, Clone)]
pub struct PlatformTree {
    root: PathBuf,
}

impl PlatformTree {
    /// Wrap the package extracted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PlatformTree { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `platforms/` directory.
    pub fn platforms_dir(&self) -> PathBuf {
        self.root.join("platforms")
    }

    /// The directory for API level `level`, e.g. `platforms/android-21`.
    pub fn platform_dir(&self, level: &str) -> PathBuf {
        self.platforms_dir().join(format!("{PLATFORM_PREFIX}{level}"))
    }

    /// Run every normalization stage, stopping at the first failure.
    pub fn normalize(&self, options: &NormalizeOptions) -> LayoutResult<NormalizeReport> {
        tracing::info!("Normalizing platform layout in {}", self.root.display());

        self.relocate_notice()?;
        let removed = self.remove_platforms(&options.remove)?;
        self.remove_implicit_codenames()?;
        let renamed = self.apply_renames(&options.renames)?;
        self.verify_no_codenames()?;
        let levels = self.numeric_levels()?;

        Ok(NormalizeReport {
            removed,
            renamed,
            levels,
        })
    }

    /// Move the package's top-level `NOTICE` into `sysroot/`.
    ///
    /// The package root is not itself installed; only `sysroot/` is, so the
    /// license has to travel with it.
    pub fn relocate_notice(&self) -> LayoutResult<()> {
        let src = self.root.join("NOTICE");
        if !src.is_file() {
            return Err(LayoutError::MissingNotice { path: src });
        }
        let sysroot = self.root.join("sysroot");
        if !sysroot.is_dir() {
            tracing::debug!("mkdir -p {}", sysroot.display());
            std::fs::create_dir_all(&sysroot).map_err(|e| LayoutError::io(&sysroot, e))?;
        }
        rename(&src, &sysroot.join("NOTICE"))
    }

    /// Delete the given levels if present. Returns the ones that existed.
    pub fn remove_platforms<S: AsRef<str>>(&self, levels: &[S]) -> LayoutResult<Vec<String>> {
        let mut removed = Vec::new();
        for level in levels {
            let level = level.as_ref();
            let path = self.platform_dir(level);
            if path.exists() {
                remove_tree(&path)?;
                removed.push(level.to_string());
            } else {
                tracing::debug!("{} not present, nothing to remove", path.display());
            }
        }
        Ok(removed)
    }

    /// Delete `android-current` and, if the package has one, `android-REL`.
    ///
    /// `android-current` is the next, not yet numbered, API level and must
    /// never ship. Every platform package carries it.
    pub fn remove_implicit_codenames(&self) -> LayoutResult<()> {
        let current = self.platform_dir("current");
        if !current.exists() {
            return Err(LayoutError::MissingPlatform { path: current });
        }
        remove_tree(&current)?;

        let rel = self.platform_dir("REL");
        if rel.exists() {
            remove_tree(&rel)?;
        }
        Ok(())
    }

    /// Apply `renames` in order. Returns the renames performed.
    ///
    /// An occupied destination is an error and nothing is moved for that pair.
    pub fn apply_renames(&self, renames: &RenameRequest) -> LayoutResult<Vec<(String, String)>> {
        let mut applied = Vec::with_capacity(renames.len());
        for (codename, new_name) in renames.iter() {
            let src = self.platform_dir(codename);
            let dst = self.platform_dir(new_name);

            if dst.exists() {
                return Err(LayoutError::RenameConflict {
                    codename: codename.to_string(),
                    new_name: new_name.to_string(),
                    path: dst,
                });
            }
            if !src.exists() {
                return Err(LayoutError::MissingPlatform { path: src });
            }

            rename(&src, &dst)?;
            applied.push((codename.to_string(), new_name.to_string()));
        }
        Ok(applied)
    }

    /// Every `platforms/android-*` entry whose level is not a number.
    pub fn find_codenames(&self) -> LayoutResult<Vec<PathBuf>> {
        let mut codenames: Vec<PathBuf> = self
            .platform_entries()?
            .into_iter()
            .filter(|(_, level)| !is_numeric_level(level))
            .map(|(path, _)| path)
            .collect();
        codenames.sort();
        Ok(codenames)
    }

    /// Fail with every residual codename if any remain.
    pub fn verify_no_codenames(&self) -> LayoutResult<()> {
        let paths = self.find_codenames()?;
        if paths.is_empty() {
            Ok(())
        } else {
            Err(LayoutError::ResidualCodenames { paths })
        }
    }

    /// Numeric API levels present under `platforms/`, ascending.
    ///
    /// Levels too large for a `u64` still count as numeric but are not listed.
    pub fn numeric_levels(&self) -> LayoutResult<Vec<u64>> {
        let mut levels: Vec<u64> = self
            .platform_entries()?
            .into_iter()
            .filter(|(_, level)| is_numeric_level(level))
            .filter_map(|(_, level)| level.parse().ok())
            .collect();
        levels.sort_unstable();
        Ok(levels)
    }

    /// `(path, level)` for each `android-*` entry under `platforms/`.
    fn platform_entries(&self) -> LayoutResult<Vec<(PathBuf, String)>> {
        let dir = self.platforms_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| LayoutError::io(&dir, e))? {
            let entry = entry.map_err(|e| LayoutError::io(&dir, e))?;
            let name = entry.file_name();
            let Some(level) = name.to_string_lossy().strip_prefix(PLATFORM_PREFIX).map(str::to_owned)
            else {
                continue;
            };
            entries.push((entry.path(), level));
        }
        Ok(entries)
    }
}

/// A level is numeric when it is all ASCII digits, whatever its magnitude.
fn is_numeric_level(level: &str) -> bool {
    !level.is_empty() && level.bytes().all(|b| b.is_ascii_digit())
}

fn remove_tree(path: &Path) -> LayoutResult<()> {
    tracing::debug!("rmtree {}", path.display());
    let result = if path.is_dir() && !path.is_symlink() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|e| LayoutError::io(path, e))
}

fn rename(src: &Path, dst: &Path) -> LayoutResult<()> {
    tracing::debug!("mv {} {}", src.display(), dst.display());
    std::fs::rename(src, dst).map_err(|e| LayoutError::io(src, e))
}
