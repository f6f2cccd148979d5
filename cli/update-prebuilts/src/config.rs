//! `prebuilts.toml` parsing.
//!
//! The file is optional and lives in the NDK prebuilts directory. Every field
//! has a default, so an empty file (or none at all) describes the standard
//! `<top>/prebuilts/ndk` checkout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use prebuilts_core::{Arch, Host};
use prebuilts_tools::DEFAULT_FETCH_TOOL;

/// File name searched for when locating the NDK prebuilts directory.
pub const CONFIG_FILE: &str = "prebuilts.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrebuiltsConfig {
    pub paths: PathsConfig,
    pub fetch: FetchConfig,
    pub branches: BranchesConfig,
    pub toolchains: ToolchainsConfig,
}

/// Checkout layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the Android checkout, relative to the NDK prebuilts directory.
    /// Defaults to two levels up (`prebuilts/ndk` → top).
    pub android_top: Option<PathBuf>,
}

/// Build server access.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Path to the `fetch_artifact` tool.
    pub tool: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            tool: PathBuf::from(DEFAULT_FETCH_TOOL),
        }
    }
}

/// Default build server branch per artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BranchesConfig {
    pub binutils: String,
    pub gcc: String,
    pub platform: String,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            binutils: "aosp-binutils".to_string(),
            gcc: "aosp-gcc".to_string(),
            platform: "aosp-master".to_string(),
        }
    }
}

/// Which toolchain packages are pulled.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolchainsConfig {
    pub arches: Vec<Arch>,
    pub binutils_hosts: Vec<Host>,
    pub gcc_hosts: Vec<Host>,
}

impl Default for ToolchainsConfig {
    fn default() -> Self {
        ToolchainsConfig {
            arches: Arch::ALL.to_vec(),
            binutils_hosts: vec![Host::Darwin, Host::Linux, Host::Windows64],
            gcc_hosts: vec![Host::Linux],
        }
    }
}

impl PrebuiltsConfig {
    /// Search upward from `start_dir` for `prebuilts.toml`, parse it and return
    /// it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Ok(Some((Self::load(&candidate)?, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Load `dir/prebuilts.toml` if it exists, else the defaults.
    pub fn load_in(dir: &Path) -> Result<Self> {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse a configuration from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing prebuilts.toml")
    }

    /// Resolve the Android checkout root for an NDK directory.
    pub fn android_top(&self, ndk_dir: &Path) -> PathBuf {
        match &self.paths.android_top {
            Some(top) => ndk_dir.join(top),
            None => ndk_dir
                .parent()
                .and_then(Path::parent)
                .unwrap_or(ndk_dir)
                .to_path_buf(),
        }
    }
}
