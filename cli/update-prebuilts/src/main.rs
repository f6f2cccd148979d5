//! update-prebuilts — refresh the NDK's toolchain and platform prebuilts and
//! commit the result on a topic branch.

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CommitOptions, Workspace};
use config::PrebuiltsConfig;
use prebuilts_core::{BuildSource, NormalizeOptions, RenameRequest};
use prebuilts_tools::SystemRunner;

#[derive(Parser)]
#[command(name = "update-prebuilts", version, about = "Update NDK prebuilts from the build server")]
struct Cli {
    /// NDK prebuilts directory (default: found via prebuilts.toml, else the
    /// current directory)
    #[arg(long, global = true)]
    ndk_dir: Option<PathBuf>,
    /// Log every command and filesystem change
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(flatten)]
    commit: CommitArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommitArgs {
    /// Bug URL for the commit message
    #[arg(short, long, global = true, default_value = "None")]
    bug: String,
    /// Do not start a new branch for the update
    #[arg(long, global = true)]
    use_current_branch: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Point the NDK at a prebuilt Clang release
    Clang {
        /// Clang release, e.g. r365631c (default: newest in prebuilts/clang)
        build: Option<String>,
    },
    /// Update the prebuilt binutils
    Binutils {
        /// Build number to pull from the build server
        build: String,
        /// Branch to pull from the build server
        #[arg(long)]
        branch: Option<String>,
    },
    /// Update the prebuilt GCC toolchains
    Gcc {
        /// Build number to pull from the build server
        build: String,
        /// Branch to pull from the build server
        #[arg(long)]
        branch: Option<String>,
    },
    /// Update the NDK platform sysroot
    Platform {
        /// Build number to pull from the build server, or a path to a local
        /// artifact with --no-download
        #[arg(value_name = "BUILD_OR_ARTIFACT")]
        build: String,
        /// Fetch artifacts from the build server (default)
        #[arg(long, conflicts_with = "no_download")]
        download: bool,
        /// Do not download; BUILD_OR_ARTIFACT is a local artifact
        #[arg(long)]
        no_download: bool,
        /// Branch to pull from the build server
        #[arg(long)]
        branch: Option<String>,
        /// Remove a platform directory (e.g. P or 28)
        #[arg(long = "remove-platform", value_name = "LEVEL")]
        remove_platform: Vec<String>,
        /// Rename a codenamed platform, e.g. --rename-codename O=26
        #[arg(long = "rename-codename", value_name = "CODENAME=NAME", value_parser = parse_key_value)]
        rename_codename: Vec<(String, String)>,
    },
}

/// Parse `key=value` with exactly one `=` and both sides non-empty.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let error = || format!("Argument must be in format key=value, got {s}");
    let mut parts = s.split('=');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(error()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    // A local artifact is relative to where we were invoked, not the NDK.
    let source = match &cli.command {
        Commands::Platform {
            build,
            download,
            no_download,
            ..
        } => Some(platform_source(build, *no_download && !*download, &cwd)?),
        _ => None,
    };

    let (config, ndk_dir) = resolve_ndk_dir(cli.ndk_dir.as_deref(), &cwd)?;
    let runner = SystemRunner;
    let ws = Workspace::new(&ndk_dir, config, &runner)?;
    let options = CommitOptions {
        bug: cli.commit.bug,
        use_current_branch: cli.commit.use_current_branch,
    };

    match cli.command {
        Commands::Clang { build } => commands::clang::run(&ws, build.as_deref(), &options),

        Commands::Binutils { build, branch } => {
            commands::binutils::run(&ws, &build, branch.as_deref(), &options)
        }

        Commands::Gcc { build, branch } => {
            commands::gcc::run(&ws, &build, branch.as_deref(), &options)
        }

        Commands::Platform {
            branch,
            remove_platform,
            rename_codename,
            ..
        } => {
            let source = source.context("platform source was not resolved")?;
            let normalize = NormalizeOptions {
                remove: remove_platform,
                renames: rename_codename.into_iter().collect::<RenameRequest>(),
            };
            commands::platform::run(&ws, &source, branch.as_deref(), &normalize, &options)
        }
    }
}

fn platform_source(build: &str, no_download: bool, cwd: &Path) -> anyhow::Result<BuildSource> {
    if !no_download {
        return Ok(BuildSource::Build(build.to_string()));
    }
    let path = cwd.join(build);
    let path = path
        .canonicalize()
        .with_context(|| format!("local artifact not found: {}", path.display()))?;
    Ok(BuildSource::Local(path))
}

/// Find the configuration and the NDK directory it applies to.
fn resolve_ndk_dir(ndk_dir: Option<&Path>, cwd: &Path) -> anyhow::Result<(PrebuiltsConfig, PathBuf)> {
    if let Some(dir) = ndk_dir {
        let dir = cwd.join(dir);
        return Ok((PrebuiltsConfig::load_in(&dir)?, dir));
    }
    match PrebuiltsConfig::find_and_load(cwd)? {
        Some(found) => Ok(found),
        None => Ok((PrebuiltsConfig::default(), cwd.to_path_buf())),
    }
}
