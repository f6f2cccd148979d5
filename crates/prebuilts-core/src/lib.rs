//! Core logic for updating NDK toolchain prebuilts.
//!
//! Two pieces of real logic live here; everything else in the workspace is
//! plumbing around external tools:
//! - **release** — parse `clang-r<revision><patch>` directory names and pick
//!   the newest release.
//! - **platform** — normalize an extracted platform sysroot package so that no
//!   codenamed API level is ever committed.
//!
//! Supporting modules name the hosts, architectures and build artifacts the
//! update flows iterate over, and render topic branch names and commit
//! messages.

pub mod error;
pub mod host;
pub mod message;
pub mod package;
pub mod platform;
pub mod release;

// Re-exports for convenience.
pub use error::{LayoutError, LayoutResult, ReleaseError, ReleaseResult};
pub use host::{Arch, Host};
pub use message::{branch_name, ArtifactKind, BuildSource, CommitMessage};
pub use package::Package;
pub use platform::{NormalizeOptions, NormalizeReport, PlatformTree, RenameRequest};
pub use release::{scan_release_dir, select_latest, ReleaseId};
