//! External tools driven by the prebuilt update flows.
//!
//! Nothing here reimplements what the tools do; each wrapper builds the exact
//! command line, runs it through a [`Runner`] and turns failures into typed
//! errors:
//! - **fetch** — `fetch_artifact` downloads from the build server
//! - **archive** — `tar` extraction
//! - **vcs** — `git rm`/`add`/`commit` and `repo`/`pore` topic branches

pub mod archive;
pub mod error;
pub mod fetch;
pub mod process;
pub mod vcs;

// Re-exports for convenience.
pub use archive::ArchiveExpander;
pub use error::{Result, ToolError};
pub use fetch::{ArtifactFetcher, ArtifactRequest, DEFAULT_FETCH_TOOL};
pub use process::{Invocation, RecordingRunner, Runner, SystemRunner};
pub use vcs::{BranchTool, Stager};
