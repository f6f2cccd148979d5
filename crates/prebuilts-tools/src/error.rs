//! Errors from driving external tools.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors that can occur while running an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The tool ran and exited unsuccessfully.
    #[error("`{command}` failed ({status})")]
    ExternalProcess { command: String, status: ExitStatus },

    /// The tool could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A required tool is not on `PATH`.
    #[error("could not find {name} in PATH")]
    ToolNotFound { name: String },

    /// Filesystem failure around a tool invocation.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;
