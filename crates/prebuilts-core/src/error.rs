//! Error types for release ordering and platform layout normalization.

use std::path::PathBuf;

/// Errors raised while parsing or selecting Clang release directories.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    /// A directory name does not have the `clang-r<digits><letter?>` shape.
    #[error("invalid clang release name '{name}': {reason}")]
    Format { name: String, reason: String },

    /// No candidate name carried the `clang-r` prefix.
    #[error("no clang-r* release found among the candidates")]
    EmptyCandidateSet,
}

/// Errors raised while normalizing an extracted platform package.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The package root has no `NOTICE` to relocate.
    #[error("expected NOTICE file not found at {}", path.display())]
    MissingNotice { path: PathBuf },

    /// A platform directory that must exist was not found.
    #[error("platform directory not found: {}", path.display())]
    MissingPlatform { path: PathBuf },

    /// The rename destination is already occupied.
    #[error(
        "could not rename android-{codename} to android-{new_name} because {} already exists",
        path.display()
    )]
    RenameConflict {
        codename: String,
        new_name: String,
        path: PathBuf,
    },

    /// Codenamed releases are still present after removal and renaming.
    #[error(
        "Found unhandled codenamed releases in the sysroot. Clang requires numeric \
         releases, so codenamed releases must either be removed using \
         --remove-platform or renamed using --rename-codename. Found codenames:\n{}",
        format_paths(paths)
    )]
    ResidualCodenames { paths: Vec<PathBuf> },

    /// Filesystem failure at a specific path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LayoutError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LayoutError::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result alias for release operations.
pub type ReleaseResult<T> = std::result::Result<T, ReleaseError>;

/// Result alias for layout operations.
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;
