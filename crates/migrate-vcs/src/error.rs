//! Error types for version-control operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`Vcs`](crate::Vcs) operations.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The directory is not inside a repository of any supported kind.
    #[error("unsupported repository at {}: {message}", path.display())]
    UnsupportedRepository {
        /// The directory that was checked.
        path: PathBuf,
        /// What was looked for.
        message: String,
    },

    /// A version-control command exited unsuccessfully.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Trimmed standard error of the command.
        stderr: String,
    },

    /// Command output could not be interpreted.
    #[error("could not parse {what}: {message}")]
    Parse {
        /// Which output was being parsed.
        what: String,
        /// Details about the failure.
        message: String,
    },

    /// An I/O error occurred (process spawn, file system, etc.).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The gix backend returned an error while opening the repository.
    #[error("git backend error: {message}")]
    BackendError {
        /// Freeform error description from the backend.
        message: String,
    },
}
