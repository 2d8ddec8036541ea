//! Error types for the migration engine.
//!
//! [`MigrateError`] covers every hard failure a migration can hit: bad
//! migration definitions, unreadable inputs, and repository errors. A hard
//! error aborts the migration that raised it; the batch driver logs it and
//! moves on to the next migration.
//!
//! A translation that is simply missing from a legacy file is *not* an
//! error. The evaluator reports it as [`Absent`](crate::evaluator::Absent)
//! and the affected message is skipped.

use std::path::PathBuf;

use migrate_vcs::VcsError;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = MigrateError> = std::result::Result<T, E>;

/// Hard failures of a migration.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The reference `.ftl` file could not be read.
    #[error("could not read reference file `{path}`: {detail}")]
    UnreadableReference {
        /// Path relative to the reference directory.
        path: String,
        /// The underlying I/O failure.
        detail: String,
    },

    /// None of the legacy files a migration depends on exist.
    #[error("{message}")]
    EmptyLocalization {
        /// Human-readable description.
        message: String,
    },

    /// A transform was used in a way the tool does not support, for example
    /// copying a legacy value out of an `.ftl` file.
    #[error("not supported: {message}")]
    NotSupported {
        /// What was attempted and what to use instead.
        message: String,
    },

    /// A migration definition is malformed.
    #[error("invalid transform: {message}")]
    InvalidTransform {
        /// What is wrong with the definition.
        message: String,
    },

    /// A structured copy names a key that the loaded `.ftl` source lacks.
    #[error("pattern `{key}` not found in `{path}`")]
    MissingPattern {
        /// The `.ftl` source file.
        path: String,
        /// The missing message, attribute or term key.
        key: String,
    },

    /// A recipe file could not be loaded.
    #[error("invalid recipe {}: {message}", path.display())]
    Recipe {
        /// The recipe file.
        path: PathBuf,
        /// Why it was rejected.
        message: String,
    },

    /// The tool configuration file could not be loaded.
    #[error("invalid config {}: {message}", path.display())]
    Config {
        /// The config file.
        path: PathBuf,
        /// Why it was rejected.
        message: String,
    },

    /// A file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The version-control backend failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

impl MigrateError {
    pub(crate) fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_transform(message: impl Into<String>) -> Self {
        Self::InvalidTransform {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_file() {
        let err = MigrateError::MissingPattern {
            path: "browser/menu.ftl".to_owned(),
            key: "open.label".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "pattern `open.label` not found in `browser/menu.ftl`"
        );

        let err = MigrateError::io(
            "out/file.ftl",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("I/O error on out/file.ftl"));
    }
}
