//! Value types used in [`Vcs`](crate::Vcs) signatures.

use serde::Deserialize;

/// Attribution of one line of a file: who committed it last, and when.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlameLine {
    /// Author as the backend reports it (`Name <email>` for git).
    pub author: String,
    /// Commit time in seconds since the Unix epoch.
    pub timestamp: i64,
}

impl BlameLine {
    #[must_use]
    pub fn new(author: impl Into<String>, timestamp: i64) -> Self {
        Self {
            author: author.into(),
            timestamp,
        }
    }
}

/// Which backend to use for a localization directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Detect from the `.hg` or `.git` directory at the root.
    #[default]
    Auto,
    Git,
    Hg,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Git => write!(f, "git"),
            Self::Hg => write!(f, "hg"),
        }
    }
}
