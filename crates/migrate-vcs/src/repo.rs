//! The [`Vcs`] trait, the boundary between the migration driver and the
//! repository holding the localization files.
//!
//! The trait is object-safe; the driver holds a `Box<dyn Vcs>` so tests can
//! substitute an in-memory double.

use std::path::Path;

use crate::error::VcsError;
use crate::git::GitVcs;
use crate::hg::HgVcs;
use crate::types::{Backend, BlameLine};

/// Per-line blame and author-attributed commits.
pub trait Vcs {
    /// The working directory root. Paths passed to [`Vcs::blame`] are
    /// relative to it.
    fn root(&self) -> &Path;

    /// The backend kind, for logging.
    fn backend(&self) -> Backend;

    /// Blame every line of `file`, in line order.
    ///
    /// # Errors
    /// Returns [`VcsError::CommandFailed`] when the file is not tracked or the
    /// backend tool fails, and [`VcsError::Parse`] on unexpected output.
    fn blame(&self, file: &str) -> Result<Vec<BlameLine>, VcsError>;

    /// Record all pending changes under the working directory as one commit.
    ///
    /// # Errors
    /// Returns [`VcsError::CommandFailed`] when the backend refuses the commit.
    fn commit(&self, message: &str, author: &str) -> Result<(), VcsError>;
}

/// Open the repository rooted at `root` with the requested backend.
///
/// With [`Backend::Auto`], a `.hg` directory selects Mercurial and a `.git`
/// entry selects git.
///
/// # Errors
/// Returns [`VcsError::UnsupportedRepository`] when auto-detection finds
/// neither, or the backend's own error when opening fails.
pub fn open(root: &Path, backend: Backend) -> Result<Box<dyn Vcs>, VcsError> {
    let backend = match backend {
        Backend::Auto if root.join(".hg").is_dir() => Backend::Hg,
        Backend::Auto if root.join(".git").exists() => Backend::Git,
        Backend::Auto => {
            return Err(VcsError::UnsupportedRepository {
                path: root.to_path_buf(),
                message: "no .hg or .git found".to_owned(),
            });
        }
        explicit => explicit,
    };
    tracing::debug!(root = %root.display(), %backend, "opening repository");
    match backend {
        Backend::Hg => Ok(Box::new(HgVcs::open(root)?)),
        _ => Ok(Box::new(GitVcs::open(root)?)),
    }
}
