//! git backend: gix for opening, the git CLI for blame and commit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cli::run;
use crate::error::VcsError;
use crate::repo::Vcs;
use crate::types::{Backend, BlameLine};

/// A [`Vcs`] over a git working tree.
pub struct GitVcs {
    root: PathBuf,
}

impl GitVcs {
    /// Open the git repository whose working tree contains `root`.
    ///
    /// # Errors
    /// Returns [`VcsError::BackendError`] if gix cannot open the repository,
    /// and [`VcsError::UnsupportedRepository`] for bare repositories.
    pub fn open(root: &Path) -> Result<Self, VcsError> {
        let repo = gix::discover(root).map_err(|e| VcsError::BackendError {
            message: e.to_string(),
        })?;
        if repo.workdir().is_none() {
            return Err(VcsError::UnsupportedRepository {
                path: root.to_path_buf(),
                message: "bare git repository has no working tree".to_owned(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

impl Vcs for GitVcs {
    fn root(&self) -> &Path {
        &self.root
    }

    fn backend(&self) -> Backend {
        Backend::Git
    }

    fn blame(&self, file: &str) -> Result<Vec<BlameLine>, VcsError> {
        let stdout = run("git", &["blame", "--porcelain", "--", file], &self.root)?;
        parse_porcelain(&stdout)
    }

    fn commit(&self, message: &str, author: &str) -> Result<(), VcsError> {
        run("git", &["add", "."], &self.root)?;
        let author = format!("--author={}", git_author(author));
        let message = format!("--message={message}");
        run("git", &["commit", &author, &message], &self.root)?;
        Ok(())
    }
}

/// git requires `Name <email>`; bare names get an empty address.
fn git_author(author: &str) -> String {
    if author.contains('<') && author.ends_with('>') {
        author.to_owned()
    } else {
        format!("{author} <>")
    }
}

#[derive(Clone, Default)]
struct CommitAuthor {
    name: String,
    mail: String,
    time: i64,
}

/// Parse `git blame --porcelain` output.
///
/// Author fields are only printed the first time a commit appears, so they
/// are remembered per commit hash.
fn parse_porcelain(stdout: &str) -> Result<Vec<BlameLine>, VcsError> {
    let mut commits: HashMap<String, CommitAuthor> = HashMap::new();
    let mut current = String::new();
    let mut lines = Vec::new();

    for line in stdout.lines() {
        if line.starts_with('\t') {
            let author = commits.get(&current).cloned().unwrap_or_default();
            let name = if author.mail.is_empty() {
                author.name
            } else {
                format!("{} {}", author.name, author.mail)
            };
            lines.push(BlameLine::new(name, author.time));
            continue;
        }
        if let Some(name) = line.strip_prefix("author ") {
            commits.entry(current.clone()).or_default().name = name.to_owned();
        } else if let Some(mail) = line.strip_prefix("author-mail ") {
            commits.entry(current.clone()).or_default().mail = mail.to_owned();
        } else if let Some(time) = line.strip_prefix("author-time ") {
            let time = time.trim().parse().map_err(|e| VcsError::Parse {
                what: "git blame author-time".to_owned(),
                message: format!("{time:?}: {e}"),
            })?;
            commits.entry(current.clone()).or_default().time = time;
        } else if let Some(hash) = line.split(' ').next().filter(|word| is_commit_hash(word)) {
            hash.clone_into(&mut current);
        }
    }
    Ok(lines)
}

fn is_commit_hash(word: &str) -> bool {
    matches!(word.len(), 40 | 64) && word.chars().all(|c| c.is_ascii_hexdigit())
}
