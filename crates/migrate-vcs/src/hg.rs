//! Mercurial backend, driven through the `hg` CLI.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::run_with_env;
use crate::error::VcsError;
use crate::repo::Vcs;
use crate::types::{Backend, BlameLine};

/// `HGPLAIN` disables user configuration that changes output formats.
const PLAIN: &[(&str, &str)] = &[("HGPLAIN", "1")];

/// A [`Vcs`] over a Mercurial working directory.
pub struct HgVcs {
    root: PathBuf,
}

impl HgVcs {
    /// Use the Mercurial repository at `root`.
    ///
    /// # Errors
    /// Returns [`VcsError::UnsupportedRepository`] when `root` has no `.hg`.
    pub fn open(root: &Path) -> Result<Self, VcsError> {
        if !root.join(".hg").is_dir() {
            return Err(VcsError::UnsupportedRepository {
                path: root.to_path_buf(),
                message: "no .hg directory".to_owned(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

impl Vcs for HgVcs {
    fn root(&self) -> &Path {
        &self.root
    }

    fn backend(&self) -> Backend {
        Backend::Hg
    }

    fn blame(&self, file: &str) -> Result<Vec<BlameLine>, VcsError> {
        let stdout = run_with_env(
            "hg",
            &["annotate", "--template", "json", "--date", "--user", "--", file],
            &self.root,
            PLAIN,
        )?;
        parse_annotate_json(&stdout)
    }

    fn commit(&self, message: &str, author: &str) -> Result<(), VcsError> {
        run_with_env(
            "hg",
            &["commit", "--addremove", "--user", author, "--message", message],
            &self.root,
            PLAIN,
        )?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct AnnotatedFile {
    lines: Vec<AnnotatedLine>,
}

#[derive(Deserialize)]
struct AnnotatedLine {
    /// `[unix_time, tz_offset]`.
    date: (f64, i64),
    user: String,
}

fn parse_annotate_json(stdout: &str) -> Result<Vec<BlameLine>, VcsError> {
    let files: Vec<AnnotatedFile> =
        serde_json::from_str(stdout).map_err(|e| VcsError::Parse {
            what: "hg annotate json".to_owned(),
            message: e.to_string(),
        })?;
    Ok(files
        .into_iter()
        .flat_map(|file| file.lines)
        .map(|line| {
            #[allow(clippy::cast_possible_truncation)]
            let timestamp = line.date.0.trunc() as i64;
            BlameLine::new(line.user, timestamp)
        })
        .collect())
}
