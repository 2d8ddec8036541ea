//! Per-key attribution of source files.
//!
//! The VCS reports who last touched each line. Blame maps every key of a
//! source file to the author and time of its first line, so a multi-line
//! value is attributed to whoever wrote the line holding its key.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use migrate_vcs::{BlameLine, Vcs};
use regex::Regex;
use serde::Serialize;

use crate::legacy::{LegacyFormat, LegacyResource};

/// `(author index, timestamp)` keyed by path, then by key.
pub type BlameMap = BTreeMap<String, BTreeMap<String, (usize, i64)>>;

/// Attribution of every key in a set of files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BlameResult {
    /// Authors in the order they were first seen.
    pub authors: Vec<String>,
    pub blame: BlameMap,
}

impl BlameResult {
    fn author_index(&mut self, author: &str) -> usize {
        if let Some(index) = self.authors.iter().position(|known| known == author) {
            return index;
        }
        self.authors.push(author.to_owned());
        self.authors.len() - 1
    }
}

static FTL_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?[a-zA-Z][a-zA-Z0-9_-]*)[ \t]*=").expect("message key pattern is a valid regex")
});

static FTL_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]+\.([a-zA-Z][a-zA-Z0-9_-]*)[ \t]*=")
        .expect("attribute key pattern is a valid regex")
});

/// Attribution over a repository.
pub struct Blame<'a> {
    vcs: &'a dyn Vcs,
}

impl<'a> Blame<'a> {
    #[must_use]
    pub const fn new(vcs: &'a dyn Vcs) -> Self {
        Self { vcs }
    }

    /// Attribute every key of `files`, paths relative to the repository root.
    ///
    /// A file that cannot be read or blamed is logged and left out.
    pub fn attribution<'p>(&self, files: impl IntoIterator<Item = &'p str>) -> BlameResult {
        let mut result = BlameResult::default();
        for path in files {
            let text = match std::fs::read_to_string(self.vcs.root().join(path)) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(path, error = %err, "cannot read file for blame");
                    continue;
                }
            };
            let lines = match self.vcs.blame(path) {
                Ok(lines) => lines,
                Err(err) => {
                    tracing::warn!(path, error = %err, "blame failed");
                    continue;
                }
            };
            handle_file(&mut result, path, &text, &lines);
        }
        tracing::debug!(
            files = result.blame.len(),
            authors = result.authors.len(),
            "blame complete"
        );
        result
    }
}

fn handle_file(result: &mut BlameResult, path: &str, text: &str, lines: &[BlameLine]) {
    let mut keys = BTreeMap::new();
    for (key, line) in key_lines(path, text) {
        let Some(blame) = line.checked_sub(1).and_then(|index| lines.get(index)) else {
            tracing::debug!(path, %key, line, "no blame for line");
            continue;
        };
        let author = result.author_index(&blame.author);
        keys.insert(key, (author, blame.timestamp));
    }
    result.blame.insert(path.to_owned(), keys);
}

/// Every key of a source file with the 1-based line it starts on.
fn key_lines(path: &str, text: &str) -> Vec<(String, usize)> {
    if path.ends_with(".ftl") {
        return ftl_key_lines(text);
    }
    let Some(format) = LegacyFormat::from_path(path) else {
        tracing::warn!(path, "unsupported file format for blame");
        return Vec::new();
    };
    LegacyResource::parse(format, text)
        .entries()
        .iter()
        .map(|entry| (entry.key.clone(), entry.line))
        .collect()
}

/// Message, term and `message.attribute` keys of Fluent text.
fn ftl_key_lines(text: &str) -> Vec<(String, usize)> {
    let mut keys = Vec::new();
    let mut current: Option<&str> = None;
    for (index, line) in text.lines().enumerate() {
        if let Some(caps) = FTL_MESSAGE.captures(line) {
            let id = caps.get(1).map_or("", |m| m.as_str());
            keys.push((id.to_owned(), index + 1));
            current = Some(id);
        } else if let Some(caps) = FTL_ATTRIBUTE.captures(line) {
            if let (Some(parent), Some(attribute)) = (current, caps.get(1)) {
                keys.push((format!("{parent}.{}", attribute.as_str()), index + 1));
            }
        } else if !line.starts_with([' ', '\t']) && !line.is_empty() {
            current = None;
        }
    }
    keys
}
