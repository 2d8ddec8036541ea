//! Grouping blamed source keys into per-author changesets.
//!
//! Each author gets exactly one changeset holding every key they last
//! touched, dated by the oldest of those touches. Replaying changesets in
//! date order re-creates the translations roughly in the order they were
//! written.

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::blame::BlameResult;
use crate::transforms::SourceRef;

/// A set of `(path, key)` source changes.
pub type Changes = BTreeSet<SourceRef>;

/// The keys one author last touched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Changeset {
    pub author: String,
    /// Earliest commit time among the changes, in seconds since the Unix
    /// epoch. Authors with no changes keep the conversion time.
    pub first_commit: i64,
    pub changes: Changes,
}

/// Convert blame into changesets ordered by first commit.
#[must_use]
pub fn convert_blame_to_changesets(blame: &BlameResult) -> Vec<Changeset> {
    convert_blame_to_changesets_at(blame, current_time_secs())
}

/// [`convert_blame_to_changesets`] with an explicit "now".
///
/// The sort is stable: authors with equal first commits keep their order in
/// [`BlameResult::authors`].
#[must_use]
pub fn convert_blame_to_changesets_at(blame: &BlameResult, now: i64) -> Vec<Changeset> {
    let mut changesets: Vec<Changeset> = blame
        .authors
        .iter()
        .map(|author| Changeset {
            author: author.clone(),
            first_commit: now,
            changes: Changes::new(),
        })
        .collect();

    for (path, keys) in &blame.blame {
        for (key, &(author, timestamp)) in keys {
            let Some(changeset) = changesets.get_mut(author) else {
                tracing::warn!(%path, %key, author, "blame refers to an unknown author");
                continue;
            };
            changeset.changes.insert(SourceRef::new(path, key));
            changeset.first_commit = changeset.first_commit.min(timestamp);
        }
    }

    changesets.sort_by_key(|changeset| changeset.first_commit);
    changesets
}

fn current_time_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn blame(authors: &[&str], entries: &[(&str, &str, usize, i64)]) -> BlameResult {
        let mut map: BTreeMap<String, BTreeMap<String, (usize, i64)>> = BTreeMap::new();
        for &(path, key, author, timestamp) in entries {
            map.entry(path.to_owned())
                .or_default()
                .insert(key.to_owned(), (author, timestamp));
        }
        BlameResult {
            authors: authors.iter().map(|a| (*a).to_owned()).collect(),
            blame: map,
        }
    }

    #[test]
    fn one_changeset_per_author() {
        let result = convert_blame_to_changesets_at(
            &blame(
                &["Jane <jane@example.com>", "Joe <joe@example.com>"],
                &[
                    ("file.properties", "jane1", 0, 1_000),
                    ("file.properties", "joe", 1, 500),
                    ("other.dtd", "jane2", 0, 2_000),
                ],
            ),
            10_000,
        );
        assert_eq!(
            result,
            vec![
                Changeset {
                    author: "Joe <joe@example.com>".to_owned(),
                    first_commit: 500,
                    changes: [SourceRef::new("file.properties", "joe")].into(),
                },
                Changeset {
                    author: "Jane <jane@example.com>".to_owned(),
                    first_commit: 1_000,
                    changes: [
                        SourceRef::new("file.properties", "jane1"),
                        SourceRef::new("other.dtd", "jane2"),
                    ]
                    .into(),
                },
            ]
        );
    }

    #[test]
    fn idle_authors_sort_last_with_now() {
        let result = convert_blame_to_changesets_at(
            &blame(&["idle", "busy"], &[("a.dtd", "k", 1, 42)]),
            10_000,
        );
        assert_eq!(result[0].author, "busy");
        assert_eq!(result[1].author, "idle");
        assert_eq!(result[1].first_commit, 10_000);
        assert!(result[1].changes.is_empty());
    }

    #[test]
    fn ties_keep_author_order() {
        let result = convert_blame_to_changesets_at(
            &blame(&["b", "a"], &[("x.dtd", "one", 0, 7), ("x.dtd", "two", 1, 7)]),
            10_000,
        );
        let authors: Vec<&str> = result.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(authors, ["b", "a"]);
    }

    #[test]
    fn empty_blame_gives_no_changesets() {
        assert!(convert_blame_to_changesets(&BlameResult::default()).is_empty());
    }
}
