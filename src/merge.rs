//! Merging migrated entries into a target resource.
//!
//! The reference resource is the template: its order and standalone
//! comments shape the result. For each reference entry:
//!
//! - an entry already in the target file is kept, unless a transform in the
//!   current changeset produces different content, which replaces it;
//! - otherwise a transform in the current changeset is evaluated and added;
//! - otherwise the entry is left out.
//!
//! Target entries the reference does not know about are kept after the
//! reference-shaped part, under the same replacement rule, followed by
//! migrated entries that neither file has.

use std::collections::BTreeMap;

use migrate_ftl::{Entry, Resource};

use crate::evaluator::Evaluator;
use crate::transforms::MessageTransform;

/// Merge `transforms` into `current` using `reference` as the template.
///
/// `in_changeset` decides, per entry key, whether its transform runs in
/// this snapshot.
pub fn merge_resource(
    evaluator: &Evaluator<'_>,
    reference: &Resource,
    current: &Resource,
    transforms: &[MessageTransform],
    in_changeset: impl Fn(&str) -> bool,
) -> Resource {
    let transform_for = |key: &str| {
        transforms
            .iter()
            .find(|transform| transform.id == key)
            .filter(|transform| in_changeset(&transform.id))
    };
    let migrate = |transform: &MessageTransform, template: Option<&Entry>| {
        match evaluator.evaluate_message(transform) {
            Ok(mut entry) => {
                if entry.comment().is_none() {
                    entry.set_comment(template.and_then(Entry::comment).cloned());
                }
                Some(entry)
            }
            Err(absent) => {
                tracing::warn!(message = %transform.id, %absent, "skipping message");
                None
            }
        }
    };

    let mut body = leading_comments(current)
        .or_else(|| leading_comments(reference))
        .unwrap_or_default();
    let skip = leading_comments(reference).map_or(0, |comments| comments.len());

    for entry in reference.body.iter().skip(skip) {
        if entry.is_comment() {
            body.push(entry.clone());
            continue;
        }
        let Some(key) = entry.key() else {
            continue;
        };
        let existing = current.get(&key);
        let migrated = transform_for(&key).and_then(|transform| migrate(transform, Some(entry)));
        match (existing, migrated) {
            (Some(existing), Some(migrated)) if !existing.same_content(&migrated) => {
                tracing::debug!(message = %key, "replacing changed message");
                body.push(migrated);
            }
            (Some(existing), _) => body.push(existing.clone()),
            (None, Some(migrated)) => body.push(migrated),
            (None, None) => {}
        }
    }

    for entry in current.entries() {
        let Some(key) = entry.key() else {
            continue;
        };
        if reference.get(&key).is_some() {
            continue;
        }
        match transform_for(&key).and_then(|transform| migrate(transform, None)) {
            Some(migrated) if !entry.same_content(&migrated) => {
                tracing::debug!(message = %key, "replacing changed message");
                body.push(migrated);
            }
            _ => body.push(entry.clone()),
        }
    }
    for transform in transforms {
        if reference.get(&transform.id).is_some() || current.get(&transform.id).is_some() {
            continue;
        }
        if let Some(migrated) = transform_for(&transform.id).and_then(|t| migrate(t, None)) {
            body.push(migrated);
        }
    }

    Resource::new(body)
}

/// The `#` and `###` comments a file starts with (license headers and
/// the like), or `None` when there are none. Group comments belong to the
/// body.
fn leading_comments(resource: &Resource) -> Option<Vec<Entry>> {
    let comments: Vec<Entry> = resource
        .body
        .iter()
        .take_while(|entry| matches!(entry, Entry::Comment(_) | Entry::ResourceComment(_)))
        .cloned()
        .collect();
    Some(comments).filter(|comments| !comments.is_empty())
}

/// `true` when both resources hold the same messages and terms, ignoring
/// order, comments and junk.
#[must_use]
pub fn messages_equal(a: &Resource, b: &Resource) -> bool {
    let index = |resource: &Resource| -> BTreeMap<String, Entry> {
        resource
            .entries()
            .filter_map(|entry| entry.key().map(|key| (key, entry.clone())))
            .collect()
    };
    let (a, b) = (index(a), index(b));
    a.len() == b.len()
        && a.iter().all(|(key, entry)| {
            b.get(key)
                .is_some_and(|other| entry.same_content(other))
        })
}

#[cfg(test)]
mod tests {
    use migrate_ftl::{Pattern, parse, serialize};

    use super::*;
    use crate::evaluator::SourceLookup;
    use crate::legacy::LegacyResource;
    use crate::plurals::PluralCategory;
    use crate::transforms::{Transform, copy};

    struct Strings(LegacyResource);

    impl SourceLookup for Strings {
        fn legacy_value(&self, _path: &str, key: &str) -> Option<&str> {
            self.0.get(key).map(|entry| entry.value.as_str())
        }

        fn fluent_pattern(&self, _path: &str, _key: &str) -> Option<&Pattern> {
            None
        }

        fn plural_categories(&self) -> &[PluralCategory] {
            &[]
        }
    }

    fn strings() -> Strings {
        Strings(LegacyResource::from_pairs([
            ("title", "Pobrane pliki"),
            ("header", "Twoje pobrane pliki"),
        ]))
    }

    fn message(id: &str, key: &str) -> MessageTransform {
        MessageTransform::message(id, copy("downloads.dtd", key).unwrap())
    }

    const REFERENCE: &str = "\
# License header

## Group
# Title comment
title = Downloads
header = Your Downloads
empty = Nothing here
";

    fn merge(current: &str, transforms: &[MessageTransform], in_changeset: bool) -> String {
        let strings = strings();
        let evaluator = Evaluator::new(&strings);
        let merged = merge_resource(
            &evaluator,
            &parse(REFERENCE),
            &parse(current),
            transforms,
            |_| in_changeset,
        );
        serialize(&merged)
    }

    #[test]
    fn reference_shapes_new_file() {
        let merged = merge("", &[message("title", "title"), message("header", "header")], true);
        assert_eq!(
            merged,
            "# License header\n\n## Group\n\n# Title comment\ntitle = Pobrane pliki\nheader = Twoje pobrane pliki\n"
        );
    }

    #[test]
    fn out_of_changeset_transforms_are_skipped() {
        let merged = merge("", &[message("title", "title")], false);
        assert_eq!(merged, "# License header\n\n## Group\n\n");
    }

    #[test]
    fn existing_leading_comments_win() {
        let merged = merge("# Mine\n\nheader = Moje\n", &[message("title", "title")], true);
        assert_eq!(
            merged,
            "# Mine\n\n## Group\n\n# Title comment\ntitle = Pobrane pliki\nheader = Moje\n"
        );
    }

    #[test]
    fn changed_messages_outside_the_reference_are_replaced() {
        let merged = merge("extra = Stare\n", &[message("extra", "title")], true);
        assert!(merged.ends_with("extra = Pobrane pliki\n"), "{merged}");
        assert!(!merged.contains("Stare"), "{merged}");

        let kept = merge("extra = Stare\n", &[message("extra", "title")], false);
        assert!(kept.ends_with("extra = Stare\n"), "{kept}");
    }

    #[test]
    fn changed_messages_are_replaced() {
        let merged = merge("title = Stare\n", &[message("title", "title")], true);
        assert!(merged.contains("title = Pobrane pliki\n"), "{merged}");
        assert!(!merged.contains("Stare"), "{merged}");
    }

    #[test]
    fn unknown_existing_entries_are_kept() {
        let merged = merge("obsolete = Stary\n", &[message("title", "title")], true);
        assert!(merged.ends_with("title = Pobrane pliki\nobsolete = Stary\n"), "{merged}");
    }

    #[test]
    fn absent_sources_drop_only_their_message() {
        let merged = merge(
            "",
            &[message("title", "title"), message("empty", "missing")],
            true,
        );
        assert!(merged.contains("title = Pobrane pliki"));
        assert!(!merged.contains("empty"));
    }

    #[test]
    fn transforms_missing_from_reference_are_appended() {
        let extra = MessageTransform::message("extra", Transform::Text("Extra".into()));
        let merged = merge("", &[extra], true);
        assert!(merged.ends_with("## Group\n\nextra = Extra\n"), "{merged}");
    }

    #[test]
    fn equality_ignores_order_and_comments() {
        let a = parse("# c\nfoo = Foo\nbar = Bar\n    .title = T\n");
        let b = parse("bar = Bar\n    .title = T\nfoo = Foo\n");
        assert!(messages_equal(&a, &b));
        let c = parse("bar = Bar\n    .title = X\nfoo = Foo\n");
        assert!(!messages_equal(&a, &c));
        let d = parse("-foo = Foo\nbar = Bar\n    .title = T\n");
        assert!(!messages_equal(&a, &d));
    }
}
