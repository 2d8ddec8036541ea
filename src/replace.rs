//! Placeholder splitting for the replace primitive.
//!
//! Every occurrence of every placeholder is substituted. When two
//! placeholders start at the same offset the one listed later wins, and a
//! match that overlaps an earlier substitution is left as text.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::transforms::Transform;

static PRINTF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"%(?P<escape>%)|%(?:(?P<number>[1-9][0-9]*)\$)?(?:\*|[0-9]+)?(?:\.(?:\*|[0-9]+)?)?(?P<spec>[duxXosScpfg@])",
    )
    .expect("printf specifier pattern is a valid regex")
});

/// Number every printf specifier and collapse `%%` to `%`.
///
/// Unnumbered specifiers are numbered in order of appearance, so
/// `%S and %S` becomes `%1$S and %2$S`. Width and precision are dropped.
#[must_use]
pub fn normalize_printf(text: &str) -> String {
    let mut next = 0_u32;
    PRINTF
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.name("escape").is_some() {
                return "%".to_owned();
            }
            let number = caps.name("number").map_or_else(
                || {
                    next += 1;
                    next.to_string()
                },
                |number| number.as_str().to_owned(),
            );
            format!("%{number}${}", &caps["spec"])
        })
        .into_owned()
}

/// Split source text for printf-mode replacement.
///
/// Specifiers are matched against `keys` in their numbered form. A specifier
/// without a key stays as written, `%%` becomes `%`, and the text between
/// specifiers is split with [`split_placeholders`].
pub(crate) fn split_printf<'a>(text: &'a str, keys: &[&str]) -> Vec<Piece<'a>> {
    let mut next = 0_u32;
    let mut pieces = Vec::new();
    let mut cursor = 0;
    for caps in PRINTF.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        pieces.extend(split_placeholders(&text[cursor..whole.start()], keys));
        cursor = whole.end();
        if caps.name("escape").is_some() {
            pieces.push(Piece::Text(&text[whole.start()..=whole.start()]));
            continue;
        }
        let number = caps.name("number").map_or_else(
            || {
                next += 1;
                next.to_string()
            },
            |number| number.as_str().to_owned(),
        );
        let key = format!("%{number}${}", &caps["spec"]);
        match keys.iter().position(|candidate| *candidate == key) {
            Some(index) => pieces.push(Piece::Placeholder(index)),
            None => pieces.push(Piece::Text(whole.as_str())),
        }
    }
    pieces.extend(split_placeholders(&text[cursor..], keys));
    pieces
}

/// Normalize placeholder keys; when two keys normalize to the same text the
/// first one is kept.
pub(crate) fn normalize_keys(replacements: Vec<(String, Transform)>) -> Vec<(String, Transform)> {
    let mut normalized: Vec<(String, Transform)> = Vec::with_capacity(replacements.len());
    for (key, replacement) in replacements {
        let key = normalize_printf(&key);
        if normalized.iter().any(|(existing, _)| *existing == key) {
            tracing::debug!(%key, "dropping duplicate printf placeholder");
            continue;
        }
        normalized.push((key, replacement));
    }
    normalized
}

/// A run of source text or the index of the placeholder found there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    Text(&'a str),
    Placeholder(usize),
}

/// Split `text` around every occurrence of `keys`.
pub(crate) fn split_placeholders<'a>(text: &'a str, keys: &[&str]) -> Vec<Piece<'a>> {
    let mut starts: BTreeMap<usize, usize> = BTreeMap::new();
    for (index, key) in keys.iter().enumerate() {
        if key.is_empty() {
            continue;
        }
        for (offset, _) in text.match_indices(key) {
            starts.insert(offset, index);
        }
    }

    let mut pieces = Vec::with_capacity(starts.len() * 2 + 1);
    let mut cursor = 0;
    for (offset, index) in starts {
        if offset < cursor {
            continue;
        }
        pieces.push(Piece::Text(&text[cursor..offset]));
        pieces.push(Piece::Placeholder(index));
        cursor = offset + keys[index].len();
    }
    pieces.push(Piece::Text(&text[cursor..]));
    pieces
}
