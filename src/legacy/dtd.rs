//! `.dtd` reader.
//!
//! Reads `<!ENTITY key "value">` (or single-quoted) declarations, skipping
//! `<!-- -->` comments. Character references (`&#38;`, `&#x26;`) and the
//! predefined named entities are resolved; references to any other entity
//! are kept verbatim. Backslash sequences have no meaning in DTD values.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{LegacyEntry, line_of};

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<!ENTITY\s+(?P<key>[^\s"'>]+)\s+(?:"(?P<double>[^"]*)"|'(?P<single>[^']*)')\s*>"#,
    )
    .expect("entity declaration pattern is a valid regex")
});

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#x(?P<hex>[0-9a-fA-F]+)|#(?P<dec>[0-9]+)|(?P<name>[A-Za-z][A-Za-z0-9]*));")
        .expect("character reference pattern is a valid regex")
});

/// Parse `.dtd` text.
#[must_use]
pub fn parse(text: &str) -> Vec<LegacyEntry> {
    DECLARATION
        .captures_iter(text)
        .filter_map(|caps| {
            let key = caps.name("key")?;
            let value = caps.name("double").or_else(|| caps.name("single"))?;
            let whole = caps.get(0)?;
            Some(LegacyEntry {
                key: key.as_str().to_owned(),
                value: resolve_references(value.as_str()),
                line: line_of(text, whole.start()),
                end_line: line_of(text, whole.end()),
                translated: true,
            })
        })
        .collect()
}

fn resolve_references(value: &str) -> String {
    REFERENCE
        .replace_all(value, |caps: &Captures<'_>| {
            let resolved = if let Some(hex) = caps.name("hex") {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
            } else if let Some(dec) = caps.name("dec") {
                dec.as_str().parse().ok().and_then(char::from_u32)
            } else {
                caps.name("name").and_then(|name| named_entity(name.as_str()))
            };
            resolved.map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => return None,
    })
}
