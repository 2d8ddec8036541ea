//! Bilingual gettext `.po` reader.
//!
//! An entry's key is `msgid`, or `msgctxt` + `\u{4}` + `msgid` when a
//! context is present. The header entry (empty `msgid`) is skipped. Entries
//! with an empty `msgstr` or a `fuzzy` flag are untranslated: their value
//! falls back to the source string and [`LegacyEntry::translated`] is
//! `false`. Plural translations (`msgstr[N]`) are joined with `;`, the form
//! separator the plural transform expects.

use super::LegacyEntry;

/// Separator between `msgctxt` and `msgid` in entry keys.
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// The lookup key for a message with an optional context.
#[must_use]
pub fn po_key(msgid: &str, msgctxt: Option<&str>) -> String {
    match msgctxt {
        Some(context) => format!("{context}{CONTEXT_SEPARATOR}{msgid}"),
        None => msgid.to_owned(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str(usize),
}

#[derive(Default)]
struct Pending {
    context: Option<String>,
    id: Option<String>,
    forms: Vec<String>,
    fuzzy: bool,
    /// First `msgstr` line, 1-based.
    str_line: Option<usize>,
    first_line: usize,
    last_line: usize,
}

impl Pending {
    fn finish(self, entries: &mut Vec<LegacyEntry>) {
        let Some(id) = self.id else {
            return;
        };
        if id.is_empty() && self.context.is_none() {
            return;
        }
        let translation = self.forms.join(";");
        let translated = !self.fuzzy && self.forms.iter().any(|form| !form.is_empty());
        entries.push(LegacyEntry {
            key: po_key(&id, self.context.as_deref()),
            value: if translated { translation } else { id },
            line: self.str_line.unwrap_or(self.first_line),
            end_line: self.last_line,
            translated,
        });
    }

    fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Context => self.context.as_mut(),
            Field::Id => self.id.as_mut(),
            Field::IdPlural => None,
            Field::Str(index) => self.forms.get_mut(index),
        }
    }
}

/// Parse `.po` text.
#[must_use]
pub fn parse(text: &str) -> Vec<LegacyEntry> {
    let mut entries = Vec::new();
    let mut pending = Pending::default();
    let mut field: Option<Field> = None;

    for (index, raw_line) in text.split('\n').enumerate() {
        let number = index + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            continue;
        }
        if let Some(flags) = line.strip_prefix("#,") {
            if pending.id.is_some() {
                std::mem::take(&mut pending).finish(&mut entries);
            }
            pending.fuzzy |= flags.split(',').any(|flag| flag.trim() == "fuzzy");
            field = None;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        if line.starts_with('"') {
            if let Some(target) = field.and_then(|f| pending.field_mut(f)) {
                target.push_str(&unquote(line));
            }
            pending.last_line = number;
            continue;
        }

        let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let value = unquote(rest.trim());
        match keyword {
            "msgctxt" => {
                if pending.id.is_some() {
                    std::mem::take(&mut pending).finish(&mut entries);
                }
                pending.context = Some(value);
                field = Some(Field::Context);
            }
            "msgid" => {
                if pending.id.is_some() {
                    std::mem::take(&mut pending).finish(&mut entries);
                }
                pending.id = Some(value);
                field = Some(Field::Id);
            }
            "msgid_plural" => field = Some(Field::IdPlural),
            "msgstr" => {
                pending.forms = vec![value];
                pending.str_line.get_or_insert(number);
                field = Some(Field::Str(0));
            }
            plural if plural.starts_with("msgstr[") => {
                pending.forms.push(value);
                pending.str_line.get_or_insert(number);
                field = Some(Field::Str(pending.forms.len() - 1));
            }
            _ => continue,
        }
        if pending.first_line == 0 {
            pending.first_line = number;
        }
        pending.last_line = number;
    }
    pending.finish(&mut entries);
    entries
}

/// Strip the surrounding quotes of a PO string and resolve its escapes.
fn unquote(quoted: &str) -> String {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
