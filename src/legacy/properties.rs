//! `.properties` reader.
//!
//! Keys end at the first unescaped `=`, `:` or blank. Lines ending in an odd
//! number of backslashes continue on the next line, whose leading blanks are
//! dropped. Values resolve `\uXXXX`, `\n`, `\t`, `\r`, `\f` and `\\`; any
//! other escaped character stands for itself.

use super::LegacyEntry;

/// Parse `.properties` text.
#[must_use]
pub fn parse(text: &str) -> Vec<LegacyEntry> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let mut entries = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index].trim_start_matches(is_blank);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            index += 1;
            continue;
        }

        let start = index;
        let mut logical = line.to_owned();
        while ends_with_continuation(&logical) {
            logical.pop();
            if index + 1 >= lines.len() {
                break;
            }
            index += 1;
            logical.push_str(lines[index].trim_start_matches(is_blank));
        }

        let (key, value) = split_key_value(&logical);
        entries.push(LegacyEntry {
            key: unescape(key),
            value: unescape(value),
            line: start + 1,
            end_line: index + 1,
            translated: true,
        });
        index += 1;
    }
    entries
}

const fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (offset, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..offset], line[offset + 1..].trim_start_matches(is_blank)),
            c if is_blank(c) => {
                let rest = line[offset..].trim_start_matches(is_blank);
                let rest = rest
                    .strip_prefix(['=', ':'])
                    .map_or(rest, |value| value.trim_start_matches(is_blank));
                return (&line[..offset], rest);
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(&escaped) = chars.get(i) else {
            break;
        };
        i += 1;
        match escaped {
            'u' => {
                let (unit, used) = read_hex(&chars[i..]);
                i += used;
                let Some(unit) = unit else {
                    out.push('u');
                    continue;
                };
                // A high surrogate followed by an escaped low surrogate.
                if (0xD800..0xDC00).contains(&unit)
                    && chars.get(i) == Some(&'\\')
                    && chars.get(i + 1) == Some(&'u')
                {
                    let (low, low_used) = read_hex(&chars[i + 2..]);
                    if let Some(Some(Ok(c))) = low
                        .filter(|low| (0xDC00..0xE000).contains(low))
                        .map(|low| char::decode_utf16([unit, low]).next())
                    {
                        out.push(c);
                        i += 2 + low_used;
                        continue;
                    }
                }
                out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'f' => out.push('\x0c'),
            other => out.push(other),
        }
    }
    out
}

/// Up to four hex digits as a UTF-16 code unit, and how many were read.
fn read_hex(chars: &[char]) -> (Option<u16>, usize) {
    let digits: String = chars
        .iter()
        .take(4)
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    (u16::from_str_radix(&digits, 16).ok(), digits.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(text: &str) -> Vec<(String, String)> {
        parse(text)
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }

    #[test]
    fn basic_pairs_and_separators() {
        let text = "# comment\n! also comment\nfoo = Foo\nbar:Bar\nbaz Baz\nempty =\n";
        assert_eq!(
            values(text),
            vec![
                ("foo".into(), "Foo".into()),
                ("bar".into(), "Bar".into()),
                ("baz".into(), "Baz".into()),
                ("empty".into(), String::new()),
            ]
        );
    }

    #[test]
    fn unicode_and_control_escapes() {
        let text = "unicode = Foo\\u0020Bar\nlf = a\\nb\nplus = \\u002B\n";
        assert_eq!(
            values(text),
            vec![
                ("unicode".into(), "Foo Bar".into()),
                ("lf".into(), "a\nb".into()),
                ("plus".into(), "+".into()),
            ]
        );
    }

    #[test]
    fn surrogate_pairs() {
        let text = "emoji = \\uD83D\\uDE02\n";
        assert_eq!(values(text), vec![("emoji".into(), "😂".into())]);
    }

    #[test]
    fn continuation_lines_and_spans() {
        let text = "first = a\nlong = one \\\n    two \\\n    three\nlast = z\n";
        let entries = parse(text);
        assert_eq!(entries[1].value, "one two three");
        assert_eq!((entries[1].line, entries[1].end_line), (2, 4));
        assert_eq!(entries[2].line, 5);
    }

    #[test]
    fn escaped_separator_in_key() {
        assert_eq!(values("a\\=b = c\n"), vec![("a=b".into(), "c".into())]);
    }

    #[test]
    fn trailing_whitespace_is_kept() {
        assert_eq!(values("key = value  \n"), vec![("key".into(), "value  ".into())]);
    }

    #[test]
    fn escaped_backslash_is_not_continuation() {
        let entries = parse("path = C:\\\\\nnext = n\n");
        assert_eq!(entries[0].value, "C:\\");
        assert_eq!(entries[1].key, "next");
    }
}
