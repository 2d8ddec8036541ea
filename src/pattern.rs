//! Pattern normalization.
//!
//! Every transform result goes through [`pattern_of`], which makes boundary
//! whitespace explicit. Fluent drops blanks at the start and end of a value,
//! so a leading or trailing run of spaces becomes a string literal placeable
//! and a leading or trailing newline gets an empty literal next to it. A
//! value with no content at all is `{ "" }`, never an empty element list.

use migrate_ftl::{Expression, InlineExpression, Pattern, PatternElement};

/// Normalize `elements` into a pattern.
///
/// Adjacent text, including whitespace-only string literals, is joined and
/// empty text is pruned before boundary whitespace is made explicit.
#[must_use]
pub fn pattern_of(elements: impl IntoIterator<Item = PatternElement>) -> Pattern {
    let mut normalized: Vec<PatternElement> = Vec::new();
    for element in elements {
        let content = match element {
            PatternElement::Text(text) => text,
            PatternElement::Placeable(Expression::Inline(InlineExpression::StringLiteral {
                value,
            })) if is_blank(&value) => value,
            other => {
                normalized.push(other);
                continue;
            }
        };
        match normalized.last_mut() {
            Some(PatternElement::Text(previous)) => previous.push_str(&content),
            _ if !content.is_empty() => normalized.push(PatternElement::Text(content)),
            _ => {}
        }
    }

    if normalized.is_empty() {
        return empty();
    }

    let leading = match normalized.first_mut() {
        Some(PatternElement::Text(first)) => {
            let spaces = first.len() - first.trim_start_matches(' ').len();
            if spaces > 0 {
                Some(first.drain(..spaces).collect::<String>())
            } else {
                first.starts_with('\n').then(String::new)
            }
        }
        _ => None,
    };
    if let Some(leading) = leading {
        normalized.insert(0, literal(leading));
    }

    let trailing = match normalized.last_mut() {
        Some(PatternElement::Text(last)) => {
            let kept = last.trim_end_matches(' ').len();
            if kept < last.len() {
                Some(last.split_off(kept))
            } else {
                last.ends_with('\n').then(String::new)
            }
        }
        _ => None,
    };
    if let Some(trailing) = trailing {
        normalized.push(literal(trailing));
    }

    normalized.retain(|element| !matches!(element, PatternElement::Text(text) if text.is_empty()));
    Pattern::new(normalized)
}

/// `{ "" }`.
#[must_use]
pub fn empty() -> Pattern {
    Pattern::new(vec![literal(String::new())])
}

/// Strip blanks around every line, then blank lines at both ends.
#[must_use]
pub fn trim_text(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.trim_matches([' ', '\t']))
        .collect();
    lines.join("\n").trim_matches(['\r', '\n']).to_owned()
}

fn is_blank(value: &str) -> bool {
    value.chars().all(|c| c == ' ')
}

fn literal(value: String) -> PatternElement {
    PatternElement::placeable(InlineExpression::StringLiteral { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> PatternElement {
        PatternElement::Text(value.to_owned())
    }

    fn lit(value: &str) -> PatternElement {
        literal(value.to_owned())
    }

    #[test]
    fn nothing_becomes_empty_literal() {
        assert_eq!(pattern_of(Vec::new()), empty());
        assert_eq!(pattern_of([text("")]), empty());
        assert_eq!(pattern_of([lit("")]), empty());
    }

    #[test]
    fn adjacent_text_is_joined() {
        assert_eq!(
            pattern_of([text("Foo"), lit(" "), text("Bar")]),
            Pattern::text("Foo Bar")
        );
    }

    #[test]
    fn leading_and_trailing_spaces_are_explicit() {
        assert_eq!(
            pattern_of([text("  Foo ")]),
            Pattern::new(vec![lit("  "), text("Foo"), lit(" ")])
        );
        assert_eq!(pattern_of([text("   ")]), Pattern::new(vec![lit("   ")]));
    }

    #[test]
    fn boundary_newlines_get_empty_literals() {
        assert_eq!(
            pattern_of([text("\nFoo\n")]),
            Pattern::new(vec![lit(""), text("\nFoo\n"), lit("")])
        );
    }

    #[test]
    fn placeables_are_kept() {
        let variable = PatternElement::placeable(InlineExpression::variable("user"));
        assert_eq!(
            pattern_of([text("Hello, "), variable.clone(), text("!")]),
            Pattern::new(vec![text("Hello, "), variable, text("!")])
        );
    }

    #[test]
    fn trim_strips_lines_and_blank_edges() {
        assert_eq!(trim_text("Foo   \n         Bar\n"), "Foo\nBar");
        assert_eq!(trim_text("\n    Foo   \n      Bar\n    "), "Foo\nBar");
        assert_eq!(trim_text(" "), "");
        assert_eq!(trim_text("\nnext up is a \n"), "next up is a");
    }
}
