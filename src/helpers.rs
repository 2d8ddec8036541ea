//! Shorthands for writing migrations.
//!
//! [`transforms_from`] turns Fluent text into message templates, so most
//! migrations can be written as the Fluent they produce:
//!
//! ```text
//! new-key = Hardcoded text { COPY("file.dtd", "string.key") }
//! other-key = { COPY_PATTERN(source, "old-key.label") }
//! ```
//!
//! Function calls named `COPY` and `COPY_PATTERN` become transforms. Their
//! arguments are string literals or message references; a message reference
//! is looked up in the symbol table passed by the caller. Everything else in
//! the text is literal Fluent.

use std::collections::BTreeMap;

use migrate_ftl::{
    CallArguments, Entry, Expression, InlineExpression, Pattern, PatternElement, SelectExpression,
    parse_strict,
};

use crate::error::{MigrateError, Result};
use crate::transforms::{
    LegacySource, MessageTransform, SelectTransform, Transform, VariantTransform, concat,
    copy_pattern,
};

/// Calls that every pattern already gets.
const IMPLICIT_TRANSFORMS: &[&str] = &["CONCAT"];

/// Calls that need arguments Fluent syntax cannot express.
const FORBIDDEN_TRANSFORMS: &[&str] = &["PLURALS", "REPLACE", "REPLACE_IN_TEXT"];

/// `{ $name }`.
#[must_use]
pub fn variable_reference(name: &str) -> Transform {
    Transform::Expression(InlineExpression::variable(name))
}

/// `{ name }`.
#[must_use]
pub fn message_reference(name: &str) -> Transform {
    Transform::Expression(InlineExpression::message(name))
}

/// `{ -name }`; `name` is given without the sigil.
#[must_use]
pub fn term_reference(name: &str) -> Transform {
    Transform::Expression(InlineExpression::term(name))
}

/// Parse `ftl` into message templates.
///
/// # Errors
/// - [`MigrateError::InvalidTransform`] for syntax errors, unknown
///   substitutions and malformed `COPY` arguments.
/// - [`MigrateError::NotSupported`] for `CONCAT`, `PLURALS`, `REPLACE` and
///   `REPLACE_IN_TEXT` calls, and for copies from the wrong kind of file.
pub fn transforms_from(ftl: &str, symbols: &BTreeMap<String, String>) -> Result<Vec<MessageTransform>> {
    let resource = parse_strict(ftl).map_err(|err| {
        MigrateError::invalid_transform(format!(
            "Transform contains parse error: {}, at {}",
            err.message, err.offset
        ))
    })?;
    let converter = Converter { symbols };

    let mut messages = Vec::new();
    for entry in &resource.body {
        let (id, value, attributes, comment) = match entry {
            Entry::Message(message) => (
                message.id.clone(),
                message.value.as_ref(),
                &message.attributes,
                message.comment.as_ref(),
            ),
            Entry::Term(term) => (
                format!("-{}", term.id),
                Some(&term.value),
                &term.attributes,
                term.comment.as_ref(),
            ),
            _ => continue,
        };
        let mut transform = MessageTransform::attributes_only(id);
        transform.value = value.map(|pattern| converter.pattern(pattern)).transpose()?;
        for attribute in attributes {
            let value = converter.pattern(&attribute.value)?;
            transform = transform.with_attribute(attribute.id.clone(), value);
        }
        if let Some(comment) = comment {
            transform = transform.with_comment(comment.content.clone());
        }
        messages.push(transform);
    }
    Ok(messages)
}

struct Converter<'a> {
    symbols: &'a BTreeMap<String, String>,
}

impl Converter<'_> {
    /// A pattern made of one placeable converts to that placeable's
    /// transform.
    fn pattern(&self, pattern: &Pattern) -> Result<Transform> {
        let mut children = pattern
            .elements
            .iter()
            .map(|element| match element {
                PatternElement::Text(text) => Ok(Transform::Text(text.clone())),
                PatternElement::Placeable(expression) => self.expression(expression),
            })
            .collect::<Result<Vec<_>>>()?;
        if children.len() == 1 && !matches!(children[0], Transform::Text(_)) {
            return Ok(children.swap_remove(0));
        }
        Ok(concat(children))
    }

    fn expression(&self, expression: &Expression) -> Result<Transform> {
        match expression {
            Expression::Select(select) => self.select(select),
            Expression::Inline(InlineExpression::FunctionReference { id, arguments }) => {
                self.call(id, arguments)
            }
            Expression::Inline(InlineExpression::Placeable { expression }) => {
                self.expression(expression)
            }
            Expression::Inline(inline) => Ok(Transform::Expression(inline.clone())),
        }
    }

    fn select(&self, select: &SelectExpression) -> Result<Transform> {
        let variants = select
            .variants
            .iter()
            .map(|variant| {
                Ok(VariantTransform {
                    key: variant.key.clone(),
                    value: self.pattern(&variant.value)?,
                    default: variant.default,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Transform::Select(SelectTransform {
            selector: select.selector.clone(),
            variants,
        }))
    }

    fn call(&self, name: &str, arguments: &CallArguments) -> Result<Transform> {
        match name {
            "COPY" => {
                let (path, key) = self.path_and_key(name, arguments)?;
                let mut source = LegacySource::new(path, key)?;
                for named in &arguments.named {
                    match (named.name.as_str(), self.argument(name, &named.value)?.as_str()) {
                        ("trim", value) => {
                            source = source.with_trim(!value.eq_ignore_ascii_case("false"));
                        }
                        (other, _) => {
                            return Err(MigrateError::invalid_transform(format!(
                                "Unknown argument passed to COPY: {other}"
                            )));
                        }
                    }
                }
                Ok(Transform::Copy(source))
            }
            "COPY_PATTERN" => {
                let (path, key) = self.path_and_key(name, arguments)?;
                copy_pattern(path, key)
            }
            _ if IMPLICIT_TRANSFORMS.contains(&name) => Err(MigrateError::not_supported(format!(
                "{name} may not be used with transforms_from(). It runs implicitly on all Patterns anyways."
            ))),
            _ if FORBIDDEN_TRANSFORMS.contains(&name) => Err(MigrateError::not_supported(format!(
                "{name} may not be used with transforms_from(). It requires additional logic in code."
            ))),
            _ => Ok(Transform::Expression(InlineExpression::FunctionReference {
                id: name.to_owned(),
                arguments: arguments.clone(),
            })),
        }
    }

    fn path_and_key(&self, name: &str, arguments: &CallArguments) -> Result<(String, String)> {
        match arguments.positional.as_slice() {
            [path, key] => Ok((self.argument(name, path)?, self.argument(name, key)?)),
            other => Err(MigrateError::invalid_transform(format!(
                "{name} takes a path and a key, got {} arguments",
                other.len()
            ))),
        }
    }

    fn argument(&self, name: &str, argument: &InlineExpression) -> Result<String> {
        match argument {
            InlineExpression::StringLiteral { value } => Ok(unescape(value)),
            InlineExpression::MessageReference {
                id,
                attribute: None,
            } => self.symbols.get(id).cloned().ok_or_else(|| {
                MigrateError::invalid_transform(format!("Unknown substitution in {name}: {id}"))
            }),
            other => Err(MigrateError::invalid_transform(format!(
                "Invalid argument passed to {name}: {other:?}"
            ))),
        }
    }
}

/// Resolve `\"` and `\\` in a raw string literal.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use migrate_ftl::VariantKey;

    use super::*;
    use crate::transforms::copy;

    fn parse(ftl: &str) -> Result<Vec<MessageTransform>> {
        transforms_from(ftl, &BTreeMap::new())
    }

    fn text(value: &str) -> Transform {
        Transform::Concat(vec![Transform::Text(value.to_owned())])
    }

    #[test]
    fn text_elements() {
        let parsed = parse("key-one = Hardcoded value.\nkey-two = Another value.\n").unwrap();
        assert_eq!(
            parsed,
            vec![
                MessageTransform::message("key-one", text("Hardcoded value.")),
                MessageTransform::message("key-two", text("Another value.")),
            ]
        );
    }

    #[test]
    fn references_stay_literal() {
        let parsed = parse("new-key = Prefix { message-reference } { $argument } postfix.\n").unwrap();
        assert_eq!(
            parsed[0].value,
            Some(Transform::Concat(vec![
                Transform::Text("Prefix ".into()),
                message_reference("message-reference"),
                Transform::Text(" ".into()),
                variable_reference("argument"),
                Transform::Text(" postfix.".into()),
            ]))
        );
    }

    #[test]
    fn attributes_and_comments() {
        let parsed = parse("# Note\nnew-key =\n    .attr = Attribute value\n").unwrap();
        assert_eq!(
            parsed,
            vec![
                MessageTransform::attributes_only("new-key")
                    .with_attribute("attr", text("Attribute value"))
                    .with_comment("Note")
            ]
        );
    }

    #[test]
    fn block_values() {
        let parsed = parse("new-key =\n    Block value\n    continued.\n").unwrap();
        assert_eq!(parsed[0].value, Some(text("Block value\ncontinued.")));
    }

    #[test]
    fn copy_in_value_unwraps() {
        let parsed = parse("new-key = { COPY(\"path.dtd\", \"key\") }\n").unwrap();
        assert_eq!(parsed[0].value, Some(copy("path.dtd", "key").unwrap()));
    }

    #[test]
    fn copy_in_select_expression() {
        let parsed = parse(
            "new-key =\n    { PLATFORM() ->\n        [macos] { COPY(\"path.dtd\", \"key.mac\") }\n       *[other] { COPY(\"path.dtd\", \"key.other\") }\n    }\n",
        )
        .unwrap();
        let Some(Transform::Select(select)) = &parsed[0].value else {
            panic!("expected a select, got {:?}", parsed[0].value);
        };
        assert_eq!(select.variants.len(), 2);
        assert_eq!(select.variants[0].key, VariantKey::identifier("macos"));
        assert_eq!(select.variants[0].value, copy("path.dtd", "key.mac").unwrap());
        assert!(select.variants[1].default);
    }

    #[test]
    fn substitutions_resolve_message_references() {
        let symbols = BTreeMap::from([("from_path".to_owned(), "browser/menu.dtd".to_owned())]);
        let parsed = transforms_from("key = { COPY(from_path, \"open.label\") }\n", &symbols).unwrap();
        assert_eq!(parsed[0].value, Some(copy("browser/menu.dtd", "open.label").unwrap()));

        let err = parse("key = { COPY(unknown, \"k\") }\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid transform: Unknown substitution in COPY: unknown"
        );
    }

    #[test]
    fn trim_argument() {
        let parsed = parse("key = { COPY(\"a.properties\", \"k\", trim: \"False\") }\n").unwrap();
        let Some(Transform::Copy(source)) = &parsed[0].value else {
            panic!("expected a copy");
        };
        assert_eq!(source.trim, Some(false));
    }

    #[test]
    fn copy_pattern_calls() {
        let parsed = parse("key = { COPY_PATTERN(\"old.ftl\", \"msg.attr\") }\n").unwrap();
        assert_eq!(parsed[0].value, Some(copy_pattern("old.ftl", "msg.attr").unwrap()));
    }

    #[test]
    fn implicit_and_forbidden_calls() {
        let err = parse("new-key = { CONCAT(\"a\", \"b\") }\n").unwrap_err();
        assert!(err.to_string().contains("runs implicitly"), "{err}");
        let err = parse("new-key = { REPLACE() }\n").unwrap_err();
        assert!(err.to_string().contains("requires additional logic"), "{err}");
    }

    #[test]
    fn copy_from_fluent_is_rejected() {
        let err = parse("key = { COPY(\"old.ftl\", \"k\") }\n").unwrap_err();
        assert!(matches!(err, MigrateError::NotSupported { .. }));
    }

    #[test]
    fn syntax_errors_are_invalid_transforms() {
        let err = parse("key = { COPY(\n").unwrap_err();
        assert!(err.to_string().contains("Transform contains parse error"), "{err}");
    }
}
