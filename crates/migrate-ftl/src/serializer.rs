//! Fluent serializer.
//!
//! Output follows the canonical Fluent layout: four-space indentation,
//! multiline patterns starting on their own line, a single blank line around
//! standalone comments and none between messages. Junk entries are dropped.
//!
//! Text that would otherwise be read back as syntax is written as string
//! literal placeables: braces anywhere, and `[`, `*` or `.` at the start of a
//! continuation line.

use std::fmt::Write as _;

use crate::ast::{
    Attribute, CallArguments, Comment, Entry, Expression, InlineExpression, Message, Pattern,
    PatternElement, Resource, SelectExpression, Term, Variant, VariantKey,
};

/// Serialize a whole resource.
#[must_use]
pub fn serialize(resource: &Resource) -> String {
    let mut out = String::new();
    let mut has_entries = false;
    for entry in &resource.body {
        if matches!(entry, Entry::Junk(_)) {
            continue;
        }
        if has_entries && entry.is_comment() && !out.ends_with("\n\n") {
            out.push('\n');
        }
        out.push_str(&serialize_entry(entry));
        if entry.is_comment() {
            out.push('\n');
        }
        has_entries = true;
    }
    out
}

/// Serialize one entry, without the blank lines [`serialize`] puts around
/// standalone comments.
#[must_use]
pub fn serialize_entry(entry: &Entry) -> String {
    match entry {
        Entry::Message(message) => serialize_message(message),
        Entry::Term(term) => serialize_term(term),
        Entry::Comment(comment) => serialize_comment(comment, "#"),
        Entry::GroupComment(comment) => serialize_comment(comment, "##"),
        Entry::ResourceComment(comment) => serialize_comment(comment, "###"),
        Entry::Junk(junk) => junk.content.clone(),
    }
}

fn serialize_comment(comment: &Comment, prefix: &str) -> String {
    let mut out = String::new();
    for (index, line) in comment.content.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(prefix);
        if !line.is_empty() {
            out.push(' ');
            out.push_str(line);
        }
    }
    out.push('\n');
    out
}

fn serialize_message(message: &Message) -> String {
    let mut out = String::new();
    if let Some(comment) = &message.comment {
        out.push_str(&serialize_comment(comment, "#"));
    }
    let _ = write!(out, "{} =", message.id);
    if let Some(value) = &message.value {
        out.push_str(&serialize_pattern(value));
    }
    serialize_attributes(&mut out, &message.attributes);
    out.push('\n');
    out
}

fn serialize_term(term: &Term) -> String {
    let mut out = String::new();
    if let Some(comment) = &term.comment {
        out.push_str(&serialize_comment(comment, "#"));
    }
    let _ = write!(out, "-{} =", term.id);
    out.push_str(&serialize_pattern(&term.value));
    serialize_attributes(&mut out, &term.attributes);
    out.push('\n');
    out
}

fn serialize_attributes(out: &mut String, attributes: &[Attribute]) {
    for attribute in attributes {
        let _ = write!(
            out,
            "\n    .{} ={}",
            attribute.id,
            indent_except_first_line(&serialize_pattern(&attribute.value))
        );
    }
}

/// Insert four spaces after every line break that is not the last character.
fn indent_except_first_line(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\n' && chars.peek().is_some() {
            out.push_str("    ");
        }
    }
    out
}

fn serialize_pattern(pattern: &Pattern) -> String {
    let mut content = String::new();
    let mut at_line_start = false;
    for element in &pattern.elements {
        match element {
            PatternElement::Text(text) => serialize_text(&mut content, text, &mut at_line_start),
            PatternElement::Placeable(expression) => {
                content.push_str(&serialize_placeable(expression));
                at_line_start = false;
            }
        }
    }
    let content = indent_except_first_line(&content);
    if should_start_on_new_line(pattern) {
        format!("\n    {content}")
    } else {
        format!(" {content}")
    }
}

fn serialize_text(out: &mut String, text: &str, at_line_start: &mut bool) {
    for c in text.chars() {
        match c {
            '{' | '}' => {
                let _ = write!(out, "{{ \"{c}\" }}");
            }
            '[' | '*' | '.' if *at_line_start => {
                let _ = write!(out, "{{ \"{c}\" }}");
            }
            _ => out.push(c),
        }
        *at_line_start = match c {
            '\n' => true,
            ' ' => *at_line_start,
            _ => false,
        };
    }
}

fn should_start_on_new_line(pattern: &Pattern) -> bool {
    let is_multiline = pattern.elements.iter().any(|element| match element {
        PatternElement::Placeable(Expression::Select(_)) => true,
        PatternElement::Text(text) => text.contains('\n'),
        PatternElement::Placeable(Expression::Inline(_)) => false,
    });
    if !is_multiline {
        return false;
    }
    // Text starting with special characters stays on the `=` line where they
    // carry no meaning.
    !matches!(
        pattern.elements.first(),
        Some(PatternElement::Text(text)) if text.starts_with(['[', '.', '*'])
    )
}

fn serialize_placeable(expression: &Expression) -> String {
    match expression {
        Expression::Select(select) => format!("{{ {}}}", serialize_select(select)),
        Expression::Inline(InlineExpression::Placeable { expression }) => {
            format!("{{{}}}", serialize_placeable(expression))
        }
        Expression::Inline(inline) => format!("{{ {} }}", serialize_inline(inline)),
    }
}

fn serialize_select(select: &SelectExpression) -> String {
    let mut out = format!("{} ->", serialize_inline(&select.selector));
    for variant in &select.variants {
        out.push_str(&serialize_variant(variant));
    }
    out.push('\n');
    out
}

fn serialize_variant(variant: &Variant) -> String {
    let marker = if variant.default { "   *" } else { "    " };
    let key = match &variant.key {
        VariantKey::Identifier { name } => name,
        VariantKey::NumberLiteral { value } => value,
    };
    format!(
        "\n{marker}[{key}]{}",
        indent_except_first_line(&serialize_pattern(&variant.value))
    )
}

fn serialize_inline(expression: &InlineExpression) -> String {
    match expression {
        InlineExpression::StringLiteral { value } => format!("\"{value}\""),
        InlineExpression::NumberLiteral { value } => value.clone(),
        InlineExpression::VariableReference { id } => format!("${id}"),
        InlineExpression::MessageReference { id, attribute } => match attribute {
            Some(attribute) => format!("{id}.{attribute}"),
            None => id.clone(),
        },
        InlineExpression::TermReference {
            id,
            attribute,
            arguments,
        } => {
            let mut out = format!("-{id}");
            if let Some(attribute) = attribute {
                let _ = write!(out, ".{attribute}");
            }
            if let Some(arguments) = arguments {
                out.push_str(&serialize_call_arguments(arguments));
            }
            out
        }
        InlineExpression::FunctionReference { id, arguments } => {
            format!("{id}{}", serialize_call_arguments(arguments))
        }
        InlineExpression::Placeable { expression } => serialize_placeable(expression),
    }
}

fn serialize_call_arguments(arguments: &CallArguments) -> String {
    let parts: Vec<String> = arguments
        .positional
        .iter()
        .map(serialize_inline)
        .chain(
            arguments
                .named
                .iter()
                .map(|arg| format!("{}: {}", arg.name, serialize_inline(&arg.value))),
        )
        .collect();
    format!("({})", parts.join(", "))
}
