//! Recursive-descent parser for Fluent 1.0 syntax.
//!
//! Parsing never fails as a whole: an entry that cannot be parsed becomes a
//! [`Junk`] entry covering the source up to the next line that looks like the
//! start of an entry, and parsing resumes there. Use [`parse_strict`] when any
//! junk should be treated as an error.
//!
//! Line endings are normalized to `\n` before parsing.

use crate::ast::{
    Annotation, Attribute, CallArguments, Comment, Entry, Expression, InlineExpression, Junk,
    Message, NamedArgument, Pattern, PatternElement, Resource, SelectExpression, Term, Variant,
    VariantKey,
};
use crate::error::ParseError;

type PResult<T> = Result<T, ParseError>;

/// Parse Fluent source into a [`Resource`], recovering from errors as junk.
#[must_use]
pub fn parse(source: &str) -> Resource {
    Parser::new(source).resource()
}

/// Parse Fluent source, failing on the first junk entry.
///
/// # Errors
/// Returns the first annotation of the first [`Junk`] entry.
pub fn parse_strict(source: &str) -> Result<Resource, ParseError> {
    let resource = parse(source);
    if let Some(annotation) = resource.junk().find_map(|junk| junk.annotations.first()) {
        return Err(ParseError::new(annotation.message.clone(), annotation.offset));
    }
    Ok(resource)
}

const fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

const fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_callee(id: &str) -> bool {
    id.starts_with(|c: char| c.is_ascii_uppercase())
        && id
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// Raw pattern pieces before dedentation.
enum Piece {
    Text(String),
    /// Line break(s) followed by `indent` spaces of a continuation line.
    Indent { newlines: usize, indent: usize },
    Placeable(Expression),
}

struct Continuation {
    newlines: usize,
    indent: usize,
    end: usize,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.replace("\r\n", "\n").chars().collect(),
            pos: 0,
        }
    }

    // -- cursor helpers -----------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    const fn bump(&mut self) {
        self.pos += 1;
    }

    const fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.pos)
    }

    fn expect(&mut self, expected: char) -> PResult<()> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("Expected token: \"{expected}\"")))
        }
    }

    fn skip_blank_inline(&mut self) {
        while self.peek() == Some(' ') {
            self.bump();
        }
    }

    fn skip_blank(&mut self) {
        while matches!(self.peek(), Some(' ' | '\n')) {
            self.bump();
        }
    }

    /// Skip whole blank lines. Returns how many line breaks were consumed.
    fn skip_blank_block(&mut self) -> usize {
        let mut count = 0;
        loop {
            let line_start = self.pos;
            self.skip_blank_inline();
            match self.peek() {
                Some('\n') => {
                    self.bump();
                    count += 1;
                }
                None => return count,
                Some(_) => {
                    self.pos = line_start;
                    return count;
                }
            }
        }
    }

    // -- entries ------------------------------------------------------------

    fn resource(mut self) -> Resource {
        let mut body = Vec::new();
        let mut pending_comment: Option<Comment> = None;
        self.skip_blank_block();

        while !self.is_eof() {
            let mut entry = self.entry_or_junk();
            let blank_lines = self.skip_blank_block();

            // A comment directly followed by a message or term belongs to it.
            // Whether it attaches is only known once the next entry parsed.
            if blank_lines == 0 && !self.is_eof() {
                if let Entry::Comment(comment) = entry {
                    if let Some(previous) = pending_comment.replace(comment) {
                        body.push(Entry::Comment(previous));
                    }
                    continue;
                }
            }

            if let Some(comment) = pending_comment.take() {
                if matches!(entry, Entry::Message(_) | Entry::Term(_)) {
                    entry.set_comment(Some(comment));
                } else {
                    body.push(Entry::Comment(comment));
                }
            }
            body.push(entry);
        }

        if let Some(comment) = pending_comment {
            body.push(Entry::Comment(comment));
        }
        Resource::new(body)
    }

    fn entry_or_junk(&mut self) -> Entry {
        let start = self.pos;
        match self.entry() {
            Ok(entry) => entry,
            Err(err) => {
                self.skip_to_next_entry_start(start);
                Entry::Junk(Junk {
                    content: self.chars[start..self.pos].iter().collect(),
                    annotations: vec![Annotation {
                        message: err.message,
                        offset: err.offset,
                    }],
                })
            }
        }
    }

    fn entry(&mut self) -> PResult<Entry> {
        let entry = match self.peek() {
            Some('#') => self.comment()?,
            Some('-') => Entry::Term(self.term()?),
            Some(c) if is_identifier_start(c) => Entry::Message(self.message()?),
            _ => return Err(self.error("Expected an entry start")),
        };
        match self.peek() {
            None => {}
            Some('\n') => self.bump(),
            Some(_) => return Err(self.error("Expected line end")),
        }
        Ok(entry)
    }

    fn skip_to_next_entry_start(&mut self, start: usize) {
        self.pos = start;
        loop {
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.bump();
            }
            if self.is_eof() {
                return;
            }
            self.bump();
            match self.peek() {
                Some(c) if is_identifier_start(c) || c == '-' || c == '#' => return,
                None => return,
                Some(_) => {}
            }
        }
    }

    fn comment(&mut self) -> PResult<Entry> {
        let level = self.chars[self.pos..]
            .iter()
            .take_while(|&&c| c == '#')
            .count();
        if level > 3 {
            return Err(self.error("Expected a comment of at most three '#'"));
        }

        let mut lines = Vec::new();
        loop {
            self.pos += level;
            let mut line = String::new();
            match self.peek() {
                Some(' ') => {
                    self.bump();
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        line.push(c);
                        self.bump();
                    }
                }
                Some('\n') | None => {}
                Some(_) => return Err(self.error("Expected token: \" \"")),
            }
            lines.push(line);

            if self.peek() == Some('\n') && self.comment_line_follows(level) {
                self.bump();
                continue;
            }
            break;
        }

        let comment = Comment::new(lines.join("\n"));
        Ok(match level {
            1 => Entry::Comment(comment),
            2 => Entry::GroupComment(comment),
            _ => Entry::ResourceComment(comment),
        })
    }

    /// Whether the line after the current `\n` continues a comment of `level`.
    fn comment_line_follows(&self, level: usize) -> bool {
        let start = self.pos + 1;
        (0..level).all(|i| self.chars.get(start + i) == Some(&'#'))
            && matches!(
                self.chars.get(start + level).copied(),
                None | Some(' ' | '\n')
            )
    }

    fn message(&mut self) -> PResult<Message> {
        let id = self.identifier()?;
        self.skip_blank_inline();
        self.expect('=')?;
        let value = self.maybe_pattern()?;
        let attributes = self.attributes()?;
        if value.is_none() && attributes.is_empty() {
            return Err(self.error(format!(
                "Expected message \"{id}\" to have a value or attributes"
            )));
        }
        Ok(Message {
            id,
            value,
            attributes,
            comment: None,
        })
    }

    fn term(&mut self) -> PResult<Term> {
        self.expect('-')?;
        let id = self.identifier()?;
        self.skip_blank_inline();
        self.expect('=')?;
        let Some(value) = self.maybe_pattern()? else {
            return Err(self.error(format!("Expected term \"-{id}\" to have a value")));
        };
        let attributes = self.attributes()?;
        Ok(Term {
            id,
            value,
            attributes,
            comment: None,
        })
    }

    fn attributes(&mut self) -> PResult<Vec<Attribute>> {
        let mut attributes = Vec::new();
        loop {
            let save = self.pos;
            if self.peek() != Some('\n') {
                break;
            }
            self.bump();
            self.skip_blank_block();
            self.skip_blank_inline();
            if self.peek() != Some('.') {
                self.pos = save;
                break;
            }
            self.bump();
            let id = self.identifier()?;
            self.skip_blank_inline();
            self.expect('=')?;
            let Some(value) = self.maybe_pattern()? else {
                return Err(self.error(format!("Expected attribute \".{id}\" to have a value")));
            };
            attributes.push(Attribute { id, value });
        }
        Ok(attributes)
    }

    fn identifier(&mut self) -> PResult<String> {
        match self.peek() {
            Some(c) if is_identifier_start(c) => {}
            _ => return Err(self.error("Expected a character from range: [a-zA-Z]")),
        }
        let mut id = String::new();
        while let Some(c) = self.peek() {
            if !is_identifier_char(c) {
                break;
            }
            id.push(c);
            self.bump();
        }
        Ok(id)
    }

    // -- patterns -----------------------------------------------------------

    /// Parse the pattern following `=` or a variant key, if there is one.
    fn maybe_pattern(&mut self) -> PResult<Option<Pattern>> {
        self.skip_blank_inline();
        let block_start = matches!(self.peek(), None | Some('\n'));
        if block_start && self.peek_continuation().is_none() {
            return Ok(None);
        }

        let mut pieces = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some('\n') => {
                    let Some(next) = self.peek_continuation() else {
                        break;
                    };
                    self.pos = next.end;
                    pieces.push(Piece::Indent {
                        newlines: next.newlines,
                        indent: next.indent,
                    });
                }
                Some('{') => pieces.push(Piece::Placeable(self.placeable()?)),
                Some('}') => return Err(self.error("Unbalanced closing brace in TextElement.")),
                Some(_) => pieces.push(Piece::Text(self.text_run())),
            }
        }
        Ok(Some(dedent(pieces, block_start)))
    }

    /// Look past the current line break for an indented continuation line.
    fn peek_continuation(&self) -> Option<Continuation> {
        let mut p = self.pos;
        let mut newlines = 0;
        loop {
            if self.chars.get(p) != Some(&'\n') {
                return None;
            }
            p += 1;
            newlines += 1;
            let line_start = p;
            while self.chars.get(p) == Some(&' ') {
                p += 1;
            }
            match self.chars.get(p).copied() {
                Some('\n') => {}
                None | Some('.' | '[' | '*' | '}') => return None,
                Some(_) => {
                    let indent = p - line_start;
                    return (indent > 0).then_some(Continuation {
                        newlines,
                        indent,
                        end: p,
                    });
                }
            }
        }
    }

    fn text_run(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, '{' | '}' | '\n') {
                break;
            }
            text.push(c);
            self.bump();
        }
        text
    }

    // -- expressions --------------------------------------------------------

    fn placeable(&mut self) -> PResult<Expression> {
        self.expect('{')?;
        self.skip_blank();
        let expression = self.expression()?;
        self.skip_blank();
        self.expect('}')?;
        Ok(expression)
    }

    fn expression(&mut self) -> PResult<Expression> {
        let selector = self.inline_expression()?;
        self.skip_blank();

        if self.peek() == Some('-') && self.peek_at(1) == Some('>') {
            match &selector {
                InlineExpression::MessageReference { .. } => {
                    return Err(self.error("Message references cannot be used as selectors."));
                }
                InlineExpression::TermReference {
                    attribute: None, ..
                } => {
                    return Err(self.error("Terms cannot be used as selectors."));
                }
                _ => {}
            }
            self.pos += 2;
            self.skip_blank_inline();
            if self.peek() != Some('\n') {
                return Err(self.error("Expected line end"));
            }
            let variants = self.variants()?;
            return Ok(Expression::Select(SelectExpression { selector, variants }));
        }

        if let InlineExpression::TermReference {
            attribute: Some(_), ..
        } = &selector
        {
            return Err(self.error("Term attributes cannot be used as placeables."));
        }
        Ok(Expression::Inline(selector))
    }

    fn variants(&mut self) -> PResult<Vec<Variant>> {
        let mut variants = Vec::new();
        let mut has_default = false;
        loop {
            self.skip_blank();
            let default = self.peek() == Some('*');
            if default {
                self.bump();
            }
            if self.peek() != Some('[') {
                if default {
                    return Err(self.error("Expected token: \"[\""));
                }
                break;
            }
            if default && has_default {
                return Err(self.error("Only one variant can be marked as default (*)"));
            }
            self.bump();
            self.skip_blank();
            let key = self.variant_key()?;
            self.skip_blank();
            self.expect(']')?;
            let Some(value) = self.maybe_pattern()? else {
                return Err(self.error("Expected value"));
            };
            has_default |= default;
            variants.push(Variant {
                key,
                value,
                default,
            });
        }

        if variants.is_empty() {
            return Err(self.error("Expected at least one variant after \"->\""));
        }
        if !has_default {
            return Err(self.error("Expected one of the variants to be marked as default (*)"));
        }
        Ok(variants)
    }

    fn variant_key(&mut self) -> PResult<VariantKey> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '-' => {
                let InlineExpression::NumberLiteral { value } = self.number_literal()? else {
                    return Err(self.error("Expected a number literal"));
                };
                Ok(VariantKey::NumberLiteral { value })
            }
            _ => Ok(VariantKey::Identifier {
                name: self.identifier()?,
            }),
        }
    }

    fn inline_expression(&mut self) -> PResult<InlineExpression> {
        match self.peek() {
            Some('{') => Ok(InlineExpression::Placeable {
                expression: Box::new(self.placeable()?),
            }),
            Some('"') => self.string_literal(),
            Some(c) if c.is_ascii_digit() => self.number_literal(),
            Some('-') if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal()
            }
            Some('-') => {
                self.bump();
                let id = self.identifier()?;
                let attribute = self.attribute_accessor()?;
                let arguments = if self.peek() == Some('(') {
                    Some(self.call_arguments()?)
                } else {
                    None
                };
                Ok(InlineExpression::TermReference {
                    id,
                    attribute,
                    arguments,
                })
            }
            Some('$') => {
                self.bump();
                Ok(InlineExpression::VariableReference {
                    id: self.identifier()?,
                })
            }
            Some(c) if is_identifier_start(c) => {
                let id = self.identifier()?;
                if self.peek() == Some('(') {
                    if !is_callee(&id) {
                        return Err(self.error(format!(
                            "The callee has to be an upper-case identifier or a term, got \"{id}\""
                        )));
                    }
                    let arguments = self.call_arguments()?;
                    return Ok(InlineExpression::FunctionReference { id, arguments });
                }
                let attribute = self.attribute_accessor()?;
                Ok(InlineExpression::MessageReference { id, attribute })
            }
            _ => Err(self.error("Expected an inline expression")),
        }
    }

    fn attribute_accessor(&mut self) -> PResult<Option<String>> {
        if self.peek() == Some('.') {
            self.bump();
            return Ok(Some(self.identifier()?));
        }
        Ok(None)
    }

    fn string_literal(&mut self) -> PResult<InlineExpression> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => return Err(self.error("Unterminated string literal")),
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    value.push('\\');
                    self.bump();
                    match self.peek() {
                        Some(c @ ('\\' | '"')) => {
                            value.push(c);
                            self.bump();
                        }
                        Some(c @ 'u') => self.unicode_escape(&mut value, c, 4)?,
                        Some(c @ 'U') => self.unicode_escape(&mut value, c, 6)?,
                        _ => return Err(self.error("Unknown escape sequence")),
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        Ok(InlineExpression::StringLiteral { value })
    }

    fn unicode_escape(&mut self, value: &mut String, marker: char, digits: usize) -> PResult<()> {
        value.push(marker);
        self.bump();
        for _ in 0..digits {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    value.push(c);
                    self.bump();
                }
                _ => return Err(self.error("Invalid Unicode escape sequence")),
            }
        }
        Ok(())
    }

    fn number_literal(&mut self) -> PResult<InlineExpression> {
        let mut value = String::new();
        if self.peek() == Some('-') {
            value.push('-');
            self.bump();
        }
        self.digits(&mut value)?;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            value.push('.');
            self.bump();
            self.digits(&mut value)?;
        }
        Ok(InlineExpression::NumberLiteral { value })
    }

    fn digits(&mut self, out: &mut String) -> PResult<()> {
        let start = out.len();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            out.push(c);
            self.bump();
        }
        if out.len() == start {
            return Err(self.error("Expected a character from range: [0-9]"));
        }
        Ok(())
    }

    fn call_arguments(&mut self) -> PResult<CallArguments> {
        self.expect('(')?;
        let mut arguments = CallArguments::default();
        loop {
            self.skip_blank();
            if self.peek() == Some(')') {
                self.bump();
                break;
            }

            let expression = self.inline_expression()?;
            self.skip_blank();
            if self.peek() == Some(':') {
                let InlineExpression::MessageReference {
                    id: name,
                    attribute: None,
                } = expression
                else {
                    return Err(self.error("Expected an argument name"));
                };
                self.bump();
                self.skip_blank();
                let value = match self.peek() {
                    Some('"') => self.string_literal()?,
                    Some(c) if c.is_ascii_digit() || c == '-' => self.number_literal()?,
                    _ => return Err(self.error("Named arguments must be literals")),
                };
                if arguments.named.iter().any(|arg| arg.name == name) {
                    return Err(self.error(format!("The \"{name}\" argument appears twice.")));
                }
                arguments.named.push(NamedArgument { name, value });
            } else {
                if !arguments.named.is_empty() {
                    return Err(self.error("Positional arguments must not follow named arguments"));
                }
                arguments.positional.push(expression);
            }

            self.skip_blank();
            match self.peek() {
                Some(',') => self.bump(),
                Some(')') => {
                    self.bump();
                    break;
                }
                _ => return Err(self.error("Expected token: \",\" or \")\"")),
            }
        }
        Ok(arguments)
    }
}

/// Remove the common indentation of continuation lines, join adjacent text
/// and trim trailing blank space from the end of the pattern.
fn dedent(pieces: Vec<Piece>, block_start: bool) -> Pattern {
    let common = pieces
        .iter()
        .filter_map(|piece| match piece {
            Piece::Indent { indent, .. } => Some(*indent),
            _ => None,
        })
        .min()
        .unwrap_or(0);

    let mut elements: Vec<PatternElement> = Vec::new();
    for (index, piece) in pieces.into_iter().enumerate() {
        let text = match piece {
            Piece::Placeable(expression) => {
                elements.push(PatternElement::Placeable(expression));
                continue;
            }
            Piece::Text(text) => text,
            Piece::Indent { newlines, indent } => {
                let mut text = if index == 0 && block_start {
                    String::new()
                } else {
                    "\n".repeat(newlines)
                };
                text.push_str(&" ".repeat(indent - common));
                text
            }
        };
        if let Some(PatternElement::Text(previous)) = elements.last_mut() {
            previous.push_str(&text);
        } else {
            elements.push(PatternElement::Text(text));
        }
    }

    if let Some(PatternElement::Text(last)) = elements.last_mut() {
        let trimmed = last.trim_end_matches([' ', '\n']).len();
        last.truncate(trimmed);
    }
    elements.retain(|element| !matches!(element, PatternElement::Text(text) if text.is_empty()));
    Pattern::new(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(source: &str, key: &str) -> Pattern {
        match parse(source).get(key) {
            Some(Entry::Message(message)) => message.value.clone().unwrap_or_default(),
            Some(Entry::Term(term)) => term.value.clone(),
            other => panic!("no entry {key}: {other:?}"),
        }
    }

    #[test]
    fn simple_message() {
        let resource = parse("hello = Hello, world!\n");
        assert_eq!(resource.body.len(), 1);
        assert_eq!(value_of("hello = Hello, world!\n", "hello"), Pattern::text("Hello, world!"));
    }

    #[test]
    fn multiline_values_are_dedented() {
        let source = "key =\n    Block value\n      continued.\n";
        assert_eq!(value_of(source, "key"), Pattern::text("Block value\n  continued."));

        let inline = "key = First\n    second\n";
        assert_eq!(value_of(inline, "key"), Pattern::text("First\nsecond"));
    }

    #[test]
    fn blank_lines_inside_pattern_are_kept() {
        let source = "key = one\n\n    two\n\nnext = x\n";
        assert_eq!(value_of(source, "key"), Pattern::text("one\n\ntwo"));
        assert_eq!(value_of(source, "next"), Pattern::text("x"));
    }

    #[test]
    fn attributes_and_terms() {
        let source = "-brand = Firefox\n    .gender = masculine\nmsg =\n    .label = Label\n";
        let resource = parse(source);
        let Some(Entry::Term(term)) = resource.get("-brand") else {
            panic!("missing term");
        };
        assert_eq!(term.attributes[0].id, "gender");
        let Some(Entry::Message(message)) = resource.get("msg") else {
            panic!("missing message");
        };
        assert!(message.value.is_none());
        assert_eq!(message.attributes[0].value, Pattern::text("Label"));
    }

    #[test]
    fn placeables() {
        let pattern = value_of(
            "key = { $num } of { -brand } { msg.attr } { NUMBER($n, style: \"percent\") } {\"\\u002B\"}\n",
            "key",
        );
        let expressions: Vec<_> = pattern
            .elements
            .iter()
            .filter_map(|el| match el {
                PatternElement::Placeable(Expression::Inline(expr)) => Some(expr.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(expressions.len(), 5, "{pattern:?}");
        assert_eq!(expressions[0], InlineExpression::variable("num"));
        assert_eq!(expressions[1], InlineExpression::term("brand"));
    }

    #[test]
    fn term_attribute_as_placeable_is_junk() {
        let resource = parse("key = { -brand.gender }\n");
        assert_eq!(resource.junk().count(), 1);
    }

    #[test]
    fn string_literals_stay_raw() {
        let pattern = value_of("key = {\"\\u002B\"}\n", "key");
        assert_eq!(
            pattern.elements,
            vec![PatternElement::placeable(InlineExpression::string_literal("\\u002B"))]
        );
    }

    #[test]
    fn select_expression() {
        let source = "\
key =
    { $num ->
        [one] One
        [few] Few
       *[many] Many
    }
";
        let pattern = value_of(source, "key");
        let [PatternElement::Placeable(Expression::Select(select))] = pattern.elements.as_slice()
        else {
            panic!("expected select: {pattern:?}");
        };
        assert_eq!(select.variants.len(), 3);
        assert!(select.variants[2].default);
        assert_eq!(select.variants[1].value, Pattern::text("Few"));
    }

    #[test]
    fn select_without_default_is_junk() {
        let source = "key = { $n ->\n    [one] One\n    [other] Other\n}\n";
        let resource = parse(source);
        assert_eq!(resource.junk().count(), 1);
    }

    #[test]
    fn comments_attach_to_following_message() {
        let source = "# License\n\n# Attached\nkey = value\n## Group\n";
        let resource = parse(source);
        assert_eq!(resource.body[0], Entry::Comment(Comment::new("License")));
        assert_eq!(resource.body[1].comment(), Some(&Comment::new("Attached")));
        assert_eq!(resource.body[2], Entry::GroupComment(Comment::new("Group")));
    }

    #[test]
    fn multiline_comment() {
        let resource = parse("# one\n#\n# three\n\nkey = v\n");
        assert_eq!(resource.body[0], Entry::Comment(Comment::new("one\n\nthree")));
    }

    #[test]
    fn junk_recovery_resumes_at_next_entry() {
        let source = "good = yes\nbad = { oops\n    still bad\nafter = fine\n";
        let resource = parse(source);
        assert_eq!(resource.junk().count(), 1);
        assert!(resource.get("good").is_some());
        assert!(resource.get("after").is_some());
        let junk = resource.junk().next().map(|j| j.content.clone());
        assert_eq!(junk.as_deref(), Some("bad = { oops\n    still bad\n"));
    }

    #[test]
    fn strict_parse_reports_error() {
        assert!(parse_strict("key = {\n").is_err());
        assert!(parse_strict("key = ok\n").is_ok());
    }

    #[test]
    fn crlf_is_normalized() {
        assert_eq!(value_of("key = a\r\n    b\r\n", "key"), Pattern::text("a\nb"));
    }

    #[test]
    fn message_without_value_or_attributes_is_junk() {
        assert_eq!(parse("key =\n").junk().count(), 1);
    }
}
