//! Fluent syntax tree.
//!
//! The tree mirrors the Fluent 1.0 data model closely enough to round-trip
//! every construct the migration tool produces or reads back from disk.
//! Identifiers are stored without sigils: a term `-brand` has `id == "brand"`
//! and a variable `$count` has `id == "count"`.
//!
//! String literals keep their *raw* source form (escape sequences are not
//! decoded), so `{ "+" }` survives a parse/serialize cycle unchanged.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Resource and entries
// ---------------------------------------------------------------------------

/// A parsed `.ftl` file: an ordered list of entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// Entries in source order.
    pub body: Vec<Entry>,
}

impl Resource {
    /// Create a resource from a list of entries.
    #[must_use]
    pub const fn new(body: Vec<Entry>) -> Self {
        Self { body }
    }

    /// Look up a message or term by its entry key (`"id"` or `"-id"`).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.body
            .iter()
            .find(|entry| entry.key().as_deref() == Some(key))
    }

    /// Iterate over the messages and terms, skipping comments and junk.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.body.iter().filter(|entry| entry.key().is_some())
    }

    /// Iterate over the junk entries produced by parse errors.
    pub fn junk(&self) -> impl Iterator<Item = &Junk> {
        self.body.iter().filter_map(|entry| match entry {
            Entry::Junk(junk) => Some(junk),
            _ => None,
        })
    }
}

/// A top-level entry of a resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Entry {
    Message(Message),
    Term(Term),
    /// `# ...` standalone comment.
    Comment(Comment),
    /// `## ...` group comment.
    GroupComment(Comment),
    /// `### ...` resource comment.
    ResourceComment(Comment),
    /// Unparseable source text.
    Junk(Junk),
}

impl Entry {
    /// The entry key: the identifier for messages, `-identifier` for terms,
    /// `None` for comments and junk.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Message(message) => Some(message.id.clone()),
            Self::Term(term) => Some(format!("-{}", term.id)),
            _ => None,
        }
    }

    /// `true` for the three comment kinds.
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(
            self,
            Self::Comment(_) | Self::GroupComment(_) | Self::ResourceComment(_)
        )
    }

    /// The comment attached to a message or term.
    #[must_use]
    pub const fn comment(&self) -> Option<&Comment> {
        match self {
            Self::Message(message) => message.comment.as_ref(),
            Self::Term(term) => term.comment.as_ref(),
            _ => None,
        }
    }

    /// Attach (or clear) the comment of a message or term. No-op for other
    /// entry kinds.
    pub fn set_comment(&mut self, comment: Option<Comment>) {
        match self {
            Self::Message(message) => message.comment = comment,
            Self::Term(term) => term.comment = comment,
            _ => {}
        }
    }

    /// Content equality used to decide whether a migrated entry is already
    /// present: compares id, value and the attribute set. Attached comments
    /// and attribute order are ignored.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Message(a), Self::Message(b)) => {
                a.id == b.id && a.value == b.value && same_attributes(&a.attributes, &b.attributes)
            }
            (Self::Term(a), Self::Term(b)) => {
                a.id == b.id && a.value == b.value && same_attributes(&a.attributes, &b.attributes)
            }
            _ => false,
        }
    }
}

fn same_attributes(a: &[Attribute], b: &[Attribute]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut left: Vec<&Attribute> = a.iter().collect();
    let mut right: Vec<&Attribute> = b.iter().collect();
    left.sort_by(|x, y| x.id.cmp(&y.id));
    right.sort_by(|x, y| x.id.cmp(&y.id));
    left == right
}

/// A message: `id = value` with optional attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: String,
    pub value: Option<Pattern>,
    pub attributes: Vec<Attribute>,
    pub comment: Option<Comment>,
}

impl Message {
    /// A message with only a value.
    #[must_use]
    pub fn new(id: impl Into<String>, value: Pattern) -> Self {
        Self {
            id: id.into(),
            value: Some(value),
            attributes: Vec::new(),
            comment: None,
        }
    }
}

/// A term: `-id = value`. Terms always carry a value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Term {
    pub id: String,
    pub value: Pattern,
    pub attributes: Vec<Attribute>,
    pub comment: Option<Comment>,
}

/// `.id = value` under a message or term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub id: String,
    pub value: Pattern,
}

impl Attribute {
    #[must_use]
    pub fn new(id: impl Into<String>, value: Pattern) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

/// Comment text with the `#` markers and the single separating space removed.
/// Lines are joined with `\n`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub content: String,
}

impl Comment {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Source text that failed to parse, with the reasons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Junk {
    pub content: String,
    pub annotations: Vec<Annotation>,
}

/// A parse error attached to a [`Junk`] entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Human-readable reason.
    pub message: String,
    /// Character offset into the parsed source.
    pub offset: usize,
}

// ---------------------------------------------------------------------------
// Patterns and expressions
// ---------------------------------------------------------------------------

/// An ordered sequence of text and placeables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Pattern {
    pub elements: Vec<PatternElement>,
}

impl Pattern {
    #[must_use]
    pub const fn new(elements: Vec<PatternElement>) -> Self {
        Self { elements }
    }

    /// A pattern made of a single text element.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            elements: vec![PatternElement::Text(value.into())],
        }
    }

    /// Concatenated text content, or `None` if the pattern has any placeable.
    #[must_use]
    pub fn as_plain_text(&self) -> Option<String> {
        let mut out = String::new();
        for element in &self.elements {
            match element {
                PatternElement::Text(text) => out.push_str(text),
                PatternElement::Placeable(_) => return None,
            }
        }
        Some(out)
    }
}

/// One element of a [`Pattern`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum PatternElement {
    Text(String),
    Placeable(Expression),
}

impl PatternElement {
    /// `{ expression }` for an inline expression.
    #[must_use]
    pub const fn placeable(expression: InlineExpression) -> Self {
        Self::Placeable(Expression::Inline(expression))
    }
}

/// The content of a placeable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Expression {
    Inline(InlineExpression),
    Select(SelectExpression),
}

/// Expressions that fit on one line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum InlineExpression {
    /// `"value"`, raw (escapes not decoded).
    StringLiteral { value: String },
    /// `-?[0-9]+(\.[0-9]+)?`, raw.
    NumberLiteral { value: String },
    /// `FUNC(args)`.
    FunctionReference {
        id: String,
        arguments: CallArguments,
    },
    /// `message` or `message.attribute`.
    MessageReference {
        id: String,
        attribute: Option<String>,
    },
    /// `-term`, `-term.attribute`, `-term(args)`.
    TermReference {
        id: String,
        attribute: Option<String>,
        arguments: Option<CallArguments>,
    },
    /// `$variable`.
    VariableReference { id: String },
    /// `{ expression }` nested inside another placeable.
    Placeable { expression: Box<Expression> },
}

impl InlineExpression {
    #[must_use]
    pub fn string_literal(value: impl Into<String>) -> Self {
        Self::StringLiteral {
            value: value.into(),
        }
    }

    #[must_use]
    pub fn variable(id: impl Into<String>) -> Self {
        Self::VariableReference { id: id.into() }
    }

    #[must_use]
    pub fn message(id: impl Into<String>) -> Self {
        Self::MessageReference {
            id: id.into(),
            attribute: None,
        }
    }

    #[must_use]
    pub fn term(id: impl Into<String>) -> Self {
        Self::TermReference {
            id: id.into(),
            attribute: None,
            arguments: None,
        }
    }
}

/// Positional and named arguments of a call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CallArguments {
    pub positional: Vec<InlineExpression>,
    pub named: Vec<NamedArgument>,
}

/// `name: value` where value is a literal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NamedArgument {
    pub name: String,
    pub value: InlineExpression,
}

/// `{ selector -> [key] value *[other] value }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectExpression {
    pub selector: InlineExpression,
    pub variants: Vec<Variant>,
}

/// One branch of a select expression. Exactly one variant per select is the
/// default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub key: VariantKey,
    pub value: Pattern,
    pub default: bool,
}

/// A variant key: an identifier (`[few]`) or a number (`[0]`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum VariantKey {
    Identifier { name: String },
    NumberLiteral { value: String },
}

impl VariantKey {
    #[must_use]
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier { name: name.into() }
    }

    /// The key as written between the brackets.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Identifier { name } => name,
            Self::NumberLiteral { value } => value,
        }
    }
}
