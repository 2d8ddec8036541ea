//! Transform trees.
//!
//! A migration describes each target message as a tree of [`Transform`]
//! nodes. Leaves either carry literal Fluent content or reference a string in
//! a source file; inner nodes compose their children. Trees are built once
//! per migration and evaluated afresh for every changeset by
//! [`Evaluator`](crate::evaluator::Evaluator).
//!
//! | Primitive          | Node                          |
//! |--------------------|-------------------------------|
//! | `COPY`             | [`Transform::Copy`]           |
//! | `COPY_PATTERN`     | [`Transform::CopyPattern`]    |
//! | `CONCAT`           | [`Transform::Concat`]         |
//! | `REPLACE`          | [`Transform::Replace`]        |
//! | `REPLACE_IN_TEXT`  | [`Transform::Replace`] over [`ReplaceBase::Text`] |
//! | `PLURALS`          | [`Transform::Plurals`]        |
//! | pattern rewrite    | [`Transform::TransformPattern`] |
//!
//! Constructors validate their source paths: legacy primitives reject `.ftl`
//! files and [`copy_pattern`] rejects everything else, so a malformed tree
//! fails before any evaluation starts.

use std::fmt;
use std::sync::Arc;

use migrate_ftl::{Attribute, Comment, Entry, InlineExpression, Message, Pattern, Term, VariantKey};
use serde::Serialize;

use crate::error::{MigrateError, Result};
use crate::pattern;
use crate::replace::normalize_keys;
use crate::visitor::PatternVisitor;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// A `(path, key)` reference to a string in a localization file.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceRef {
    pub path: String,
    pub key: String,
}

impl SourceRef {
    #[must_use]
    pub fn new(path: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.key)
    }
}

fn is_fluent(path: &str) -> bool {
    path.ends_with(".ftl")
}

/// A flat key in a `.properties`, `.dtd` or `.po` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacySource {
    pub path: String,
    pub key: String,
    /// `None` and `Some(true)` trim blanks around lines and blank lines at
    /// the edges; `Some(false)` keeps the value verbatim.
    pub trim: Option<bool>,
}

impl LegacySource {
    /// # Errors
    /// Returns [`MigrateError::NotSupported`] when `path` is a Fluent file.
    pub fn new(path: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let key = key.into();
        if is_fluent(&path) {
            return Err(MigrateError::not_supported(format!(
                "Please use COPY_PATTERN to migrate from Fluent files ({path}:{key})"
            )));
        }
        Ok(Self {
            path,
            key,
            trim: None,
        })
    }

    #[must_use]
    pub const fn with_trim(mut self, trim: bool) -> Self {
        self.trim = Some(trim);
        self
    }

    #[must_use]
    pub fn source_ref(&self) -> SourceRef {
        SourceRef::new(&self.path, &self.key)
    }

    /// Apply the trim policy to a raw value.
    #[must_use]
    pub fn process(&self, value: &str) -> String {
        if self.trim == Some(false) {
            value.to_owned()
        } else {
            pattern::trim_text(value)
        }
    }
}

/// A message (`key`), attribute (`key.attr`) or term (`-key`) in an `.ftl`
/// file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FluentSource {
    pub path: String,
    pub key: String,
}

impl FluentSource {
    /// # Errors
    /// Returns [`MigrateError::NotSupported`] for non-Fluent paths and for
    /// term attributes.
    pub fn new(path: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let key = key.into();
        if !is_fluent(&path) {
            return Err(MigrateError::not_supported(format!(
                "Please use COPY to migrate from legacy files ({path}:{key})"
            )));
        }
        if key.starts_with('-') && key.contains('.') {
            return Err(MigrateError::not_supported(format!(
                "Cannot migrate from Term Attributes ({path}:{key})"
            )));
        }
        Ok(Self { path, key })
    }

    #[must_use]
    pub fn source_ref(&self) -> SourceRef {
        SourceRef::new(&self.path, &self.key)
    }

    /// The entry key and the attribute name, if any.
    #[must_use]
    pub fn split_key(&self) -> (&str, Option<&str>) {
        match self.key.split_once('.') {
            Some((id, attribute)) => (id, Some(attribute)),
            None => (&self.key, None),
        }
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// One node of a transform tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Transform {
    /// Literal text.
    Text(String),
    /// A literal placeable.
    Expression(InlineExpression),
    /// A literal pattern, spliced into its parent.
    Pattern(Pattern),
    /// A select expression whose variants are transforms.
    Select(SelectTransform),
    Copy(LegacySource),
    CopyPattern(FluentSource),
    Concat(Vec<Transform>),
    Replace(Replace),
    Plurals(Plurals),
    TransformPattern(TransformPattern),
}

/// `{ selector -> [key] value *[other] value }` with transform values.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectTransform {
    pub selector: InlineExpression,
    pub variants: Vec<VariantTransform>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariantTransform {
    pub key: VariantKey,
    pub value: Transform,
    pub default: bool,
}

/// What a [`Replace`] substitutes into.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplaceBase {
    Source(LegacySource),
    Text(String),
}

/// Placeholder substitution over a legacy string.
#[derive(Clone, Debug, PartialEq)]
pub struct Replace {
    pub base: ReplaceBase,
    /// Placeholder text and its replacement. Order matters only when two
    /// placeholders start at the same offset; the later one wins.
    pub replacements: Vec<(String, Transform)>,
    /// Number `%s`-style specifiers and collapse `%%` before matching.
    pub normalize_printf: bool,
}

impl Replace {
    #[must_use]
    pub const fn new(base: ReplaceBase, replacements: Vec<(String, Transform)>) -> Self {
        Self {
            base,
            replacements,
            normalize_printf: false,
        }
    }

    /// Turn on printf normalization. Placeholder keys are numbered the way
    /// specifiers in the source are matched against them.
    #[must_use]
    pub fn with_printf_normalization(mut self) -> Self {
        self.replacements = normalize_keys(std::mem::take(&mut self.replacements));
        self.normalize_printf = true;
        self
    }
}

/// Builds the transform for one plural form.
#[derive(Clone)]
pub struct FormRewrite(Arc<dyn Fn(&str) -> Transform + Send + Sync>);

impl FormRewrite {
    pub fn new(rewrite: impl Fn(&str) -> Transform + Send + Sync + 'static) -> Self {
        Self(Arc::new(rewrite))
    }

    #[must_use]
    pub fn apply(&self, form: &str) -> Transform {
        (self.0)(form)
    }
}

impl fmt::Debug for FormRewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FormRewrite(..)")
    }
}

impl PartialEq for FormRewrite {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A `;`-separated legacy plural string turned into a select expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Plurals {
    pub source: LegacySource,
    pub selector: InlineExpression,
    /// Applied to every form. Without it a form is copied as text.
    pub foreach: Option<FormRewrite>,
}

impl Plurals {
    #[must_use]
    pub const fn new(source: LegacySource, selector: InlineExpression) -> Self {
        Self {
            source,
            selector,
            foreach: None,
        }
    }

    #[must_use]
    pub fn foreach(mut self, rewrite: impl Fn(&str) -> Transform + Send + Sync + 'static) -> Self {
        self.foreach = Some(FormRewrite::new(rewrite));
        self
    }
}

/// A copied Fluent pattern rewritten by a visitor.
#[derive(Clone)]
pub struct TransformPattern {
    pub source: FluentSource,
    pub visitor: Arc<dyn PatternVisitor>,
}

impl fmt::Debug for TransformPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformPattern")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TransformPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && Arc::ptr_eq(&self.visitor, &other.visitor)
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

/// `COPY(path, key)`.
///
/// # Errors
/// Returns [`MigrateError::NotSupported`] for `.ftl` paths.
pub fn copy(path: impl Into<String>, key: impl Into<String>) -> Result<Transform> {
    Ok(Transform::Copy(LegacySource::new(path, key)?))
}

/// `COPY_PATTERN(path, key)`.
///
/// # Errors
/// Returns [`MigrateError::NotSupported`] for legacy paths and term
/// attributes.
pub fn copy_pattern(path: impl Into<String>, key: impl Into<String>) -> Result<Transform> {
    Ok(Transform::CopyPattern(FluentSource::new(path, key)?))
}

/// `REPLACE(path, key, replacements)`.
///
/// # Errors
/// Returns [`MigrateError::NotSupported`] for `.ftl` paths.
pub fn replace(
    path: impl Into<String>,
    key: impl Into<String>,
    replacements: Vec<(String, Transform)>,
) -> Result<Transform> {
    let source = LegacySource::new(path, key)?;
    Ok(Transform::Replace(Replace::new(
        ReplaceBase::Source(source),
        replacements,
    )))
}

/// `REPLACE_IN_TEXT(text, replacements)`.
#[must_use]
pub fn replace_in_text(text: impl Into<String>, replacements: Vec<(String, Transform)>) -> Transform {
    Transform::Replace(Replace::new(ReplaceBase::Text(text.into()), replacements))
}

/// `PLURALS(path, key, selector)`.
///
/// # Errors
/// Returns [`MigrateError::NotSupported`] for `.ftl` paths.
pub fn plurals(
    path: impl Into<String>,
    key: impl Into<String>,
    selector: InlineExpression,
) -> Result<Transform> {
    Ok(Transform::Plurals(Plurals::new(
        LegacySource::new(path, key)?,
        selector,
    )))
}

/// `CONCAT(children...)`. A lone source child is returned as is.
#[must_use]
pub fn concat(mut children: Vec<Transform>) -> Transform {
    if children.len() == 1 && children[0].is_source() {
        return children.remove(0);
    }
    Transform::Concat(children)
}

/// Copy the Fluent pattern at `path:key` through `visitor`.
///
/// # Errors
/// Same as [`copy_pattern`].
pub fn transform_pattern(
    path: impl Into<String>,
    key: impl Into<String>,
    visitor: Arc<dyn PatternVisitor>,
) -> Result<Transform> {
    Ok(Transform::TransformPattern(TransformPattern {
        source: FluentSource::new(path, key)?,
        visitor,
    }))
}

// ---------------------------------------------------------------------------
// Tree queries
// ---------------------------------------------------------------------------

impl Transform {
    /// `true` for nodes that read a source file.
    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(
            self,
            Self::Copy(_)
                | Self::CopyPattern(_)
                | Self::Replace(Replace {
                    base: ReplaceBase::Source(_),
                    ..
                })
                | Self::Plurals(_)
                | Self::TransformPattern(_)
        )
    }

    /// Source references reachable from this node, depth-first, without
    /// duplicates. A replace records its replacements before its own source.
    #[must_use]
    pub fn dependencies(&self) -> Vec<SourceRef> {
        let mut found = Vec::new();
        self.collect_dependencies(&mut found);
        found
    }

    fn collect_dependencies(&self, found: &mut Vec<SourceRef>) {
        match self {
            Self::Text(_) | Self::Expression(_) | Self::Pattern(_) => {}
            Self::Copy(source) => push_unique(found, source.source_ref()),
            Self::CopyPattern(source) => push_unique(found, source.source_ref()),
            Self::TransformPattern(transform) => push_unique(found, transform.source.source_ref()),
            Self::Plurals(plurals) => push_unique(found, plurals.source.source_ref()),
            Self::Select(select) => {
                for variant in &select.variants {
                    variant.value.collect_dependencies(found);
                }
            }
            Self::Concat(children) => {
                for child in children {
                    child.collect_dependencies(found);
                }
            }
            Self::Replace(replace) => {
                for (_, replacement) in &replace.replacements {
                    replacement.collect_dependencies(found);
                }
                if let ReplaceBase::Source(source) = &replace.base {
                    push_unique(found, source.source_ref());
                }
            }
        }
    }

    /// The `.ftl` sources this node copies patterns from.
    pub(crate) fn fluent_sources(&self) -> Vec<&FluentSource> {
        let mut found = Vec::new();
        self.collect_fluent_sources(&mut found);
        found
    }

    fn collect_fluent_sources<'a>(&'a self, found: &mut Vec<&'a FluentSource>) {
        match self {
            Self::CopyPattern(source) => found.push(source),
            Self::TransformPattern(transform) => found.push(&transform.source),
            Self::Select(select) => {
                for variant in &select.variants {
                    variant.value.collect_fluent_sources(found);
                }
            }
            Self::Concat(children) => {
                for child in children {
                    child.collect_fluent_sources(found);
                }
            }
            Self::Replace(replace) => {
                for (_, replacement) in &replace.replacements {
                    replacement.collect_fluent_sources(found);
                }
            }
            Self::Text(_)
            | Self::Expression(_)
            | Self::Pattern(_)
            | Self::Copy(_)
            | Self::Plurals(_) => {}
        }
    }
}

fn push_unique(found: &mut Vec<SourceRef>, source: SourceRef) {
    if !found.contains(&source) {
        found.push(source);
    }
}

// ---------------------------------------------------------------------------
// Message templates
// ---------------------------------------------------------------------------

/// A target message or term whose value and attributes are transforms.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageTransform {
    /// Entry key: `id` for messages, `-id` for terms.
    pub id: String,
    pub value: Option<Transform>,
    pub attributes: Vec<(String, Transform)>,
    pub comment: Option<String>,
}

impl MessageTransform {
    /// A message with a value.
    #[must_use]
    pub fn message(id: impl Into<String>, value: Transform) -> Self {
        Self {
            id: id.into(),
            value: Some(value),
            attributes: Vec::new(),
            comment: None,
        }
    }

    /// A message with attributes only.
    #[must_use]
    pub fn attributes_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: None,
            attributes: Vec::new(),
            comment: None,
        }
    }

    /// A term; `id` is given without the leading `-`.
    #[must_use]
    pub fn term(id: impl AsRef<str>, value: Transform) -> Self {
        Self::message(format!("-{}", id.as_ref()), value)
    }

    #[must_use]
    pub fn with_attribute(mut self, id: impl Into<String>, value: Transform) -> Self {
        self.attributes.push((id.into(), value));
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn is_term(&self) -> bool {
        self.id.starts_with('-')
    }

    /// The identifier without the term sigil.
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.id.strip_prefix('-').unwrap_or(&self.id)
    }

    /// Every source the value and attributes read, depth-first.
    #[must_use]
    pub fn dependencies(&self) -> Vec<SourceRef> {
        let mut found = Vec::new();
        let nodes = self
            .value
            .iter()
            .chain(self.attributes.iter().map(|(_, value)| value));
        for node in nodes {
            node.collect_dependencies(&mut found);
        }
        found
    }

    pub(crate) fn fluent_sources(&self) -> Vec<&FluentSource> {
        self.value
            .iter()
            .chain(self.attributes.iter().map(|(_, value)| value))
            .flat_map(Transform::fluent_sources)
            .collect()
    }

    /// An entry with this id, comment and attribute names but empty values,
    /// used as the reference shape when no reference file exists.
    #[must_use]
    pub fn skeleton(&self) -> Entry {
        let attributes = self
            .attributes
            .iter()
            .map(|(id, _)| Attribute::new(id.clone(), pattern::empty()))
            .collect();
        let comment = self.comment.clone().map(Comment::new);
        if self.is_term() {
            Entry::Term(Term {
                id: self.identifier().to_owned(),
                value: pattern::empty(),
                attributes,
                comment,
            })
        } else {
            Entry::Message(Message {
                id: self.id.clone(),
                value: self.value.as_ref().map(|_| pattern::empty()),
                attributes,
                comment,
            })
        }
    }
}
