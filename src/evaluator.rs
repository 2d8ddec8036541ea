//! Transform evaluation.
//!
//! [`Evaluator`] walks a transform tree bottom-up and produces a Fluent
//! [`Pattern`]. Source strings come from a [`SourceLookup`]. A string that is
//! missing is not an error: evaluation returns [`Absent`] and the caller
//! drops the message, attribute or variant that needed it.
//!
//! Absence propagates through composition. A concat or replace with one
//! absent child is absent as a whole. A select survives the loss of a
//! non-default variant but not of its default one. A message survives the
//! loss of an attribute as long as it keeps a value or another attribute.

use std::fmt;

use migrate_ftl::{
    Attribute, Comment, Entry, Expression, Message, Pattern, PatternElement, SelectExpression,
    Term, Variant, VariantKey,
};

use crate::pattern::{empty, pattern_of};
use crate::plurals::PluralCategory;
use crate::replace::{Piece, split_placeholders, split_printf};
use crate::transforms::{
    FluentSource, LegacySource, MessageTransform, Plurals, Replace, ReplaceBase, SelectTransform,
    Transform,
};
use crate::visitor::walk_pattern;

/// Read access to the source strings a transform tree references.
pub trait SourceLookup {
    /// The raw value of `key` in a legacy file, escapes already resolved.
    fn legacy_value(&self, path: &str, key: &str) -> Option<&str>;

    /// The pattern of a message (`key`), attribute (`key.attr`) or term
    /// (`-key`) in an `.ftl` file.
    fn fluent_pattern(&self, path: &str, key: &str) -> Option<&Pattern>;

    /// The target locale's plural categories in legacy form order.
    fn plural_categories(&self) -> &[PluralCategory];
}

/// A source string that does not exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Absent {
    pub path: String,
    pub key: String,
}

impl fmt::Display for Absent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing `{}` in `{}`", self.key, self.path)
    }
}

/// Result of evaluating a node.
pub type Evaluated<T> = std::result::Result<T, Absent>;

/// Stateless transform interpreter over a [`SourceLookup`].
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    lookup: &'a dyn SourceLookup,
}

impl<'a> Evaluator<'a> {
    #[must_use]
    pub const fn new(lookup: &'a dyn SourceLookup) -> Self {
        Self { lookup }
    }

    /// Evaluate `transform` into a normalized pattern.
    ///
    /// # Errors
    /// Returns [`Absent`] when a required source string is missing.
    pub fn evaluate(&self, transform: &Transform) -> Evaluated<Pattern> {
        match transform {
            Transform::Text(text) => Ok(pattern_of([PatternElement::Text(text.clone())])),
            Transform::Expression(expression) => Ok(Pattern::new(vec![PatternElement::placeable(
                expression.clone(),
            )])),
            Transform::Pattern(pattern) => Ok(pattern.clone()),
            Transform::Select(select) => {
                let select = self.select(select)?;
                Ok(Pattern::new(vec![PatternElement::Placeable(
                    Expression::Select(select),
                )]))
            }
            Transform::Copy(source) => {
                let value = self.legacy(source)?;
                Ok(pattern_of([PatternElement::Text(value)]))
            }
            Transform::CopyPattern(source) => self.fluent(source).cloned(),
            Transform::Concat(children) => {
                let mut elements = Vec::new();
                for child in children {
                    elements.extend(self.evaluate(child)?.elements);
                }
                Ok(pattern_of(elements))
            }
            Transform::Replace(replace) => self.replace(replace),
            Transform::Plurals(plurals) => self.plurals(plurals),
            Transform::TransformPattern(transform) => {
                let pattern = self.fluent(&transform.source)?;
                Ok(walk_pattern(transform.visitor.as_ref(), pattern))
            }
        }
    }

    /// Evaluate a message template into a Fluent entry.
    ///
    /// # Errors
    /// Returns [`Absent`] when the value is missing, or when every attribute
    /// of a value-less message is.
    pub fn evaluate_message(&self, message: &MessageTransform) -> Evaluated<Entry> {
        let value = message
            .value
            .as_ref()
            .map(|value| self.evaluate(value))
            .transpose()?;

        let mut attributes = Vec::with_capacity(message.attributes.len());
        let mut missing = None;
        for (id, transform) in &message.attributes {
            match self.evaluate(transform) {
                Ok(pattern) => attributes.push(Attribute::new(id.clone(), pattern)),
                Err(absent) => {
                    tracing::warn!(message = %message.id, attribute = %id, %absent, "dropping attribute");
                    missing = Some(absent);
                }
            }
        }
        if value.is_none() && attributes.is_empty() {
            if let Some(absent) = missing {
                return Err(absent);
            }
        }

        let comment = message.comment.clone().map(Comment::new);
        Ok(if message.is_term() {
            Entry::Term(Term {
                id: message.identifier().to_owned(),
                value: value.unwrap_or_else(empty),
                attributes,
                comment,
            })
        } else {
            Entry::Message(Message {
                id: message.id.clone(),
                value,
                attributes,
                comment,
            })
        })
    }

    fn legacy(&self, source: &LegacySource) -> Evaluated<String> {
        self.lookup
            .legacy_value(&source.path, &source.key)
            .map(|value| source.process(value))
            .ok_or_else(|| Absent {
                path: source.path.clone(),
                key: source.key.clone(),
            })
    }

    fn fluent(&self, source: &FluentSource) -> Evaluated<&'a Pattern> {
        self.lookup
            .fluent_pattern(&source.path, &source.key)
            .ok_or_else(|| Absent {
                path: source.path.clone(),
                key: source.key.clone(),
            })
    }

    fn select(&self, select: &SelectTransform) -> Evaluated<SelectExpression> {
        let mut variants = Vec::with_capacity(select.variants.len());
        for variant in &select.variants {
            match self.evaluate(&variant.value) {
                Ok(value) => variants.push(Variant {
                    key: variant.key.clone(),
                    value,
                    default: variant.default,
                }),
                Err(absent) if !variant.default => {
                    tracing::warn!(variant = variant.key.as_str(), %absent, "dropping variant");
                }
                Err(absent) => return Err(absent),
            }
        }
        Ok(SelectExpression {
            selector: select.selector.clone(),
            variants,
        })
    }

    fn replace(&self, replace: &Replace) -> Evaluated<Pattern> {
        let text = match &replace.base {
            ReplaceBase::Source(source) => self.legacy(source)?,
            ReplaceBase::Text(text) => text.clone(),
        };
        let keys: Vec<&str> = replace
            .replacements
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        let pieces = if replace.normalize_printf {
            split_printf(&text, &keys)
        } else {
            split_placeholders(&text, &keys)
        };

        let mut elements = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Text(text) => elements.push(PatternElement::Text(text.to_owned())),
                Piece::Placeholder(index) => {
                    let (_, replacement) = &replace.replacements[index];
                    elements.extend(self.evaluate(replacement)?.elements);
                }
            }
        }
        Ok(pattern_of(elements))
    }

    /// Forms map onto the locale's categories in order; empty forms are
    /// skipped. The default variant is the highest category of the locale in
    /// canonical order, filled with the last form when no form reaches it.
    fn plurals(&self, plurals: &Plurals) -> Evaluated<Pattern> {
        let value = self.legacy(&plurals.source)?;
        let categories = self.lookup.plural_categories();
        let default = categories
            .iter()
            .max()
            .copied()
            .unwrap_or(PluralCategory::Other);

        let mut pairs: Vec<(PluralCategory, &str)> = categories
            .iter()
            .copied()
            .zip(value.split(';').map(str::trim))
            .filter(|(_, form)| !form.is_empty())
            .collect();

        match pairs.as_slice() {
            [] => return Ok(empty()),
            [(_, form)] => return self.plural_form(plurals, form),
            _ => {}
        }

        pairs.sort_by_key(|(category, _)| *category);
        if let Some(&(last, form)) = pairs.last() {
            if last != default {
                pairs.push((default, form));
            }
        }

        let mut variants = Vec::with_capacity(pairs.len());
        for (category, form) in pairs {
            variants.push(Variant {
                key: VariantKey::identifier(category.as_str()),
                value: self.plural_form(plurals, form)?,
                default: category == default,
            });
        }
        Ok(Pattern::new(vec![PatternElement::Placeable(
            Expression::Select(SelectExpression {
                selector: plurals.selector.clone(),
                variants,
            }),
        )]))
    }

    fn plural_form(&self, plurals: &Plurals, form: &str) -> Evaluated<Pattern> {
        match &plurals.foreach {
            Some(rewrite) => self.evaluate(&rewrite.apply(form)),
            None => Ok(pattern_of([PatternElement::Text(form.to_owned())])),
        }
    }
}
