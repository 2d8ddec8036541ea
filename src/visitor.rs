//! Structural rewrites of existing Fluent patterns.
//!
//! A [`PatternVisitor`] is the hook behind the pattern-transform primitive:
//! it receives every text element and placeable of a copied pattern and may
//! replace it. All methods default to returning the node unchanged, so an
//! implementation overrides only the node kinds it cares about.

use migrate_ftl::{Expression, InlineExpression, Pattern, PatternElement, SelectExpression};

use crate::pattern::pattern_of;

/// What a visited node is replaced with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rewrite {
    Text(String),
    Expression(Expression),
    /// Spliced into the surrounding pattern.
    Pattern(Pattern),
}

/// Per-node rewrite hooks. Nodes are visited bottom-up: the variants of a
/// select expression are rewritten before the select itself is visited.
pub trait PatternVisitor: Send + Sync {
    fn visit_text(&self, text: &str) -> Rewrite {
        Rewrite::Text(text.to_owned())
    }

    fn visit_inline(&self, expression: &InlineExpression) -> Rewrite {
        Rewrite::Expression(Expression::Inline(expression.clone()))
    }

    fn visit_select(&self, select: SelectExpression) -> Rewrite {
        Rewrite::Expression(Expression::Select(select))
    }
}

/// The visitor that changes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl PatternVisitor for Identity {}

/// Rewrite `pattern` with `visitor` and normalize the result.
#[must_use]
pub fn walk_pattern(visitor: &dyn PatternVisitor, pattern: &Pattern) -> Pattern {
    let mut elements = Vec::with_capacity(pattern.elements.len());
    for element in &pattern.elements {
        let rewrite = match element {
            PatternElement::Text(text) => visitor.visit_text(text),
            PatternElement::Placeable(Expression::Inline(inline)) => visitor.visit_inline(inline),
            PatternElement::Placeable(Expression::Select(select)) => {
                let mut select = select.clone();
                for variant in &mut select.variants {
                    variant.value = walk_pattern(visitor, &variant.value);
                }
                visitor.visit_select(select)
            }
        };
        match rewrite {
            Rewrite::Text(text) => elements.push(PatternElement::Text(text)),
            Rewrite::Expression(expression) => elements.push(PatternElement::Placeable(expression)),
            Rewrite::Pattern(pattern) => elements.extend(pattern.elements),
        }
    }
    pattern_of(elements)
}
