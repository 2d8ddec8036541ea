//! Property tests for the parser/serializer pair.
//!
//! Every resource the serializer writes must parse back into the same tree.
//! Generated resources cover plain and multiline text, attributes, terms,
//! variable placeables, select expressions and text containing characters
//! that need escaping.

#![allow(clippy::all, clippy::pedantic, clippy::nursery)]

use migrate_ftl::{
    Attribute, Entry, Expression, InlineExpression, Message, Pattern, PatternElement, Resource,
    SelectExpression, Term, Variant, VariantKey, parse, serialize,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

/// Text without leading or trailing blanks, which Fluent cannot express as
/// plain text.
fn word_text() -> BoxedStrategy<String> {
    "[A-Za-z0-9][A-Za-z0-9 ,!{}]{0,12}[A-Za-z0-9!]".boxed()
}

/// Text the serializer never has to escape.
fn plain_text() -> BoxedStrategy<String> {
    "[A-Za-z0-9][A-Za-z0-9 ,!]{0,12}[A-Za-z0-9!]".boxed()
}

fn pattern(text: fn() -> BoxedStrategy<String>) -> impl Strategy<Value = Pattern> {
    prop_oneof![
        text().prop_map(Pattern::text),
        (text(), text()).prop_map(|(a, b)| Pattern::text(format!("{a}\n{b}"))),
        (text(), identifier()).prop_map(|(a, var)| Pattern::new(vec![
            PatternElement::Text(format!("{a} ")),
            PatternElement::placeable(InlineExpression::variable(var)),
        ])),
        (text(), text()).prop_map(|(one, other)| Pattern::new(vec![
            PatternElement::Placeable(Expression::Select(SelectExpression {
                selector: InlineExpression::variable("num"),
                variants: vec![
                    Variant {
                        key: VariantKey::identifier("one"),
                        value: Pattern::text(one),
                        default: false,
                    },
                    Variant {
                        key: VariantKey::identifier("other"),
                        value: Pattern::text(other),
                        default: true,
                    },
                ],
            })),
        ])),
    ]
}

fn entry(text: fn() -> BoxedStrategy<String>) -> impl Strategy<Value = Entry> {
    (
        identifier(),
        pattern(text),
        proptest::option::of((identifier(), pattern(text))),
        any::<bool>(),
    )
        .prop_map(|(id, value, attribute, is_term)| {
            let attributes: Vec<Attribute> = attribute
                .into_iter()
                .map(|(name, pattern)| Attribute::new(name, pattern))
                .collect();
            if is_term {
                Entry::Term(Term {
                    id,
                    value,
                    attributes,
                    comment: None,
                })
            } else {
                Entry::Message(Message {
                    id,
                    value: Some(value),
                    attributes,
                    comment: None,
                })
            }
        })
}

/// Serialized braces come back as string literal placeables, so compare the
/// serialized form of the reparsed tree rather than the trees themselves.
fn stable(resource: &Resource) -> String {
    serialize(&parse(&serialize(resource)))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn serialized_resources_parse_without_junk(entries in prop::collection::vec(entry(word_text), 1..6)) {
        let resource = Resource::new(entries);
        let reparsed = parse(&serialize(&resource));
        prop_assert_eq!(reparsed.junk().count(), 0);
        prop_assert_eq!(reparsed.body.len(), resource.body.len());
    }

    #[test]
    fn serialization_is_a_fixed_point(entries in prop::collection::vec(entry(word_text), 1..6)) {
        let resource = Resource::new(entries);
        let once = serialize(&resource);
        prop_assert_eq!(stable(&resource), once);
    }

    #[test]
    fn brace_free_resources_roundtrip_exactly(entries in prop::collection::vec(entry(plain_text), 1..6)) {
        let resource = Resource::new(entries);
        prop_assert_eq!(parse(&serialize(&resource)), resource);
    }
}
