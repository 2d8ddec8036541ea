//! Fluent syntax support for l10n-migrate.
//!
//! This crate owns everything that touches `.ftl` text: the syntax tree the
//! migration engine builds, the parser used to read reference and target
//! files, and the serializer that writes merged resources back out. Nothing
//! else in the workspace formats Fluent by hand.
//!
//! # Crate layout
//!
//! - [`ast`]: the syntax tree ([`Resource`], [`Entry`], [`Pattern`], ...).
//! - [`parser`]: [`parse`] (error-recovering) and [`parse_strict`].
//! - [`serializer`]: [`serialize`], the inverse of [`parse`] for every tree
//!   the parser can produce.
//! - [`error`]: [`ParseError`].

pub mod ast;
pub mod error;
pub mod parser;
pub mod serializer;

pub use ast::{
    Annotation, Attribute, CallArguments, Comment, Entry, Expression, InlineExpression, Junk,
    Message, NamedArgument, Pattern, PatternElement, Resource, SelectExpression, Term, Variant,
    VariantKey,
};
pub use error::ParseError;
pub use parser::{parse, parse_strict};
pub use serializer::{serialize, serialize_entry};
