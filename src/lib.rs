//! Migrate legacy localization files to Fluent.
//!
//! A migration describes target Fluent messages in terms of legacy strings
//! ([`transforms`]). The [`context::MigrationContext`] loads the files a
//! migration needs, the [`evaluator`] turns transforms into Fluent AST,
//! [`merge`] folds the results into the existing target files, and the
//! [`tool::Migrator`] replays the migration once per author so every
//! changeset lands in its own commit.
//!
//! The primary interface is the `l10n-migrate` binary; this crate exposes
//! the engine for migrations written in Rust and for integration tests.

pub mod blame;
pub mod changesets;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod helpers;
pub mod legacy;
pub mod merge;
pub mod pattern;
pub mod plurals;
pub mod recipe;
pub mod replace;
pub mod telemetry;
pub mod tool;
pub mod transforms;
pub mod visitor;

pub use context::{ContextOptions, MigrationContext};
pub use error::{MigrateError, Result};
pub use recipe::Recipe;
pub use tool::{Migration, Migrator, MigratorSettings};
pub use transforms::{MessageTransform, SourceRef, Transform};
