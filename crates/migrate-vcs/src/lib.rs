//! Version-control layer for l10n-migrate.
//!
//! The migration driver needs exactly two things from the repository that
//! holds the localization files: who last touched each line of a file, and a
//! way to record a commit under a given author. This crate defines the
//! [`Vcs`] trait for that and provides git and Mercurial backends.
//!
//! # Crate layout
//!
//! - [`repo`]: the [`Vcs`] trait and [`open`], which detects the backend.
//! - [`types`]: [`BlameLine`] and [`Backend`].
//! - [`error`]: the [`VcsError`] enum returned by all trait methods.

pub mod error;
pub mod repo;
pub mod types;

mod cli;
mod git;
mod hg;

pub use error::VcsError;
pub use git::GitVcs;
pub use hg::HgVcs;
pub use repo::{Vcs, open};
pub use types::{Backend, BlameLine};
