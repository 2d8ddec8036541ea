//! The migration driver.
//!
//! For every migration, [`Migrator::run`]:
//!
//! 1. creates a fresh [`MigrationContext`] and lets the migration register
//!    its transforms;
//! 2. blames the source files the migration read and groups the keys into
//!    per-author changesets;
//! 3. replays the changesets oldest first. Each one that changes a target
//!    file is written and committed under its author, so the history of
//!    the new files keeps the attribution of the old ones.
//!
//! A migration that fails to set up is logged and skipped; a commit that
//! fails is logged and the replay continues.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use migrate_vcs::{Backend, Vcs};
use serde::Serialize;
use tracing::instrument;

use crate::blame::Blame;
use crate::changesets::{Changes, convert_blame_to_changesets};
use crate::context::{ContextOptions, MigrationContext};
use crate::error::{MigrateError, Result};

/// A migration definition.
pub trait Migration {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Commit message template; `{index}` and `{author}` are substituted.
    fn description(&self) -> &str;

    /// Register the migration's transforms.
    ///
    /// # Errors
    /// Any [`MigrateError`] aborts this migration only.
    fn migrate(&self, ctx: &mut MigrationContext) -> Result<()>;
}

/// Where and how to migrate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigratorSettings {
    pub locale: String,
    pub reference_dir: Option<PathBuf>,
    /// Localization files; also the repository root.
    pub localization_dir: PathBuf,
    /// Replay everything but write and commit nothing.
    pub dry_run: bool,
    pub backend: Backend,
    pub context: ContextOptions,
}

/// One replayed changeset that changed files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangesetSummary {
    pub index: usize,
    pub author: String,
    pub message: String,
    /// Target files written, relative to the localization directory.
    pub files: Vec<String>,
    /// `false` in dry runs and when the commit failed.
    pub committed: bool,
}

/// Outcome of one migration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub migration: String,
    pub changesets: Vec<ChangesetSummary>,
}

/// Runs migrations against one localization repository.
pub struct Migrator {
    settings: MigratorSettings,
    vcs: Option<Box<dyn Vcs>>,
}

impl Migrator {
    /// The repository is opened on first use.
    #[must_use]
    pub const fn new(settings: MigratorSettings) -> Self {
        Self {
            settings,
            vcs: None,
        }
    }

    /// Use an already opened repository.
    #[must_use]
    pub fn with_vcs(settings: MigratorSettings, vcs: Box<dyn Vcs>) -> Self {
        Self {
            settings,
            vcs: Some(vcs),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &MigratorSettings {
        &self.settings
    }

    fn vcs(&mut self) -> Result<&dyn Vcs> {
        let vcs = match self.vcs.take() {
            Some(vcs) => vcs,
            None => migrate_vcs::open(&self.settings.localization_dir, self.settings.backend)?,
        };
        Ok(&**self.vcs.insert(vcs))
    }

    /// Run every migration in order. Failed migrations are logged and
    /// skipped.
    pub fn run_all<'m>(
        &mut self,
        migrations: impl IntoIterator<Item = &'m dyn Migration>,
    ) -> Vec<MigrationSummary> {
        let mut summaries = Vec::new();
        for migration in migrations {
            match self.run(migration) {
                Ok(summary) => summaries.push(summary),
                Err(err) => tracing::error!(
                    migration = migration.name(),
                    locale = %self.settings.locale,
                    error = %err,
                    "skipping migration"
                ),
            }
        }
        summaries
    }

    /// Run one migration.
    ///
    /// # Errors
    /// Setup errors of the migration, repository errors when opening the
    /// localization repository, and I/O errors when writing target files.
    #[instrument(skip_all, fields(migration = migration.name(), locale = %self.settings.locale))]
    pub fn run(&mut self, migration: &dyn Migration) -> Result<MigrationSummary> {
        tracing::info!(dry_run = self.settings.dry_run, "running migration");
        let mut ctx = MigrationContext::with_options(
            &self.settings.locale,
            self.settings.reference_dir.as_deref(),
            &self.settings.localization_dir,
            self.settings.context.clone(),
        );
        migration.migrate(&mut ctx)?;

        let files: Vec<String> = ctx.localization_paths().map(str::to_owned).collect();
        let blame = Blame::new(self.vcs()?).attribution(files.iter().map(String::as_str));
        let changesets = convert_blame_to_changesets(&blame);
        tracing::info!(files = files.len(), changesets = changesets.len(), "blame converted");

        let mut known = Changes::new();
        let mut summary = MigrationSummary {
            migration: migration.name().to_owned(),
            changesets: Vec::new(),
        };
        for changeset in changesets {
            known.extend(changeset.changes.iter().cloned());
            let snapshot = ctx.serialize_changeset(&changeset.changes, &known);
            if snapshot.is_empty() {
                tracing::debug!(author = %changeset.author, "changeset changes nothing");
                continue;
            }
            let index = summary.changesets.len() + 1;
            self.write_snapshot(&snapshot)?;
            let message = commit_message(migration.description(), index, &changeset.author);
            let committed = self.commit(&message, &changeset.author)?;
            summary.changesets.push(ChangesetSummary {
                index,
                author: changeset.author,
                message,
                files: snapshot.into_keys().collect(),
                committed,
            });
        }
        tracing::info!(commits = summary.changesets.len(), "migration done");
        Ok(summary)
    }

    fn write_snapshot(&self, snapshot: &std::collections::BTreeMap<String, String>) -> Result<()> {
        for (path, content) in snapshot {
            let full = self.settings.localization_dir.join(path);
            tracing::info!(path = %full.display(), "writing");
            if !self.settings.dry_run {
                write_atomic(&full, content)?;
            }
        }
        Ok(())
    }

    /// `Ok(false)` for dry runs and failed commits.
    #[instrument(skip(self, message), fields(dry_run = self.settings.dry_run))]
    fn commit(&mut self, message: &str, author: &str) -> Result<bool> {
        tracing::info!(%message, "committing changeset");
        if self.settings.dry_run {
            return Ok(false);
        }
        match self.vcs()?.commit(message, author) {
            Ok(()) => Ok(true),
            Err(err) => {
                tracing::warn!(error = %err, "commit failed");
                Ok(false)
            }
        }
    }
}

/// Substitute `{index}` and `{author}` in a commit message template.
#[must_use]
pub fn commit_message(template: &str, index: usize, author: &str) -> String {
    template
        .replace("{index}", &index.to_string())
        .replace("{author}", author)
}

/// Write `content` to `path` through a temporary file in the same
/// directory, creating parent directories as needed.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| MigrateError::io(dir, e))?;

    let name = path
        .file_name()
        .map_or_else(|| "target".into(), |name| name.to_string_lossy());
    let tmp_path = dir.join(format!(".{name}.tmp"));
    let mut file = fs::File::create(&tmp_path).map_err(|e| MigrateError::io(&tmp_path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| MigrateError::io(&tmp_path, e))?;
    file.sync_all().map_err(|e| MigrateError::io(&tmp_path, e))?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|e| MigrateError::io(path, e))
}
