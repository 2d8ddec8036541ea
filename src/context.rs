//! Per-migration state: loaded sources, registered transforms, targets.
//!
//! A [`MigrationContext`] lives for one migration. [`add_transforms`]
//! registers the message templates for a target file, loads the reference
//! and every source file they read, and records each message's
//! dependencies. [`serialize_changeset`] then produces the target files as
//! they look once a set of source changes is known.
//!
//! [`add_transforms`]: MigrationContext::add_transforms
//! [`serialize_changeset`]: MigrationContext::serialize_changeset

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use migrate_ftl::{Entry, Pattern, Resource, parse, serialize};

use crate::changesets::Changes;
use crate::error::{MigrateError, Result};
use crate::evaluator::{Evaluator, SourceLookup};
use crate::legacy::{LegacyFormat, LegacyResource};
use crate::merge::{merge_resource, messages_equal};
use crate::plurals::{PluralCategory, categories_for_locale};
use crate::transforms::{MessageTransform, SourceRef};

/// A loaded source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalizationResource {
    Legacy(LegacyResource),
    Fluent(Resource),
}

/// Knobs that do not come from the directory layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextOptions {
    /// Overrides the plural categories derived from the locale.
    pub plural_categories: Option<Vec<PluralCategory>>,
    /// Use the source text of untranslated bilingual entries instead of
    /// treating them as missing.
    pub enforce_translated: bool,
}

/// Sources, references and transforms of one migration.
#[derive(Debug)]
pub struct MigrationContext {
    locale: String,
    reference_dir: Option<PathBuf>,
    localization_dir: PathBuf,
    plural_categories: Vec<PluralCategory>,
    enforce_translated: bool,

    localization_resources: BTreeMap<String, LocalizationResource>,
    reference_resources: BTreeMap<String, Resource>,
    target_resources: BTreeMap<String, Resource>,
    transforms: BTreeMap<String, Vec<MessageTransform>>,
    dependencies: BTreeMap<(String, String), BTreeSet<SourceRef>>,
}

impl MigrationContext {
    /// A context for `locale`. Without a reference directory the registered
    /// transforms themselves describe the shape of each target file.
    #[must_use]
    pub fn new(locale: &str, reference_dir: Option<&Path>, localization_dir: &Path) -> Self {
        Self::with_options(locale, reference_dir, localization_dir, ContextOptions::default())
    }

    #[must_use]
    pub fn with_options(
        locale: &str,
        reference_dir: Option<&Path>,
        localization_dir: &Path,
        options: ContextOptions,
    ) -> Self {
        let plural_categories = options
            .plural_categories
            .unwrap_or_else(|| categories_for_locale(locale));
        tracing::debug!(
            locale,
            categories = ?plural_categories,
            "creating migration context"
        );
        Self {
            locale: locale.to_owned(),
            reference_dir: reference_dir.map(Path::to_path_buf),
            localization_dir: localization_dir.to_path_buf(),
            plural_categories,
            enforce_translated: options.enforce_translated,
            localization_resources: BTreeMap::new(),
            reference_resources: BTreeMap::new(),
            target_resources: BTreeMap::new(),
            transforms: BTreeMap::new(),
            dependencies: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    #[must_use]
    pub fn localization_dir(&self) -> &Path {
        &self.localization_dir
    }

    /// Paths of the source files that were found, relative to the
    /// localization directory.
    pub fn localization_paths(&self) -> impl Iterator<Item = &str> {
        self.localization_resources.keys().map(String::as_str)
    }

    #[must_use]
    pub fn localization_resource(&self, path: &str) -> Option<&LocalizationResource> {
        self.localization_resources.get(path)
    }

    #[must_use]
    pub fn reference(&self, target: &str) -> Option<&Resource> {
        self.reference_resources.get(target)
    }

    /// The sources `key` in `target` reads, or `None` if no transform
    /// produces it.
    #[must_use]
    pub fn dependencies(&self, target: &str, key: &str) -> Option<&BTreeSet<SourceRef>> {
        self.dependencies.get(&(target.to_owned(), key.to_owned()))
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Load the source file at `path` unless it is already loaded. A file
    /// that is missing or unreadable is logged and skipped.
    pub fn maybe_add_localization(&mut self, path: &str) {
        if self.localization_resources.contains_key(path) {
            return;
        }
        let full = self.localization_dir.join(path);
        let text = match std::fs::read_to_string(&full) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(path, error = %err, "missing localization file");
                return;
            }
        };
        let resource = if is_fluent(path) {
            LocalizationResource::Fluent(parse_logged(path, &text))
        } else if let Some(format) = LegacyFormat::from_path(path) {
            LocalizationResource::Legacy(LegacyResource::parse(format, &text))
        } else {
            tracing::warn!(path, "unsupported localization file format");
            return;
        };
        tracing::debug!(path, "loaded localization file");
        self.localization_resources.insert(path.to_owned(), resource);
    }

    /// Register a literal source file; used by tests and by callers that
    /// already hold the content.
    pub fn insert_localization(&mut self, path: impl Into<String>, resource: LocalizationResource) {
        self.localization_resources.insert(path.into(), resource);
    }

    fn read_target(&self, target: &str) -> Result<Resource> {
        let full = self.localization_dir.join(target);
        match std::fs::read_to_string(&full) {
            Ok(text) => Ok(parse_logged(target, &text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = target, "target file does not exist yet");
                Ok(Resource::default())
            }
            Err(err) => Err(MigrateError::io(full, err)),
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register `transforms` for the `target` file, shaped by `reference`.
    ///
    /// Loads the reference, the existing target and every source file the
    /// transforms depend on. May be called several times for one target;
    /// the transforms accumulate.
    ///
    /// # Errors
    /// - [`MigrateError::UnreadableReference`] when the reference file cannot
    ///   be read.
    /// - [`MigrateError::EmptyLocalization`] when no source file of the
    ///   migration exists so far.
    /// - [`MigrateError::MissingPattern`] when a structured copy names a key
    ///   its loaded `.ftl` source does not have.
    pub fn add_transforms(
        &mut self,
        target: &str,
        reference: &str,
        transforms: Vec<MessageTransform>,
    ) -> Result<()> {
        match &self.reference_dir {
            Some(dir) => {
                if !self.reference_resources.contains_key(target) {
                    let resource = read_reference(dir, reference)?;
                    self.reference_resources.insert(target.to_owned(), resource);
                }
            }
            None => {
                let skeletons = transforms.iter().map(MessageTransform::skeleton);
                self.reference_resources
                    .entry(target.to_owned())
                    .or_default()
                    .body
                    .extend(skeletons);
            }
        }

        for transform in &transforms {
            let dependencies: BTreeSet<SourceRef> = transform.dependencies().into_iter().collect();
            tracing::debug!(
                target,
                message = %transform.id,
                dependencies = dependencies.len(),
                "registering transform"
            );
            self.dependencies
                .insert((target.to_owned(), transform.id.clone()), dependencies);
            if self.reference_dir.is_some()
                && self
                    .reference_resources
                    .get(target)
                    .is_some_and(|resource| resource.get(&transform.id).is_none())
            {
                tracing::warn!(
                    target,
                    message = %transform.id,
                    "message is not in the reference file"
                );
            }
        }

        let needed: BTreeSet<String> = self
            .dependencies
            .values()
            .flatten()
            .map(|source| source.path.clone())
            .collect();
        let mut expected = Vec::new();
        for path in needed {
            if !self.localization_resources.contains_key(&path) {
                self.maybe_add_localization(&path);
                expected.push(path);
            }
        }
        if !expected.is_empty() && self.localization_resources.is_empty() {
            return Err(MigrateError::EmptyLocalization {
                message: "No localization files were found".to_owned(),
            });
        }

        for transform in &transforms {
            for source in transform.fluent_sources() {
                let loaded = matches!(
                    self.localization_resources.get(&source.path),
                    Some(LocalizationResource::Fluent(_))
                );
                if loaded && self.fluent_pattern(&source.path, &source.key).is_none() {
                    return Err(MigrateError::MissingPattern {
                        path: source.path.clone(),
                        key: source.key.clone(),
                    });
                }
            }
        }

        self.transforms
            .entry(target.to_owned())
            .or_default()
            .extend(transforms);
        if !self.target_resources.contains_key(target) {
            let current = self.read_target(target)?;
            self.target_resources.insert(target.to_owned(), current);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Changesets
    // -----------------------------------------------------------------------

    /// Whether `key` in `target` is migrated by `changeset` given everything
    /// `known` so far.
    ///
    /// Messages without dependencies are always in. Otherwise every
    /// dependency must be known and at least one must be in `changeset`.
    #[must_use]
    pub fn in_changeset(&self, target: &str, key: &str, changeset: &Changes, known: &Changes) -> bool {
        let Some(dependencies) = self.dependencies(target, key) else {
            return true;
        };
        dependencies.is_empty()
            || (dependencies.is_subset(known)
                && dependencies.iter().any(|source| changeset.contains(source)))
    }

    /// Every source string that is visible to the evaluator: the changeset
    /// that migrates everything at once.
    #[must_use]
    pub fn default_changeset(&self) -> Changes {
        let mut changes = Changes::new();
        for (path, resource) in &self.localization_resources {
            match resource {
                LocalizationResource::Legacy(resource) => {
                    for entry in resource.entries() {
                        if entry.translated || self.enforce_translated {
                            changes.insert(SourceRef::new(path, &entry.key));
                        }
                    }
                }
                LocalizationResource::Fluent(resource) => {
                    for entry in resource.entries() {
                        let Some(key) = entry.key() else { continue };
                        if let Entry::Message(message) = entry {
                            for attribute in &message.attributes {
                                changes.insert(SourceRef::new(
                                    path,
                                    format!("{key}.{}", attribute.id),
                                ));
                            }
                        }
                        changes.insert(SourceRef::new(path, key));
                    }
                }
            }
        }
        changes
    }

    /// The merged target resources that differ from their current content.
    #[must_use]
    pub fn merge_changeset(&self, changeset: &Changes, known: &Changes) -> BTreeMap<String, Resource> {
        let evaluator = Evaluator::new(self);
        let mut merged = BTreeMap::new();
        for (target, reference) in &self.reference_resources {
            let empty = Resource::default();
            let current = self.target_resources.get(target).unwrap_or(&empty);
            let transforms = self.transforms.get(target).map_or(&[][..], Vec::as_slice);
            let snapshot = merge_resource(&evaluator, reference, current, transforms, |key| {
                self.in_changeset(target, key, changeset, known)
            });
            if messages_equal(current, &snapshot) {
                tracing::debug!(target, "no changes");
                continue;
            }
            merged.insert(target.clone(), snapshot);
        }
        merged
    }

    /// Serialize the targets changed by `changeset` and remember them as the
    /// new current content, so later changesets build on this one.
    pub fn serialize_changeset(&mut self, changeset: &Changes, known: &Changes) -> BTreeMap<String, String> {
        let merged = self.merge_changeset(changeset, known);
        let mut serialized = BTreeMap::new();
        for (target, snapshot) in merged {
            serialized.insert(target.clone(), serialize(&snapshot));
            self.target_resources.insert(target, snapshot);
        }
        serialized
    }
}

impl SourceLookup for MigrationContext {
    fn legacy_value(&self, path: &str, key: &str) -> Option<&str> {
        match self.localization_resources.get(path)? {
            LocalizationResource::Legacy(resource) => resource
                .get(key)
                .filter(|entry| entry.translated || self.enforce_translated)
                .map(|entry| entry.value.as_str()),
            LocalizationResource::Fluent(_) => None,
        }
    }

    fn fluent_pattern(&self, path: &str, key: &str) -> Option<&Pattern> {
        let LocalizationResource::Fluent(resource) = self.localization_resources.get(path)? else {
            return None;
        };
        if key.starts_with('-') {
            return match resource.get(key)? {
                Entry::Term(term) => Some(&term.value),
                _ => None,
            };
        }
        let (id, attribute) = match key.split_once('.') {
            Some((id, attribute)) => (id, Some(attribute)),
            None => (key, None),
        };
        let Entry::Message(message) = resource.get(id)? else {
            return None;
        };
        match attribute {
            Some(name) => message
                .attributes
                .iter()
                .find(|attribute| attribute.id == name)
                .map(|attribute| &attribute.value),
            None => message.value.as_ref(),
        }
    }

    fn plural_categories(&self) -> &[PluralCategory] {
        &self.plural_categories
    }
}

fn is_fluent(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|extension| extension == "ftl")
}

fn read_reference(dir: &Path, reference: &str) -> Result<Resource> {
    let text = std::fs::read_to_string(dir.join(reference)).map_err(|err| {
        MigrateError::UnreadableReference {
            path: reference.to_owned(),
            detail: err.to_string(),
        }
    })?;
    Ok(parse_logged(reference, &text))
}

fn parse_logged(path: &str, text: &str) -> Resource {
    let resource = parse(text);
    for junk in resource.junk() {
        for annotation in &junk.annotations {
            tracing::warn!(
                path,
                offset = annotation.offset,
                reason = %annotation.message,
                "skipping unparseable Fluent"
            );
        }
    }
    resource
}
