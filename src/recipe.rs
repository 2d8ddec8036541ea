//! Migration recipes: migrations written as TOML files.
//!
//! ```toml
//! description = "Bug 1234 - Migrate the downloads panel, part {index}"
//!
//! [[transforms]]
//! target = "browser/downloads.ftl"
//! ftl = """
//! downloads-title = { COPY(dtd, "downloads.title") }
//! """
//!
//! [transforms.substitutions]
//! dtd = "browser/downloads.dtd"
//!
//! [[transforms.replace]]
//! id = "downloads-welcome"
//! path = "browser/downloads.properties"
//! key = "welcome"
//! replacements = [{ placeholder = "%S", variable = "user" }]
//!
//! [[transforms.plurals]]
//! id = "downloads-count"
//! path = "browser/downloads.properties"
//! key = "count"
//! selector = "num"
//! foreach = [{ placeholder = "#1", variable = "num" }]
//! ```
//!
//! Fluent text covers copies; `replace`, `plurals` and `copy` tables cover
//! the primitives Fluent syntax cannot express. Entries with the same `id`
//! build one message; `attribute` puts an entry's result into an attribute.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use migrate_ftl::InlineExpression;
use serde::Deserialize;

use crate::config::describe_toml_error;
use crate::context::MigrationContext;
use crate::error::{MigrateError, Result};
use crate::helpers::{message_reference, term_reference, transforms_from, variable_reference};
use crate::tool::Migration;
use crate::transforms::{
    LegacySource, MessageTransform, Plurals, Replace, ReplaceBase, Transform, replace_in_text,
};

/// A migration loaded from a recipe file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    #[serde(skip)]
    name: String,
    /// Commit message template.
    pub description: String,
    #[serde(default)]
    pub transforms: Vec<TargetRecipe>,
}

/// The transforms for one target file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetRecipe {
    pub target: String,
    /// Reference file, relative to the reference directory. Defaults to
    /// `target`.
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub ftl: Option<String>,
    /// Values for message references used as `COPY` arguments in `ftl`.
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,
    #[serde(default)]
    pub copy: Vec<CopyEntry>,
    #[serde(default)]
    pub replace: Vec<ReplaceEntry>,
    #[serde(default)]
    pub plurals: Vec<PluralsEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyEntry {
    pub id: String,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub path: String,
    pub key: String,
    #[serde(default)]
    pub trim: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceEntry {
    pub id: String,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub path: String,
    pub key: String,
    /// Number printf specifiers before matching placeholders.
    #[serde(default)]
    pub printf: bool,
    pub replacements: Vec<Replacement>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluralsEntry {
    pub id: String,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub path: String,
    pub key: String,
    /// Variable the plural category is selected on.
    pub selector: String,
    /// Substitutions applied to every plural form.
    #[serde(default)]
    pub foreach: Vec<Replacement>,
}

/// A placeholder and what replaces it. Exactly one of `variable`,
/// `message`, `term` and `text` is set.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Replacement {
    pub placeholder: String,
    #[serde(default)]
    pub variable: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Replacement {
    fn to_transform(&self) -> Result<(String, Transform)> {
        let value = match (&self.variable, &self.message, &self.term, &self.text) {
            (Some(name), None, None, None) => variable_reference(name),
            (None, Some(name), None, None) => message_reference(name),
            (None, None, Some(name), None) => term_reference(name),
            (None, None, None, Some(text)) => Transform::Text(text.clone()),
            _ => {
                return Err(MigrateError::invalid_transform(format!(
                    "replacement for `{}` needs exactly one of variable, message, term or text",
                    self.placeholder
                )));
            }
        };
        Ok((self.placeholder.clone(), value))
    }
}

fn replacements(entries: &[Replacement]) -> Result<Vec<(String, Transform)>> {
    entries.iter().map(Replacement::to_transform).collect()
}

impl Recipe {
    /// Load a recipe; its name is the file stem.
    ///
    /// # Errors
    /// Returns [`MigrateError::Recipe`] when the file cannot be read or is
    /// not a valid recipe.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| MigrateError::Recipe {
            path: path.to_owned(),
            message: format!("could not read file: {e}"),
        })?;
        Self::parse(&text, path)
    }

    /// Parse recipe text; `path` names the recipe.
    ///
    /// # Errors
    /// Returns [`MigrateError::Recipe`] on invalid TOML or unknown fields.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut recipe: Self = toml::from_str(text).map_err(|e| MigrateError::Recipe {
            path: path.to_owned(),
            message: describe_toml_error(&e, text),
        })?;
        recipe.name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned());
        Ok(recipe)
    }
}

impl TargetRecipe {
    /// The message templates this table describes, in definition order:
    /// `ftl` messages first, then `copy`, `replace` and `plurals` entries.
    ///
    /// # Errors
    /// Propagates construction errors of the individual transforms.
    pub fn messages(&self) -> Result<Vec<MessageTransform>> {
        let mut messages = match &self.ftl {
            Some(ftl) => transforms_from(ftl, &self.substitutions)?,
            None => Vec::new(),
        };

        for entry in &self.copy {
            let mut source = LegacySource::new(&entry.path, &entry.key)?;
            if let Some(trim) = entry.trim {
                source = source.with_trim(trim);
            }
            let placed = Placement::new(&entry.id, entry.attribute.as_deref(), entry.comment.as_deref());
            placed.add(&mut messages, Transform::Copy(source))?;
        }

        for entry in &self.replace {
            let source = LegacySource::new(&entry.path, &entry.key)?;
            let mut replace = Replace::new(ReplaceBase::Source(source), replacements(&entry.replacements)?);
            if entry.printf {
                replace = replace.with_printf_normalization();
            }
            let placed = Placement::new(&entry.id, entry.attribute.as_deref(), entry.comment.as_deref());
            placed.add(&mut messages, Transform::Replace(replace))?;
        }

        for entry in &self.plurals {
            let source = LegacySource::new(&entry.path, &entry.key)?;
            let mut plurals = Plurals::new(source, InlineExpression::variable(&entry.selector));
            if !entry.foreach.is_empty() {
                let foreach = replacements(&entry.foreach)?;
                plurals = plurals.foreach(move |form| replace_in_text(form, foreach.clone()));
            }
            let placed = Placement::new(&entry.id, entry.attribute.as_deref(), entry.comment.as_deref());
            placed.add(&mut messages, Transform::Plurals(plurals))?;
        }

        Ok(messages)
    }
}

/// Where a structured entry's transform goes.
struct Placement<'a> {
    id: &'a str,
    attribute: Option<&'a str>,
    comment: Option<&'a str>,
}

impl<'a> Placement<'a> {
    const fn new(id: &'a str, attribute: Option<&'a str>, comment: Option<&'a str>) -> Self {
        Self {
            id,
            attribute,
            comment,
        }
    }

    fn add(&self, messages: &mut Vec<MessageTransform>, transform: Transform) -> Result<()> {
        let index = match messages.iter().position(|message| message.id == self.id) {
            Some(index) => index,
            None => {
                messages.push(MessageTransform::attributes_only(self.id));
                messages.len() - 1
            }
        };
        let message = &mut messages[index];
        match self.attribute {
            Some(attribute) => {
                if message.attributes.iter().any(|(id, _)| id == attribute) {
                    return Err(MigrateError::invalid_transform(format!(
                        "attribute `{}.{attribute}` is defined twice",
                        self.id
                    )));
                }
                message.attributes.push((attribute.to_owned(), transform));
            }
            None => {
                if message.value.is_some() {
                    return Err(MigrateError::invalid_transform(format!(
                        "value of `{}` is defined twice",
                        self.id
                    )));
                }
                message.value = Some(transform);
            }
        }
        if let Some(comment) = self.comment {
            message.comment = Some(comment.to_owned());
        }
        Ok(())
    }
}

impl Migration for Recipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn migrate(&self, ctx: &mut MigrationContext) -> Result<()> {
        for target in &self.transforms {
            let reference = target.reference.as_deref().unwrap_or(&target.target);
            ctx.add_transforms(&target.target, reference, target.messages()?)?;
        }
        Ok(())
    }
}

/// Expand recipe arguments: plain paths are kept, glob patterns are
/// expanded in sorted order.
///
/// # Errors
/// Returns [`MigrateError::Recipe`] for malformed patterns and patterns
/// that match nothing.
pub fn expand_recipe_paths<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }
        let matches = glob::glob(pattern).map_err(|e| MigrateError::Recipe {
            path: PathBuf::from(pattern),
            message: e.to_string(),
        })?;
        let mut found: Vec<PathBuf> = matches.filter_map(std::result::Result::ok).collect();
        if found.is_empty() {
            return Err(MigrateError::Recipe {
                path: PathBuf::from(pattern),
                message: "pattern matches no recipe files".to_owned(),
            });
        }
        found.sort();
        paths.extend(found);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::copy;

    const RECIPE: &str = r##"
description = "Bug 1 - Migrate downloads, part {index}"

[[transforms]]
target = "downloads.ftl"
ftl = """
title = { COPY(dtd, "title") }
"""

[transforms.substitutions]
dtd = "downloads.dtd"

[[transforms.copy]]
id = "title"
attribute = "tooltip"
path = "downloads.dtd"
key = "title.tooltip"

[[transforms.replace]]
id = "welcome"
comment = "%1$S is the user name"
path = "downloads.properties"
key = "welcome"
printf = true
replacements = [{ placeholder = "%1$S", variable = "user" }]

[[transforms.plurals]]
id = "count"
path = "downloads.properties"
key = "count"
selector = "num"
foreach = [{ placeholder = "#1", variable = "num" }]
"##;

    fn recipe() -> Recipe {
        Recipe::parse(RECIPE, Path::new("recipes/bug_1_downloads.toml")).unwrap()
    }

    #[test]
    fn name_is_the_file_stem() {
        let recipe = recipe();
        assert_eq!(recipe.name(), "bug_1_downloads");
        assert_eq!(recipe.description(), "Bug 1 - Migrate downloads, part {index}");
    }

    #[test]
    fn entries_merge_by_id() {
        let messages = recipe().transforms[0].messages().unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["title", "welcome", "count"]);

        assert_eq!(messages[0].value, Some(copy("downloads.dtd", "title").unwrap()));
        assert_eq!(
            messages[0].attributes,
            vec![(
                "tooltip".to_owned(),
                copy("downloads.dtd", "title.tooltip").unwrap()
            )]
        );
        assert_eq!(messages[1].comment.as_deref(), Some("%1$S is the user name"));
        let Some(Transform::Replace(replace)) = &messages[1].value else {
            panic!("expected a replace");
        };
        assert!(replace.normalize_printf);
        let Some(Transform::Plurals(plurals)) = &messages[2].value else {
            panic!("expected plurals");
        };
        assert!(plurals.foreach.is_some());
    }

    #[test]
    fn duplicate_values_are_rejected() {
        let text = r#"
description = "x"
[[transforms]]
target = "a.ftl"
ftl = "title = Title\n"
[[transforms.copy]]
id = "title"
path = "a.dtd"
key = "title"
"#;
        let recipe = Recipe::parse(text, Path::new("dup.toml")).unwrap();
        let err = recipe.transforms[0].messages().unwrap_err();
        assert!(err.to_string().contains("defined twice"), "{err}");
    }

    #[test]
    fn ambiguous_replacements_are_rejected() {
        let replacement = Replacement {
            placeholder: "#1".to_owned(),
            variable: Some("a".to_owned()),
            message: Some("b".to_owned()),
            term: None,
            text: None,
        };
        assert!(matches!(
            replacement.to_transform(),
            Err(MigrateError::InvalidTransform { .. })
        ));
    }

    #[test]
    fn unknown_fields_are_recipe_errors() {
        let err = Recipe::parse("description = \"x\"\nsteps = []\n", Path::new("bad.toml")).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("invalid recipe bad.toml: line 2"), "{message}");
    }

    #[test]
    fn plain_paths_pass_through_and_globs_expand() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.toml"), "").unwrap();
        std::fs::write(dir.path().join("a.toml"), "").unwrap();
        let pattern = format!("{}/*.toml", dir.path().display());
        let paths = expand_recipe_paths(&["plain.toml".to_owned(), pattern]).unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("plain.toml"),
                dir.path().join("a.toml"),
                dir.path().join("b.toml"),
            ]
        );

        let empty = format!("{}/*.nothing", dir.path().display());
        assert!(expand_recipe_paths(&[empty]).is_err());
    }
}
