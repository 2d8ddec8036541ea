//! Tool configuration (`l10n-migrate.toml`).
//!
//! Every setting can also be given on the command line; flags win. A missing
//! file means all defaults.
//!
//! ```toml
//! [migrate]
//! locale = "pl"
//! reference-dir = "en-US"
//! localization-dir = "l10n/pl"
//! enforce-translated = false
//! plural-categories = ["one", "few", "many"]
//!
//! [vcs]
//! backend = "auto"
//! ```

use std::path::{Path, PathBuf};

use migrate_vcs::Backend;
use serde::Deserialize;

use crate::context::ContextOptions;
use crate::error::{MigrateError, Result};
use crate::plurals::PluralCategory;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "l10n-migrate.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    #[serde(default)]
    pub migrate: MigrateConfig,

    #[serde(default)]
    pub vcs: VcsConfig,
}

/// Where the files are and how to read them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct MigrateConfig {
    /// Target locale code.
    #[serde(default)]
    pub locale: Option<String>,

    /// Directory with the reference `.ftl` files. Without one, each
    /// migration's own messages define the target file shape.
    #[serde(default)]
    pub reference_dir: Option<PathBuf>,

    /// Directory (and repository root) of the localization.
    #[serde(default)]
    pub localization_dir: Option<PathBuf>,

    /// Migrate untranslated bilingual entries with their source text.
    #[serde(default)]
    pub enforce_translated: bool,

    /// Plural categories in legacy form order, overriding the locale's.
    #[serde(default)]
    pub plural_categories: Option<Vec<PluralCategory>>,
}

impl MigrateConfig {
    #[must_use]
    pub fn context_options(&self) -> ContextOptions {
        ContextOptions {
            plural_categories: self.plural_categories.clone(),
            enforce_translated: self.enforce_translated,
        }
    }
}

/// Version-control settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VcsConfig {
    #[serde(default)]
    pub backend: Backend,
}

impl ToolConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML or unknown fields,
    ///   the error carries the offending line.
    ///
    /// # Errors
    /// Returns [`MigrateError::Config`] on I/O errors (other than not-found)
    /// or parse errors.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(MigrateError::Config {
                    path: path.to_owned(),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents, path)
    }

    /// Parse configuration text; `path` is only used in errors.
    ///
    /// # Errors
    /// Returns [`MigrateError::Config`] on invalid TOML, unknown fields or
    /// an empty `plural-categories` list.
    pub fn parse(toml_str: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| MigrateError::Config {
            path: path.to_owned(),
            message: describe_toml_error(&e, toml_str),
        })?;
        if config
            .migrate
            .plural_categories
            .as_ref()
            .is_some_and(Vec::is_empty)
        {
            return Err(MigrateError::Config {
                path: path.to_owned(),
                message: "plural-categories must not be empty".to_owned(),
            });
        }
        Ok(config)
    }
}

/// The parser message, prefixed with the line it points at.
pub(crate) fn describe_toml_error(error: &toml::de::Error, source: &str) -> String {
    let message = error.message().to_owned();
    match error.span() {
        Some(span) => {
            let line = source[..span.start].chars().filter(|&c| c == '\n').count() + 1;
            format!("line {line}: {message}")
        }
        None => message,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ToolConfig> {
        ToolConfig::parse(text, Path::new(DEFAULT_CONFIG_FILE))
    }

    #[test]
    fn parse_empty_string() {
        assert_eq!(parse("").unwrap(), ToolConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let cfg = parse(
            r#"
[migrate]
locale = "pl"
reference-dir = "en-US"
localization-dir = "l10n/pl"
enforce-translated = true
plural-categories = ["one", "few", "many"]

[vcs]
backend = "hg"
"#,
        )
        .unwrap();
        assert_eq!(cfg.migrate.locale.as_deref(), Some("pl"));
        assert_eq!(cfg.migrate.reference_dir, Some(PathBuf::from("en-US")));
        assert_eq!(cfg.migrate.localization_dir, Some(PathBuf::from("l10n/pl")));
        assert_eq!(cfg.vcs.backend, Backend::Hg);

        let options = cfg.migrate.context_options();
        assert!(options.enforce_translated);
        assert_eq!(
            options.plural_categories,
            Some(vec![
                PluralCategory::One,
                PluralCategory::Few,
                PluralCategory::Many
            ])
        );
    }

    #[test]
    fn unknown_fields_name_the_line() {
        let err = parse("[migrate]\nlocale = \"pl\"\nlocal-dir = \"x\"\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains(DEFAULT_CONFIG_FILE), "{message}");
        assert!(message.contains("line 3"), "{message}");
    }

    #[test]
    fn empty_plural_categories_are_rejected() {
        let err = parse("[migrate]\nplural-categories = []\n").unwrap_err();
        assert!(err.to_string().contains("plural-categories"), "{err}");
        assert!(parse("[migrate]\nplural-categories = [\"other\"]\n").is_ok());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg = ToolConfig::load(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(cfg, ToolConfig::default());
    }
}
