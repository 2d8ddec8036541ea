use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{CommandFactory as _, Parser, Subcommand};
use clap_complete::Shell;

use migrate::config::{DEFAULT_CONFIG_FILE, ToolConfig};
use migrate::recipe::expand_recipe_paths;
use migrate::tool::MigrationSummary;
use migrate::{Migration, Migrator, MigratorSettings, Recipe, telemetry};

/// Migrate legacy localization files to Fluent
///
/// Each recipe describes Fluent messages in terms of strings from
/// .properties, .dtd and .po files. The migration is replayed once per
/// author of those strings, oldest first, and every step is committed
/// under its author, so `blame` on the new .ftl files still points at the
/// translators who wrote the strings.
///
/// EXAMPLES:
///
///   l10n-migrate --locale pl --reference-dir en-US --localization-dir l10n/pl recipes/*.toml
///
///   # See what would be committed without touching the repository
///   l10n-migrate --dry-run recipes/bug_1234_downloads.toml
#[derive(Parser)]
#[command(name = "l10n-migrate")]
#[command(version, about)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Recipe files or glob patterns, run in the order given
    #[arg(required = true, value_name = "RECIPE")]
    recipes: Vec<String>,

    /// Target locale code
    #[arg(long, visible_alias = "lang", env = "L10N_MIGRATE_LOCALE")]
    locale: Option<String>,

    /// Directory with the reference .ftl files
    #[arg(long)]
    reference_dir: Option<PathBuf>,

    /// Localization directory; must be the root of a git or hg repository
    #[arg(long)]
    localization_dir: Option<PathBuf>,

    /// Replay the migrations without writing files or committing
    #[arg(long)]
    dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Tool configuration file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "l10n-migrate", &mut std::io::stdout());
            Ok(())
        }
        None => run(cli),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = ToolConfig::load(&cli.config)?;
    let settings = settings(&cli, config)?;

    let paths = expand_recipe_paths(&cli.recipes)?;
    let mut recipes = Vec::with_capacity(paths.len());
    for path in &paths {
        match Recipe::load(path) {
            Ok(recipe) => recipes.push(recipe),
            Err(err) => tracing::error!(error = %err, "skipping recipe"),
        }
    }

    let mut migrator = Migrator::new(settings);
    let summaries = migrator.run_all(recipes.iter().map(|recipe| recipe as &dyn Migration));

    if cli.json {
        let json = serde_json::to_string_pretty(&summaries).context("serializing summary")?;
        println!("{json}");
    } else if cli.dry_run {
        print_summary(&summaries).context("printing summary")?;
    }

    let failed = paths.len() - summaries.len();
    if failed > 0 {
        bail!("{failed} of {} migrations failed", paths.len());
    }
    Ok(())
}

/// Flags win over the config file.
fn settings(cli: &Cli, config: ToolConfig) -> Result<MigratorSettings> {
    let context = config.migrate.context_options();
    let Some(locale) = cli.locale.clone().or(config.migrate.locale) else {
        bail!("no locale given; pass --locale or set `locale` in {}", cli.config.display());
    };
    let Some(localization_dir) = cli
        .localization_dir
        .clone()
        .or(config.migrate.localization_dir)
    else {
        bail!(
            "no localization directory given; pass --localization-dir or set `localization-dir` in {}",
            cli.config.display()
        );
    };
    let localization_dir = localization_dir
        .canonicalize()
        .with_context(|| format!("localization directory {}", localization_dir.display()))?;

    Ok(MigratorSettings {
        locale,
        reference_dir: cli.reference_dir.clone().or(config.migrate.reference_dir),
        localization_dir,
        dry_run: cli.dry_run,
        backend: config.vcs.backend,
        context,
    })
}

fn print_summary(summaries: &[MigrationSummary]) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    for summary in summaries {
        writeln!(out, "{}:", summary.migration)?;
        if summary.changesets.is_empty() {
            writeln!(out, "  nothing to migrate")?;
        }
        for changeset in &summary.changesets {
            writeln!(out, "  [{}] {}", changeset.index, changeset.message)?;
            writeln!(out, "      author: {}", changeset.author)?;
            for file in &changeset.files {
                writeln!(out, "      {file}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = Cli::parse_from([
            "l10n-migrate",
            "--lang",
            "de",
            "--localization-dir",
            dir.path().to_str().unwrap(),
            "recipe.toml",
        ]);
        let config = ToolConfig::parse(
            "[migrate]\nlocale = \"pl\"\nreference-dir = \"en-US\"\n",
            std::path::Path::new(DEFAULT_CONFIG_FILE),
        )
        .unwrap();
        let settings = settings(&cli, config).unwrap();
        assert_eq!(settings.locale, "de");
        assert_eq!(settings.reference_dir, Some(PathBuf::from("en-US")));
        assert!(!settings.dry_run);
    }

    #[test]
    fn locale_is_required() {
        let cli = Cli::parse_from(["l10n-migrate", "--localization-dir", ".", "recipe.toml"]);
        if std::env::var_os("L10N_MIGRATE_LOCALE").is_none() {
            assert!(settings(&cli, ToolConfig::default()).is_err());
        }
    }

    #[test]
    fn completions_need_no_recipes() {
        let cli = Cli::parse_from(["l10n-migrate", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Completions { shell: Shell::Bash })
        ));
    }
}
