//! End-to-end migrations against real git repositories.
//!
//! Each test builds a localization repository whose history has known
//! authors, runs a recipe through the [`Migrator`], and inspects the
//! commits it produced.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use migrate::context::ContextOptions;
use migrate::{Migrator, MigratorSettings, Recipe};
use migrate_vcs::Backend;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn git(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> String {
    let mut command = Command::new("git");
    command.args(args).current_dir(dir);
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command.output().unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn setup_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init"], &[]);
    git(dir.path(), &["config", "user.email", "migrator@example.com"], &[]);
    git(dir.path(), &["config", "user.name", "Migrator"], &[]);
    git(dir.path(), &["config", "commit.gpgsign", "false"], &[]);
    dir
}

fn write(dir: &Path, path: &str, content: &str) {
    let full = dir.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

fn commit_as(dir: &Path, author: &str, timestamp: i64, message: &str) {
    let date = format!("@{timestamp} +0000");
    git(dir, &["add", "."], &[]);
    git(
        dir,
        &["commit", "--author", author, "--message", message],
        &[("GIT_AUTHOR_DATE", &date), ("GIT_COMMITTER_DATE", &date)],
    );
}

/// `author name|subject` of every commit, newest first.
fn log(dir: &Path) -> Vec<String> {
    git(dir, &["log", "--format=%an|%s"], &[])
        .lines()
        .map(str::to_owned)
        .collect()
}

fn settings(localization: &Path, reference: &Path, dry_run: bool) -> MigratorSettings {
    MigratorSettings {
        locale: "pl".to_owned(),
        reference_dir: Some(reference.to_path_buf()),
        localization_dir: localization.to_path_buf(),
        dry_run,
        backend: Backend::Git,
        context: ContextOptions::default(),
    }
}

fn recipe(text: &str) -> Recipe {
    Recipe::parse(text, Path::new("test_recipe.toml")).unwrap()
}

const HUSKER: &str = "Hüsker Dü <husker@example.com>";
const LAUGH: &str = "😂 <laugh@example.com>";

// ---------------------------------------------------------------------------
// Fluent sources
// ---------------------------------------------------------------------------

fn fluent_fixture() -> (TempDir, TempDir) {
    let repo = setup_repo();
    write(repo.path(), "d1/f1.ftl", "one = first line\n");
    commit_as(repo.path(), HUSKER, 1_272_837_600, "initial");
    write(repo.path(), "d1/f1.ftl", "one = first line\n    .with = attribute\n");
    commit_as(repo.path(), LAUGH, 1_335_996_000, "add attribute");

    let reference = TempDir::new().unwrap();
    write(
        reference.path(),
        "d1/f1.ftl",
        "one = first line\n    .with = attribute\ntarget = attribute\n",
    );
    (repo, reference)
}

#[test]
fn copied_attribute_is_committed_by_its_author() {
    let (repo, reference) = fluent_fixture();
    let recipe = recipe(
        r#"
description = "Migrate d1, part {index}"

[[transforms]]
target = "d1/f1.ftl"
ftl = """
target = { COPY_PATTERN("d1/f1.ftl", "one.with") }
"""
"#,
    );

    let mut migrator = Migrator::new(settings(repo.path(), reference.path(), false));
    let summary = migrator.run(&recipe).unwrap();

    assert_eq!(summary.changesets.len(), 1);
    assert_eq!(summary.changesets[0].author, "😂 <laugh@example.com>");
    assert!(summary.changesets[0].committed);
    assert_eq!(
        log(repo.path()),
        [
            "😂|Migrate d1, part 1",
            "😂|add attribute",
            "Hüsker Dü|initial",
        ]
    );
    assert_eq!(
        fs::read_to_string(repo.path().join("d1/f1.ftl")).unwrap(),
        "one = first line\n    .with = attribute\ntarget = attribute\n"
    );
}

#[test]
fn structured_copy_of_a_whole_message() {
    let (repo, reference) = fluent_fixture();
    write(
        reference.path(),
        "d1/f1.ftl",
        "one = first line\n    .with = attribute\ncopy = first line\n",
    );
    let recipe = recipe(
        r#"
description = "Copy one"

[[transforms]]
target = "d1/f1.ftl"
ftl = """
copy = { COPY_PATTERN("d1/f1.ftl", "one") }
"""
"#,
    );

    let mut migrator = Migrator::new(settings(repo.path(), reference.path(), false));
    let summary = migrator.run(&recipe).unwrap();

    assert_eq!(summary.changesets.len(), 1);
    assert_eq!(summary.changesets[0].author, HUSKER);
    assert_eq!(log(repo.path())[0], "Hüsker Dü|Copy one");
    assert_eq!(
        fs::read_to_string(repo.path().join("d1/f1.ftl")).unwrap(),
        "one = first line\n    .with = attribute\ncopy = first line\n"
    );
}

// ---------------------------------------------------------------------------
// Legacy sources
// ---------------------------------------------------------------------------

const APP_REFERENCE: &str = "\
app-title = Downloads
app-welcome = Hello, { $user }!
app-both = { app-title }: { $user }
";

const APP_RECIPE: &str = r##"
description = "Migrate app, part {index}"

[[transforms]]
target = "app.ftl"
ftl = """
app-title = { COPY(props, "title") }
app-both = { COPY(props, "title") }{ COPY(props, "missing") }
"""

[transforms.substitutions]
props = "app.properties"

[[transforms.replace]]
id = "app-welcome"
path = "app.properties"
key = "welcome"
replacements = [{ placeholder = "#1", variable = "user" }]
"##;

fn legacy_fixture() -> (TempDir, TempDir) {
    let repo = setup_repo();
    write(repo.path(), "app.properties", "title = Pobrane\n");
    commit_as(repo.path(), "Jane <jane@example.com>", 1_000_000, "title");
    write(repo.path(), "app.properties", "title = Pobrane\nwelcome = Witaj, #1!\n");
    commit_as(repo.path(), "Joe <joe@example.com>", 2_000_000, "welcome");

    let reference = TempDir::new().unwrap();
    write(reference.path(), "app.ftl", APP_REFERENCE);
    (repo, reference)
}

#[test]
fn each_author_gets_one_commit() {
    let (repo, reference) = legacy_fixture();
    let mut migrator = Migrator::new(settings(repo.path(), reference.path(), false));
    let summary = migrator.run(&recipe(APP_RECIPE)).unwrap();

    let authors: Vec<&str> = summary
        .changesets
        .iter()
        .map(|changeset| changeset.author.as_str())
        .collect();
    assert_eq!(authors, ["Jane <jane@example.com>", "Joe <joe@example.com>"]);
    assert_eq!(
        log(repo.path())[..2],
        ["Joe|Migrate app, part 2", "Jane|Migrate app, part 1"]
    );

    assert_eq!(
        git(repo.path(), &["show", "HEAD~1:app.ftl"], &[]),
        "app-title = Pobrane\n"
    );
    // `app-both` needs a string nobody translated, so it never appears.
    assert_eq!(
        fs::read_to_string(repo.path().join("app.ftl")).unwrap(),
        "app-title = Pobrane\napp-welcome = Witaj, { $user }!\n"
    );
}

#[test]
fn rerunning_a_migration_commits_nothing() {
    let (repo, reference) = legacy_fixture();
    let mut migrator = Migrator::new(settings(repo.path(), reference.path(), false));
    migrator.run(&recipe(APP_RECIPE)).unwrap();
    let before = log(repo.path());

    let summary = migrator.run(&recipe(APP_RECIPE)).unwrap();
    assert!(summary.changesets.is_empty());
    assert_eq!(log(repo.path()), before);
}

#[test]
fn dry_run_leaves_the_repository_alone() {
    let (repo, reference) = legacy_fixture();
    let mut migrator = Migrator::new(settings(repo.path(), reference.path(), true));
    let summary = migrator.run(&recipe(APP_RECIPE)).unwrap();

    assert_eq!(summary.changesets.len(), 2);
    assert!(summary.changesets.iter().all(|changeset| !changeset.committed));
    assert_eq!(summary.changesets[1].files, ["app.ftl"]);
    assert!(!repo.path().join("app.ftl").exists());
    assert_eq!(log(repo.path()).len(), 2);
}

#[test]
fn failing_migrations_do_not_stop_the_batch() {
    let (repo, reference) = legacy_fixture();
    let broken = recipe(
        r#"
description = "Broken"

[[transforms]]
target = "nowhere.ftl"
ftl = "x = { COPY(\"gone.properties\", \"x\") }\n"
"#,
    );
    let working = recipe(APP_RECIPE);

    let mut migrator = Migrator::new(settings(repo.path(), reference.path(), false));
    let summaries = migrator.run_all([&broken as &dyn migrate::Migration, &working]);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].changesets.len(), 2);
}
