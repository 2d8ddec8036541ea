use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use migrate_vcs::{Backend, BlameLine, GitVcs, Vcs, VcsError, open};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn git(dir: &Path, args: &[&str], env: &[(&str, &str)]) {
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
}

fn setup_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init"], &[]);
    git(dir.path(), &["config", "user.email", "test@test.com"], &[]);
    git(dir.path(), &["config", "user.name", "Test User"], &[]);
    git(dir.path(), &["config", "commit.gpgsign", "false"], &[]);
    dir
}

fn commit_as(dir: &Path, author: &str, date: &str, message: &str) {
    git(dir, &["add", "."], &[]);
    git(
        dir,
        &["commit", "--author", author, "--message", message],
        &[("GIT_AUTHOR_DATE", date), ("GIT_COMMITTER_DATE", date)],
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn blame_attributes_lines_to_authors() {
    let dir = setup_repo();
    std::fs::write(dir.path().join("f1.ftl"), "one = first line\n").unwrap();
    commit_as(dir.path(), "Jane <jane@example.com>", "@10000 +0000", "first");
    std::fs::write(
        dir.path().join("f1.ftl"),
        "one = first line\n    .with = attribute\n",
    )
    .unwrap();
    commit_as(dir.path(), "Joe <joe@example.com>", "@11000 +0000", "second");

    let vcs = GitVcs::open(dir.path()).unwrap();
    let lines = vcs.blame("f1.ftl").unwrap();
    assert_eq!(
        lines,
        vec![
            BlameLine::new("Jane <jane@example.com>", 10000),
            BlameLine::new("Joe <joe@example.com>", 11000),
        ]
    );
}

#[test]
fn blame_of_untracked_file_fails() {
    let dir = setup_repo();
    std::fs::write(dir.path().join("seed.txt"), "x\n").unwrap();
    commit_as(dir.path(), "Jane <jane@example.com>", "@10000 +0000", "seed");
    std::fs::write(dir.path().join("new.ftl"), "x = y\n").unwrap();

    let vcs = GitVcs::open(dir.path()).unwrap();
    assert!(matches!(
        vcs.blame("new.ftl"),
        Err(VcsError::CommandFailed { .. })
    ));
}

#[test]
fn commit_records_author_and_new_files() {
    let dir = setup_repo();
    std::fs::create_dir_all(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub/new.ftl"), "x = y\n").unwrap();

    let vcs = open(dir.path(), Backend::Auto).unwrap();
    assert_eq!(vcs.backend(), Backend::Git);
    vcs.commit("Migrate part 1", "😂 <smile@example.com>").unwrap();

    let log = Command::new("git")
        .args(["log", "--format=%an|%s", "--name-only"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    let log = String::from_utf8_lossy(&log.stdout);
    assert!(log.contains("😂|Migrate part 1"), "{log}");
    assert!(log.contains("sub/new.ftl"), "{log}");
}

#[test]
fn auto_detection_rejects_plain_directories() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        open(dir.path(), Backend::Auto),
        Err(VcsError::UnsupportedRepository { .. })
    ));
}
