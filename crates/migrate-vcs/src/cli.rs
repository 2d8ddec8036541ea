//! Running backend command-line tools.

use std::path::Path;
use std::process::Command;

use crate::error::VcsError;

/// Run `program args...` in `cwd` and return its standard output.
pub(crate) fn run(program: &str, args: &[&str], cwd: &Path) -> Result<String, VcsError> {
    run_with_env(program, args, cwd, &[])
}

pub(crate) fn run_with_env(
    program: &str,
    args: &[&str],
    cwd: &Path,
    env: &[(&str, &str)],
) -> Result<String, VcsError> {
    let mut command = Command::new(program);
    command.args(args).current_dir(cwd);
    for (key, value) in env {
        command.env(key, value);
    }
    tracing::debug!(program, ?args, cwd = %cwd.display(), "running");
    let output = command.output()?;
    if !output.status.success() {
        return Err(VcsError::CommandFailed {
            command: format!("{program} {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
