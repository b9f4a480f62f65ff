use std::{
    ffi::OsStr,
    io,
    path::Path,
    process::{Command, Output, Stdio},
};
use thiserror::Error;

const GIT: &str = "git";

#[derive(Error, Debug)]
pub enum GitCmdError {
    #[error("`{0}` was not found on PATH")]
    NotFound(String),

    #[error("failed to run git: {0}")]
    Io(#[source] io::Error),

    #[error("git {action} exited with {}: {stderr}", exit_code_text(.code))]
    Failed {
        action: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl GitCmdError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitCmdError::NotFound(_))
    }

    fn from_spawn(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            GitCmdError::NotFound(GIT.to_string())
        } else {
            GitCmdError::Io(err)
        }
    }
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub struct Git;
impl Git {
    /// Runs `git --version`, the cheapest way to find out if the client is installed.
    pub fn version() -> Result<String, GitCmdError> {
        let output = wrap_cmd(&mut git_cmd(["--version"])).map_err(GitCmdError::from_spawn)?;
        let output = check_status("--version", output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Clones `uri` into `to_path`, checking out `reference` instead of the
    /// remote's default branch when one is given.
    pub fn clone<P>(uri: &str, to_path: P, reference: Option<&str>) -> Result<Output, GitCmdError>
    where
        P: AsRef<Path>,
    {
        let output = wrap_cmd(&mut git_cmd(clone_args(uri, to_path.as_ref(), reference)))
            .map_err(GitCmdError::from_spawn)?;
        check_status("clone", output)
    }
}

fn clone_args(uri: &str, to_path: &Path, reference: Option<&str>) -> Vec<String> {
    let mut args = vec!["clone".to_string()];
    if let Some(reference) = reference {
        args.push("--branch".to_string());
        args.push(reference.to_string());
    }
    args.push("--".to_string());
    args.push(uri.to_string());
    args.push(to_path.to_string_lossy().to_string());
    args
}

fn check_status(action: &str, output: Output) -> Result<Output, GitCmdError> {
    if output.status.success() {
        return Ok(output);
    }
    Err(GitCmdError::Failed {
        action: action.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Non-interactive `git`: a missing or private repository fails instead of
/// asking for credentials on the terminal.
fn git_cmd<I, S>(args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(GIT);
    cmd.args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null());
    cmd
}

fn wrap_cmd(cmd: &mut Command) -> io::Result<Output> {
    let output = pipe_io(cmd).spawn()?.wait_with_output()?;

    log_output(&output);

    Ok(output)
}

pub fn pipe_io(cmd: &mut Command) -> &mut Command {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped())
}

pub fn log_output(output: &Output) {
    // Use log crate to allow verbosity flag to control wrapped command logs.
    if output.status.success() && !output.stdout.is_empty() {
        log::info!("{}", String::from_utf8_lossy(&output.stdout).trim());
    } else if !output.stderr.is_empty() {
        log::warn!("{}", String::from_utf8_lossy(&output.stderr).trim());
    }
}
