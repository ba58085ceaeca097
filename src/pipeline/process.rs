//! Process Runner: invoke an external program and capture its output.
//!
//! Every renderer and the document converter goes through [`run`]. The call
//! is awaited to completion before the pipeline moves on, so diagrams are
//! rendered strictly one at a time in discovery order. A non-zero exit is
//! returned as [`Md2DocxError::CommandFailed`] carrying the command line, the
//! exit code, and both captured streams; callers propagate it with `?` and
//! the run stops there.
//!
//! ## Direct vs. shell invocation
//!
//! [`Invocation::Direct`] execs the program with its arguments as-is.
//! [`Invocation::Shell`] joins every token with spaces and hands the line to
//! `sh -c` (`cmd /C` on Windows), which is how package-manager shims that
//! only resolve inside an interactive shell environment get found.
//! [`resolve_program`] is the preferred alternative: it finds the absolute
//! binary with `which` so the direct path can be used instead.

use crate::error::Md2DocxError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// How the tokens of a [`CommandSpec`] are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Invocation {
    /// `program arg1 arg2 …`, no shell.
    #[default]
    Direct,
    /// `sh -c "program arg1 arg2 …"`.
    Shell,
}

/// A command to run: program, arguments, optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub invocation: Invocation,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            invocation: Invocation::Direct,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a path argument, converted lossily to UTF-8.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn invocation(mut self, invocation: Invocation) -> Self {
        self.invocation = invocation;
        self
    }

    /// The single line handed to the shell in [`Invocation::Shell`] mode.
    pub fn shell_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = match self.invocation {
            Invocation::Direct => {
                let mut c = Command::new(&self.program);
                c.args(&self.args);
                c
            }
            Invocation::Shell => shell_command(&self.shell_line()),
        };
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.shell_line())
    }
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut c = Command::new("sh");
    c.arg("-c").arg(line);
    c
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut c = Command::new("cmd");
    c.arg("/C").arg(line);
    c
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Run `spec` to completion.
///
/// Both streams are decoded as UTF-8 (invalid sequences replaced).
///
/// # Errors
/// - [`Md2DocxError::CommandSpawnFailed`] if the program cannot be started
/// - [`Md2DocxError::CommandFailed`] if it exits non-zero or is killed
pub async fn run(spec: &CommandSpec) -> Result<CommandOutput, Md2DocxError> {
    debug!("Running: {}", spec);

    let spawn_name = match spec.invocation {
        Invocation::Direct => spec.program.clone(),
        Invocation::Shell => spec.shell_line(),
    };
    let output = spec
        .to_command()
        .output()
        .await
        .map_err(|e| Md2DocxError::CommandSpawnFailed {
            program: spawn_name,
            source: e,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    debug!(
        "Finished: {} (status {}, {} bytes stdout, {} bytes stderr)",
        spec.program,
        output.status,
        stdout.len(),
        stderr.len()
    );

    if !output.status.success() {
        return Err(Md2DocxError::CommandFailed {
            command: spec.to_string(),
            exit_code: output.status.code(),
            stdout,
            stderr,
        });
    }

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code: output.status.code().unwrap_or(0),
    })
}

/// Find the absolute path of `program`.
///
/// Names containing a path separator are taken as paths and only checked for
/// existence; bare names are looked up on `PATH`.
pub fn resolve_program(program: &str) -> Result<PathBuf, Md2DocxError> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        if candidate.exists() {
            return Ok(candidate.to_path_buf());
        }
        return Err(Md2DocxError::ToolNotFound {
            name: program.to_string(),
            hint: format!("No file exists at '{}'.", candidate.display()),
        });
    }

    which::which(program).map_err(|e| Md2DocxError::ToolNotFound {
        name: program.to_string(),
        hint: format!("{e}. Install it or pass its absolute path."),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let out = run(&CommandSpec::new("sh").args(["-c", "printf hello"]))
            .await
            .unwrap();
        assert_eq!(out.stdout, "hello");
        assert_eq!(out.exit_code, 0);
    }

    #[tokio::test]
    async fn non_zero_exit_is_command_failed() {
        let err = run(&CommandSpec::new("sh").args(["-c", "echo out; echo bad >&2; exit 2"]))
            .await
            .unwrap_err();
        match err {
            Md2DocxError::CommandFailed {
                command,
                exit_code,
                stdout,
                stderr,
            } => {
                assert!(command.starts_with("sh -c"), "got: {command}");
                assert_eq!(exit_code, Some(2));
                assert_eq!(stdout.trim(), "out");
                assert_eq!(stderr.trim(), "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_spawn_failure() {
        let err = run(&CommandSpec::new("md2docx-definitely-not-installed"))
            .await
            .unwrap_err();
        assert!(matches!(err, Md2DocxError::CommandSpawnFailed { .. }));
    }

    #[tokio::test]
    async fn shell_invocation_joins_tokens() {
        let spec = CommandSpec::new("echo")
            .args(["a", "b"])
            .invocation(Invocation::Shell);
        assert_eq!(spec.shell_line(), "echo a b");
        let out = run(&spec).await.unwrap();
        assert_eq!(out.stdout.trim(), "a b");
    }

    #[tokio::test]
    async fn working_directory_is_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let out = run(&CommandSpec::new("pwd").current_dir(dir.path()))
            .await
            .unwrap();
        let reported = std::fs::canonicalize(out.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn resolve_program_finds_sh() {
        let sh = resolve_program("sh").unwrap();
        assert!(sh.is_absolute());
    }

    #[test]
    fn resolve_program_rejects_missing_path() {
        let err = resolve_program("/no/such/dir/npx").unwrap_err();
        assert!(matches!(err, Md2DocxError::ToolNotFound { .. }));
    }
}
