//! Error types for the edgequake-md2docx library.
//!
//! Every error here is **fatal**: the pipeline stops at the first failure and
//! no retry is attempted. A renderer that exits non-zero halts the run before
//! `processed.md` is written, so a half-rewritten document never reaches the
//! converter.
//!
//! The one non-fatal failure in the system, workspace teardown, never becomes
//! an [`Md2DocxError`]; it is logged as a warning and the run outcome stands.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-md2docx library.
#[derive(Debug, Error)]
pub enum Md2DocxError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input Markdown file was not found at the given path.
    #[error("Markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Input file exists but could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Workspace errors ──────────────────────────────────────────────────
    /// The base temp folder or the per-run directory could not be created.
    #[error("Failed to create workspace under '{path}': {source}")]
    WorkspaceCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An intermediate artefact (`mermaid-N.mmd`, `processed.md`) could not be written.
    #[error("Failed to write '{path}': {source}")]
    WorkspaceWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The output path could not be resolved, or its directory could not be created.
    #[error("Failed to prepare output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── External command errors ───────────────────────────────────────────
    /// The program could not be started at all (missing binary, no exec permission).
    #[error("Failed to start '{program}': {source}")]
    CommandSpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran but exited non-zero.
    ///
    /// `exit_code` is `None` when the process was killed by a signal.
    #[error(
        "Error executing command: {command}\n\
Return code: {}\n\
Stdout: {stdout}\n\
Stderr: {stderr}",
        exit_code_label(.exit_code)
    )]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// A launcher or converter could not be located on `PATH`.
    #[error("'{name}' was not found on PATH.\n{hint}")]
    ToolNotFound { name: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "terminated by signal".to_string(),
    }
}

impl Md2DocxError {
    /// `true` when the failure came from an external program rather than
    /// the local filesystem or configuration.
    pub fn is_command_failure(&self) -> bool {
        matches!(
            self,
            Md2DocxError::CommandFailed { .. }
                | Md2DocxError::CommandSpawnFailed { .. }
                | Md2DocxError::ToolNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_display_includes_streams() {
        let e = Md2DocxError::CommandFailed {
            command: "node render_excalidraw.js a.excalidraw out.svg".into(),
            exit_code: Some(2),
            stdout: "[INFO] Input file".into(),
            stderr: "boom".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("node render_excalidraw.js"), "got: {msg}");
        assert!(msg.contains("Return code: 2"), "got: {msg}");
        assert!(msg.contains("Stdout: [INFO] Input file"), "got: {msg}");
        assert!(msg.contains("Stderr: boom"), "got: {msg}");
    }

    #[test]
    fn command_failed_by_signal() {
        let e = Md2DocxError::CommandFailed {
            command: "pandoc".into(),
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(e.to_string().contains("terminated by signal"));
    }

    #[test]
    fn input_not_found_display() {
        let e = Md2DocxError::InputNotFound {
            path: PathBuf::from("/nope/doc.md"),
        };
        assert!(e.to_string().contains("/nope/doc.md"));
    }

    #[test]
    fn output_errors_name_the_output_path() {
        let e = Md2DocxError::OutputWriteFailed {
            path: PathBuf::from("/out/build"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("output '/out/build'"), "got: {msg}");
        assert!(!e.is_command_failure());
    }

    #[test]
    fn command_failure_classification() {
        let spawn = Md2DocxError::CommandSpawnFailed {
            program: "pandoc".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(spawn.is_command_failure());
        assert!(!Md2DocxError::InvalidConfig("x".into()).is_command_failure());
    }
}
