//! Workspace Manager: one isolated scratch directory per run.
//!
//! ```text
//! <tool_root>/temp/            created on first use, never removed
//!   temp_3fa91c02/             one per run
//!     excalidraw-0.svg
//!     mermaid-0.mmd
//!     mermaid-0.svg
//!     processed.md
//! ```
//!
//! The per-run name carries eight hex characters from a v4 UUID. The
//! directory is created with `create_dir` (not `create_dir_all`) so a name
//! collision surfaces as `AlreadyExists` and a fresh name is drawn; two runs
//! never share a workspace.
//!
//! Teardown is never fatal: [`Workspace::destroy`] logs a warning on failure
//! and returns normally.

use crate::config::CleanupPolicy;
use crate::error::Md2DocxError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Prefix of every per-run directory name.
pub const WORKSPACE_PREFIX: &str = "temp_";

/// Name of the rewritten Markdown written before conversion.
pub const PROCESSED_MARKDOWN: &str = "processed.md";

const MAX_NAME_ATTEMPTS: usize = 16;

/// A per-run scratch directory.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Create a uniquely named directory beneath `base`, creating `base` too
    /// if it does not exist yet.
    ///
    /// The returned path is absolute.
    pub async fn create(base: &Path) -> Result<Self, Md2DocxError> {
        let base = std::path::absolute(base).map_err(|e| Md2DocxError::WorkspaceCreateFailed {
            path: base.to_path_buf(),
            source: e,
        })?;

        if !tokio::fs::try_exists(&base).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&base)
                .await
                .map_err(|e| Md2DocxError::WorkspaceCreateFailed {
                    path: base.clone(),
                    source: e,
                })?;
            info!("Created temp directory: {}", base.display());
        }

        let mut last_err = None;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = base.join(unique_name());
            match tokio::fs::create_dir(&path).await {
                Ok(()) => {
                    info!("Created workspace: {}", path.display());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Workspace name collision at {}, retrying", path.display());
                    last_err = Some(e);
                }
                Err(e) => {
                    return Err(Md2DocxError::WorkspaceCreateFailed { path, source: e });
                }
            }
        }

        Err(Md2DocxError::WorkspaceCreateFailed {
            path: base,
            source: last_err
                .unwrap_or_else(|| std::io::Error::other("no unique workspace name found")),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute path of `name` inside the workspace.
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Write `contents` to `name` inside the workspace, returning its path.
    pub async fn write(&self, name: &str, contents: &str) -> Result<PathBuf, Md2DocxError> {
        let path = self.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| Md2DocxError::WorkspaceWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        debug!("Wrote {} ({} bytes)", path.display(), contents.len());
        Ok(path)
    }

    /// Recursively remove the workspace. Failure is logged, never returned.
    ///
    /// Returns `true` if the directory is gone afterwards.
    pub async fn destroy(&self) -> bool {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                info!("Cleaned up temporary directory: {}", self.path.display());
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                warn!(
                    "Could not clean up temporary directory {}: {}",
                    self.path.display(),
                    e
                );
                false
            }
        }
    }

    /// Apply `policy` for a run that ended with `succeeded`.
    ///
    /// Returns `true` if the workspace was removed.
    pub async fn finish(&self, policy: CleanupPolicy, succeeded: bool) -> bool {
        if policy.should_remove(succeeded) {
            self.destroy().await
        } else {
            info!("Keeping workspace: {}", self.path.display());
            false
        }
    }
}

/// `temp_` followed by the first eight hex digits of a random UUID.
fn unique_name() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{WORKSPACE_PREFIX}{}", &hex[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn unique_name_shape() {
        let name = unique_name();
        assert!(name.starts_with(WORKSPACE_PREFIX));
        let suffix = &name[WORKSPACE_PREFIX.len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn create_makes_base_and_run_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("temp");
        let ws = Workspace::create(&base).await.unwrap();
        assert!(base.is_dir());
        assert!(ws.path().is_dir());
        assert!(ws.path().is_absolute());
        assert_eq!(ws.path().parent(), Some(base.as_path()));
    }

    #[tokio::test]
    async fn sequential_runs_never_share_a_workspace() {
        let tmp = tempfile::tempdir().unwrap();
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let ws = Workspace::create(tmp.path()).await.unwrap();
            assert!(seen.insert(ws.path().to_path_buf()), "reused {:?}", ws.path());
        }
    }

    #[tokio::test]
    async fn write_and_destroy() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::create(tmp.path()).await.unwrap();
        let p = ws.write("processed.md", "# hi\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&p).unwrap(), "# hi\n");
        assert!(ws.destroy().await);
        assert!(!ws.path().exists());
        // A second destroy finds nothing to remove and still succeeds.
        assert!(ws.destroy().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_teardown_is_reported_not_raised() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::create(tmp.path()).await.unwrap();
        // A plain file where the directory was makes removal fail with ENOTDIR.
        std::fs::remove_dir(ws.path()).unwrap();
        std::fs::write(ws.path(), "not a directory").unwrap();

        assert!(!ws.destroy().await);
        assert!(!ws.finish(CleanupPolicy::Always, true).await);
        assert!(ws.path().is_file());
    }

    #[tokio::test]
    async fn finish_respects_policy() {
        let tmp = tempfile::tempdir().unwrap();

        let kept = Workspace::create(tmp.path()).await.unwrap();
        assert!(!kept.finish(CleanupPolicy::Keep, true).await);
        assert!(kept.path().exists());

        let failed = Workspace::create(tmp.path()).await.unwrap();
        assert!(!failed.finish(CleanupPolicy::OnSuccess, false).await);
        assert!(failed.path().exists());

        let done = Workspace::create(tmp.path()).await.unwrap();
        assert!(done.finish(CleanupPolicy::OnSuccess, true).await);
        assert!(!done.path().exists());
    }
}
