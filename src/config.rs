//! Configuration types for Markdown-to-DOCX conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The external programs (Excalidraw
//! renderer, Mermaid CLI launcher, pandoc) are named here rather than
//! hard-coded in the pipeline so tests and unusual installs can swap them.

use crate::error::Md2DocxError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the per-tool scratch folder created beneath [`ConversionConfig::tool_root`].
pub const WORKSPACE_DIR_NAME: &str = "temp";

/// File name of the Node helper that renders `.excalidraw` scenes to SVG.
pub const EXCALIDRAW_SCRIPT_NAME: &str = "render_excalidraw.js";

/// Configuration for a Markdown-to-DOCX conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_md2docx::{CleanupPolicy, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .tool_root("/opt/md2docx")
///     .cleanup(CleanupPolicy::OnSuccess)
///     .build()
///     .unwrap();
/// assert_eq!(config.workspace_root, std::path::PathBuf::from("/opt/md2docx/temp"));
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Install location of the tool. Default: directory of the running executable.
    ///
    /// The Mermaid renderer runs with this as its working directory so the
    /// launcher picks up the tool's own `node_modules`.
    pub tool_root: PathBuf,

    /// Base folder holding one `temp_<hex>` directory per run.
    /// Default: `<tool_root>/temp`.
    pub workspace_root: PathBuf,

    /// Program that renders Excalidraw scenes. Default: `node`.
    pub excalidraw_program: String,

    /// Script passed as the first argument to [`Self::excalidraw_program`].
    /// Default: `<tool_root>/render_excalidraw.js`.
    ///
    /// `None` means the program itself accepts `<source> <destination>`.
    pub excalidraw_script: Option<PathBuf>,

    /// Package-manager launcher used to find the Mermaid CLI. Default: `npx`.
    pub launcher: String,

    /// Mermaid CLI binary name handed to the launcher. Default: `mmdc`.
    pub mermaid_tool: String,

    /// How the launcher is located and started. Default: [`LaunchMode::Resolve`].
    pub launch_mode: LaunchMode,

    /// Document converter. Default: `pandoc`.
    pub converter: String,

    /// Extra arguments appended after the fixed converter arguments,
    /// e.g. `["--reference-doc", "template.docx"]`.
    pub converter_args: Vec<String>,

    /// What happens to the run's workspace at the end. Default: [`CleanupPolicy::Keep`].
    pub cleanup: CleanupPolicy,

    /// How Excalidraw references are rewritten. Default: [`RewriteMode::Positional`].
    pub rewrite: RewriteMode,

    /// Optional per-diagram progress callback.
    ///
    /// Inject an `Arc<dyn ConversionProgressCallback>` to receive real-time
    /// events as each diagram is rendered. Default: `None`.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::for_tool_root(default_tool_root())
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("tool_root", &self.tool_root)
            .field("workspace_root", &self.workspace_root)
            .field("excalidraw_program", &self.excalidraw_program)
            .field("excalidraw_script", &self.excalidraw_script)
            .field("launcher", &self.launcher)
            .field("mermaid_tool", &self.mermaid_tool)
            .field("launch_mode", &self.launch_mode)
            .field("converter", &self.converter)
            .field("converter_args", &self.converter_args)
            .field("cleanup", &self.cleanup)
            .field("rewrite", &self.rewrite)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
            workspace_root: None,
            excalidraw_script: ScriptChoice::Default,
        }
    }

    fn for_tool_root(tool_root: PathBuf) -> Self {
        Self {
            workspace_root: tool_root.join(WORKSPACE_DIR_NAME),
            excalidraw_program: "node".to_string(),
            excalidraw_script: Some(tool_root.join(EXCALIDRAW_SCRIPT_NAME)),
            launcher: "npx".to_string(),
            mermaid_tool: "mmdc".to_string(),
            launch_mode: LaunchMode::default(),
            converter: "pandoc".to_string(),
            converter_args: Vec::new(),
            cleanup: CleanupPolicy::default(),
            rewrite: RewriteMode::default(),
            progress_callback: None,
            tool_root,
        }
    }
}

/// Directory of the running executable, falling back to the current directory.
fn default_tool_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug)]
enum ScriptChoice {
    Default,
    Explicit(Option<PathBuf>),
}

/// Builder for [`ConversionConfig`].
///
/// Paths derived from the tool root (`workspace_root`, `excalidraw_script`)
/// are resolved in [`build`](Self::build), so `tool_root` may be set in any
/// order relative to them.
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
    workspace_root: Option<PathBuf>,
    excalidraw_script: ScriptChoice,
}

impl ConversionConfigBuilder {
    pub fn tool_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.tool_root = root.into();
        self
    }

    pub fn workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn excalidraw_program(mut self, program: impl Into<String>) -> Self {
        self.config.excalidraw_program = program.into();
        self
    }

    /// Script run by the Excalidraw program; `None` calls the program directly.
    pub fn excalidraw_script(mut self, script: Option<PathBuf>) -> Self {
        self.excalidraw_script = ScriptChoice::Explicit(script);
        self
    }

    pub fn launcher(mut self, launcher: impl Into<String>) -> Self {
        self.config.launcher = launcher.into();
        self
    }

    pub fn mermaid_tool(mut self, tool: impl Into<String>) -> Self {
        self.config.mermaid_tool = tool.into();
        self
    }

    pub fn launch_mode(mut self, mode: LaunchMode) -> Self {
        self.config.launch_mode = mode;
        self
    }

    pub fn converter(mut self, converter: impl Into<String>) -> Self {
        self.config.converter = converter.into();
        self
    }

    pub fn converter_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.converter_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn cleanup(mut self, policy: CleanupPolicy) -> Self {
        self.config.cleanup = policy;
        self
    }

    pub fn rewrite(mut self, mode: RewriteMode) -> Self {
        self.config.rewrite = mode;
        self
    }

    /// Attach a progress callback that receives per-diagram events.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2DocxError> {
        let mut config = self.config;

        config.workspace_root = self
            .workspace_root
            .unwrap_or_else(|| config.tool_root.join(WORKSPACE_DIR_NAME));
        config.excalidraw_script = match self.excalidraw_script {
            ScriptChoice::Default => Some(config.tool_root.join(EXCALIDRAW_SCRIPT_NAME)),
            ScriptChoice::Explicit(script) => script,
        };

        for (field, value) in [
            ("excalidraw_program", &config.excalidraw_program),
            ("launcher", &config.launcher),
            ("mermaid_tool", &config.mermaid_tool),
            ("converter", &config.converter),
        ] {
            if value.trim().is_empty() {
                return Err(Md2DocxError::InvalidConfig(format!(
                    "{field} must not be empty"
                )));
            }
        }
        if config.workspace_root.as_os_str().is_empty() {
            return Err(Md2DocxError::InvalidConfig(
                "workspace_root must not be empty".into(),
            ));
        }
        Ok(config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What to do with the per-run workspace once the run ends.
///
/// | Policy | Success | Failure |
/// |--------|---------|---------|
/// | `Keep` | kept | kept |
/// | `OnSuccess` | removed | kept for inspection |
/// | `Always` | removed | removed |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupPolicy {
    /// Leave every artefact on disk. (default)
    #[default]
    Keep,
    /// Remove the workspace only when the document was produced.
    OnSuccess,
    /// Remove the workspace whatever the outcome.
    Always,
}

impl CleanupPolicy {
    /// Whether the workspace should be destroyed for a run with this outcome.
    pub fn should_remove(self, succeeded: bool) -> bool {
        match self {
            CleanupPolicy::Keep => false,
            CleanupPolicy::OnSuccess => succeeded,
            CleanupPolicy::Always => true,
        }
    }
}

/// How the package-manager launcher is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchMode {
    /// Look the launcher up on `PATH` and exec it directly, no shell involved. (default)
    #[default]
    Resolve,
    /// Join all tokens into one command line and hand it to the platform shell.
    Shell,
}

/// How Excalidraw image references are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteMode {
    /// Each reference is replaced at its own byte span, so duplicates rewrite
    /// independently. (default)
    #[default]
    Positional,
    /// Every literal occurrence of `![alt](path)` is replaced on each match.
    /// The first match rewrites every identical copy, so duplicates all point
    /// at the first render even though one SVG per occurrence is produced.
    Literal,
}
