//! # edgequake-md2docx
//!
//! Convert Markdown documents that embed diagrams into DOCX.
//!
//! Two kinds of diagram content are rewritten before the document reaches
//! pandoc:
//!
//! - `![alt](path/to/scene.excalidraw)` image references to Excalidraw files
//! - ```` ```mermaid ```` fenced blocks
//!
//! Each is rendered to SVG by an external program, the Markdown is rewritten
//! to point at the SVG, and pandoc produces the final document with the
//! per-run workspace on its resource path.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Setup      absolute paths, per-run workspace  <tool>/temp/temp_xxxxxxxx
//!  ├─ 2. Load       read input as UTF-8
//!  ├─ 3. Transform  Pass A: excalidraw-N.svg   (node render_excalidraw.js)
//!  │                Pass B: mermaid-N.svg      (npx mmdc)
//!  ├─ 4. Persist    processed.md in the workspace
//!  └─ 5. Convert    pandoc processed.md -o out.docx --resource-path <workspace>
//! ```
//!
//! Every external program runs to completion before the next starts; the
//! first non-zero exit ends the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_md2docx::{convert, CleanupPolicy, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .cleanup(CleanupPolicy::OnSuccess)
//!         .build()?;
//!     let report = convert("design.md", "design.docx", &config).await?;
//!     eprintln!(
//!         "{} excalidraw + {} mermaid diagrams",
//!         report.stats.excalidraw_rendered, report.stats.mermaid_rendered
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2docx` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## External tools
//!
//! | Tool | Used for | Override |
//! |------|----------|----------|
//! | `node` + `render_excalidraw.js` | Excalidraw → SVG | `excalidraw_program`, `excalidraw_script` |
//! | `npx mmdc` | Mermaid → SVG | `launcher`, `mermaid_tool`, `launch_mode` |
//! | `pandoc` | Markdown → DOCX | `converter`, `converter_args` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    CleanupPolicy, ConversionConfig, ConversionConfigBuilder, LaunchMode, RewriteMode,
};
pub use convert::{convert, convert_sync, inspect, preprocess, rewrite_document};
pub use error::Md2DocxError;
pub use output::{
    ConversionReport, ConversionStats, DiagramInventory, DiagramKind, ExcalidrawReference,
    MermaidBlock, RenderedDiagram,
};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
