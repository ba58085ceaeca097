//! Pipeline stages for Markdown-to-DOCX conversion.
//!
//! Each submodule implements one step; [`crate::convert`] sequences them.
//!
//! ## Data Flow
//!
//! ```text
//! workspace ──▶ excalidraw ──▶ mermaid ──▶ processed.md ──▶ pandoc
//! (temp_xxxx)   (Pass A)       (Pass B)    (workspace)      (DOCX)
//! ```
//!
//! 1. [`workspace`]  — create the per-run scratch directory, tear it down
//! 2. [`scan`]       — find `![alt](x.excalidraw)` refs and mermaid fences (pure)
//! 3. [`excalidraw`] — Pass A: render each reference, rewrite it to its SVG
//! 4. [`mermaid`]    — Pass B: render each fenced block, replace it with an image
//! 5. [`pandoc`]     — convert the rewritten Markdown with the workspace as
//!    resource path
//!
//! [`process`] runs every external program; [`splice`] rebuilds text from
//! recorded match spans.

pub mod excalidraw;
pub mod mermaid;
pub mod pandoc;
pub mod process;
pub mod scan;
pub mod splice;
pub mod workspace;

use crate::config::ConversionConfig;
use crate::output::RenderedDiagram;
use crate::progress::ConversionProgressCallback;
use std::path::Path;
use workspace::Workspace;

/// Everything a rewriting pass needs besides the document text.
pub struct PassContext<'a> {
    pub config: &'a ConversionConfig,
    pub workspace: &'a Workspace,
    /// Directory of the input document; relative references resolve against it.
    pub document_dir: &'a Path,
}

impl PassContext<'_> {
    /// Forward an event to the configured progress callback, if any.
    pub(crate) fn notify(&self, event: impl FnOnce(&dyn ConversionProgressCallback)) {
        if let Some(ref cb) = self.config.progress_callback {
            event(cb.as_ref());
        }
    }
}

/// Result of one rewriting pass.
#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    /// The document text after this pass.
    pub text: String,
    /// Diagrams rendered by this pass, in index order.
    pub rendered: Vec<RenderedDiagram>,
}

impl PassOutcome {
    pub(crate) fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            rendered: Vec::new(),
        }
    }
}
