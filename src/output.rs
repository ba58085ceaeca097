//! Result types returned by the conversion entry points.
//!
//! Everything here is plain data and serialises with serde, so the CLI's
//! `--json` mode is a straight `serde_json::to_string_pretty` of
//! [`ConversionReport`] or [`DiagramInventory`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// The two kinds of diagram content the pipeline rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    /// `![alt](path.excalidraw)` image reference to an editor file.
    Excalidraw,
    /// ```` ```mermaid ```` fenced block.
    Mermaid,
}

impl DiagramKind {
    /// File-name stem shared by every artefact of this kind (`excalidraw-0.svg`).
    pub fn stem(self) -> &'static str {
        match self {
            DiagramKind::Excalidraw => "excalidraw",
            DiagramKind::Mermaid => "mermaid",
        }
    }

    /// Workspace-relative SVG name for the `index`-th diagram of this kind.
    pub fn svg_name(self, index: usize) -> String {
        format!("{}-{}.svg", self.stem(), index)
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramKind::Excalidraw => f.write_str("Excalidraw"),
            DiagramKind::Mermaid => f.write_str("Mermaid"),
        }
    }
}

/// An `![alt](path.excalidraw)` reference located in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcalidrawReference {
    /// Alt text between the brackets, verbatim.
    pub alt: String,
    /// Target path as written in the document.
    pub path: String,
    /// Byte range of the whole `![alt](path)` in the document text.
    pub span: Range<usize>,
}

impl ExcalidrawReference {
    /// The reference exactly as it appears in the source text.
    pub fn literal(&self) -> String {
        format!("![{}]({})", self.alt, self.path)
    }
}

/// A ```` ```mermaid ```` fenced block located in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MermaidBlock {
    /// Text between the opening and closing fences, trimmed.
    pub source: String,
    /// Byte range of the whole fenced block including both fences.
    pub span: Range<usize>,
}

/// Diagrams discovered in a document without rendering anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramInventory {
    pub excalidraw: Vec<ExcalidrawReference>,
    pub mermaid: Vec<MermaidBlock>,
}

impl DiagramInventory {
    /// Total number of diagrams of both kinds.
    pub fn total(&self) -> usize {
        self.excalidraw.len() + self.mermaid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// One diagram rendered during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDiagram {
    pub kind: DiagramKind,
    /// Zero-based index within `kind`.
    pub index: usize,
    /// Absolute path of the SVG inside the workspace.
    pub image: PathBuf,
    /// Absolute path of the source the renderer read
    /// (the `.excalidraw` file, or the `mermaid-N.mmd` written to the workspace).
    pub source: PathBuf,
}

/// Timing and count statistics for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub excalidraw_rendered: usize,
    pub mermaid_rendered: usize,
    /// Wall-clock time spent inside diagram renderers.
    pub render_duration_ms: u64,
    /// Wall-clock time spent inside the document converter (0 for preprocess-only runs).
    pub convert_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Absolute input document path.
    pub input: PathBuf,
    /// Absolute output document path; `None` when the converter was not run.
    pub output: Option<PathBuf>,
    /// The run's workspace directory.
    pub workspace: PathBuf,
    /// The rewritten Markdown handed to the converter.
    pub processed_markdown: PathBuf,
    /// `true` when the workspace was deleted at the end of the run.
    pub workspace_removed: bool,
    pub diagrams: Vec<RenderedDiagram>,
    pub stats: ConversionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_names_are_per_kind() {
        assert_eq!(DiagramKind::Excalidraw.svg_name(0), "excalidraw-0.svg");
        assert_eq!(DiagramKind::Mermaid.svg_name(12), "mermaid-12.svg");
    }

    #[test]
    fn reference_literal_round_trips_source() {
        let r = ExcalidrawReference {
            alt: "Flow".into(),
            path: "img/flow.excalidraw".into(),
            span: 0..28,
        };
        assert_eq!(r.literal(), "![Flow](img/flow.excalidraw)");
    }

    #[test]
    fn inventory_serialises_kind_lowercase() {
        let d = RenderedDiagram {
            kind: DiagramKind::Mermaid,
            index: 0,
            image: PathBuf::from("/w/mermaid-0.svg"),
            source: PathBuf::from("/w/mermaid-0.mmd"),
        };
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"kind\":\"mermaid\""), "got: {json}");
    }
}
