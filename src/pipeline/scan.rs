//! Diagram discovery: locate Excalidraw references and Mermaid fences.
//!
//! Pure functions over `&str`; nothing here touches the filesystem or spawns
//! a process. Each match carries its byte span so the rewriting passes can
//! splice replacements in place.
//!
//! ## Patterns
//!
//! - Excalidraw: `![alt](path.excalidraw)` on a single line. Neither alt nor
//!   path may cross a `]` or `)`, so an ordinary image earlier on the same
//!   line is never swallowed. The path must *end* in `.excalidraw`;
//!   `diagram.excalidraw.png` is left alone.
//! - Mermaid: an opening fence ```` ```mermaid ```` on its own line, any text
//!   (blank lines included), and the first closing ```` ``` ```` that starts a
//!   line. Matching is lazy so consecutive blocks never merge.

use crate::output::{DiagramInventory, ExcalidrawReference, MermaidBlock};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

static RE_EXCALIDRAW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]\n]*)\]\(([^)\n]*\.excalidraw)\)").unwrap());

static RE_MERMAID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```mermaid\r?\n(.*?)\r?\n```").unwrap());

/// Find every Excalidraw image reference, in order of appearance.
pub fn find_excalidraw_references(text: &str) -> Vec<ExcalidrawReference> {
    RE_EXCALIDRAW
        .captures_iter(text)
        .filter_map(|caps| {
            Some(ExcalidrawReference {
                alt: caps.get(1)?.as_str().to_string(),
                path: caps.get(2)?.as_str().to_string(),
                span: caps.get(0)?.range(),
            })
        })
        .collect()
}

/// Find every fenced Mermaid block, in order of appearance.
pub fn find_mermaid_blocks(text: &str) -> Vec<MermaidBlock> {
    RE_MERMAID
        .captures_iter(text)
        .filter_map(|caps| {
            Some(MermaidBlock {
                source: caps.get(1)?.as_str().trim().to_string(),
                span: caps.get(0)?.range(),
            })
        })
        .collect()
}

/// Both passes' discoveries over the same unmodified text.
///
/// Spans are relative to `text`; after Pass A rewrites the document the
/// Mermaid spans shift, so the driver rescans before Pass B.
pub fn inventory(text: &str) -> DiagramInventory {
    DiagramInventory {
        excalidraw: find_excalidraw_references(text),
        mermaid: find_mermaid_blocks(text),
    }
}

/// Resolve a reference path against the directory of the input document.
///
/// Absolute targets are kept as-is. `.` and `..` components are folded
/// lexically so the result is stable whether or not the file exists.
pub fn resolve_reference(document_dir: &Path, reference: &str) -> PathBuf {
    let joined = document_dir.join(reference);
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
