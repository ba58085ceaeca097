//! Pipeline Driver: the conversion entry points.
//!
//! A run moves through five phases with no branching or retry between them:
//!
//! 1. **Setup**   resolve input/output to absolute paths, create the workspace
//! 2. **Load**    read the input Markdown as UTF-8
//! 3. **Transform** Pass A (Excalidraw), then Pass B (Mermaid)
//! 4. **Persist** write `processed.md` into the workspace
//! 5. **Convert** run pandoc with the workspace as resource path
//!
//! Phases 2–5 are wrapped so the workspace's [`CleanupPolicy`] is applied
//! whatever their outcome. The first error ends the run.
//!
//! [`CleanupPolicy`]: crate::config::CleanupPolicy

use crate::config::ConversionConfig;
use crate::error::Md2DocxError;
use crate::output::{
    ConversionReport, ConversionStats, DiagramInventory, DiagramKind, RenderedDiagram,
};
use crate::pipeline::workspace::{Workspace, PROCESSED_MARKDOWN};
use crate::pipeline::{excalidraw, mermaid, pandoc, scan, PassContext};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert a Markdown file to a DOCX file.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input`  — Markdown document; relative diagram references resolve
///   against its directory
/// * `output` — Destination document; its directory is created if missing
/// * `config` — Conversion configuration
///
/// # Errors
/// Returns the first failure: unreadable input, workspace creation, any
/// renderer or converter exiting non-zero.
pub async fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Md2DocxError> {
    let output = output.as_ref();
    let output = std::path::absolute(output).map_err(|e| Md2DocxError::OutputWriteFailed {
        path: output.to_path_buf(),
        source: e,
    })?;
    run(input.as_ref(), Some(output), config).await
}

/// Run phases 1–4 only: render diagrams and write `processed.md`, without
/// invoking the converter.
///
/// Useful to inspect the rewritten Markdown, or to hand it to a different
/// converter. The report's `output` is `None`.
pub async fn preprocess(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Md2DocxError> {
    run(input.as_ref(), None, config).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Md2DocxError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2DocxError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, output, config))
}

/// List the diagrams a conversion would render, without running anything.
pub async fn inspect(input: impl AsRef<Path>) -> Result<DiagramInventory, Md2DocxError> {
    let input = absolute_input(input.as_ref())?;
    let text = load(&input).await?;
    Ok(scan::inventory(&text))
}

/// Rewrite `text` in memory: Pass A then Pass B.
///
/// `document_dir` is where relative Excalidraw paths resolve; all artefacts
/// land in `workspace`. Returns the rewritten text and the per-diagram record.
pub async fn rewrite_document(
    text: &str,
    document_dir: &Path,
    workspace: &Workspace,
    config: &ConversionConfig,
) -> Result<(String, Vec<RenderedDiagram>), Md2DocxError> {
    let ctx = PassContext {
        config,
        workspace,
        document_dir,
    };

    let pass_a = excalidraw::render_references(text, &ctx).await?;
    let pass_b = mermaid::render_blocks(&pass_a.text, &ctx).await?;

    let mut rendered = pass_a.rendered;
    rendered.extend(pass_b.rendered);
    Ok((pass_b.text, rendered))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run(
    input: &Path,
    output: Option<PathBuf>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Md2DocxError> {
    let total_start = Instant::now();

    // ── Phase 1: Setup ───────────────────────────────────────────────────
    let input = absolute_input(input)?;
    info!("Starting conversion: {}", input.display());
    let workspace = Workspace::create(&config.workspace_root).await?;

    // ── Phases 2–5, with teardown around them ────────────────────────────
    let result = run_phases(&input, output.as_deref(), &workspace, config).await;
    let workspace_removed = workspace.finish(config.cleanup, result.is_ok()).await;
    let mut report = result?;

    report.workspace_removed = workspace_removed;
    report.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(report)
}

async fn run_phases(
    input: &Path,
    output: Option<&Path>,
    workspace: &Workspace,
    config: &ConversionConfig,
) -> Result<ConversionReport, Md2DocxError> {
    // ── Phase 2: Load ────────────────────────────────────────────────────
    let text = load(input).await?;
    let total = scan::inventory(&text).total();
    debug!("Found {} diagrams in {} bytes", total, text.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    // ── Phase 3: Transform ───────────────────────────────────────────────
    let document_dir = input.parent().unwrap_or_else(|| Path::new("/"));
    let render_start = Instant::now();
    let (markdown, diagrams) = rewrite_document(&text, document_dir, workspace, config).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Phase 4: Persist intermediate ────────────────────────────────────
    let processed_markdown = workspace.write(PROCESSED_MARKDOWN, &markdown).await?;

    // ── Phase 5: Convert ─────────────────────────────────────────────────
    let mut convert_duration_ms = 0;
    if let Some(output) = output {
        if let Some(ref cb) = config.progress_callback {
            cb.on_convert_start();
        }
        let convert_start = Instant::now();
        pandoc::convert_document(config, &processed_markdown, output, workspace.path()).await?;
        convert_duration_ms = convert_start.elapsed().as_millis() as u64;
        info!("Successfully created DOCX file at: {}", output.display());
    } else {
        info!("Processed Markdown written to: {}", processed_markdown.display());
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(diagrams.len());
    }

    let count = |kind: DiagramKind| diagrams.iter().filter(|d| d.kind == kind).count();
    let stats = ConversionStats {
        excalidraw_rendered: count(DiagramKind::Excalidraw),
        mermaid_rendered: count(DiagramKind::Mermaid),
        render_duration_ms,
        convert_duration_ms,
        total_duration_ms: 0,
    };

    Ok(ConversionReport {
        input: input.to_path_buf(),
        output: output.map(Path::to_path_buf),
        workspace: workspace.path().to_path_buf(),
        processed_markdown,
        workspace_removed: false,
        diagrams,
        stats,
    })
}

/// Read the whole document as UTF-8.
async fn load(path: &Path) -> Result<String, Md2DocxError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Md2DocxError::InputNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Md2DocxError::InputReadFailed {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

fn absolute_input(path: &Path) -> Result<PathBuf, Md2DocxError> {
    std::path::absolute(path).map_err(|e| Md2DocxError::InputReadFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
