//! Pass B: render fenced ```` ```mermaid ```` blocks to SVG.
//!
//! Blocks are numbered from zero in order of appearance, independently of
//! Pass A. For the `i`-th block the trimmed source is written to
//! `mermaid-{i}.mmd`, the Mermaid CLI renders it to `mermaid-{i}.svg`, and
//! the whole fenced block is replaced by `![Mermaid Diagram](mermaid-{i}.svg)`.
//!
//! The pass renders every block first, collecting one [`Replacement`] per
//! block in a [`BlockLedger`], then rebuilds the document in a single splice.
//! The ledger is the only state carried between blocks; the next index is
//! always the number of blocks already rendered.
//!
//! The Mermaid CLI is started through a package-manager launcher
//! (`npx mmdc -i … -o …`) with the tool root as working directory, so the
//! tool's own `node_modules` is used. See [`LaunchMode`] for how the launcher
//! itself is found.

use super::process::{self, resolve_program, CommandSpec, Invocation};
use super::scan::find_mermaid_blocks;
use super::splice::{splice, Replacement};
use super::{PassContext, PassOutcome};
use crate::config::{ConversionConfig, LaunchMode};
use crate::error::Md2DocxError;
use crate::output::{DiagramKind, MermaidBlock, RenderedDiagram};
use std::path::{Path, PathBuf};
use tracing::info;

/// Alt text given to every image that replaces a Mermaid block.
pub const MERMAID_ALT_TEXT: &str = "Mermaid Diagram";

/// Accumulates the per-block results of Pass B.
#[derive(Debug, Default)]
pub struct BlockLedger {
    replacements: Vec<Replacement>,
    rendered: Vec<RenderedDiagram>,
}

impl BlockLedger {
    /// Index the next rendered block will receive.
    pub fn next_index(&self) -> usize {
        self.rendered.len()
    }

    fn record(&mut self, block: &MermaidBlock, diagram: RenderedDiagram, link: String) {
        self.replacements.push(Replacement::new(block.span.clone(), link));
        self.rendered.push(diagram);
    }

    fn finish(self, text: &str) -> Result<PassOutcome, Md2DocxError> {
        Ok(PassOutcome {
            text: splice(text, &self.replacements)?,
            rendered: self.rendered,
        })
    }
}

/// Run Pass B over `text`.
pub async fn render_blocks(text: &str, ctx: &PassContext<'_>) -> Result<PassOutcome, Md2DocxError> {
    info!("Processing Mermaid diagrams...");
    let blocks = find_mermaid_blocks(text);
    if blocks.is_empty() {
        info!("No Mermaid diagrams found");
        return Ok(PassOutcome::unchanged(text));
    }

    let launcher = Launcher::locate(ctx.config)?;
    let mut ledger = BlockLedger::default();

    for block in &blocks {
        let index = ledger.next_index();
        info!("Found Mermaid diagram {}", index + 1);
        ctx.notify(|cb| cb.on_diagram_start(DiagramKind::Mermaid, index));

        let source = ctx
            .workspace
            .write(&format!("{}-{}.mmd", DiagramKind::Mermaid.stem(), index), &block.source)
            .await?;
        let svg_name = DiagramKind::Mermaid.svg_name(index);
        let image = ctx.workspace.join(&svg_name);

        info!("Rendering to {}...", image.display());
        let spec = launcher.render_command(ctx.config, &source, &image);
        if let Err(e) = process::run(&spec).await {
            ctx.notify(|cb| cb.on_diagram_error(DiagramKind::Mermaid, index, &e.to_string()));
            return Err(e);
        }

        let link = format!("![{MERMAID_ALT_TEXT}]({svg_name})");
        info!("Replacing block with: {}", link);
        ctx.notify(|cb| cb.on_diagram_complete(DiagramKind::Mermaid, index, &svg_name));

        ledger.record(
            block,
            RenderedDiagram {
                kind: DiagramKind::Mermaid,
                index,
                image,
                source,
            },
            link,
        );
    }

    ledger.finish(text)
}

/// The launcher as it will be started for every block of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// Absolute binary path, exec'd directly.
    Resolved(PathBuf),
    /// Name handed to the shell together with the arguments.
    Shell(String),
}

impl Launcher {
    /// Locate the configured launcher once per pass.
    pub fn locate(config: &ConversionConfig) -> Result<Self, Md2DocxError> {
        match config.launch_mode {
            LaunchMode::Resolve => Ok(Launcher::Resolved(resolve_program(&config.launcher)?)),
            LaunchMode::Shell => Ok(Launcher::Shell(config.launcher.clone())),
        }
    }

    /// `<launcher> mmdc -i <source.mmd> -o <dest.svg>`, run from the tool root.
    pub fn render_command(
        &self,
        config: &ConversionConfig,
        source: &Path,
        destination: &Path,
    ) -> CommandSpec {
        let spec = match self {
            Launcher::Resolved(path) => CommandSpec::new(path.to_string_lossy()),
            Launcher::Shell(name) => CommandSpec::new(name).invocation(Invocation::Shell),
        };
        spec.arg(&config.mermaid_tool)
            .arg("-i")
            .path_arg(source)
            .arg("-o")
            .path_arg(destination)
            .current_dir(&config.tool_root)
    }
}
