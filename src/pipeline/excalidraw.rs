//! Pass A: render `![alt](path.excalidraw)` references to SVG.
//!
//! References are numbered from zero in order of appearance. The `i`-th one
//! is resolved against the input document's directory, rendered by the
//! configured helper to `excalidraw-{i}.svg` in the workspace, and rewritten
//! to `![alt](excalidraw-{i}.svg)`.
//!
//! ## Rewrite modes
//!
//! [`RewriteMode::Positional`] splices each replacement at the reference's own
//! byte span, so two identical references become `excalidraw-0.svg` and
//! `excalidraw-1.svg`.
//!
//! [`RewriteMode::Literal`] instead replaces every occurrence of the literal
//! `![alt](path)` text as each match is processed. The first match of a
//! duplicated reference therefore rewrites all of its copies, later matches
//! find nothing left to replace, and every copy points at the first render
//! even though one SVG per occurrence is still produced.

use super::process::{self, CommandSpec};
use super::scan::{find_excalidraw_references, resolve_reference};
use super::splice::{splice, Replacement};
use super::{PassContext, PassOutcome};
use crate::config::{ConversionConfig, RewriteMode};
use crate::error::Md2DocxError;
use crate::output::{DiagramKind, RenderedDiagram};
use std::path::Path;
use tracing::info;

/// Run Pass A over `text`.
pub async fn render_references(
    text: &str,
    ctx: &PassContext<'_>,
) -> Result<PassOutcome, Md2DocxError> {
    info!("Processing Excalidraw diagrams...");
    let references = find_excalidraw_references(text);
    if references.is_empty() {
        info!("No Excalidraw diagrams found");
        return Ok(PassOutcome::unchanged(text));
    }

    let mode = ctx.config.rewrite;
    let mut replacements = Vec::with_capacity(references.len());
    let mut literal_text = text.to_string();
    let mut rendered = Vec::with_capacity(references.len());

    for (index, reference) in references.iter().enumerate() {
        info!("Found Excalidraw: {}", reference.path);
        ctx.notify(|cb| cb.on_diagram_start(DiagramKind::Excalidraw, index));

        let source = resolve_reference(ctx.document_dir, &reference.path);
        let svg_name = DiagramKind::Excalidraw.svg_name(index);
        let image = ctx.workspace.join(&svg_name);

        info!("Rendering to {}...", image.display());
        let spec = render_command(ctx.config, &source, &image);
        if let Err(e) = process::run(&spec).await {
            ctx.notify(|cb| cb.on_diagram_error(DiagramKind::Excalidraw, index, &e.to_string()));
            return Err(e);
        }

        let new_link = format!("![{}]({})", reference.alt, svg_name);
        match mode {
            RewriteMode::Positional => {
                replacements.push(Replacement::new(reference.span.clone(), new_link.clone()));
            }
            RewriteMode::Literal => {
                literal_text = literal_text.replace(&reference.literal(), &new_link);
            }
        }
        info!("Replaced link with: {}", new_link);
        ctx.notify(|cb| cb.on_diagram_complete(DiagramKind::Excalidraw, index, &svg_name));

        rendered.push(RenderedDiagram {
            kind: DiagramKind::Excalidraw,
            index,
            image,
            source,
        });
    }

    let text = match mode {
        RewriteMode::Positional => splice(text, &replacements)?,
        RewriteMode::Literal => literal_text,
    };
    Ok(PassOutcome { text, rendered })
}

/// `node render_excalidraw.js <source> <destination>`, or
/// `<program> <source> <destination>` when no script is configured.
pub fn render_command(config: &ConversionConfig, source: &Path, destination: &Path) -> CommandSpec {
    let mut spec = CommandSpec::new(&config.excalidraw_program);
    if let Some(ref script) = config.excalidraw_script {
        spec = spec.path_arg(script);
    }
    spec.path_arg(source).path_arg(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn command_with_default_script() {
        let config = ConversionConfig::builder()
            .tool_root("/opt/md2docx")
            .build()
            .unwrap();
        let spec = render_command(
            &config,
            Path::new("/docs/flow.excalidraw"),
            Path::new("/opt/md2docx/temp/temp_0/excalidraw-0.svg"),
        );
        assert_eq!(spec.program, "node");
        assert_eq!(
            spec.args,
            vec![
                "/opt/md2docx/render_excalidraw.js",
                "/docs/flow.excalidraw",
                "/opt/md2docx/temp/temp_0/excalidraw-0.svg",
            ]
        );
        assert_eq!(spec.cwd, None);
    }

    #[test]
    fn command_without_script() {
        let config = ConversionConfig::builder()
            .excalidraw_program("excalidraw-render")
            .excalidraw_script(None)
            .build()
            .unwrap();
        let spec = render_command(
            &config,
            &PathBuf::from("/a.excalidraw"),
            &PathBuf::from("/w/excalidraw-3.svg"),
        );
        assert_eq!(spec.program, "excalidraw-render");
        assert_eq!(spec.args, vec!["/a.excalidraw", "/w/excalidraw-3.svg"]);
    }
}
