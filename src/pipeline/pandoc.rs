//! Document conversion through pandoc.
//!
//! `pandoc <processed.md> -o <output> --resource-path <workspace> [extra…]`
//!
//! The rewritten Markdown refers to `excalidraw-N.svg` / `mermaid-N.svg` by
//! bare file name, so the workspace has to be on pandoc's resource path for
//! the images to be embedded.

use super::process::{self, CommandOutput, CommandSpec};
use crate::config::ConversionConfig;
use crate::error::Md2DocxError;
use std::path::Path;
use tracing::info;

/// Build the converter command line.
pub fn convert_command(
    config: &ConversionConfig,
    markdown: &Path,
    output: &Path,
    resource_dir: &Path,
) -> CommandSpec {
    CommandSpec::new(&config.converter)
        .path_arg(markdown)
        .arg("-o")
        .path_arg(output)
        .arg("--resource-path")
        .path_arg(resource_dir)
        .args(config.converter_args.iter().cloned())
}

/// Convert `markdown` to `output`, creating the output directory if needed.
pub async fn convert_document(
    config: &ConversionConfig,
    markdown: &Path,
    output: &Path,
    resource_dir: &Path,
) -> Result<CommandOutput, Md2DocxError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Md2DocxError::OutputWriteFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    info!("Converting to DOCX with {}...", config.converter);
    process::run(&convert_command(config, markdown, output, resource_dir)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_includes_resource_path() {
        let config = ConversionConfig::default();
        let spec = convert_command(
            &config,
            Path::new("/w/processed.md"),
            Path::new("/out/report.docx"),
            Path::new("/w"),
        );
        assert_eq!(spec.program, "pandoc");
        assert_eq!(
            spec.args,
            vec![
                "/w/processed.md",
                "-o",
                "/out/report.docx",
                "--resource-path",
                "/w"
            ]
        );
    }

    #[test]
    fn extra_arguments_are_appended() {
        let config = ConversionConfig::builder()
            .converter_args(["--reference-doc", "/t/ref.docx"])
            .build()
            .unwrap();
        let spec = convert_command(
            &config,
            Path::new("/w/processed.md"),
            Path::new("/o.docx"),
            Path::new("/w"),
        );
        assert_eq!(&spec.args[5..], ["--reference-doc", "/t/ref.docx"]);
    }
}
