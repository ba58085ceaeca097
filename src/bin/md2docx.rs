//! CLI binary for edgequake-md2docx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_md2docx::{
    convert, inspect, preprocess, CleanupPolicy, ConversionConfig, ConversionProgressCallback,
    DiagramKind, LaunchMode, ProgressCallback, RewriteMode,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner that switches to a bar once the
/// number of diagrams is known, plus one log line per rendered diagram.
struct CliProgressCallback {
    bar: ProgressBar,
    done: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Reading Markdown…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            done: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_diagrams: usize) {
        if total_diagrams > 0 {
            self.bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} {prefix:.bold}  \
                     [{bar:42.green/238}] {pos:>3}/{len} diagrams  ⏱ {elapsed_precise}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  ")
                .tick_strings(TICKS),
            );
            self.bar.set_length(total_diagrams as u64);
        }
        self.bar.set_prefix("Rendering");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_diagrams} diagrams"))
        ));
    }

    fn on_diagram_start(&self, kind: DiagramKind, index: usize) {
        self.bar.set_message(format!("{kind} #{index}"));
    }

    fn on_diagram_complete(&self, kind: DiagramKind, index: usize, image: &str) {
        self.done.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:<10} #{:<3} {}",
            green("✓"),
            kind.to_string(),
            index,
            dim(image)
        ));
        self.bar.inc(1);
    }

    fn on_diagram_error(&self, kind: DiagramKind, index: usize, error: &str) {
        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} {:<10} #{:<3} {}",
            red("✗"),
            kind.to_string(),
            index,
            red(first_line)
        ));
        self.bar.abandon();
    }

    fn on_convert_start(&self) {
        self.bar.set_prefix("Converting");
        self.bar.set_message("pandoc…");
    }

    fn on_conversion_complete(&self, rendered: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} diagrams rendered",
            green("✔"),
            bold(&rendered.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion
  md2docx design.md design.docx

  # Remove the scratch workspace after a successful run
  md2docx --cleanup on-success design.md design.docx

  # Use a pandoc reference document for styles
  md2docx design.md design.docx --converter-arg=--reference-doc=template.docx

  # List diagrams without rendering anything
  md2docx --inspect-only design.md

  # Render diagrams and stop before pandoc
  md2docx --markdown-only design.md

  # Machine-readable run report
  md2docx --json design.md design.docx > report.json

EXTERNAL TOOLS:
  node + render_excalidraw.js   Excalidraw → SVG  (from the tool directory)
  npx mmdc                      Mermaid → SVG     (@mermaid-js/mermaid-cli)
  pandoc                        Markdown → DOCX

WORKSPACE:
  Intermediate files go to <tool dir>/temp/temp_<8 hex>/:
    excalidraw-N.svg, mermaid-N.mmd, mermaid-N.svg, processed.md
  They are kept by default; see --cleanup.

ENVIRONMENT VARIABLES:
  MD2DOCX_HOME        Tool directory (default: directory of the executable)
  MD2DOCX_WORKSPACE   Base workspace directory (default: $MD2DOCX_HOME/temp)
  RUST_LOG            Override log filter (e.g. edgequake_md2docx=debug)
"#;

/// Convert Markdown with Excalidraw and Mermaid diagrams to DOCX.
#[derive(Parser, Debug)]
#[command(
    name = "md2docx",
    version,
    about = "Convert Markdown with Excalidraw and Mermaid diagrams to DOCX",
    long_about = "Convert a Markdown document to DOCX with pandoc, first rendering \
`![alt](file.excalidraw)` references and ```mermaid fenced blocks to SVG images and \
rewriting the document to reference them.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input Markdown file.
    input: PathBuf,

    /// Output DOCX file.
    #[arg(required_unless_present_any = ["inspect_only", "markdown_only"])]
    output: Option<PathBuf>,

    /// Tool directory: holds render_excalidraw.js, node_modules, and temp/.
    #[arg(long, env = "MD2DOCX_HOME")]
    tool_root: Option<PathBuf>,

    /// Base directory for per-run workspaces.
    #[arg(long, env = "MD2DOCX_WORKSPACE")]
    workspace_dir: Option<PathBuf>,

    /// Program that renders Excalidraw files.
    #[arg(long, env = "MD2DOCX_EXCALIDRAW_PROGRAM", default_value = "node")]
    excalidraw_program: String,

    /// Script passed to the Excalidraw program (default: <tool dir>/render_excalidraw.js).
    #[arg(long, env = "MD2DOCX_EXCALIDRAW_SCRIPT", conflicts_with = "no_excalidraw_script")]
    excalidraw_script: Option<PathBuf>,

    /// Call the Excalidraw program as `<program> <src> <dst>` with no script.
    #[arg(long)]
    no_excalidraw_script: bool,

    /// Package-manager launcher for the Mermaid CLI.
    #[arg(long, env = "MD2DOCX_LAUNCHER", default_value = "npx")]
    launcher: String,

    /// Mermaid CLI binary run by the launcher.
    #[arg(long, env = "MD2DOCX_MERMAID_TOOL", default_value = "mmdc")]
    mermaid_tool: String,

    /// Run the launcher through the shell instead of resolving it on PATH.
    #[arg(long, env = "MD2DOCX_SHELL_LAUNCHER")]
    shell_launcher: bool,

    /// Document converter.
    #[arg(long, env = "MD2DOCX_CONVERTER", default_value = "pandoc")]
    converter: String,

    /// Extra argument for the converter (repeatable).
    #[arg(long = "converter-arg", allow_hyphen_values = true)]
    converter_args: Vec<String>,

    /// What to do with the workspace when the run ends.
    #[arg(long, env = "MD2DOCX_CLEANUP", value_enum, default_value = "keep")]
    cleanup: CleanupArg,

    /// How Excalidraw references are rewritten.
    #[arg(long, env = "MD2DOCX_REWRITE", value_enum, default_value = "positional")]
    rewrite: RewriteArg,

    /// List diagrams found in the input and exit.
    #[arg(long, conflicts_with = "markdown_only")]
    inspect_only: bool,

    /// Render diagrams and write processed.md, but do not run the converter.
    #[arg(long)]
    markdown_only: bool,

    /// Print a JSON report on stdout.
    #[arg(long, env = "MD2DOCX_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MD2DOCX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2DOCX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2DOCX_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum CleanupArg {
    Keep,
    OnSuccess,
    Always,
}

impl From<CleanupArg> for CleanupPolicy {
    fn from(v: CleanupArg) -> Self {
        match v {
            CleanupArg::Keep => CleanupPolicy::Keep,
            CleanupArg::OnSuccess => CleanupPolicy::OnSuccess,
            CleanupArg::Always => CleanupPolicy::Always,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum RewriteArg {
    Positional,
    Literal,
}

impl From<RewriteArg> for RewriteMode {
    fn from(v: RewriteArg) -> Self {
        match v {
            RewriteArg::Positional => RewriteMode::Positional,
            RewriteArg::Literal => RewriteMode::Literal,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let inventory = inspect(&cli.input)
            .await
            .context("Failed to inspect Markdown")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&inventory)
                    .context("Failed to serialise inventory")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            println!("Excalidraw:   {}", inventory.excalidraw.len());
            for (i, r) in inventory.excalidraw.iter().enumerate() {
                println!("  [{i}] ![{}]({})", r.alt, r.path);
            }
            println!("Mermaid:      {}", inventory.mermaid.len());
            for (i, b) in inventory.mermaid.iter().enumerate() {
                let first = b.source.lines().next().unwrap_or("");
                println!("  [{i}] {} ({} lines)", first, b.source.lines().count());
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let report = match cli.output {
        Some(ref output) if !cli.markdown_only => convert(&cli.input, output, &config)
            .await
            .context("Conversion failed")?,
        _ => preprocess(&cli.input, &config)
            .await
            .context("Preprocessing failed")?,
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        match report.output {
            Some(ref output) => eprintln!(
                "{}  {} excalidraw / {} mermaid  {}ms  →  {}",
                green("✔"),
                report.stats.excalidraw_rendered,
                report.stats.mermaid_rendered,
                report.stats.total_duration_ms,
                bold(&output.display().to_string()),
            ),
            None => eprintln!(
                "{}  processed Markdown  →  {}",
                green("✔"),
                bold(&report.processed_markdown.display().to_string()),
            ),
        }
        if !report.workspace_removed {
            eprintln!(
                "   {} {}",
                dim("workspace kept at"),
                dim(&report.workspace.display().to_string())
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .excalidraw_program(&cli.excalidraw_program)
        .launcher(&cli.launcher)
        .mermaid_tool(&cli.mermaid_tool)
        .launch_mode(if cli.shell_launcher {
            LaunchMode::Shell
        } else {
            LaunchMode::Resolve
        })
        .converter(&cli.converter)
        .converter_args(cli.converter_args.iter().cloned())
        .cleanup(cli.cleanup.clone().into())
        .rewrite(cli.rewrite.clone().into());

    if let Some(ref root) = cli.tool_root {
        builder = builder.tool_root(root);
    }
    if let Some(ref dir) = cli.workspace_dir {
        builder = builder.workspace_root(dir);
    }
    if cli.no_excalidraw_script {
        builder = builder.excalidraw_script(None);
    } else if let Some(ref script) = cli.excalidraw_script {
        builder = builder.excalidraw_script(Some(script.clone()));
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
