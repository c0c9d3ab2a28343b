//! CLI binary for pdf2html.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2html::{
    convert, convert_to_file, inspect, ConversionConfig, ConversionProgressCallback,
    ProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while poppler renders, then a page bar while pages are assembled.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Rendering");
        bar.set_message("running pdftohtml…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_length(total_pages as u64);
        self.bar.set_prefix("Assembling");
    }

    fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _body_len: usize) {
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages assembled",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (body to stdout)
  pdf2html document.pdf

  # Convert to file
  pdf2html document.pdf -o document.html

  # Full output (body + metadata + stats) as JSON
  pdf2html --json document.pdf > output.json

  # Metadata only
  pdf2html --inspect-only document.pdf

  # Convert from URL, keeping the <body> tags and images
  pdf2html --include-body-tag --keep-images https://example.com/report.pdf

OUTPUT:
  Pages are separated by a form feed (\f). Self-closing <img .../> elements
  are removed unless --keep-images is given.

ENVIRONMENT VARIABLES:
  PDF2HTML_PDFINFO        Path to the pdfinfo binary
  PDF2HTML_PDFTOHTML      Path to the pdftohtml binary
  RUST_LOG                Log filter (overrides -v / -q)

SETUP:
  Install poppler-utils (apt install poppler-utils / brew install poppler).
"#;

/// Convert PDF files and URLs to an HTML body plus metadata.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2html",
    version,
    about = "Convert PDF files and URLs to an HTML body plus metadata using poppler",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write the HTML body to this file instead of stdout.
    #[arg(short, long, env = "PDF2HTML_OUTPUT")]
    output: Option<PathBuf>,

    /// Output structured JSON (ConversionOutput) instead of the body.
    #[arg(long, env = "PDF2HTML_JSON")]
    json: bool,

    /// Print PDF metadata only, no rendering.
    #[arg(long)]
    inspect_only: bool,

    /// Keep each page's <body> element around its content.
    #[arg(long, env = "PDF2HTML_INCLUDE_BODY_TAG")]
    include_body_tag: bool,

    /// Do not strip self-closing <img/> elements.
    #[arg(long, env = "PDF2HTML_KEEP_IMAGES")]
    keep_images: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2HTML_PASSWORD")]
    password: Option<String>,

    /// pdfinfo binary.
    #[arg(long, env = "PDF2HTML_PDFINFO", default_value = "pdfinfo")]
    pdfinfo: String,

    /// pdftohtml binary.
    #[arg(long, env = "PDF2HTML_PDFTOHTML", default_value = "pdftohtml")]
    pdftohtml: String,

    /// Extra argument passed to pdftohtml (repeatable).
    #[arg(long = "pdftohtml-arg", value_name = "ARG", allow_hyphen_values = true)]
    pdftohtml_args: Vec<String>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2HTML_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "PDF2HTML_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2HTML_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2HTML_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input, &config)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            let width = meta.keys().map(|k| k.len()).max().unwrap_or(0) + 1;
            for (key, value) in &meta {
                println!("{:<width$} {}", format!("{key}:"), value, width = width);
            }
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = convert_to_file(&cli.input, output_path, &config)
            .await
            .context("Conversion failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} pages  {}ms  →  {}",
                green("✔"),
                stats.page_count,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let output = convert(&cli.input, &config)
            .await
            .context("Conversion failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.body.as_bytes())
                .context("Failed to write to stdout")?;
            if !output.body.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        if !cli.quiet && !cli.json {
            eprintln!(
                "   {}",
                dim(&format!(
                    "{} pages, {} metadata fields, {}ms total",
                    output.stats.page_count,
                    output.metadata.len(),
                    output.stats.total_duration_ms
                )),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .pdfinfo_program(&cli.pdfinfo)
        .pdftohtml_program(&cli.pdftohtml)
        .pdftohtml_args(cli.pdftohtml_args.iter().cloned())
        .include_body_tag(cli.include_body_tag)
        .strip_images(!cli.keep_images)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
