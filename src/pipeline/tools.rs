//! External tool seams: metadata extraction and page rendering.
//!
//! The conversion core never looks inside the PDF. It asks two collaborators
//! for text: a [`MetadataExtractor`] that dumps `key: value` lines, and a
//! [`PageRenderer`] that writes one markup file per page. The default
//! implementations shell out to poppler's `pdfinfo` and `pdftohtml`; tests
//! and embedders can inject their own through
//! [`crate::config::ConversionConfigBuilder`].
//!
//! ## Page count
//!
//! `pdftohtml` prints one diagnostic line per page on stdout. Rather than
//! trusting that side channel, [`PdfToHtml`] counts the consecutive
//! `<prefix>-N.html` files it actually produced and reports the number in
//! [`RenderedPages::page_count`]. A mismatch with the stdout line count is
//! logged.

use crate::error::Pdf2HtmlError;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Produces the raw metadata dump for a PDF.
pub trait MetadataExtractor: Send + Sync {
    /// Return the tool's `key: value` text for `source`.
    fn extract<'a>(&'a self, source: &'a Path) -> BoxFuture<'a, Result<String, Pdf2HtmlError>>;
}

/// Renders every page of a PDF to its own markup file.
pub trait PageRenderer: Send + Sync {
    /// Render `source` and report where the page files are.
    fn render<'a>(&'a self, source: &'a Path)
        -> BoxFuture<'a, Result<RenderedPages, Pdf2HtmlError>>;
}

/// Where a renderer left its page files, and how many there are.
///
/// Page `n` (1-indexed) lives at `<prefix>-<n>.html`. If the renderer used a
/// scratch directory it is owned here and deleted on drop.
#[derive(Debug)]
pub struct RenderedPages {
    page_count: usize,
    prefix: PathBuf,
    _workdir: Option<TempDir>,
}

impl RenderedPages {
    pub fn new(page_count: usize, prefix: impl Into<PathBuf>) -> Self {
        Self {
            page_count,
            prefix: prefix.into(),
            _workdir: None,
        }
    }

    /// Keep `dir` alive until the pages have been consumed.
    pub fn with_workdir(mut self, dir: TempDir) -> Self {
        self._workdir = Some(dir);
        self
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Path of the markup file for 1-indexed `page`.
    pub fn page_path(&self, page: usize) -> PathBuf {
        let mut name = self.prefix.clone().into_os_string();
        name.push(format!("-{page}.html"));
        PathBuf::from(name)
    }
}

// ── pdfinfo ──────────────────────────────────────────────────────────────

/// Metadata via `pdfinfo <file>`.
#[derive(Debug, Clone)]
pub struct PdfInfo {
    program: String,
    password: Option<String>,
}

impl PdfInfo {
    pub fn new(program: impl Into<String>, password: Option<String>) -> Self {
        Self {
            program: program.into(),
            password,
        }
    }
}

impl Default for PdfInfo {
    fn default() -> Self {
        Self::new("pdfinfo", None)
    }
}

impl MetadataExtractor for PdfInfo {
    fn extract<'a>(&'a self, source: &'a Path) -> BoxFuture<'a, Result<String, Pdf2HtmlError>> {
        async move {
            let mut cmd = Command::new(&self.program);
            if let Some(ref pwd) = self.password {
                cmd.arg("-upw").arg(pwd);
            }
            cmd.arg(source);

            let stdout = run_tool(&self.program, cmd, source).await?;
            Ok::<_, Pdf2HtmlError>(String::from_utf8_lossy(&stdout).into_owned())
        }
        .boxed()
    }
}

// ── pdftohtml ────────────────────────────────────────────────────────────

/// Page markup via `pdftohtml -c <file> <scratch>/<stem>.html`.
#[derive(Debug, Clone)]
pub struct PdfToHtml {
    program: String,
    password: Option<String>,
    extra_args: Vec<String>,
}

impl PdfToHtml {
    pub fn new(program: impl Into<String>, password: Option<String>) -> Self {
        Self {
            program: program.into(),
            password,
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }
}

impl Default for PdfToHtml {
    fn default() -> Self {
        Self::new("pdftohtml", None)
    }
}

impl PageRenderer for PdfToHtml {
    fn render<'a>(
        &'a self,
        source: &'a Path,
    ) -> BoxFuture<'a, Result<RenderedPages, Pdf2HtmlError>> {
        async move {
            let workdir = tempfile::Builder::new()
                .prefix("pdf2html-")
                .tempdir()
                .map_err(|e| Pdf2HtmlError::Internal(format!("scratch dir: {e}")))?;

            let stem = source
                .file_stem()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| OsStr::new("document"));
            let prefix = workdir.path().join(stem);
            // pdftohtml drops a trailing ".html" from the target and names
            // complex-mode pages "<base>-<n>.html".
            let mut target = prefix.clone().into_os_string();
            target.push(".html");

            let mut cmd = Command::new(&self.program);
            cmd.arg("-c");
            if let Some(ref pwd) = self.password {
                cmd.arg("-upw").arg(pwd);
            }
            cmd.args(&self.extra_args).arg(source).arg(&target);

            let stdout = run_tool(&self.program, cmd, source).await?;
            let reported = count_lines(&stdout);

            let rendered = RenderedPages::new(0, prefix).with_workdir(workdir);
            let page_count = count_page_files(&rendered).await;
            if page_count != reported {
                warn!(
                    "{} reported {} pages but wrote {} page files; using {}",
                    self.program, reported, page_count, page_count
                );
            }
            info!("Rendered {} pages to {}", page_count, rendered.prefix().display());

            Ok::<_, Pdf2HtmlError>(RenderedPages {
                page_count,
                ..rendered
            })
        }
        .boxed()
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run `cmd` to completion and return its stdout.
async fn run_tool(tool: &str, mut cmd: Command, source: &Path) -> Result<Vec<u8>, Pdf2HtmlError> {
    debug!("Running {} on {}", tool, source.display());

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| Pdf2HtmlError::ToolLaunch {
            tool: tool.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(Pdf2HtmlError::ToolFailed {
            tool: tool.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    debug!("{} wrote {} bytes to stdout", tool, output.stdout.len());
    Ok(output.stdout)
}

fn count_lines(stdout: &[u8]) -> usize {
    stdout.iter().filter(|&&b| b == b'\n').count()
}

/// Count the consecutive page files `-1.html`, `-2.html`, … that exist.
async fn count_page_files(rendered: &RenderedPages) -> usize {
    let mut count = 0;
    while tokio::fs::try_exists(rendered.page_path(count + 1))
        .await
        .unwrap_or(false)
    {
        count += 1;
    }
    count
}
