//! Error types for the pdf2html library.
//!
//! Every failure is fatal to the conversion: the output is all-or-nothing,
//! so there is no per-page error type. A date field that cannot be parsed is
//! not an error at all (see [`crate::pipeline::metadata`]).
//!
//! The two concurrent tasks each hold their own failure until the
//! orchestrator joins them. When both fail, [`Pdf2HtmlError::BothTasksFailed`]
//! keeps both errors instead of dropping one.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// All fatal errors returned by the pdf2html library.
#[derive(Debug, Error)]
pub enum Pdf2HtmlError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── External tool errors ──────────────────────────────────────────────
    /// An external tool could not be started at all.
    #[error("Failed to launch '{tool}': {source}\nIs poppler-utils installed and on PATH?")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran but exited unsuccessfully.
    #[error("'{tool}' exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    // ── Page errors ───────────────────────────────────────────────────────
    /// A rendered page file could not be read back from disk.
    #[error("Failed to read rendered page {page} at '{path}': {source}")]
    PageRead {
        page: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rendered page has no `<body>` element.
    #[error("Missing <body> in the markup of page {page}")]
    MissingContentRoot { page: usize },

    // ── Orchestration errors ──────────────────────────────────────────────
    /// Metadata extraction and body assembly both failed.
    #[error("Metadata extraction failed: {metadata}\nBody assembly failed: {body}")]
    BothTasksFailed {
        metadata: Box<Pdf2HtmlError>,
        body: Box<Pdf2HtmlError>,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output HTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2HtmlError {
    /// Combine the outcomes of the metadata and body tasks.
    ///
    /// Returns `None` when neither failed.
    pub fn from_task_failures(
        metadata: Option<Pdf2HtmlError>,
        body: Option<Pdf2HtmlError>,
    ) -> Option<Pdf2HtmlError> {
        match (metadata, body) {
            (Some(metadata), Some(body)) => Some(Pdf2HtmlError::BothTasksFailed {
                metadata: Box::new(metadata),
                body: Box::new(body),
            }),
            (Some(e), None) | (None, Some(e)) => Some(e),
            (None, None) => None,
        }
    }
}
