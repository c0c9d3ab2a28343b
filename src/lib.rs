//! # pdf2html
//!
//! Convert PDF documents into an HTML body plus a normalized metadata map,
//! using poppler's `pdfinfo` and `pdftohtml` as external extractors.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     resolve local file, URL or byte stream to a file on disk
//!  ├─ 2. Fan out   two concurrent tokio tasks on the same file
//!  │     ├─ Metadata   pdfinfo → key: value map → CreatedDate / ModifiedDate
//!  │     └─ Body       pdftohtml -c → page 1..N → <body> → strip <img/>
//!  └─ 3. Join      body pages separated by form feeds (\f) + metadata
//! ```
//!
//! Output is all-or-nothing: if either task fails, no body and no metadata
//! are returned. When both fail, [`Pdf2HtmlError::BothTasksFailed`] carries
//! both errors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2html::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("document.pdf", &config).await?;
//!     for (i, page) in output.pages().enumerate() {
//!         println!("page {}: {} bytes", i + 1, page.len());
//!     }
//!     println!("modified: {:?}", output.metadata.get("ModifiedDate"));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2html` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2html = { version = "0.1", default-features = false }
//! ```
//!
//! ## Requirements
//!
//! `pdfinfo` and `pdftohtml` (poppler-utils) must be installed, or custom
//! [`MetadataExtractor`] / [`PageRenderer`] implementations injected through
//! [`ConversionConfig::builder`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{
    convert, convert_from_bytes, convert_reader, convert_request, convert_sync, convert_to_file,
    inspect,
};
pub use error::Pdf2HtmlError;
pub use output::{ConversionOutput, ConversionRequest, ConversionStats, Metadata, PAGE_BREAK};
pub use pipeline::tools::{MetadataExtractor, PageRenderer, PdfInfo, PdfToHtml, RenderedPages};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
