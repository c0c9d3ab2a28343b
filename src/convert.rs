//! Conversion entry points and the two-task orchestrator.
//!
//! ## Fan-out / join
//!
//! [`convert_request`] spawns two independent tokio tasks against the same
//! source file:
//!
//! ```text
//!                  ┌─ metadata task: extractor → normalize_metadata ─┐
//! ConversionRequest┤                                                  ├─ join ─▶ ConversionOutput
//!                  └─ body task:     renderer → page 1..N → join     ─┘
//! ```
//!
//! Each task owns its result and hands it over exactly once through its
//! `JoinHandle`. The tasks share no mutable state and only read the source
//! file. Both are awaited before anything is returned, and the output is
//! all-or-nothing: if either task failed no body or metadata is returned;
//! if both failed the two errors are combined.

use crate::config::ConversionConfig;
use crate::error::Pdf2HtmlError;
use crate::output::{ConversionOutput, ConversionRequest, ConversionStats, Metadata};
use crate::pipeline::assemble::{assemble_body, AssembledBody};
use crate::pipeline::input::{self, PreparedInput};
use crate::pipeline::metadata::extract_metadata;
use crate::pipeline::sanitize::SanitizeOptions;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

/// Convert a PDF file or URL to an HTML body plus metadata.
///
/// # Errors
/// Input errors (missing file, not a PDF, download failure) and any failure
/// of the metadata or body task.
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);

    let prepared = input::resolve_input(input_str, config.download_timeout_secs).await?;
    convert_prepared(&prepared, config).await
}

/// Run both extraction tasks on a prepared file and join their results.
///
/// The request's file is only read; its lifecycle stays with the caller.
pub async fn convert_request(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    let total_start = Instant::now();
    let source = request.source().to_path_buf();

    let extractor = config.metadata_extractor();
    let meta_source = source.clone();
    let metadata_task = tokio::spawn(async move {
        let start = Instant::now();
        let result = extract_metadata(extractor.as_ref(), &meta_source).await;
        (result, elapsed_ms(start))
    });

    let renderer = config.page_renderer();
    let options = SanitizeOptions::from(config);
    let progress = config.progress_callback.clone();
    let body_task = tokio::spawn(async move {
        let start = Instant::now();
        let result = assemble_body(renderer.as_ref(), &source, options, progress.as_ref()).await;
        (result, elapsed_ms(start))
    });

    let (metadata_joined, body_joined) = tokio::join!(metadata_task, body_task);
    let (metadata, metadata_duration_ms) = flatten_join("metadata", metadata_joined);
    let (body, body_duration_ms) = flatten_join("body", body_joined);

    let (metadata, body) = join_results(metadata, body)?;

    let stats = ConversionStats {
        page_count: body.page_count,
        metadata_duration_ms,
        body_duration_ms,
        total_duration_ms: elapsed_ms(total_start),
    };

    info!(
        "Conversion complete: {} pages, {} metadata fields, {}ms total",
        stats.page_count,
        metadata.len(),
        stats.total_duration_ms
    );

    Ok(ConversionOutput {
        body: body.body,
        metadata,
        stats,
    })
}

/// Stage `reader` into a temp file, convert it, then delete the file.
pub async fn convert_reader<R: Read>(
    reader: R,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    let prepared = input::stage_reader(reader)?;
    // `prepared` is dropped (and the file deleted) when this returns
    convert_prepared(&prepared, config).await
}

/// Convert PDF bytes held in memory.
///
/// # Example
/// ```rust,no_run
/// use pdf2html::{convert_from_bytes, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("document.pdf")?;
/// let output = convert_from_bytes(&bytes, &ConversionConfig::default()).await?;
/// println!("{}", output.body);
/// # Ok(())
/// # }
/// ```
pub async fn convert_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    convert_reader(bytes, config).await
}

/// Convert a PDF and write the body directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Pdf2HtmlError> {
    let output = convert(input_str, config).await?;
    let path = output_path.as_ref();
    let write_failed = |source: std::io::Error| Pdf2HtmlError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let tmp_path = path.with_extension("html.tmp");
    tokio::fs::write(&tmp_path, &output.body)
        .await
        .map_err(write_failed)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_failed(e));
    }

    debug!("Wrote {} bytes to {}", output.body.len(), path.display());
    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2HtmlError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, config))
}

/// Extract normalized metadata only, without rendering any page.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<Metadata, Pdf2HtmlError> {
    let prepared = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let extractor = config.metadata_extractor();
    extract_metadata(extractor.as_ref(), prepared.path()).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn convert_prepared(
    prepared: &PreparedInput,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    let request = ConversionRequest::new(prepared.path());
    convert_request(&request, config).await
}

/// Turn a task panic into an ordinary error.
fn flatten_join<T>(
    task: &str,
    joined: Result<(Result<T, Pdf2HtmlError>, u64), JoinError>,
) -> (Result<T, Pdf2HtmlError>, u64) {
    match joined {
        Ok(done) => done,
        Err(e) => (
            Err(Pdf2HtmlError::Internal(format!("{task} task panicked: {e}"))),
            0,
        ),
    }
}

/// Both results must succeed; otherwise report every failure.
fn join_results(
    metadata: Result<Metadata, Pdf2HtmlError>,
    body: Result<AssembledBody, Pdf2HtmlError>,
) -> Result<(Metadata, AssembledBody), Pdf2HtmlError> {
    match (metadata, body) {
        (Ok(metadata), Ok(body)) => Ok((metadata, body)),
        (metadata, body) => {
            let metadata_err = metadata.err();
            let body_err = body.err();
            if let Some(ref e) = metadata_err {
                warn!("Metadata task failed: {}", e);
            }
            if let Some(ref e) = body_err {
                warn!("Body task failed: {}", e);
            }
            Err(Pdf2HtmlError::from_task_failures(metadata_err, body_err)
                .unwrap_or_else(|| Pdf2HtmlError::Internal("task failure without error".into())))
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> AssembledBody {
        AssembledBody {
            body: text.to_string(),
            page_count: 1,
        }
    }

    #[test]
    fn test_join_both_ok() {
        let mut meta = Metadata::new();
        meta.insert("Title".into(), "T".into());
        let (m, b) = join_results(Ok(meta), Ok(body("x"))).unwrap();
        assert_eq!(m["Title"], "T");
        assert_eq!(b.body, "x");
    }

    #[test]
    fn test_join_metadata_failure_discards_body() {
        let err = join_results(
            Err(Pdf2HtmlError::Internal("pdfinfo broke".into())),
            Ok(body("x")),
        )
        .unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::Internal(ref m) if m == "pdfinfo broke"));
    }

    #[test]
    fn test_join_both_failed_is_composite() {
        let err = join_results(
            Err(Pdf2HtmlError::Internal("meta".into())),
            Err(Pdf2HtmlError::MissingContentRoot { page: 1 }),
        )
        .unwrap_err();
        match err {
            Pdf2HtmlError::BothTasksFailed { metadata, body } => {
                assert!(matches!(*metadata, Pdf2HtmlError::Internal(_)));
                assert!(matches!(*body, Pdf2HtmlError::MissingContentRoot { page: 1 }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_internal_error() {
        let handle = tokio::spawn(async {
            if true {
                panic!("boom");
            }
            (Ok::<(), Pdf2HtmlError>(()), 0u64)
        });
        let (result, ms) = flatten_join("body", handle.await);
        assert_eq!(ms, 0);
        assert!(matches!(result, Err(Pdf2HtmlError::Internal(ref m)) if m.contains("body task panicked")));
    }
}
