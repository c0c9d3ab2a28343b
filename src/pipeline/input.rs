//! Input resolution: turn a user-supplied path, URL or byte stream into a
//! prepared PDF on disk.
//!
//! Both poppler tools need a file-system path. Local files are used in place
//! after a `%PDF` magic check. Downloads and in-memory data are staged into a
//! `pdf-convert-*.pdf` temp file that is deleted when the [`PreparedInput`]
//! is dropped.

use crate::error::Pdf2HtmlError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A PDF ready to hand to the orchestrator.
#[derive(Debug)]
pub enum PreparedInput {
    /// Input was already a local file; it is left untouched.
    Local(PathBuf),
    /// Input was downloaded or streamed into a temp file owned here.
    Staged(NamedTempFile),
}

impl PreparedInput {
    /// Path to the PDF regardless of how it was prepared.
    pub fn path(&self) -> &Path {
        match self {
            PreparedInput::Local(p) => p,
            PreparedInput::Staged(f) => f.path(),
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a path or HTTP(S) URL to a local PDF.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<PreparedInput, Pdf2HtmlError> {
    if input.trim().is_empty() {
        return Err(Pdf2HtmlError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(Path::new(input))
    }
}

/// Copy `reader` into a staged temp file.
pub fn stage_reader<R: Read>(mut reader: R) -> Result<PreparedInput, Pdf2HtmlError> {
    let mut file = new_staging_file()?;
    std::io::copy(&mut reader, &mut file)
        .map_err(|e| Pdf2HtmlError::Internal(format!("staging write: {e}")))?;
    file.flush()
        .map_err(|e| Pdf2HtmlError::Internal(format!("staging flush: {e}")))?;
    debug!("Staged input at {}", file.path().display());
    Ok(PreparedInput::Staged(file))
}

/// Validate a local file: it must exist, be readable and start with `%PDF`.
fn resolve_local(path: &Path) -> Result<PreparedInput, Pdf2HtmlError> {
    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2HtmlError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2HtmlError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_ok() {
        check_magic(&magic, path)?;
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(PreparedInput::Local(path.to_path_buf()))
}

/// Download a URL into a staged temp file.
async fn download_url(url: &str, timeout_secs: u64) -> Result<PreparedInput, Pdf2HtmlError> {
    info!("Downloading PDF from: {}", url);

    let failed = |reason: String| Pdf2HtmlError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Pdf2HtmlError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

    let staged = stage_reader(bytes.as_ref())?;
    if bytes.len() >= 4 {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        check_magic(&magic, staged.path())?;
    }

    info!("Downloaded {} bytes to: {}", bytes.len(), staged.path().display());
    Ok(staged)
}

fn new_staging_file() -> Result<NamedTempFile, Pdf2HtmlError> {
    tempfile::Builder::new()
        .prefix("pdf-convert-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Pdf2HtmlError::Internal(format!("tempfile: {e}")))
}

fn check_magic(magic: &[u8; 4], path: &Path) -> Result<(), Pdf2HtmlError> {
    if magic != PDF_MAGIC {
        return Err(Pdf2HtmlError::NotAPdf {
            path: path.to_path_buf(),
            magic: *magic,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = resolve_input("/definitely/not/a/real/file.pdf", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::FileNotFound { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_empty_input_is_invalid() {
        let err = resolve_input("  ", 5).await.unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"hello world").unwrap();

        let err = resolve_input(path.to_str().unwrap(), 5).await.unwrap_err();
        match err {
            Pdf2HtmlError::NotAPdf { magic, .. } => assert_eq!(&magic, b"hell"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_local_pdf_left_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.7\n").unwrap();

        let prepared = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(prepared.path(), path.as_path());
        drop(prepared);
        assert!(path.exists(), "local inputs must not be deleted");
    }

    #[test]
    fn test_staged_file_removed_on_drop() {
        let prepared = stage_reader(&b"%PDF-1.4 data"[..]).unwrap();
        let path = prepared.path().to_path_buf();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("pdf-convert-") && name.ends_with(".pdf"), "got: {name}");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 data");

        drop(prepared);
        assert!(!path.exists());
    }
}
