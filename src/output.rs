//! Request and result types shared by the pipeline and the public API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Separator written between consecutive pages of the assembled body.
pub const PAGE_BREAK: char = '\u{000C}';

/// Normalized document metadata: field name → value.
///
/// Holds every `key: value` line reported by the metadata tool, plus the
/// derived `CreatedDate` / `ModifiedDate` epoch fields when their source
/// dates parse.
pub type Metadata = BTreeMap<String, String>;

/// A prepared PDF on disk, ready for conversion.
///
/// The request only names the file. Whoever created it owns its lifecycle;
/// the orchestrator reads it and never deletes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    source: PathBuf,
}

impl ConversionRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Path of the source PDF.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Timing and size figures for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages reported by the page renderer.
    pub page_count: usize,
    /// Wall-clock time of the metadata task.
    pub metadata_duration_ms: u64,
    /// Wall-clock time of the body task (render + assembly).
    pub body_duration_ms: u64,
    /// Wall-clock time of the whole conversion.
    pub total_duration_ms: u64,
}

/// The result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Sanitized page bodies joined by [`PAGE_BREAK`].
    pub body: String,
    /// Normalized metadata mapping.
    pub metadata: Metadata,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Iterate over the per-page segments of the body, in page order.
    ///
    /// A document with zero pages yields no segments.
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        let empty = self.stats.page_count == 0 && self.body.is_empty();
        self.body.split(PAGE_BREAK).filter(move |_| !empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(body: &str, page_count: usize) -> ConversionOutput {
        ConversionOutput {
            body: body.to_string(),
            metadata: Metadata::new(),
            stats: ConversionStats {
                page_count,
                ..Default::default()
            },
        }
    }

    #[test]
    fn pages_split_on_form_feed() {
        let out = output("A\u{000C}B\u{000C}C", 3);
        assert_eq!(out.pages().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn empty_page_is_still_a_segment() {
        let out = output("\u{000C}B", 2);
        assert_eq!(out.pages().collect::<Vec<_>>(), vec!["", "B"]);
    }

    #[test]
    fn zero_pages_yield_nothing() {
        let out = output("", 0);
        assert_eq!(out.pages().count(), 0);
    }

    #[test]
    fn request_keeps_path() {
        let req = ConversionRequest::new("/tmp/doc.pdf");
        assert_eq!(req.source(), Path::new("/tmp/doc.pdf"));
    }
}
