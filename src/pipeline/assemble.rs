//! Body assembly: render every page, then join their sanitised bodies.
//!
//! Pages are processed strictly in order `1..=N`. Each page file is read,
//! parsed, reduced to its content root and sanitised; the results are joined
//! with a single [`PAGE_BREAK`] between neighbours. Any unreadable page or
//! page without a `<body>` aborts the whole body: no partial text is returned.

use crate::error::Pdf2HtmlError;
use crate::output::PAGE_BREAK;
use crate::pipeline::locate::{find_content_root, parse_page};
use crate::pipeline::sanitize::{sanitize_page, SanitizeOptions};
use crate::pipeline::tools::PageRenderer;
use crate::progress::ProgressCallback;
use std::path::Path;
use tracing::{debug, info};

/// The assembled document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledBody {
    pub body: String,
    pub page_count: usize,
}

/// Render `source` and assemble its pages into one body.
pub async fn assemble_body(
    renderer: &dyn PageRenderer,
    source: &Path,
    options: SanitizeOptions,
    progress: Option<&ProgressCallback>,
) -> Result<AssembledBody, Pdf2HtmlError> {
    let rendered = renderer.render(source).await?;
    let total = rendered.page_count();
    info!("Assembling {} pages", total);

    if let Some(cb) = progress {
        cb.on_conversion_start(total);
    }

    let mut body = String::new();
    for page in 1..=total {
        let path = rendered.page_path(page);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| Pdf2HtmlError::PageRead {
                page,
                path: path.clone(),
                source,
            })?;

        let segment = page_body(&String::from_utf8_lossy(&bytes), page, options)?;
        debug!("Page {} → {} bytes", page, segment.len());

        body.push_str(&segment);
        if page != total {
            body.push(PAGE_BREAK);
        }

        if let Some(cb) = progress {
            cb.on_page_complete(page, total, segment.len());
        }
    }

    if let Some(cb) = progress {
        cb.on_conversion_complete(total);
    }

    Ok(AssembledBody {
        body,
        page_count: total,
    })
}

/// Extract the sanitised body of one page's markup.
///
/// The parsed tree lives only for the duration of this call.
pub fn page_body(markup: &str, page: usize, options: SanitizeOptions) -> Result<String, Pdf2HtmlError> {
    let doc = parse_page(markup);
    let root = find_content_root(&doc).ok_or(Pdf2HtmlError::MissingContentRoot { page })?;
    Ok(sanitize_page(root, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tools::RenderedPages;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Writes the given page markups as `<dir>/doc-N.html`.
    struct StaticPages {
        pages: Vec<&'static str>,
        reported: usize,
    }

    impl StaticPages {
        fn new(pages: Vec<&'static str>) -> Self {
            let reported = pages.len();
            Self { pages, reported }
        }
    }

    impl PageRenderer for StaticPages {
        fn render<'a>(
            &'a self,
            _source: &'a Path,
        ) -> BoxFuture<'a, Result<RenderedPages, Pdf2HtmlError>> {
            async move {
                let dir = TempDir::new().map_err(|e| Pdf2HtmlError::Internal(e.to_string()))?;
                let prefix: PathBuf = dir.path().join("doc");
                let rendered = RenderedPages::new(self.reported, &prefix);
                for (i, markup) in self.pages.iter().enumerate() {
                    std::fs::write(rendered.page_path(i + 1), markup)
                        .map_err(|e| Pdf2HtmlError::Internal(e.to_string()))?;
                }
                Ok::<_, Pdf2HtmlError>(rendered.with_workdir(dir))
            }
            .boxed()
        }
    }

    async fn assemble(renderer: StaticPages) -> Result<AssembledBody, Pdf2HtmlError> {
        assemble_body(&renderer, Path::new("doc.pdf"), SanitizeOptions::default(), None).await
    }

    #[tokio::test]
    async fn test_two_page_scenario() {
        let out = assemble(StaticPages::new(vec![
            "<body>A</body>",
            r#"<body>B<img src="x"/></body>"#,
        ]))
        .await
        .unwrap();
        assert_eq!(out.body, "A\u{000C}B");
        assert_eq!(out.page_count, 2);
    }

    #[tokio::test]
    async fn test_page_breaks_only_between_pages() {
        let out = assemble(StaticPages::new(vec![
            "<body>1</body>",
            "<body>2</body>",
            "<body>3</body>",
            "<body>4</body>",
        ]))
        .await
        .unwrap();
        assert_eq!(out.body.matches(PAGE_BREAK).count(), 3);
        assert_eq!(
            out.body.split(PAGE_BREAK).collect::<Vec<_>>(),
            vec!["1", "2", "3", "4"]
        );
    }

    #[tokio::test]
    async fn test_single_page_has_no_break() {
        let out = assemble(StaticPages::new(vec!["<body><p>only</p></body>"]))
            .await
            .unwrap();
        assert_eq!(out.body, "<p>only</p>");
    }

    #[tokio::test]
    async fn test_zero_pages_is_empty_body() {
        let out = assemble(StaticPages::new(vec![])).await.unwrap();
        assert_eq!(out.body, "");
        assert_eq!(out.page_count, 0);
    }

    #[tokio::test]
    async fn test_missing_body_aborts() {
        let err = assemble(StaticPages::new(vec![
            "<body>A</body>",
            "<html><head></head><frameset><frame src=\"a\"></frameset></html>",
            "<body>C</body>",
        ]))
        .await
        .unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::MissingContentRoot { page: 2 }), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_missing_page_file_aborts() {
        let mut renderer = StaticPages::new(vec!["<body>A</body>", "<body>B</body>"]);
        renderer.reported = 3;
        let err = assemble(renderer).await.unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::PageRead { page: 3, .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_progress_events_in_order() {
        struct Recorder(AtomicUsize, std::sync::Mutex<Vec<usize>>);
        impl crate::progress::ConversionProgressCallback for Recorder {
            fn on_conversion_start(&self, total_pages: usize) {
                self.0.store(total_pages, Ordering::SeqCst);
            }
            fn on_page_complete(&self, page_num: usize, _total: usize, _len: usize) {
                self.1.lock().unwrap().push(page_num);
            }
        }

        let recorder = Arc::new(Recorder(AtomicUsize::new(0), Default::default()));
        let cb: ProgressCallback = recorder.clone();
        let renderer = StaticPages::new(vec!["<body>a</body>", "<body>b</body>", "<body>c</body>"]);
        assemble_body(&renderer, Path::new("doc.pdf"), SanitizeOptions::default(), Some(&cb))
            .await
            .unwrap();

        assert_eq!(recorder.0.load(Ordering::SeqCst), 3);
        assert_eq!(*recorder.1.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_page_body_reports_page_number() {
        let err = page_body("<frameset></frameset>", 7, SanitizeOptions::default()).unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::MissingContentRoot { page: 7 }));
    }
}
