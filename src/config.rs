//! Configuration types for PDF-to-HTML conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The external tools are reached through
//! the [`MetadataExtractor`] and [`PageRenderer`] seams; when none are
//! injected, the poppler implementations are built from the configured
//! program paths.

use crate::error::Pdf2HtmlError;
use crate::pipeline::tools::{MetadataExtractor, PageRenderer, PdfInfo, PdfToHtml};
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Configuration for a PDF-to-HTML conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2html::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .pdftohtml_program("/opt/poppler/bin/pdftohtml")
///     .include_body_tag(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Program used for metadata extraction. Default: `pdfinfo`.
    pub pdfinfo_program: String,

    /// Program used for page rendering. Default: `pdftohtml`.
    pub pdftohtml_program: String,

    /// Extra arguments passed to `pdftohtml` after `-c`.
    pub pdftohtml_args: Vec<String>,

    /// PDF user password for encrypted documents, passed as `-upw`.
    pub password: Option<String>,

    /// Keep the `<body>` element itself in each page segment. Default: false.
    ///
    /// When false only the children of `<body>` are serialized.
    pub include_body_tag: bool,

    /// Remove self-closing `<img .../>` elements from each page. Default: true.
    pub strip_images: bool,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Pre-constructed metadata extractor. Takes precedence over `pdfinfo_program`.
    pub metadata_extractor: Option<Arc<dyn MetadataExtractor>>,

    /// Pre-constructed page renderer. Takes precedence over `pdftohtml_program`.
    pub page_renderer: Option<Arc<dyn PageRenderer>>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pdfinfo_program: "pdfinfo".to_string(),
            pdftohtml_program: "pdftohtml".to_string(),
            pdftohtml_args: Vec::new(),
            password: None,
            include_body_tag: false,
            strip_images: true,
            download_timeout_secs: 120,
            metadata_extractor: None,
            page_renderer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("pdfinfo_program", &self.pdfinfo_program)
            .field("pdftohtml_program", &self.pdftohtml_program)
            .field("pdftohtml_args", &self.pdftohtml_args)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("include_body_tag", &self.include_body_tag)
            .field("strip_images", &self.strip_images)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "metadata_extractor",
                &self.metadata_extractor.as_ref().map(|_| "<dyn MetadataExtractor>"),
            )
            .field(
                "page_renderer",
                &self.page_renderer.as_ref().map(|_| "<dyn PageRenderer>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The metadata extractor to use: the injected one, else `pdfinfo`.
    pub fn metadata_extractor(&self) -> Arc<dyn MetadataExtractor> {
        match self.metadata_extractor {
            Some(ref extractor) => Arc::clone(extractor),
            None => Arc::new(PdfInfo::new(
                self.pdfinfo_program.clone(),
                self.password.clone(),
            )),
        }
    }

    /// The page renderer to use: the injected one, else `pdftohtml`.
    pub fn page_renderer(&self) -> Arc<dyn PageRenderer> {
        match self.page_renderer {
            Some(ref renderer) => Arc::clone(renderer),
            None => Arc::new(
                PdfToHtml::new(self.pdftohtml_program.clone(), self.password.clone())
                    .with_extra_args(self.pdftohtml_args.clone()),
            ),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn pdfinfo_program(mut self, program: impl Into<String>) -> Self {
        self.config.pdfinfo_program = program.into();
        self
    }

    pub fn pdftohtml_program(mut self, program: impl Into<String>) -> Self {
        self.config.pdftohtml_program = program.into();
        self
    }

    pub fn pdftohtml_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.pdftohtml_args.push(arg.into());
        self
    }

    pub fn pdftohtml_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.pdftohtml_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn include_body_tag(mut self, v: bool) -> Self {
        self.config.include_body_tag = v;
        self
    }

    pub fn strip_images(mut self, v: bool) -> Self {
        self.config.strip_images = v;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn metadata_extractor(mut self, extractor: Arc<dyn MetadataExtractor>) -> Self {
        self.config.metadata_extractor = Some(extractor);
        self
    }

    pub fn page_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.config.page_renderer = Some(renderer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2HtmlError> {
        let c = &self.config;
        if c.pdfinfo_program.trim().is_empty() {
            return Err(Pdf2HtmlError::InvalidConfig(
                "pdfinfo program must not be empty".into(),
            ));
        }
        if c.pdftohtml_program.trim().is_empty() {
            return Err(Pdf2HtmlError::InvalidConfig(
                "pdftohtml program must not be empty".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(Pdf2HtmlError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
