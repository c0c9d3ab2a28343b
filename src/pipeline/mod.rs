//! Pipeline stages for PDF-to-HTML conversion.
//!
//! Each submodule implements one step. The external tools sit behind the
//! traits in [`tools`], so every other stage can be tested without poppler.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ tools::MetadataExtractor ──▶ metadata ───────────────┐
//! input ─────┤                                                        ├─▶ output
//! (path/URL) └─▶ tools::PageRenderer ──▶ assemble ─▶ locate ─▶ sanitize ┘
//!                (pdftohtml -c)          (page 1..N, in order)
//! ```
//!
//! 1. [`input`]    — canonicalise the user-supplied path, URL or bytes to a
//!    local file
//! 2. [`tools`]    — run `pdfinfo` / `pdftohtml`
//! 3. [`metadata`] — parse `key: value` lines, derive epoch dates
//! 4. [`assemble`] — read each page file and join the page bodies with form feeds
//! 5. [`locate`]   — find the `<body>` of a parsed page
//! 6. [`sanitize`] — serialise it and drop self-closing `<img/>` elements

pub mod assemble;
pub mod input;
pub mod locate;
pub mod metadata;
pub mod sanitize;
pub mod tools;
