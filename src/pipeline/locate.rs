//! Content-root lookup in a parsed page.
//!
//! A rendered page is parsed into a throwaway [`Html`] tree. The content root
//! is the first `<body>` element met in a pre-order walk of that tree.
//! HTML5 parsing synthesises a `<body>` for ordinary markup, so a page only
//! lacks one when it is a frameset document.

use scraper::{ElementRef, Html};

/// Tag name of the element holding a page's visible content.
pub const CONTENT_ROOT_TAG: &str = "body";

/// Parse one page's markup into a document tree.
pub fn parse_page(markup: &str) -> Html {
    Html::parse_document(markup)
}

/// Find the first `<body>` element in pre-order (children left to right).
pub fn find_content_root(doc: &Html) -> Option<ElementRef<'_>> {
    doc.tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == CONTENT_ROOT_TAG)
}
