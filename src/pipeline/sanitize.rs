//! Page sanitising: serialise a content root back to markup and strip images.
//!
//! The serialiser writes void elements in explicit self-closing form
//! (`<img src="x"/>`, `<br/>`), which is the shape the image pattern below
//! expects. Only that exact shape is removed: `<img>` without attributes or
//! without the trailing `/>` is left alone.

use crate::config::ConversionConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};

/// How a content root is turned into page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Emit the content-root element itself, not just its children.
    pub include_root_tag: bool,
    /// Remove self-closing `<img .../>` elements.
    pub strip_images: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            include_root_tag: false,
            strip_images: true,
        }
    }
}

impl From<&ConversionConfig> for SanitizeOptions {
    fn from(config: &ConversionConfig) -> Self {
        Self {
            include_root_tag: config.include_body_tag,
            strip_images: config.strip_images,
        }
    }
}

static RE_SELF_CLOSING_IMG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<img\s[^>]+/>").unwrap());

/// Serialise `root` and apply the image filter.
pub fn sanitize_page(root: ElementRef<'_>, options: SanitizeOptions) -> String {
    let mut markup = String::new();
    if options.include_root_tag {
        write_element(root, &mut markup);
    } else {
        write_children(root, &mut markup);
    }

    if options.strip_images {
        strip_images(&markup)
    } else {
        markup
    }
}

/// Remove every self-closing `<img .../>` element.
pub fn strip_images(markup: &str) -> String {
    RE_SELF_CLOSING_IMG.replace_all(markup, "").into_owned()
}

// ── Serialiser ───────────────────────────────────────────────────────────

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

fn write_element(el: ElementRef<'_>, out: &mut String) {
    let element = el.value();
    let name = element.name();

    out.push('<');
    out.push_str(name);
    for (key, value) in element.attrs() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        push_escaped(value, out);
        out.push('"');
    }

    if VOID_ELEMENTS.contains(&name) {
        out.push_str("/>");
        return;
    }
    out.push('>');

    // A leading newline right after these start tags is dropped by parsers,
    // so it has to be written back.
    if matches!(name, "pre" | "listing" | "textarea") {
        let leading_newline = el
            .first_child()
            .and_then(|child| match child.value() {
                Node::Text(text) => Some(text.starts_with('\n')),
                _ => None,
            })
            .unwrap_or(false);
        if leading_newline {
            out.push('\n');
        }
    }

    if RAW_TEXT_ELEMENTS.contains(&name) {
        for child in el.children() {
            if let Node::Text(text) = child.value() {
                out.push_str(text);
            }
        }
    } else {
        write_children(el, out);
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_children(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    write_element(child_el, out);
                }
            }
            Node::Text(text) => push_escaped(text, out),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::Doctype(doctype) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(doctype.name());
                out.push('>');
            }
            _ => {}
        }
    }
}

fn push_escaped(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::locate::{find_content_root, parse_page};

    fn sanitize(markup: &str, options: SanitizeOptions) -> String {
        let doc = parse_page(markup);
        let root = find_content_root(&doc).expect("body");
        sanitize_page(root, options)
    }

    #[test]
    fn test_strip_images_removes_self_closing() {
        let input = r#"<p>a</p><img width="918" height="1188" src="x001.png" alt="background image"/><p>b</p>"#;
        assert_eq!(strip_images(input), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_strip_images_leaves_other_shapes() {
        let input = r#"<img><img src="x.png"><image src="y"/><p>keep</p>"#;
        assert_eq!(strip_images(input), input);
    }

    #[test]
    fn test_strip_images_every_occurrence() {
        let input = "<img src=\"1\"/>x<img\tsrc=\"2\" />y<img src=\"3\"/>";
        assert_eq!(strip_images(input), "xy");
    }

    #[test]
    fn test_sanitize_inner_body() {
        let out = sanitize(r#"<body>B<img src="x"/></body>"#, SanitizeOptions::default());
        assert_eq!(out, "B");
    }

    #[test]
    fn test_sanitize_with_root_tag() {
        let options = SanitizeOptions {
            include_root_tag: true,
            strip_images: true,
        };
        let out = sanitize(r#"<body bgcolor="gray">A<br>B</body>"#, options);
        assert_eq!(out, r#"<body bgcolor="gray">A<br/>B</body>"#);
    }

    #[test]
    fn test_attributes_keep_source_order() {
        let markup = r#"<p style="position:absolute;top:50px;left:108px;white-space:nowrap" class="ft00">x</p>"#;
        let out = sanitize(&format!("<body>{markup}</body>"), SanitizeOptions::default());
        assert_eq!(out, markup);
    }

    #[test]
    fn test_images_kept_when_disabled() {
        let options = SanitizeOptions {
            include_root_tag: false,
            strip_images: false,
        };
        let out = sanitize(r#"<body><img src="x"></body>"#, options);
        assert_eq!(out, r#"<img src="x"/>"#);
    }

    #[test]
    fn test_text_is_escaped() {
        let out = sanitize("<body><p>a &amp; b &lt;c&gt;</p></body>", SanitizeOptions::default());
        assert_eq!(out, "<p>a &amp; b &lt;c&gt;</p>");
    }

    #[test]
    fn test_attribute_quotes_escaped() {
        let out = sanitize(
            r#"<body><a title='say "hi"'>x</a></body>"#,
            SanitizeOptions::default(),
        );
        assert_eq!(out, r#"<a title="say &#34;hi&#34;">x</a>"#);
    }

    #[test]
    fn test_script_is_raw_text() {
        let out = sanitize(
            "<body><script>if (a < b) {}</script></body>",
            SanitizeOptions::default(),
        );
        assert_eq!(out, "<script>if (a < b) {}</script>");
    }

    #[test]
    fn test_comment_round_trips() {
        let out = sanitize("<body><!-- note -->x</body>", SanitizeOptions::default());
        assert_eq!(out, "<!-- note -->x");
    }

    #[test]
    fn test_pre_leading_newline_preserved() {
        let out = sanitize("<body><pre>\n\nline</pre></body>", SanitizeOptions::default());
        assert_eq!(out, "<pre>\n\nline</pre>");
    }

    #[test]
    fn test_write_element_nested() {
        let doc = parse_page("<body><div id=\"p1\"><b>x</b></div></body>");
        let root = find_content_root(&doc).unwrap();
        let div = root.child_elements().next().unwrap();
        let mut out = String::new();
        write_element(div, &mut out);
        assert_eq!(out, r#"<div id="p1"><b>x</b></div>"#);
    }
}
