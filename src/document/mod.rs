//! Document model: a small query surface over parsed HTML
//!
//! Wraps `scraper::Html` behind the handful of operations the extractor
//! needs (select-first, select-all, text, inner HTML, attributes), so the
//! extraction logic can be exercised against in-memory trees built straight
//! from string literals in tests.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// A parsed HTML page plus the URL it was fetched from is represented by
/// callers as `(Document, Url)`; the document itself is URL-agnostic.
pub struct Document {
    html: Html,
}

/// A hyperlink found on a page: raw href plus collapsed visible text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

impl Document {
    /// Parses an HTML document from a string
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Returns all elements matching a CSS selector group, in document order.
    ///
    /// Selector strings are internal constants; an invalid one yields no
    /// matches rather than an error.
    pub fn select(&self, selectors: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selectors) {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(_) => {
                debug_assert!(false, "invalid selector: {selectors}");
                Vec::new()
            }
        }
    }

    /// Returns the first element matching a CSS selector group
    pub fn first(&self, selectors: &str) -> Option<ElementRef<'_>> {
        self.select(selectors).into_iter().next()
    }

    /// Collapsed text of the first matching element, `None` when empty
    pub fn first_text(&self, selectors: &str) -> Option<String> {
        self.select(selectors)
            .into_iter()
            .map(|el| element_text(el))
            .find(|t| !t.is_empty())
    }

    /// Trimmed inner HTML of the first matching element with any content
    pub fn first_inner_html(&self, selectors: &str) -> Option<String> {
        self.select(selectors)
            .into_iter()
            .map(|el| el.inner_html().trim().to_string())
            .find(|h| !h.is_empty())
    }

    /// Attribute value of the first matching element that carries it
    pub fn first_attr(&self, selectors: &str, attr: &str) -> Option<String> {
        self.select(selectors)
            .into_iter()
            .find_map(|el| el.value().attr(attr).map(|v| v.trim().to_string()))
            .filter(|v| !v.is_empty())
    }

    /// All hyperlinks on the page, in document order
    pub fn anchors(&self) -> Vec<Anchor> {
        self.anchors_matching("a[href]")
    }

    /// Hyperlinks matching a scoped anchor selector group
    pub fn anchors_matching(&self, selectors: &str) -> Vec<Anchor> {
        self.select(selectors)
            .into_iter()
            .filter_map(|el| {
                let href = el.value().attr("href")?.trim();
                if href.is_empty() {
                    return None;
                }
                Some(Anchor {
                    href: href.to_string(),
                    text: element_text(el),
                })
            })
            .collect()
    }

    /// Raw contents of every embedded JSON-LD script block
    pub fn json_ld_blocks(&self) -> Vec<String> {
        self.select(r#"script[type="application/ld+json"]"#)
            .into_iter()
            .map(|el| el.inner_html())
            .collect()
    }
}

/// Collapses an element's visible text into single-spaced trimmed form
pub fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// Derives plain text from an HTML fragment.
///
/// Script, style, noscript, and iframe subtrees are dropped, as are nodes
/// hidden via class or inline style, then whitespace is collapsed.
pub fn clean_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    collect_visible_text(fragment.tree.root(), &mut out);
    collapse_whitespace(&out)
}

fn collect_visible_text(node: ego_tree::NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(t) => out.push_str(&t.text),
        Node::Element(el) => {
            let name = el.name();
            if matches!(name, "script" | "style" | "noscript" | "iframe") {
                return;
            }
            if el.attr("class").is_some_and(|c| c.contains("hidden")) {
                return;
            }
            if el
                .attr("style")
                .is_some_and(|s| s.replace(' ', "").contains("display:none"))
            {
                return;
            }
            for child in node.children() {
                collect_visible_text(child, out);
            }
        }
        _ => {
            for child in node.children() {
                collect_visible_text(child, out);
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
