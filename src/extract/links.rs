//! Detail-link extraction and pagination discovery on listing pages

use crate::document::Document;
use crate::state::CrawlState;
use crate::url::{classify, resolve_href, PageRole};
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Narrower anchor scope used when the broad scan finds nothing. Some
/// listing layouts bury detail links inside card markup while generic
/// anchors are all navigation chrome.
const CARD_ANCHORS: &str =
    "h2 a[href], .job a[href], .job-card a[href], .job-item a[href], [data-job-id] a[href]";

/// Extracts job-detail links from a listing page.
///
/// Every anchor is resolved against the page URL and kept when it
/// classifies as a detail page; a zero-result broad scan falls back to the
/// card-container scope. Links are deduplicated within the page in
/// discovery order, then filtered through (and recorded in) the global
/// visited set, so a second call over the same state yields nothing.
pub fn extract_detail_links(doc: &Document, base: &Url, state: &CrawlState) -> Vec<Url> {
    let mut found = scan_anchors(doc, "a[href]", base);
    if found.is_empty() {
        found = scan_anchors(doc, CARD_ANCHORS, base);
        if !found.is_empty() {
            tracing::debug!(url = %base, count = found.len(), "card-container fallback scan used");
        }
    }

    found
        .into_iter()
        .filter(|url| state.claim_url(url.as_str()))
        .collect()
}

fn scan_anchors(doc: &Document, selectors: &str, base: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for anchor in doc.anchors_matching(selectors) {
        let Some(resolved) = resolve_href(&anchor.href, base) else {
            continue;
        };
        if classify(resolved.as_str()) != PageRole::Detail {
            continue;
        }
        if seen.insert(resolved.to_string()) {
            out.push(resolved);
        }
    }
    out
}

/// Which fallback stage located the next listing page.
///
/// The later stages exist for older site layouts; logging the winning stage
/// makes dead rules visible over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStage {
    /// Explicit `rel="next"` link
    RelNext,
    /// Anchor text containing a "next" label in either language
    NextLabel,
    /// English file-name scheme `...-page-N-en.html`
    EnPageFile,
    /// Anchor whose text is exactly the next page number
    NumericAnchor,
    /// Vietnamese file-name scheme `trang-N-vi.html`
    ViPageFile,
}

impl fmt::Display for PaginationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RelNext => "rel-next",
            Self::NextLabel => "next-label",
            Self::EnPageFile => "en-page-file",
            Self::NumericAnchor => "numeric-anchor",
            Self::ViPageFile => "vi-page-file",
        };
        f.write_str(name)
    }
}

/// Locates the next listing page via the five-stage fallback chain.
///
/// Stages run in order and the first hit wins; all five missing is the
/// normal terminal condition for a seed, not an error.
pub fn find_next_page(
    doc: &Document,
    base: &Url,
    current_page: u32,
) -> Option<(Url, PaginationStage)> {
    let next = current_page + 1;

    let href_and_stage = stage_rel_next(doc)
        .map(|h| (h, PaginationStage::RelNext))
        .or_else(|| stage_next_label(doc).map(|h| (h, PaginationStage::NextLabel)))
        .or_else(|| stage_href_contains(doc, &format!("-page-{next}-en.html"))
            .map(|h| (h, PaginationStage::EnPageFile)))
        .or_else(|| stage_numeric_anchor(doc, next).map(|h| (h, PaginationStage::NumericAnchor)))
        .or_else(|| stage_href_contains(doc, &format!("trang-{next}-vi.html"))
            .map(|h| (h, PaginationStage::ViPageFile)))?;

    let (href, stage) = href_and_stage;
    let url = resolve_href(&href, base)?;
    tracing::debug!(%url, %stage, page = next, "pagination resolved");
    Some((url, stage))
}

fn stage_rel_next(doc: &Document) -> Option<String> {
    doc.first_attr(r#"a[rel="next"][href]"#, "href")
}

fn stage_next_label(doc: &Document) -> Option<String> {
    doc.anchors().into_iter().find_map(|a| {
        let text = a.text.to_lowercase();
        if text.contains("next") || text.contains("tiếp") {
            Some(a.href)
        } else {
            None
        }
    })
}

fn stage_href_contains(doc: &Document, needle: &str) -> Option<String> {
    doc.anchors()
        .into_iter()
        .find_map(|a| a.href.contains(needle).then_some(a.href))
}

fn stage_numeric_anchor(doc: &Document, next: u32) -> Option<String> {
    let wanted = next.to_string();
    doc.anchors()
        .into_iter()
        .find_map(|a| (a.text.trim() == wanted).then_some(a.href))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://careerviet.vn/jobs/all-jobs-en.html").unwrap()
    }

    fn state() -> CrawlState {
        CrawlState::new(100, true)
    }

    #[test]
    fn test_broad_scan_keeps_only_detail_links() {
        let doc = Document::parse(
            r#"<body>
                <a href="/jobs/backend-engineer-1001.html">Backend</a>
                <a href="/jobs/all-jobs-page-2-en.html">2</a>
                <a href="/en/about-us">About</a>
            </body>"#,
        );
        let links = extract_detail_links(&doc, &base(), &state());
        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].as_str(),
            "https://careerviet.vn/jobs/backend-engineer-1001.html"
        );
    }

    #[test]
    fn test_in_page_dedup_preserves_order() {
        let doc = Document::parse(
            r#"<a href="/jobs/a-1.html">A</a>
               <a href="/jobs/b-2.html">B</a>
               <a href="/jobs/a-1.html">A again</a>"#,
        );
        let links = extract_detail_links(&doc, &base(), &state());
        assert_eq!(links.len(), 2);
        assert!(links[0].as_str().ends_with("/jobs/a-1.html"));
        assert!(links[1].as_str().ends_with("/jobs/b-2.html"));
    }

    #[test]
    fn test_second_call_with_same_state_yields_nothing() {
        let doc = Document::parse(r#"<a href="/jobs/a-1.html">A</a>"#);
        let state = state();
        assert_eq!(extract_detail_links(&doc, &base(), &state).len(), 1);
        assert!(extract_detail_links(&doc, &base(), &state).is_empty());
    }

    #[test]
    fn test_card_scoped_scan_classifies_like_broad_scan() {
        let doc = Document::parse(
            r#"<nav><a href="/en/about-us">About</a></nav>
               <div class="job-card"><a href="/jobs/engineer-77.html">Engineer</a></div>"#,
        );
        let links = extract_detail_links(&doc, &base(), &state());
        assert_eq!(links.len(), 1);
        assert!(links[0].as_str().ends_with("/jobs/engineer-77.html"));

        let scoped = scan_anchors(&doc, CARD_ANCHORS, &base());
        assert_eq!(scoped.len(), 1);
    }

    #[test]
    fn test_unresolvable_href_discarded() {
        let doc = Document::parse(r#"<a href="https://[bad">broken</a>"#);
        assert!(extract_detail_links(&doc, &base(), &state()).is_empty());
    }

    #[test]
    fn test_next_page_rel_next() {
        let doc = Document::parse(r#"<a rel="next" href="/jobs/all-jobs-page-2-en.html">»</a>"#);
        let (url, stage) = find_next_page(&doc, &base(), 1).unwrap();
        assert_eq!(stage, PaginationStage::RelNext);
        assert!(url.as_str().ends_with("all-jobs-page-2-en.html"));
    }

    #[test]
    fn test_next_page_label_english_and_vietnamese() {
        let doc = Document::parse(r#"<a href="/p2">Next »</a>"#);
        let (_, stage) = find_next_page(&doc, &base(), 1).unwrap();
        assert_eq!(stage, PaginationStage::NextLabel);

        let doc = Document::parse(r#"<a href="/p2">Tiếp theo</a>"#);
        let (_, stage) = find_next_page(&doc, &base(), 1).unwrap();
        assert_eq!(stage, PaginationStage::NextLabel);
    }

    #[test]
    fn test_next_page_english_file_scheme() {
        let doc = Document::parse(
            r#"<a href="/jobs/all-jobs-page-3-en.html">more</a>
               <a href="/jobs/all-jobs-page-9-en.html">last</a>"#,
        );
        let (url, stage) = find_next_page(&doc, &base(), 2).unwrap();
        assert_eq!(stage, PaginationStage::EnPageFile);
        assert!(url.as_str().contains("-page-3-en.html"));
    }

    #[test]
    fn test_next_page_numeric_anchor() {
        let doc = Document::parse(r#"<a href="/listing?p=4">4</a><a href="/listing?p=9">9</a>"#);
        let (url, stage) = find_next_page(&doc, &base(), 3).unwrap();
        assert_eq!(stage, PaginationStage::NumericAnchor);
        assert!(url.as_str().ends_with("p=4"));
    }

    #[test]
    fn test_next_page_vietnamese_file_scheme() {
        let doc = Document::parse(r#"<a href="/viec-lam/tat-ca-trang-2-vi.html">&gt;</a>"#);
        let (url, stage) = find_next_page(&doc, &base(), 1).unwrap();
        assert_eq!(stage, PaginationStage::ViPageFile);
        assert!(url.as_str().contains("trang-2-vi.html"));
    }

    #[test]
    fn test_no_next_page_is_none() {
        let doc = Document::parse(r#"<a href="/jobs/engineer-5.html">job</a>"#);
        assert!(find_next_page(&doc, &base(), 1).is_none());
    }

    #[test]
    fn test_numeric_anchor_requires_exact_text() {
        // "24" contains "2" but is not page 2
        let doc = Document::parse(r#"<a href="/x">24</a>"#);
        assert!(find_next_page(&doc, &base(), 1).is_none());
    }
}
