//! URL handling: page-role classification and href resolution
//!
//! CareerViet has accumulated several URL schemes over time (current English,
//! Vietnamese, and a legacy English layout). Classification is an ordered
//! list of per-locale pattern rules evaluated first-match-wins against the
//! absolute URL, so each legacy scheme stays declarative and independently
//! testable.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Role a URL plays in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRole {
    /// A listing page enumerating job postings with pagination controls
    List,
    /// A single job posting's detail page
    Detail,
    /// Neither; the link is ignored
    Unknown,
}

struct PatternRule {
    name: &'static str,
    role: PageRole,
    pattern: Regex,
}

/// Ordered classification rules. Detail rules come first; the English legacy
/// detail scheme (`/jobs/<slug>-<digits>.html`) is disjoint from English
/// listing files, which end in `-en.html`.
static RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    let rule = |name, role, pattern: &str| PatternRule {
        name,
        role,
        pattern: Regex::new(&format!("(?i){pattern}")).expect("classification pattern"),
    };
    vec![
        rule(
            "en-detail",
            PageRole::Detail,
            r"careerviet\.vn/en/search-job/[^/?#]+\.[A-Za-z0-9]+\.html",
        ),
        rule(
            "vi-detail",
            PageRole::Detail,
            r"careerviet\.vn/vi/tim-viec-lam/[^/?#]+\.\d+\.html",
        ),
        rule(
            "legacy-detail",
            PageRole::Detail,
            r"careerviet\.vn/jobs/[^/?#]+-\d+\.html",
        ),
        rule(
            "en-listing",
            PageRole::List,
            r"careerviet\.vn/jobs/[^/?#]+-en\.html",
        ),
        rule(
            "vi-listing",
            PageRole::List,
            r"careerviet\.vn/vi/tim-viec-lam(?:[/?#]|$)",
        ),
        rule("vi-listing-page", PageRole::List, r"trang-\d+-vi\.html"),
    ]
});

/// Classifies an absolute URL as a listing page, detail page, or neither.
///
/// Pure function over the URL string; no network access.
pub fn classify(url: &str) -> PageRole {
    for rule in RULES.iter() {
        if rule.pattern.is_match(url) {
            tracing::trace!(rule = rule.name, %url, "classified URL");
            return rule.role;
        }
    }
    PageRole::Unknown
}

/// Resolves an href against the page it appeared on.
///
/// Returns `None` for non-navigational schemes, fragment-only links, and
/// anything that fails to resolve to an http(s) URL; such links are
/// discarded rather than treated as errors.
pub fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(resolved) if resolved.scheme() == "http" || resolved.scheme() == "https" => {
            Some(resolved)
        }
        _ => None,
    }
}
