//! Heuristic extraction of job fields from detail-page markup
//!
//! Runs after the JSON-LD stage and only fills fields still missing. The
//! scoped stage probes structured label/value markup inside likely
//! "job summary" containers (definition lists, two-column tables, label +
//! value list items, inline "Label: Value" text) with bilingual label
//! patterns; the generic stage falls back to broad class-substring
//! selectors anywhere in the document, per the selector chains the site's
//! layouts have used over time.

use crate::document::{element_text, Document};
use crate::extract::jsonld::extract_job_posting;
use crate::output::{RawRecord, RawSalary};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

/// Containers likely to hold the posting's summary/info/meta block.
/// Scoping label probes here keeps sidebar and navigation text out.
const SUMMARY_CONTAINERS: &str = "[class*=\"job-summary\"], [class*=\"job-info\"], \
     [class*=\"job-meta\"], [class*=\"job-detail\"], .detail-box, .box-info, .summary, .job";

/// Description containers, in preference order
const DESCRIPTION_SELECTORS: &[&str] = &[
    ".job-description",
    ".description",
    "[class*=\"description\"]",
    ".content",
    "[class*=\"content\"]",
    ".entry-content",
];

static LOCATION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(work\s*location|location|địa\s*điểm|nơi\s*làm\s*việc)").unwrap()
});
static SALARY_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(salary|mức\s*lương|lương)").unwrap());
static JOB_TYPE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(job\s*type|employment\s*type|hình\s*thức(\s*làm\s*việc)?|loại\s*hình)")
        .unwrap()
});
static COMPANY_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(company|employer|công\s*ty|nhà\s*tuyển\s*dụng)").unwrap()
});
static DATE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(date\s*posted|posted|updated|ngày\s*(đăng|cập\s*nhật))").unwrap()
});

/// Extracts a raw record from a detail page.
///
/// Stage order: JSON-LD, scoped label heuristics, generic class fallbacks,
/// then the description chain. Best-effort throughout; any field may stay
/// unset.
pub fn extract(doc: &Document) -> RawRecord {
    let mut raw = extract_job_posting(doc).unwrap_or_default();

    if !raw.is_complete() {
        scoped_stage(doc, &mut raw);
        generic_stage(doc, &mut raw);
    }

    if raw.description_html.is_none() {
        raw.description_html = DESCRIPTION_SELECTORS
            .iter()
            .find_map(|sel| doc.first_inner_html(sel));
    }

    raw
}

/// Probes structured label/value markup inside summary containers for each
/// still-missing field.
fn scoped_stage(doc: &Document, raw: &mut RawRecord) {
    let containers = doc.select(SUMMARY_CONTAINERS);
    if containers.is_empty() {
        return;
    }

    let mut fill = |slot: &mut Option<String>, label: &Regex| {
        if slot.is_some() {
            return;
        }
        *slot = containers
            .iter()
            .find_map(|container| labeled_value(*container, label));
    };

    fill(&mut raw.location, &LOCATION_LABEL);
    fill(&mut raw.job_type, &JOB_TYPE_LABEL);
    fill(&mut raw.company, &COMPANY_LABEL);
    fill(&mut raw.date_posted, &DATE_LABEL);

    if raw.salary.is_none() {
        raw.salary = containers
            .iter()
            .find_map(|container| labeled_value(*container, &SALARY_LABEL))
            .map(RawSalary::Text);
    }
}

/// Finds the value paired with a matching label inside one container.
///
/// Probe order: definition-list pairs, two-column table rows, label+value
/// list items, then generic inline "Label: Value" text.
fn labeled_value(container: ElementRef<'_>, label: &Regex) -> Option<String> {
    definition_pair(container, label)
        .or_else(|| table_row_pair(container, label))
        .or_else(|| list_item_pair(container, label))
        .or_else(|| inline_pair(container, label))
}

fn definition_pair(container: ElementRef<'_>, label: &Regex) -> Option<String> {
    let dt_sel = Selector::parse("dt").ok()?;
    for dt in container.select(&dt_sel) {
        if !label.is_match(&element_text(dt)) {
            continue;
        }
        if let Some(value) = next_sibling_named(dt, "dd").map(element_text) {
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

fn table_row_pair(container: ElementRef<'_>, label: &Regex) -> Option<String> {
    let row_sel = Selector::parse("tr").ok()?;
    let cell_sel = Selector::parse("th, td").ok()?;
    for row in container.select(&row_sel) {
        let cells: Vec<_> = row.select(&cell_sel).collect();
        if cells.len() < 2 {
            continue;
        }
        if label.is_match(&element_text(cells[0])) {
            let value = element_text(cells[1]);
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// List items come in two shapes: a label-only `<li>` followed by a value
/// `<li>`, or a single `<li>Label: Value</li>`.
fn list_item_pair(container: ElementRef<'_>, label: &Regex) -> Option<String> {
    let li_sel = Selector::parse("li").ok()?;
    for li in container.select(&li_sel) {
        let text = element_text(li);
        if text.is_empty() || !label.is_match(&text) {
            continue;
        }
        if let Some((prefix, suffix)) = text.split_once(':') {
            if label.is_match(prefix.trim()) {
                let value = suffix.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
            continue;
        }
        // Label-only item: the value is the next list item
        if let Some(value) = next_sibling_named(li, "li").map(element_text) {
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

fn inline_pair(container: ElementRef<'_>, label: &Regex) -> Option<String> {
    let sel = Selector::parse("p, div, span").ok()?;
    for el in container.select(&sel) {
        let text = element_text(el);
        let Some((prefix, suffix)) = text.split_once(':') else {
            continue;
        };
        if label.is_match(prefix.trim()) {
            let value = suffix.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

fn next_sibling_named<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sib| sib.value().name() == name)
}

/// Broad class-name/attribute fallbacks anywhere in the document, matching
/// the selector chains the site's layouts have used.
fn generic_stage(doc: &Document, raw: &mut RawRecord) {
    if raw.title.is_none() {
        raw.title = doc
            .first_text("h1.job-title, .job-title h1, .title h1, h1")
            .or_else(|| doc.first_text("[class*=\"job-title\"]"));
    }
    if raw.company.is_none() {
        raw.company = doc.first_text(
            ".company-name, .employer-name, [class*=\"company\"], \
             a[href*=\"/company/\"], a[href*=\"nha-tuyen-dung\"]",
        );
    }
    if raw.location.is_none() {
        raw.location =
            doc.first_text("[class*=\"location\"], [class*=\"address\"], .location span");
    }
    if raw.salary.is_none() {
        raw.salary = doc
            .first_text("[class*=\"salary\"], .salary, [class*=\"luong\"]")
            .map(RawSalary::Text);
    }
    if raw.job_type.is_none() {
        raw.job_type = doc.first_text("[class*=\"job-type\"], [class*=\"employment\"]");
    }
    if raw.date_posted.is_none() {
        raw.date_posted = doc
            .first_attr("time[datetime]", "datetime")
            .or_else(|| doc.first_text("[class*=\"date\"], [class*=\"posted\"], time"));
    }
}
