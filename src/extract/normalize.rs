//! Field normalization: canonical forms for location, salary, and job type
//!
//! All three normalizers are pure, total functions: absent or unparseable
//! input yields `None`, never an error. A shared length/category filter
//! guards against mis-scraped navigation text (listing and category links
//! often end up in location/salary slots on drifted layouts).

use crate::output::RawSalary;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Values longer than this are assumed to be mis-scraped page chrome
const MAX_FIELD_LEN: usize = 120;

/// Marker words that appear in listing/category navigation, not in real
/// field values (both languages, accents optional)
static CATEGORY_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(việc làm|viec lam|tuyển dụng|tuyen dung|jobs? in|all jobs|ngành nghề|nganh nghe|danh mục|category)",
    )
    .unwrap()
});

static MAP_BOILERPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(?\s*(view (on )?map|xem bản đồ|xem ban do)\s*\)?").unwrap());

static NEGOTIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(negotiable|thỏa thuận|thoả thuận|thoa thuan)").unwrap());

/// Currency symbol or code adjacent to the first amount of a range
static CURRENCY_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([$€£₫]|USD|VND|EUR)\s*([0-9][0-9.,]*)\s*(?:-|–|~|to|đến|den)\s*(?:[$€£₫]|USD|VND|EUR)?\s*([0-9][0-9.,]*)",
    )
    .unwrap()
});

static BARE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9][0-9.,]*)\s*(?:-|–|~|to|đến|den)\s*([0-9][0-9.,]*)").unwrap()
});

static SINGLE_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([$€£₫]|USD|VND|EUR)\s*([0-9][0-9.,]*)|([0-9][0-9.,]*)\s*([$€£₫]|USD|VND|EUR)")
        .unwrap()
});

static CURRENCY_ANYWHERE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[$€£₫]|USD|VND|EUR").unwrap());

static PER_HOUR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)hour|giờ|gio\b").unwrap());
static PER_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)month|tháng|thang\b").unwrap());
static PER_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)year|annum|năm|nam\b").unwrap());

/// Passes trimmed text through the shared length/category-word filter
fn passes_field_filter(text: &str) -> bool {
    !text.is_empty() && text.chars().count() <= MAX_FIELD_LEN && !CATEGORY_MARKERS.is_match(text)
}

/// Normalizes a raw location string to its first meaningful segment.
///
/// Rejects over-long values and listing/category text, strips "view map"
/// boilerplate, then keeps the first segment split on common separators.
pub fn normalize_location(raw: &str) -> Option<String> {
    let stripped = MAP_BOILERPLATE.replace_all(raw, "");
    let text = stripped.trim();
    if !passes_field_filter(text) {
        return None;
    }
    text.split(['|', ',', '•', '/'])
        .map(str::trim)
        .find(|seg| !seg.is_empty())
        .map(String::from)
}

/// Normalizes a raw salary (freeform text or structured JSON-LD value) into
/// a display string, or `None` when nothing parseable is present.
pub fn normalize_salary(raw: &RawSalary) -> Option<String> {
    let result = match raw {
        RawSalary::Text(text) => normalize_salary_text(text),
        RawSalary::Structured {
            currency,
            min,
            max,
            unit,
        } => format_structured(currency.as_deref(), *min, *max, unit.as_deref()),
    }?;
    passes_field_filter(&result).then_some(result)
}

fn normalize_salary_text(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if NEGOTIABLE.is_match(text) {
        return Some("Negotiable".to_string());
    }

    let suffix = period_suffix(text);

    if let Some(caps) = CURRENCY_RANGE.captures(text) {
        let symbol = currency_symbol(&caps[1]);
        let low = parse_amount(&caps[2])?;
        let high = parse_amount(&caps[3])?;
        return Some(format!(
            "{}{} - {}{}{}",
            symbol,
            format_thousands(low),
            symbol,
            format_thousands(high),
            suffix
        ));
    }

    if let Some(caps) = BARE_RANGE.captures(text) {
        let symbol = CURRENCY_ANYWHERE
            .find(text)
            .map(|m| currency_symbol(m.as_str()))
            .unwrap_or_default();
        let low = parse_amount(&caps[1])?;
        let high = parse_amount(&caps[2])?;
        return Some(format!(
            "{}{} - {}{}{}",
            symbol,
            format_thousands(low),
            symbol,
            format_thousands(high),
            suffix
        ));
    }

    if let Some(caps) = SINGLE_AMOUNT.captures(text) {
        let (symbol, amount) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
            (Some(cur), Some(num), _, _) => (currency_symbol(cur.as_str()), num.as_str()),
            (_, _, Some(num), Some(cur)) => (currency_symbol(cur.as_str()), num.as_str()),
            _ => return None,
        };
        let value = parse_amount(amount)?;
        return Some(format!("{}{}{}", symbol, format_thousands(value), suffix));
    }

    None
}

fn format_structured(
    currency: Option<&str>,
    min: Option<f64>,
    max: Option<f64>,
    unit: Option<&str>,
) -> Option<String> {
    let symbol = currency.map(currency_symbol).unwrap_or_default();
    let suffix = unit.map(period_suffix).unwrap_or_default();

    let fmt = |v: f64| format_thousands(v.round() as u64);
    match (min, max) {
        (Some(lo), Some(hi)) => Some(format!(
            "{}{} - {}{}{}",
            symbol,
            fmt(lo),
            symbol,
            fmt(hi),
            suffix
        )),
        (Some(v), None) | (None, Some(v)) => Some(format!("{}{}{}", symbol, fmt(v), suffix)),
        (None, None) => None,
    }
}

fn currency_symbol(raw: &str) -> String {
    match raw.to_uppercase().as_str() {
        "USD" | "$" => "$".to_string(),
        "EUR" | "€" => "€".to_string(),
        "GBP" | "£" => "£".to_string(),
        "VND" | "₫" => "₫".to_string(),
        other => format!("{other} "),
    }
}

fn period_suffix(text: &str) -> &'static str {
    if PER_HOUR.is_match(text) {
        "/hour"
    } else if PER_MONTH.is_match(text) {
        "/month"
    } else if PER_YEAR.is_match(text) {
        "/year"
    } else {
        ""
    }
}

/// Parses an amount like "1,000" or "15.000.000", treating both separators
/// as digit grouping
fn parse_amount(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Canonical vocabulary rules for job types, in priority order
static JOB_TYPE_RULES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    let rule = |canon, pattern: &str| (canon, Regex::new(pattern).unwrap());
    vec![
        rule(
            "Full-time",
            r"(?i)full[\s_-]?time|toàn thời gian|toan thoi gian",
        ),
        rule(
            "Part-time",
            r"(?i)part[\s_-]?time|bán thời gian|ban thoi gian",
        ),
        rule("Internship", r"(?i)intern|thực tập|thuc tap"),
        rule("Contract", r"(?i)contract|hợp đồng|hop dong"),
        rule("Temporary", r"(?i)temp(orary)?\b|thời vụ|thoi vu"),
        rule("Freelance", r"(?i)freelance|tự do|tu do"),
        rule("Remote", r"(?i)remote|từ xa|tu xa"),
        rule("Hybrid", r"(?i)hybrid"),
    ]
});

/// Classifies raw job-type text into the canonical vocabulary.
///
/// Unmatched text passes through unchanged when it survives the shared
/// field filter; otherwise `None`.
pub fn normalize_job_type(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    for (canon, pattern) in JOB_TYPE_RULES.iter() {
        if pattern.is_match(text) {
            return Some((*canon).to_string());
        }
    }
    passes_field_filter(text).then(|| text.to_string())
}

/// Age in whole days of a posting date, when the date is parseable.
///
/// Accepts RFC 3339 timestamps and the date layouts seen on the site
/// (`2024-02-10`, `10/02/2024`, `10-02-2024`).
pub fn posting_age_days(raw: &str, today: NaiveDate) -> Option<i64> {
    let date = parse_posting_date(raw)?;
    Some((today - date).num_days())
}

fn parse_posting_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_first_segment() {
        assert_eq!(
            normalize_location("Ha Noi | Ho Chi Minh"),
            Some("Ha Noi".to_string())
        );
        assert_eq!(
            normalize_location("District 1, Ho Chi Minh City"),
            Some("District 1".to_string())
        );
    }

    #[test]
    fn test_location_strips_map_boilerplate() {
        assert_eq!(
            normalize_location("Ha Noi (View map)"),
            Some("Ha Noi".to_string())
        );
        assert_eq!(
            normalize_location("Đà Nẵng Xem bản đồ"),
            Some("Đà Nẵng".to_string())
        );
    }

    #[test]
    fn test_location_rejects_category_text() {
        assert!(normalize_location("Việc làm IT tại Hà Nội").is_none());
        assert!(normalize_location("All jobs in Vietnam").is_none());
    }

    #[test]
    fn test_location_rejects_overlong() {
        assert!(normalize_location(&"x".repeat(200)).is_none());
    }

    #[test]
    fn test_location_empty() {
        assert!(normalize_location("").is_none());
        assert!(normalize_location("  ").is_none());
    }

    #[test]
    fn test_salary_negotiable_vietnamese() {
        assert_eq!(
            normalize_salary(&RawSalary::Text("Thỏa thuận".to_string())),
            Some("Negotiable".to_string())
        );
        assert_eq!(
            normalize_salary(&RawSalary::Text("Lương: thoả thuận".to_string())),
            Some("Negotiable".to_string())
        );
        assert_eq!(
            normalize_salary(&RawSalary::Text("Negotiable".to_string())),
            Some("Negotiable".to_string())
        );
    }

    #[test]
    fn test_salary_structured_range() {
        let raw = RawSalary::Structured {
            currency: Some("USD".to_string()),
            min: Some(1000.0),
            max: Some(2000.0),
            unit: None,
        };
        let out = normalize_salary(&raw).unwrap();
        assert!(out.contains('$'));
        assert!(out.contains("1,000"));
        assert!(out.contains("2,000"));
    }

    #[test]
    fn test_salary_structured_single_with_unit() {
        let raw = RawSalary::Structured {
            currency: Some("USD".to_string()),
            min: Some(1500.0),
            max: None,
            unit: Some("MONTH".to_string()),
        };
        assert_eq!(normalize_salary(&raw), Some("$1,500/month".to_string()));
    }

    #[test]
    fn test_salary_currency_range_text() {
        assert_eq!(
            normalize_salary(&RawSalary::Text("$1,000 - $2,000 per month".to_string())),
            Some("$1,000 - $2,000/month".to_string())
        );
    }

    #[test]
    fn test_salary_bare_range_with_trailing_currency() {
        assert_eq!(
            normalize_salary(&RawSalary::Text("15.000.000 - 20.000.000 VND/tháng".to_string())),
            Some("₫15,000,000 - ₫20,000,000/month".to_string())
        );
    }

    #[test]
    fn test_salary_single_amount() {
        assert_eq!(
            normalize_salary(&RawSalary::Text("Up to $3,500/year".to_string())),
            Some("$3,500/year".to_string())
        );
    }

    #[test]
    fn test_salary_unparseable() {
        assert!(normalize_salary(&RawSalary::Text("Competitive".to_string())).is_none());
        assert!(normalize_salary(&RawSalary::Text("".to_string())).is_none());
    }

    #[test]
    fn test_salary_structured_empty() {
        let raw = RawSalary::Structured {
            currency: Some("USD".to_string()),
            min: None,
            max: None,
            unit: None,
        };
        assert!(normalize_salary(&raw).is_none());
    }

    #[test]
    fn test_job_type_vietnamese_full_time() {
        assert_eq!(
            normalize_job_type("Toàn thời gian"),
            Some("Full-time".to_string())
        );
    }

    #[test]
    fn test_job_type_canonical_vocabulary() {
        assert_eq!(normalize_job_type("FULL_TIME"), Some("Full-time".to_string()));
        assert_eq!(
            normalize_job_type("Bán thời gian"),
            Some("Part-time".to_string())
        );
        assert_eq!(
            normalize_job_type("Thực tập sinh"),
            Some("Internship".to_string())
        );
        assert_eq!(
            normalize_job_type("Hợp đồng 6 tháng"),
            Some("Contract".to_string())
        );
        assert_eq!(normalize_job_type("Remote"), Some("Remote".to_string()));
        assert_eq!(normalize_job_type("Hybrid"), Some("Hybrid".to_string()));
    }

    #[test]
    fn test_job_type_priority_order() {
        // First matching rule wins
        assert_eq!(
            normalize_job_type("Full-time, Remote"),
            Some("Full-time".to_string())
        );
    }

    #[test]
    fn test_job_type_passthrough() {
        assert_eq!(
            normalize_job_type("Shift work"),
            Some("Shift work".to_string())
        );
    }

    #[test]
    fn test_job_type_empty_and_category_text() {
        assert!(normalize_job_type("").is_none());
        assert!(normalize_job_type("Việc làm bán hàng").is_none());
    }

    #[test]
    fn test_posting_age_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(posting_age_days("2024-02-10", today), Some(20));
        assert_eq!(posting_age_days("10/02/2024", today), Some(20));
        assert_eq!(posting_age_days("2024-02-10T08:30:00+07:00", today), Some(20));
        assert_eq!(posting_age_days("last week", today), None);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(5), "5");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(15000000), "15,000,000");
    }
}
