//! Record types: the extractor's intermediate shape and the emitted record

use serde::Serialize;

/// Raw salary value as found on the page, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawSalary {
    /// Freeform text scraped from the page
    Text(String),
    /// Structured value from a JSON-LD `baseSalary` node
    Structured {
        currency: Option<String>,
        min: Option<f64>,
        max: Option<f64>,
        unit: Option<String>,
    },
}

/// Partially populated job fields straight out of extraction.
///
/// Every field may be absent; extraction is best-effort and a missing field
/// is never an error. Later extraction stages only fill fields still unset.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<RawSalary>,
    pub job_type: Option<String>,
    pub date_posted: Option<String>,
    pub description_html: Option<String>,
}

impl RawRecord {
    /// Whether every non-description field has been filled; used to
    /// short-circuit later fallback stages.
    pub fn is_complete(&self) -> bool {
        self.title.is_some()
            && self.company.is_some()
            && self.location.is_some()
            && self.salary.is_some()
            && self.job_type.is_some()
            && self.date_posted.is_some()
    }
}

/// The final output unit, emitted exactly once per detail page.
///
/// `url` is the canonical absolute detail-page URL and is unique within a
/// run; `source` is a constant tag. Everything else is nullable.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JobRecord {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub date_posted: Option<String>,
    pub description_html: Option<String>,
    pub description_text: Option<String>,
    pub url: String,
    pub source: String,
}

impl JobRecord {
    /// A link-only stub record, used when detail collection is disabled
    pub fn stub(url: &str) -> Self {
        Self {
            title: None,
            company: None,
            location: None,
            salary: None,
            job_type: None,
            date_posted: None,
            description_html: None,
            description_text: None,
            url: url.to_string(),
            source: crate::SOURCE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_completeness() {
        let mut raw = RawRecord::default();
        assert!(!raw.is_complete());
        raw.title = Some("Backend Engineer".to_string());
        raw.company = Some("Acme".to_string());
        raw.location = Some("Ha Noi".to_string());
        raw.salary = Some(RawSalary::Text("Negotiable".to_string()));
        raw.job_type = Some("Full-time".to_string());
        raw.date_posted = Some("2024-01-01".to_string());
        assert!(raw.is_complete());
    }

    #[test]
    fn test_stub_record() {
        let stub = JobRecord::stub("https://careerviet.vn/jobs/a-1.html");
        assert_eq!(stub.url, "https://careerviet.vn/jobs/a-1.html");
        assert_eq!(stub.source, "careerviet.vn");
        assert!(stub.title.is_none());
    }
}
