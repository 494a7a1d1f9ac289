//! Extraction engine: listing-page link/pagination resolution, detail-page
//! field extraction, and field normalization
//!
//! Listing pages go through [`extract_detail_links`] and [`find_next_page`];
//! detail pages go through [`extract`] and then [`finalize`], which applies
//! the normalizers and derives the plain-text description.

mod detail;
mod jsonld;
mod links;
mod normalize;

pub use detail::extract;
pub use jsonld::extract_job_posting;
pub use links::{extract_detail_links, find_next_page, PaginationStage};
pub use normalize::{normalize_job_type, normalize_location, normalize_salary, posting_age_days};

use crate::document::clean_text;
use crate::output::{JobRecord, RawRecord};
use url::Url;

/// Builds the final record from extracted raw fields.
///
/// Location, salary, and job type pass through their normalizers (which may
/// null them out); the plain-text description is derived from the HTML one.
pub fn finalize(raw: RawRecord, url: &Url) -> JobRecord {
    let description_text = raw
        .description_html
        .as_deref()
        .map(clean_text)
        .filter(|t| !t.is_empty());

    JobRecord {
        title: raw.title,
        company: raw.company,
        location: raw.location.as_deref().and_then(normalize_location),
        salary: raw.salary.as_ref().and_then(normalize_salary),
        job_type: raw.job_type.as_deref().and_then(normalize_job_type),
        date_posted: raw.date_posted,
        description_html: raw.description_html,
        description_text,
        url: url.to_string(),
        source: crate::SOURCE.to_string(),
    }
}
