//! Structured-metadata stage: schema.org JobPosting blocks in JSON-LD
//!
//! Detail pages usually carry an embedded `application/ld+json` script with
//! the posting's canonical fields. This stage is preferred over the CSS
//! heuristics; malformed blocks are skipped silently and the heuristic
//! stages pick up whatever is still missing.

use crate::document::Document;
use crate::output::{RawRecord, RawSalary};
use serde_json::Value;

/// Extracts the first JobPosting node found in the page's JSON-LD blocks.
///
/// Top-level arrays are flattened; a node qualifies when its `@type` (or
/// `type`) is `"JobPosting"` directly or inside a type array.
pub fn extract_job_posting(doc: &Document) -> Option<RawRecord> {
    for block in doc.json_ld_blocks() {
        let parsed: Value = match serde_json::from_str(&block) {
            Ok(v) => v,
            Err(e) => {
                tracing::trace!(error = %e, "skipping malformed JSON-LD block");
                continue;
            }
        };

        let nodes = match parsed {
            Value::Array(items) => items,
            other => vec![other],
        };

        for node in nodes {
            if is_job_posting(&node) {
                return Some(map_node(&node));
            }
        }
    }
    None
}

fn is_job_posting(node: &Value) -> bool {
    let type_value = node.get("@type").or_else(|| node.get("type"));
    match type_value {
        Some(Value::String(t)) => t == "JobPosting",
        Some(Value::Array(types)) => types.iter().any(|t| t == "JobPosting"),
        _ => false,
    }
}

fn map_node(node: &Value) -> RawRecord {
    RawRecord {
        title: string_field(node, "title").or_else(|| string_field(node, "name")),
        company: node
            .get("hiringOrganization")
            .and_then(|org| string_field(org, "name")),
        location: extract_location(node),
        salary: extract_salary(node),
        job_type: extract_employment_type(node),
        date_posted: string_field(node, "datePosted"),
        description_html: string_field(node, "description"),
    }
}

fn string_field(node: &Value, key: &str) -> Option<String> {
    node.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// `jobLocation` may be a single place or an array of places; the address
/// locality wins over the region.
fn extract_location(node: &Value) -> Option<String> {
    let job_location = node.get("jobLocation")?;
    let place = match job_location {
        Value::Array(places) => places.first()?,
        other => other,
    };
    let address = place.get("address")?;
    string_field(address, "addressLocality").or_else(|| string_field(address, "addressRegion"))
}

/// `baseSalary.value` is either a bare string/number or a QuantitativeValue
/// object with min/max bounds and a unit.
fn extract_salary(node: &Value) -> Option<RawSalary> {
    let base = node.get("baseSalary")?;
    let value = base.get("value")?;

    match value {
        Value::String(s) if !s.trim().is_empty() => Some(RawSalary::Text(s.trim().to_string())),
        Value::Number(n) => Some(RawSalary::Structured {
            currency: string_field(base, "currency"),
            min: n.as_f64(),
            max: None,
            unit: None,
        }),
        Value::Object(_) => {
            let min = value
                .get("minValue")
                .and_then(Value::as_f64)
                .or_else(|| value.get("value").and_then(Value::as_f64));
            let max = value.get("maxValue").and_then(Value::as_f64);
            let currency = string_field(value, "currency").or_else(|| string_field(base, "currency"));
            let unit = string_field(value, "unitText");
            if min.is_none() && max.is_none() {
                return None;
            }
            Some(RawSalary::Structured {
                currency,
                min,
                max,
                unit,
            })
        }
        _ => None,
    }
}

fn extract_employment_type(node: &Value) -> Option<String> {
    match node.get("employmentType")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(types) => types
            .iter()
            .find_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        _ => None,
    }
}
