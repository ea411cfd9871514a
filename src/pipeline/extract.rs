//! Reshape a job body's `results` into a page mapping.
//!
//! Pure: no I/O, no allocation beyond the returned map. Records without a
//! `page_number` are skipped, as are records whose `page_number` is not a
//! positive integer (or a string holding one). A null or missing
//! `transcript` becomes the empty string. If two records share a page
//! number the later one wins.

use crate::output::PageMap;
use serde_json::Value;
use tracing::warn;

fn page_number(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|&n| n > 0)
}

/// Build the page-number → transcript mapping from a decoded job body.
pub fn extract_pages(body: &Value) -> PageMap {
    let mut pages = PageMap::new();
    let Some(results) = body.get("results").and_then(Value::as_array) else {
        return pages;
    };

    for (idx, record) in results.iter().enumerate() {
        let Some(raw) = record.get("page_number") else {
            continue;
        };
        let Some(page) = page_number(raw) else {
            warn!("Skipping result #{} with unusable page_number {}", idx, raw);
            continue;
        };
        let text = record
            .get("transcript")
            .and_then(Value::as_str)
            .unwrap_or_default();
        pages.insert(page, text.to_string());
    }
    pages
}

/// Concatenate pages in ascending order into the merged transcript.
///
/// Each page is right-trimmed, pages are separated by one blank line, the
/// whole text is right-trimmed and ends with exactly one newline.
pub fn merge_pages(pages: &PageMap) -> String {
    let joined = pages
        .values()
        .map(|text| text.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n");
    let mut merged = joined.trim_end().to_string();
    merged.push('\n');
    merged
}
