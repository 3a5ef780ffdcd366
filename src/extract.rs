use once_cell::sync::Lazy;
use schemars::schema_for;
use serde::Serialize;
use serde_json::Value;

use crate::api::models::{ExtractionResult, PageSummary};
use crate::error::{AppError, Result};

/// Page extracted by `GET /extract`.
pub const DEMO_PAGE_URL: &str =
    "https://pharmac.govt.nz/pharmaceutical-schedule/general-rules-section-a";

/// Pages extracted by `GET /extract/pages`.
pub const DEMO_PAGES_URLS: [&str; 3] = [
    "https://pharmac.govt.nz/pharmaceutical-schedule/general-rules-section-a",
    "https://pharmac.govt.nz/pharmaceutical-schedule",
    "https://pharmac.govt.nz/medicine-funding-and-supply/the-funding-process",
];

// Output schemas are derived once and shared by every request
static PAGES_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::to_value(schema_for!(ExtractionResult)).expect("Failed to serialize pages schema")
});

static PAGE_SUMMARY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::to_value(schema_for!(PageSummary)).expect("Failed to serialize page schema")
});

/// A request to the extraction provider. Serialized as-is into the provider call.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExtractJob {
    pub urls: Vec<String>,
    pub prompt: String,
    pub schema: Value,
}

impl ExtractJob {
    /// Job asking for `{ pages: [...] }`, one entry per page.
    pub fn pages(urls: Vec<String>) -> Self {
        Self {
            urls,
            prompt: String::new(),
            schema: PAGES_SCHEMA.clone(),
        }
    }

    /// Job asking for a single `{ title, fulltext_compressed }` object.
    pub fn single_page(urls: Vec<String>) -> Self {
        Self {
            urls,
            prompt: String::new(),
            schema: PAGE_SUMMARY_SCHEMA.clone(),
        }
    }

    pub fn demo_page() -> Self {
        Self::single_page(vec![DEMO_PAGE_URL.to_string()])
    }

    pub fn demo_pages() -> Self {
        Self::pages(DEMO_PAGES_URLS.iter().map(|url| url.to_string()).collect())
    }
}

/// Every character treated as a line boundary, `\r\n` included as `\r` then `\n`.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Splits a newline-separated URL string, trimming entries and dropping blank lines.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(LINE_BREAKS)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validates a raw `POST /extract` body and returns the URLs it names.
pub fn urls_from_payload(body: &[u8]) -> Result<Vec<String>> {
    let payload: Option<Value> = serde_json::from_slice(body).ok();

    let urls = payload
        .as_ref()
        .and_then(|payload| payload.get("urls"))
        .ok_or_else(|| AppError::InvalidRequest("Missing urls in request payload".to_string()))?;

    let urls = urls
        .as_str()
        .ok_or_else(|| AppError::InvalidRequest("urls must be a string".to_string()))?;

    let url_list = parse_url_list(urls);
    if url_list.is_empty() {
        return Err(AppError::InvalidRequest("No valid URLs provided".to_string()));
    }

    Ok(url_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_message(body: &[u8]) -> String {
        match urls_from_payload(body) {
            Err(AppError::InvalidRequest(msg)) => msg,
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn parse_keeps_order_and_strips_blanks() {
        let urls = parse_url_list("  https://a.test \n\n\t\nhttps://b.test\r\nhttps://c.test\n   ");
        assert_eq!(urls, vec!["https://a.test", "https://b.test", "https://c.test"]);
    }

    #[test]
    fn parse_splits_on_every_line_boundary() {
        let urls = parse_url_list(
            "https://a.test\u{2028}https://b.test\x0bhttps://c.test\x0chttps://d.test\u{85}https://e.test\x1ehttps://f.test",
        );
        assert_eq!(
            urls,
            vec![
                "https://a.test",
                "https://b.test",
                "https://c.test",
                "https://d.test",
                "https://e.test",
                "https://f.test",
            ]
        );
    }

    #[test]
    fn parse_of_blank_input_is_empty() {
        assert!(parse_url_list("").is_empty());
        assert!(parse_url_list("   \n  \n").is_empty());
    }

    #[test]
    fn payload_validation_messages() {
        assert_eq!(invalid_message(b""), "Missing urls in request payload");
        assert_eq!(invalid_message(b"not json"), "Missing urls in request payload");
        assert_eq!(invalid_message(b"{}"), "Missing urls in request payload");
        assert_eq!(invalid_message(br#"["urls"]"#), "Missing urls in request payload");
        assert_eq!(invalid_message(br#"{"urls": 123}"#), "urls must be a string");
        assert_eq!(invalid_message(br#"{"urls": ["https://a.test"]}"#), "urls must be a string");
        assert_eq!(invalid_message(br#"{"urls": "   \n  \n"}"#), "No valid URLs provided");
    }

    #[test]
    fn payload_yields_urls() {
        let urls = urls_from_payload(br#"{"urls": "https://a.test\nhttps://b.test"}"#).unwrap();
        assert_eq!(urls, vec!["https://a.test", "https://b.test"]);
    }

    #[test]
    fn pages_schema_describes_page_array() {
        let job = ExtractJob::pages(vec!["https://a.test".to_string()]);
        assert_eq!(job.prompt, "");
        assert_eq!(job.schema["properties"]["pages"]["type"], "array");

        let page = &job.schema["definitions"]["ExtractionPage"];
        let required: Vec<&str> = page["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(required.contains(&"title"));
        assert!(required.contains(&"fulltext_compressed"));
        assert!(!required.contains(&"url"));
    }

    #[test]
    fn demo_jobs_use_fixed_urls() {
        let single = ExtractJob::demo_page();
        assert_eq!(single.urls, vec![DEMO_PAGE_URL]);
        assert!(single.schema["properties"]["fulltext_compressed"].is_object());

        let multi = ExtractJob::demo_pages();
        assert_eq!(multi.urls.len(), 3);
        assert!(multi.schema["properties"]["pages"].is_object());
    }
}
