//! Content-type dispatch and JSON pretty-printing

use serde::{Deserialize, Serialize};

/// Structural family of a fetched document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Json,
    Html,
    Text,
}

impl DocumentFormat {
    /// Classify by Content-Type, falling back to sniffing the body
    pub fn detect(content_type: Option<&str>, body: &str) -> Self {
        if content_type.is_some_and(is_json_content_type) {
            DocumentFormat::Json
        } else if is_html(content_type, body) {
            DocumentFormat::Html
        } else {
            DocumentFormat::Text
        }
    }
}

/// Check if a Content-Type names a JSON document (including `+json` suffixes)
pub fn is_json_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    ct_lower.contains("application/json") || ct_lower.contains("+json")
}

/// Check if content is HTML based on content type and body
pub fn is_html(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        let ct_lower = ct.to_lowercase();
        if ct_lower.contains("text/html") || ct_lower.contains("application/xhtml") {
            return true;
        }
    }

    let trimmed = body.trim_start();
    let head: String = trimmed.chars().take(15).collect::<String>().to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Prepare fetched content for the caller
///
/// JSON is re-serialized with two-space indentation; malformed JSON is
/// returned exactly as received, and so is every other format.
pub fn normalize(content: &str, content_type: Option<&str>) -> String {
    if content_type.is_some_and(is_json_content_type) {
        return match serde_json::from_str::<serde_json::Value>(content) {
            Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| content.to_string()),
            Err(_) => content.to_string(),
        };
    }
    content.to_string()
}
