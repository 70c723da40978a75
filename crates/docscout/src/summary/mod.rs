//! Format-aware bounded summaries
//!
//! Every branch produces text and never fails; JSON that does not parse
//! is summarized as plain text. The result is always cut to the configured
//! summary budget.

mod html;
pub mod openapi;
mod text;

use crate::config::Config;
use crate::normalize::DocumentFormat;
use crate::truncate::truncate;

/// Summarize a normalized document
pub fn summarize(content: &str, content_type: Option<&str>, config: &Config) -> String {
    let summary = match DocumentFormat::detect(content_type, content) {
        DocumentFormat::Json => match serde_json::from_str::<serde_json::Value>(content) {
            Ok(value) => openapi::summarize(&value),
            Err(err) => {
                tracing::debug!(error = %err, "JSON summary fell back to text");
                text::summarize(content)
            }
        },
        DocumentFormat::Html => html::summarize(content),
        DocumentFormat::Text => text::summarize(content),
    };

    truncate(&summary, config.summary_length, config.smart_truncation)
}

/// Shorten a single line for display
pub(crate) fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars).collect();
        format!("{}...", kept.trim_end())
    }
}
