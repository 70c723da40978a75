//! Text envelopes returned by the command surface
//!
//! Acquisition results are modeled as `Result<FetchedDocument, FetchError>`
//! everywhere else; this module is the one place either variant becomes the
//! uniform text the caller sees.

use crate::error::FetchError;
use crate::spa;
use crate::types::{ApiStructureReport, FetchedDocument};
use std::fmt::Write;

/// Body of a document envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Normalized content, already cut to the caller's budget
    Content(String),
    /// Summary; `automatic` when triggered by size rather than requested
    Summary { text: String, automatic: bool },
}

fn header(document: &FetchedDocument) -> String {
    format!(
        "URL: {}\nContent-Type: {}\nStatus: {}\n",
        document.url,
        document.content_type.as_deref().unwrap_or("unknown"),
        document.status_code
    )
}

/// Envelope for a successfully read document
pub fn document(document: &FetchedDocument, payload: &Payload) -> String {
    let mut output = header(document);
    output.push('\n');
    match payload {
        Payload::Content(content) => {
            output.push_str("Content:\n");
            output.push_str(content);
        }
        Payload::Summary { text, automatic } => {
            if *automatic {
                output.push_str(
                    "Note: content exceeded the length budget, so a summary is shown instead.\n",
                );
            }
            output.push_str("Summary:\n");
            output.push_str(text);
        }
    }
    output
}

/// Envelope for a script-rendered shell page
pub fn spa_page(document: &FetchedDocument, fallback: &str) -> String {
    let mut output = header(document);
    output.push_str("Page type: SPA\n\n");
    output.push_str(fallback);
    output
}

/// Envelope for a document that could not be acquired
pub fn failure(url: &str, error: &FetchError) -> String {
    let mut output = String::from("Failed to read API documentation\n");
    let _ = writeln!(output, "URL: {url}");
    let _ = writeln!(output, "Error: {error}");
    output.push('\n');
    output.push_str(&spa::url_guidance(url));
    output
}

/// Envelope for arguments that could not be understood
pub fn invalid_arguments(url: &str, detail: &str) -> String {
    let mut output = String::from("Failed to read API documentation\n");
    let _ = writeln!(output, "URL: {url}");
    let _ = writeln!(output, "Error: Invalid arguments: {detail}");
    output
}

/// Pretty JSON for a structure report
pub fn structure(report: &ApiStructureReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|err| format!("Failed to serialize structure report: {err}"))
}
