//! Summaries of documentation pages

use super::clip;
use crate::structure::{self, Source};
use regex::Regex;
use std::collections::HashSet;
use std::fmt::Write;
use std::sync::LazyLock;

const MAX_HEADINGS: usize = 15;
const MAX_ENDPOINTS: usize = 20;
const MAX_TABLE_PREVIEW_ROWS: usize = 3;
const MAX_EXAMPLES: usize = 5;
const MAX_BASE_URLS: usize = 5;
const MAX_HEADING_CHARS: usize = 120;

static BASE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bhttps?://(?:api\.[a-z0-9.-]+(?::\d+)?(?:/v\d+(?:\.\d+)?)?|[a-z0-9.-]+(?::\d+)?/api(?:/v\d+(?:\.\d+)?)?)",
    )
    .expect("hardcoded regex pattern is valid")
});

/// API base addresses mentioned on the page, de-duplicated
fn base_urls(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    BASE_URL
        .find_iter(html)
        .map(|m| m.as_str().trim_end_matches(['.', '/']).to_string())
        .filter(|url| seen.insert(url.clone()))
        .take(MAX_BASE_URLS)
        .collect()
}

pub fn summarize(html: &str) -> String {
    let source = Source::html(html);
    let mut output = String::new();

    if let Some(page) = source.page() {
        if let Some(title) = page.title() {
            let _ = writeln!(output, "Title: {title}");
        }
        if let Some(description) = page.meta_content("description") {
            let _ = writeln!(output, "Description: {description}");
        }

        let headings = page.headings();
        if !headings.is_empty() {
            output.push_str("\nSections:\n");
            for (level, text) in headings.iter().take(MAX_HEADINGS) {
                let indent = "  ".repeat(usize::from(level.saturating_sub(1)));
                let _ = writeln!(output, "{indent}- {}", clip(text, MAX_HEADING_CHARS));
            }
        }
    }

    let endpoints = structure::endpoints_in(&source);
    if !endpoints.is_empty() {
        output.push_str("\nEndpoints:\n");
        for endpoint in endpoints.iter().take(MAX_ENDPOINTS) {
            let _ = writeln!(output, "- {endpoint}");
        }
        if endpoints.len() > MAX_ENDPOINTS {
            let _ = writeln!(output, "... and {} more", endpoints.len() - MAX_ENDPOINTS);
        }
    }

    let tables = structure::parameter_tables_in(&source);
    if !tables.is_empty() {
        output.push_str("\nParameters:\n");
        for (index, table) in tables.iter().enumerate() {
            let _ = writeln!(output, "Table {}: {}", index + 1, table.headers.join(" | "));
            for row in table.rows.iter().take(MAX_TABLE_PREVIEW_ROWS) {
                let _ = writeln!(output, "  {}", row.join(" | "));
            }
            let hidden = table.rows.len().saturating_sub(MAX_TABLE_PREVIEW_ROWS) + table.omitted_rows;
            if hidden > 0 {
                let _ = writeln!(output, "  ... and {hidden} more rows");
            }
        }
    }

    let examples = structure::code_examples_in(&source);
    if !examples.is_empty() {
        output.push_str("\nCode examples:\n");
        for example in examples.iter().take(MAX_EXAMPLES) {
            let preview = example.preview.replace('\n', " ");
            let _ = writeln!(output, "- [{}] {}", example.language.as_str(), preview);
        }
    }

    if let Some(auth) = structure::authentication_in(&source) {
        let _ = writeln!(output, "\nAuthentication: {auth}");
    }

    let bases = base_urls(source.markup());
    if !bases.is_empty() {
        output.push_str("\nBase URLs:\n");
        for base in bases {
            let _ = writeln!(output, "- {base}");
        }
    }

    if output.trim().is_empty() {
        let lead: Vec<&str> = source
            .text()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .take(5)
            .collect();
        output = format!("Overview:\n{}\n", lead.join("\n"));
    }

    output
}
