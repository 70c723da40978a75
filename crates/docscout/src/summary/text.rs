//! Summaries of plain-text documents

use super::clip;
use regex::Regex;
use std::collections::HashSet;
use std::fmt::Write;
use std::sync::LazyLock;

const OVERVIEW_LINES: usize = 5;
const MATCHES_PER_PATTERN: usize = 10;
const MAX_AUTH_LINES: usize = 3;
const MAX_PARAMETER_LINES: usize = 5;
const MAX_LINE_CHARS: usize = 200;

const AUTH_KEYWORDS: &[&str] = &[
    "authentication",
    "authorization",
    "api key",
    "api_key",
    "apikey",
    "bearer",
    "oauth",
    "token",
];

const PARAMETER_KEYWORDS: &[&str] = &["parameter", "param", "required", "optional", "query string"];

static ENDPOINT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:GET|POST|PUT|DELETE|PATCH)\s+/[^\s,;)]*",
        r"(?:^|[\s(])(/api/[^\s,;)]*)",
        r#"https?://[^\s"'<>)]*/api[^\s"'<>),;]*"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("hardcoded regex pattern is valid"))
    .collect()
});

/// Endpoint-like tokens, capped per pattern then de-duplicated
fn endpoints(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for pattern in ENDPOINT_PATTERNS.iter() {
        let matches = pattern.captures_iter(content).take(MATCHES_PER_PATTERN).filter_map(|caps| {
            // Prefer the path group where the pattern has one
            caps.get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.as_str().trim_end_matches('.').to_string())
        });
        for endpoint in matches {
            if seen.insert(endpoint.clone()) {
                found.push(endpoint);
            }
        }
    }

    found
}

fn lines_with<'a>(content: &'a str, keywords: &[&str], limit: usize) -> Vec<&'a str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lowered = line.to_lowercase();
            keywords.iter().any(|keyword| lowered.contains(keyword))
        })
        .take(limit)
        .collect()
}

pub fn summarize(content: &str) -> String {
    let mut output = String::from("Overview:\n");
    for line in content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(OVERVIEW_LINES)
    {
        let _ = writeln!(output, "{}", clip(line, MAX_LINE_CHARS));
    }

    let endpoints = endpoints(content);
    if !endpoints.is_empty() {
        output.push_str("\nEndpoints:\n");
        for endpoint in endpoints {
            let _ = writeln!(output, "- {endpoint}");
        }
    }

    let auth = lines_with(content, AUTH_KEYWORDS, MAX_AUTH_LINES);
    if !auth.is_empty() {
        output.push_str("\nAuthentication:\n");
        for line in auth {
            let _ = writeln!(output, "- {}", clip(line, MAX_LINE_CHARS));
        }
    }

    let parameters = lines_with(content, PARAMETER_KEYWORDS, MAX_PARAMETER_LINES);
    if !parameters.is_empty() {
        output.push_str("\nParameters:\n");
        for line in parameters {
            let _ = writeln!(output, "- {}", clip(line, MAX_LINE_CHARS));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUIDE: &str = "Payments API\n\nThis guide covers charges.\n\nGET /api/charges lists charges\nPOST /api/charges creates one\nSee /api/refunds and https://pay.example.com/api/v1 for more.\nAuthorization: Bearer <token>\nParameter amount is required\nParameter currency is optional\n";

    #[test]
    fn test_text_summary() {
        let summary = summarize(GUIDE);
        assert!(summary.starts_with(
            "Overview:\nPayments API\nThis guide covers charges.\nGET /api/charges lists charges\n"
        ));
        assert!(summary.contains("- GET /api/charges\n"));
        assert!(summary.contains("- POST /api/charges\n"));
        assert!(summary.contains("- /api/refunds\n"));
        assert!(summary.contains("- https://pay.example.com/api/v1\n"));
        assert!(summary.contains("Authentication:\n- Authorization: Bearer <token>"));
        assert!(summary.contains("- Parameter amount is required"));
    }

    #[test]
    fn test_endpoints_deduplicated_and_capped() {
        let content: String = (0..30).map(|i| format!("GET /api/r{}\nGET /api/r{}\n", i % 12, i % 12)).collect();
        let found = endpoints(&content);
        let unique: HashSet<_> = found.iter().collect();
        assert_eq!(unique.len(), found.len());
        // 10 method matches plus at most 10 bare paths
        assert!(found.len() <= 2 * MATCHES_PER_PATTERN);
    }

    #[test]
    fn test_auth_lines_capped() {
        let content = "token one\ntoken two\ntoken three\ntoken four\n";
        let summary = summarize(content);
        assert_eq!(summary.matches("- token").count(), MAX_AUTH_LINES);
    }
}
