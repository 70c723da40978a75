//! Heuristic extraction of API facts
//!
//! Each fact is described by a table of [`ExtractionRule`]s: a pattern plus
//! the part of the document it runs over. Element-scoped rules evaluate
//! against the text of elements selected from the parsed page, so unclosed
//! tags and entities never break a match. Nothing in this module fails; a
//! document without the signals simply yields empty results.

use crate::markup::Page;
use crate::normalize::{is_html, is_json_content_type};
use crate::summary::{clip, openapi};
use crate::truncate::truncate;
use crate::types::{
    ApiStructureReport, CodeExample, CodeLanguage, FetchedDocument, FocusArea, ParameterTable,
};
use regex::Regex;
use scraper::Selector;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Data rows kept per parameter table
pub const MAX_TABLE_ROWS: usize = 10;

/// Code examples kept per document
pub const MAX_EXAMPLES: usize = 10;

/// Characters of code shown in an example preview
pub const PREVIEW_CHARS: usize = 50;

/// Code shorter than this (after trimming) is not an example
const MIN_EXAMPLE_CHARS: usize = 10;

/// Endpoints listed in a structure report
pub const MAX_REPORT_ENDPOINTS: usize = 50;

/// Parameter tables kept per document
const MAX_TABLES: usize = 20;

/// Cells kept per parameter table row
const MAX_COLUMNS: usize = 12;

const MAX_CELL_CHARS: usize = 100;
const MAX_ITEM_CHARS: usize = 200;

const ERROR_MATCH_CAP: usize = 10;
const RATE_LIMIT_MATCH_CAP: usize = 5;

const PARAMETER_KEYWORDS: &[&str] = &["parameter", "param", "field", "argument", "required"];

/// Where a rule looks for matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Inline text of every element with this tag
    Element(&'static str),
    /// The raw document, markup included
    Markup,
    /// Visible text of the document
    Text,
}

/// One declarative extraction rule
struct ExtractionRule {
    name: &'static str,
    scope: Scope,
    pattern: &'static str,
}

struct CompiledRule {
    name: &'static str,
    scope: Scope,
    selector: Option<Selector>,
    regex: Regex,
}

fn compile(rules: &[ExtractionRule]) -> Vec<CompiledRule> {
    rules
        .iter()
        .map(|rule| CompiledRule {
            name: rule.name,
            scope: rule.scope,
            selector: match rule.scope {
                Scope::Element(tag) => {
                    Some(Selector::parse(tag).expect("hardcoded selector is valid"))
                }
                Scope::Markup | Scope::Text => None,
            },
            regex: Regex::new(rule.pattern).expect("hardcoded regex pattern is valid"),
        })
        .collect()
}

const ENDPOINT_RULES: &[ExtractionRule] = &[
    ExtractionRule {
        name: "method-in-code",
        scope: Scope::Element("code"),
        pattern: r"(?i)\b(?:GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)\s+/[^\s<>]*",
    },
    ExtractionRule {
        name: "path-in-code",
        scope: Scope::Element("code"),
        pattern: r"^\s*/[A-Za-z0-9_\-./{}:]+\s*$",
    },
    ExtractionRule {
        name: "api-url",
        scope: Scope::Markup,
        pattern: r#"https?://[^\s"'<>)]+/api(?:/[^\s"'<>)]*)?"#,
    },
    ExtractionRule {
        name: "method-in-cell",
        scope: Scope::Element("td"),
        pattern: r"(?i)\b(?:GET|POST|PUT|DELETE|PATCH)\s+/[^\s<>]*",
    },
];

const ERROR_RULES: &[ExtractionRule] = &[
    ExtractionRule {
        name: "error-code",
        scope: Scope::Text,
        pattern: r"(?i)\berror\s+code:?\s*\d+",
    },
    ExtractionRule {
        name: "status-code",
        scope: Scope::Text,
        pattern: r"(?i)\bstatus\s+code:?\s*\d{3}",
    },
    ExtractionRule {
        name: "http-status",
        scope: Scope::Text,
        pattern: r"(?i)\bhttp\s+\d{3}\b",
    },
    ExtractionRule {
        name: "common-status",
        scope: Scope::Text,
        pattern: r"\b(?:400|401|403|404|429|500|502|503)\b",
    },
];

const RATE_LIMIT_RULES: &[ExtractionRule] = &[
    ExtractionRule {
        name: "rate-limit",
        scope: Scope::Text,
        pattern: r"(?i)\brate[\s-]?limit(?:s|ed|ing)?\b[^.\n]{0,80}",
    },
    ExtractionRule {
        name: "requests-per-interval",
        scope: Scope::Text,
        pattern: r"(?i)\b\d[\d,]*\s+(?:requests?|calls?)\s*(?:per|/|an?|each)\s*(?:second|minute|hour|day|sec|min|s|m|h)\b",
    },
    ExtractionRule {
        name: "throttling",
        scope: Scope::Text,
        pattern: r"(?i)\bthrottl\w*[^.\n]{0,60}",
    },
    ExtractionRule {
        name: "quota",
        scope: Scope::Text,
        pattern: r"(?i)\bquotas?\b[^.\n]{0,60}",
    },
];

/// Authentication labels in priority order
const AUTH_RULES: &[(&str, &str)] = &[
    ("API Key", r"(?i)\bapi[\s_-]?key\b|\bx-api-key\b"),
    ("Bearer Token", r"(?i)\bbearer\b"),
    (
        "Basic Auth",
        r"(?i)\bbasic\s+auth(?:entication)?\b|authorization:\s*basic\b",
    ),
    ("OAuth", r"(?i)\boauth"),
    ("JWT", r"(?i)\bjwt\b|json web token"),
];

static ENDPOINTS: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(ENDPOINT_RULES));
static ERRORS: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(ERROR_RULES));
static RATE_LIMITS: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(RATE_LIMIT_RULES));

static AUTHENTICATION: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    AUTH_RULES
        .iter()
        .map(|(label, pattern)| {
            (
                *label,
                Regex::new(pattern).expect("hardcoded regex pattern is valid"),
            )
        })
        .collect()
});

static HTTP_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)\b")
        .expect("hardcoded regex pattern is valid")
});

static SHELL_INVOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:\$\s*)?(?:curl|wget|http|httpie)\s").expect("hardcoded regex pattern is valid")
});

static PYTHON_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:import\s+\w+(?:\s+as\s+\w+)?\s*$|from\s+[\w.]+\s+import\b|def\s+\w+\s*\()|\bprint\(")
        .expect("hardcoded regex pattern is valid")
});

static JAVASCRIPT_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:const|let)\s+\w+\s*=|=>|\brequire\(|\bawait\s+fetch\(")
        .expect("hardcoded regex pattern is valid")
});

static JAVA_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)\bpublic\s+(?:static\s+)?(?:final\s+)?class\b|^\s*import\s+[a-z][\w.]*\.\w+;")
        .expect("hardcoded regex pattern is valid")
});

/// A document prepared once for every rule
pub(crate) struct Source<'a> {
    markup: &'a str,
    page: Option<Page>,
    text: String,
}

impl<'a> Source<'a> {
    /// Parse markup-looking content; anything else is matched as plain text
    pub(crate) fn new(content: &'a str) -> Self {
        if is_html(None, content) || content.contains("</") {
            Self::html(content)
        } else {
            Self {
                markup: content,
                page: None,
                text: content.to_string(),
            }
        }
    }

    /// Parse content known to be HTML
    pub(crate) fn html(content: &'a str) -> Self {
        let page = Page::parse(content);
        let text = page.visible_text();
        Self {
            markup: content,
            page: Some(page),
            text,
        }
    }

    pub(crate) fn markup(&self) -> &'a str {
        self.markup
    }

    pub(crate) fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    /// Every match of `rule`, capped per rule, in scope order
    fn matches(&self, rule: &CompiledRule, cap: usize) -> Vec<String> {
        let element_texts;
        let haystacks: Vec<&str> = match (rule.scope, &rule.selector, &self.page) {
            (Scope::Element(_), Some(selector), Some(page)) => {
                element_texts = page.texts(selector);
                element_texts.iter().map(String::as_str).collect()
            }
            (Scope::Element(_), _, _) => Vec::new(),
            (Scope::Markup, _, _) => vec![self.markup],
            (Scope::Text, _, _) => vec![self.text.as_str()],
        };

        haystacks
            .iter()
            .flat_map(|haystack| rule.regex.find_iter(haystack))
            .map(|m| match rule.scope {
                Scope::Markup => collapse(&m.as_str().replace("&amp;", "&")),
                Scope::Element(_) | Scope::Text => collapse(m.as_str()),
            })
            .filter(|m| !m.is_empty())
            .take(cap)
            .collect()
    }
}

/// Collapse internal whitespace onto single spaces
fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Append `items` to `out`, skipping anything already present
fn extend_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, items: Vec<String>) {
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
}

fn run_rules(source: &Source<'_>, rules: &[CompiledRule], cap: usize) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    for rule in rules {
        let matches = source.matches(rule, cap);
        tracing::trace!(rule = rule.name, count = matches.len(), "Rule evaluated");
        extend_unique(&mut found, &mut seen, matches);
    }
    found
}

/// Uppercase a leading HTTP verb so `get /x` and `GET /x` coincide
fn normalize_endpoint(candidate: &str) -> Option<String> {
    let candidate = collapse(candidate.trim_end_matches([',', ';', '.', ')']));
    if candidate.is_empty() {
        return None;
    }
    if let Some(verb) = HTTP_VERB.find(&candidate) {
        let rest = &candidate[verb.end()..];
        return Some(format!("{}{}", verb.as_str().to_uppercase(), rest));
    }
    candidate.contains('/').then_some(candidate)
}

pub(crate) fn endpoints_in(source: &Source<'_>) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();

    for rule in ENDPOINTS.iter() {
        let candidates = source
            .matches(rule, usize::MAX)
            .iter()
            .filter_map(|candidate| normalize_endpoint(candidate))
            .collect();
        extend_unique(&mut found, &mut seen, candidates);
    }

    found
}

/// Endpoint-like strings, de-duplicated in rule order
pub fn extract_endpoints(content: &str) -> Vec<String> {
    endpoints_in(&Source::new(content))
}

pub(crate) fn authentication_in(source: &Source<'_>) -> Option<&'static str> {
    AUTHENTICATION
        .iter()
        .find(|(_, regex)| regex.is_match(source.text()))
        .map(|(label, _)| *label)
}

/// First authentication scheme mentioned, by priority
pub fn detect_authentication(content: &str) -> Option<&'static str> {
    authentication_in(&Source::new(content))
}

fn clip_cells(cells: Vec<String>) -> Vec<String> {
    cells
        .iter()
        .take(MAX_COLUMNS)
        .map(|cell| clip(cell, MAX_CELL_CHARS))
        .collect()
}

pub(crate) fn parameter_tables_in(source: &Source<'_>) -> Vec<ParameterTable> {
    let Some(page) = source.page() else {
        return Vec::new();
    };

    page.tables()
        .into_iter()
        .filter(|table| {
            let text = table.text.to_lowercase();
            PARAMETER_KEYWORDS.iter().any(|keyword| text.contains(keyword))
        })
        .filter_map(|table| {
            let mut rows = table.rows.into_iter();
            let headers = rows.next().map(clip_cells).unwrap_or_default();
            let data: Vec<Vec<String>> = rows
                .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
                .map(clip_cells)
                .collect();

            if headers.is_empty() && data.is_empty() {
                return None;
            }

            let omitted_rows = data.len().saturating_sub(MAX_TABLE_ROWS);
            Some(ParameterTable {
                headers,
                rows: data.into_iter().take(MAX_TABLE_ROWS).collect(),
                omitted_rows,
            })
        })
        .take(MAX_TABLES)
        .collect()
}

/// Tables that look like parameter references
pub fn extract_parameter_tables(content: &str) -> Vec<ParameterTable> {
    parameter_tables_in(&Source::new(content))
}

/// Classify a snippet by its syntax signature
pub fn classify_language(code: &str) -> CodeLanguage {
    let trimmed = code.trim();
    if SHELL_INVOCATION.is_match(trimmed) || trimmed.starts_with("curl ") {
        CodeLanguage::Curl
    } else if (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
    {
        CodeLanguage::Json
    } else if PYTHON_SIGNATURE.is_match(trimmed) {
        CodeLanguage::Python
    } else if JAVASCRIPT_SIGNATURE.is_match(trimmed) {
        CodeLanguage::JavaScript
    } else if JAVA_SIGNATURE.is_match(trimmed) {
        CodeLanguage::Java
    } else {
        CodeLanguage::Unknown
    }
}

pub(crate) fn code_examples_in(source: &Source<'_>) -> Vec<CodeExample> {
    let Some(page) = source.page() else {
        return Vec::new();
    };

    page.code_blocks()
        .iter()
        .filter_map(|block| {
            let code = block.trim();
            if code.chars().count() <= MIN_EXAMPLE_CHARS {
                return None;
            }
            Some(CodeExample {
                language: classify_language(code),
                preview: code.chars().take(PREVIEW_CHARS).collect(),
                code: code.to_string(),
            })
        })
        .take(MAX_EXAMPLES)
        .collect()
}

/// Preformatted blocks and multi-line code spans
pub fn extract_code_examples(content: &str) -> Vec<CodeExample> {
    code_examples_in(&Source::new(content))
}

/// Error and status code mentions
pub fn extract_error_codes(content: &str) -> Vec<String> {
    run_rules(&Source::new(content), &ERRORS, ERROR_MATCH_CAP)
}

/// Rate limit and quota phrasing
pub fn extract_rate_limits(content: &str) -> Vec<String> {
    run_rules(&Source::new(content), &RATE_LIMITS, RATE_LIMIT_MATCH_CAP)
}

/// Endpoints of an OpenAPI document, or of the text patterns otherwise
fn document_endpoints(document: &FetchedDocument, source: &Source<'_>) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();

    if document
        .content_type
        .as_deref()
        .is_some_and(is_json_content_type)
    {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&document.content) {
            extend_unique(&mut found, &mut seen, openapi::endpoint_lines(&value));
        }
    }

    extend_unique(&mut found, &mut seen, endpoints_in(source));
    found
}

/// Clip every item to one line's worth, dropping duplicates that creates
fn clip_items(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|item| clip(item, MAX_ITEM_CHARS))
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Run the requested focus areas over a fetched document
///
/// Areas that were not requested stay `None` and are left out of the
/// serialized report. Requested list areas are always present, even when
/// empty; authentication is only present when a scheme was detected.
///
/// The pretty-printed report stays within `budget` characters whenever its
/// fixed fields allow: endpoints are capped, code is clipped, and trailing
/// entries of the largest areas are dropped until it fits.
pub fn build_report(
    document: &FetchedDocument,
    focus_areas: &[FocusArea],
    budget: usize,
) -> ApiStructureReport {
    let wants = |area: FocusArea| focus_areas.contains(&area);
    let source = Source::new(&document.content);

    let (endpoints, omitted_endpoints) = if wants(FocusArea::Endpoints) {
        let all = clip_items(document_endpoints(document, &source));
        let omitted = all.len().saturating_sub(MAX_REPORT_ENDPOINTS);
        (
            Some(all.into_iter().take(MAX_REPORT_ENDPOINTS).collect()),
            omitted,
        )
    } else {
        (None, 0)
    };

    let code_budget = (budget / (2 * MAX_EXAMPLES)).max(PREVIEW_CHARS);
    let examples = wants(FocusArea::Examples).then(|| {
        code_examples_in(&source)
            .into_iter()
            .map(|example| CodeExample {
                code: truncate(&example.code, code_budget, true),
                ..example
            })
            .collect()
    });

    let mut report = ApiStructureReport {
        url: document.url.clone(),
        content_type: document.content_type.clone(),
        page_type: document.page_type(),
        focus_areas: focus_areas.to_vec(),
        endpoints,
        omitted_endpoints,
        authentication: if wants(FocusArea::Authentication) {
            authentication_in(&source).map(str::to_string)
        } else {
            None
        },
        parameters: wants(FocusArea::Parameters).then(|| parameter_tables_in(&source)),
        examples,
        errors: wants(FocusArea::Errors)
            .then(|| clip_items(run_rules(&source, &ERRORS, ERROR_MATCH_CAP))),
        rate_limit: wants(FocusArea::Ratelimits)
            .then(|| clip_items(run_rules(&source, &RATE_LIMITS, RATE_LIMIT_MATCH_CAP))),
        spa_fallback: document
            .spa_fallback
            .as_deref()
            .map(|fallback| truncate(fallback, budget / 2, true)),
        truncated: false,
    };

    fit_to_budget(&mut report, budget);
    report
}

fn pretty_chars<T: Serialize + ?Sized>(value: &T) -> usize {
    serde_json::to_string_pretty(value)
        .map(|json| json.chars().count())
        .unwrap_or(0)
}

/// List areas of a report that can give up entries
#[derive(Debug, Clone, Copy)]
enum Area {
    Endpoints,
    Parameters,
    Examples,
    Errors,
    RateLimit,
}

const SHEDDABLE: [Area; 5] = [
    Area::Endpoints,
    Area::Parameters,
    Area::Examples,
    Area::Errors,
    Area::RateLimit,
];

impl Area {
    fn size(self, report: &ApiStructureReport) -> usize {
        match self {
            Area::Endpoints => report.endpoints.as_ref().map_or(0, pretty_chars),
            Area::Parameters => report.parameters.as_ref().map_or(0, pretty_chars),
            Area::Examples => report.examples.as_ref().map_or(0, pretty_chars),
            Area::Errors => report.errors.as_ref().map_or(0, pretty_chars),
            Area::RateLimit => report.rate_limit.as_ref().map_or(0, pretty_chars),
        }
    }

    /// Drop the last entry, returning roughly how many characters that freed
    fn shed(self, report: &mut ApiStructureReport) -> Option<usize> {
        match self {
            Area::Endpoints => {
                let endpoint = report.endpoints.as_mut()?.pop()?;
                report.omitted_endpoints += 1;
                Some(pretty_chars(&endpoint))
            }
            Area::Parameters => {
                let tables = report.parameters.as_mut()?;
                let table = tables.last_mut()?;
                match table.rows.pop() {
                    Some(row) => {
                        table.omitted_rows += 1;
                        Some(pretty_chars(&row))
                    }
                    None => tables.pop().map(|table| pretty_chars(&table)),
                }
            }
            Area::Examples => report.examples.as_mut()?.pop().map(|e| pretty_chars(&e)),
            Area::Errors => report.errors.as_mut()?.pop().map(|e| pretty_chars(&e)),
            Area::RateLimit => report.rate_limit.as_mut()?.pop().map(|e| pretty_chars(&e)),
        }
    }
}

/// Drop trailing entries of the largest areas until the report fits
fn fit_to_budget(report: &mut ApiStructureReport, budget: usize) {
    loop {
        let rendered = pretty_chars(report);
        if rendered <= budget {
            return;
        }

        let mut sizes: Vec<(Area, usize)> = SHEDDABLE
            .iter()
            .map(|area| (*area, area.size(report)))
            .collect();
        let mut excess = rendered - budget;

        while excess > 0 {
            let Some(largest) = sizes
                .iter_mut()
                .filter(|(_, size)| *size > 0)
                .max_by_key(|(_, size)| *size)
            else {
                tracing::debug!(rendered, budget, "Structure report cannot shrink further");
                return;
            };

            match largest.0.shed(report) {
                Some(freed) => {
                    let freed = freed.max(1);
                    largest.1 = largest.1.saturating_sub(freed);
                    excess = excess.saturating_sub(freed);
                    report.truncated = true;
                }
                None => largest.1 = 0,
            }
        }
    }
}
