//! Core types for docscout

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// One document to acquire
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// The URL to fetch (must be http:// or https://)
    pub url: String,
    /// Caller-supplied headers, applied on top of every header profile
    pub headers: HashMap<String, String>,
    /// Per-attempt timeout; the configured timeout when unset
    pub timeout: Option<Duration>,
    /// Attempt passes; the configured count when unset
    pub max_retries: Option<u32>,
}

impl FetchRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Add a caller header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace all caller headers
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Override the configured per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the configured number of attempt passes
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// A successfully acquired document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedDocument {
    pub url: String,
    pub content: String,
    pub content_type: Option<String>,
    pub status_code: u16,
    /// Fallback report, present only for script-rendered shell pages
    pub spa_fallback: Option<String>,
}

impl FetchedDocument {
    /// Whether the page is a shell whose content is rendered client-side
    ///
    /// When true, `content` is the shell markup rather than documentation.
    pub fn is_spa(&self) -> bool {
        self.spa_fallback.is_some()
    }

    pub fn page_type(&self) -> PageType {
        if self.is_spa() {
            PageType::Spa
        } else {
            PageType::Static
        }
    }
}

/// Category of structural information to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FocusArea {
    Endpoints,
    Authentication,
    Parameters,
    Examples,
    Errors,
    Ratelimits,
}

impl FocusArea {
    /// Areas extracted when the caller names none
    pub const DEFAULTS: [FocusArea; 4] = [
        FocusArea::Endpoints,
        FocusArea::Authentication,
        FocusArea::Parameters,
        FocusArea::Examples,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FocusArea::Endpoints => "endpoints",
            FocusArea::Authentication => "authentication",
            FocusArea::Parameters => "parameters",
            FocusArea::Examples => "examples",
            FocusArea::Errors => "errors",
            FocusArea::Ratelimits => "ratelimits",
        }
    }
}

impl FromStr for FocusArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "endpoints" => Ok(FocusArea::Endpoints),
            "authentication" | "auth" => Ok(FocusArea::Authentication),
            "parameters" | "params" => Ok(FocusArea::Parameters),
            "examples" => Ok(FocusArea::Examples),
            "errors" => Ok(FocusArea::Errors),
            "ratelimits" | "ratelimit" => Ok(FocusArea::Ratelimits),
            other => Err(format!(
                "Invalid focus area '{other}': expected endpoints, authentication, parameters, examples, errors or ratelimits"
            )),
        }
    }
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a page carried static content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Static,
    Spa,
}

/// A parameter table lifted from documentation markup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterTable {
    pub headers: Vec<String>,
    /// At most ten data rows
    pub rows: Vec<Vec<String>>,
    /// Data rows beyond the ten kept
    #[serde(skip_serializing_if = "is_zero")]
    pub omitted_rows: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Language family guessed from a code block's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Curl,
    Json,
    Python,
    JavaScript,
    Java,
    Unknown,
}

impl CodeLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeLanguage::Curl => "curl",
            CodeLanguage::Json => "json",
            CodeLanguage::Python => "python",
            CodeLanguage::JavaScript => "javascript",
            CodeLanguage::Java => "java",
            CodeLanguage::Unknown => "unknown",
        }
    }
}

/// A code example lifted from documentation markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExample {
    pub language: CodeLanguage,
    /// First 50 characters of the code
    pub preview: String,
    pub code: String,
}

/// Result of the structure extraction command
///
/// Only the requested focus areas are present. A requested `authentication`
/// that found nothing is omitted; the other requested areas serialize as
/// (possibly empty) lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStructureReport {
    pub url: String,
    pub content_type: Option<String>,
    pub page_type: PageType,
    pub focus_areas: Vec<FocusArea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<String>>,
    /// Endpoints found beyond those listed
    #[serde(default, skip_serializing_if = "is_zero")]
    pub omitted_endpoints: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterTable>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<CodeExample>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spa_fallback: Option<String>,
    /// Entries were dropped to keep the report within its size budget
    #[serde(default, skip_serializing_if = "is_false")]
    pub truncated: bool,
}

/// Arguments of `read_api_docs`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadApiDocsRequest {
    /// URL of the API documentation (must be http:// or https://)
    pub url: String,

    /// Optional HTTP request headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,

    /// Maximum characters of returned content (defaults to the configured budget)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Return a structured summary instead of the raw content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_summary: Option<bool>,
}

impl ReadApiDocsRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn summarized(mut self) -> Self {
        self.extract_summary = Some(true);
        self
    }

    pub fn wants_summary(&self) -> bool {
        self.extract_summary.unwrap_or(false)
    }
}

/// Arguments of `read_multiple_api_docs`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadMultipleApiDocsRequest {
    /// URLs of the API documentation pages
    pub urls: Vec<String>,

    /// Optional HTTP request headers, sent with every URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,

    /// Maximum characters per document (defaults to the configured batch budget)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Arguments of `read_api_docs_summary`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadApiDocsSummaryRequest {
    /// URL of the API documentation
    pub url: String,

    /// Optional HTTP request headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

/// Arguments of `extract_api_structure`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractApiStructureRequest {
    /// URL of the API documentation
    pub url: String,

    /// Optional HTTP request headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,

    /// Areas to extract (default: endpoints, authentication, parameters, examples)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "known_focus_areas"
    )]
    #[schemars(with = "Option<Vec<FocusArea>>")]
    pub focus_areas: Option<Vec<FocusArea>>,
}

/// Accept any list of names, keeping the focus areas that are recognized
fn known_focus_areas<'de, D>(deserializer: D) -> Result<Option<Vec<FocusArea>>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(names.map(|names| {
        names
            .into_iter()
            .filter_map(|name| match name.as_str().map(FocusArea::from_str) {
                Some(Ok(area)) => Some(area),
                _ => {
                    warn!(focus_area = %name, "Ignoring unknown focus area");
                    None
                }
            })
            .collect()
    }))
}

impl ExtractApiStructureRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn focus(mut self, areas: impl IntoIterator<Item = FocusArea>) -> Self {
        self.focus_areas = Some(areas.into_iter().collect());
        self
    }

    /// Requested areas, de-duplicated, or the defaults when none were named
    pub fn effective_focus_areas(&self) -> Vec<FocusArea> {
        match &self.focus_areas {
            Some(areas) if !areas.is_empty() => {
                let mut unique = Vec::with_capacity(areas.len());
                for area in areas {
                    if !unique.contains(area) {
                        unique.push(*area);
                    }
                }
                unique
            }
            _ => FocusArea::DEFAULTS.to_vec(),
        }
    }
}
