//! Docscout - API documentation reading for LLM tools
//!
//! Fetches remote documentation pages with header rotation and retries,
//! recognizes script-rendered shell pages, and turns what it gets into
//! bounded text: the content itself, a format-aware summary, or a JSON
//! report of endpoints, authentication, parameters, examples, error codes
//! and rate limits.
//!
//! ```no_run
//! use docscout::{ReadApiDocsRequest, Tool};
//!
//! # async fn run() {
//! let tool = Tool::default();
//! let report = tool
//!     .read_api_docs(ReadApiDocsRequest::new("https://petstore3.swagger.io/api/v3/openapi.json"))
//!     .await;
//! println!("{report}");
//! # }
//! ```

mod batch;
mod config;
mod error;
pub mod fetchers;
pub mod markup;
mod normalize;
mod pipeline;
mod profiles;
mod report;
pub mod spa;
pub mod structure;
pub mod summary;
mod tool;
pub mod truncate;
mod types;

pub use batch::process_batch;
pub use config::Config;
pub use error::{ConfigError, FetchError, ToolError};
pub use fetchers::{ContentFetcher, Fetcher};
pub use normalize::{normalize, DocumentFormat};
pub use pipeline::{read_document, render_document, ReadOptions};
pub use profiles::{HeaderProfile, HeaderProfileSet};
pub use report::Payload;
pub use tool::{
    Tool, ToolBuilder, ToolDefinition, EXTRACT_API_STRUCTURE, READ_API_DOCS,
    READ_API_DOCS_SUMMARY, READ_MULTIPLE_API_DOCS, TOOL_NAMES,
};
pub use truncate::{truncate, TRUNCATION_MARKER};
pub use types::{
    ApiStructureReport, CodeExample, CodeLanguage, ExtractApiStructureRequest, FetchRequest,
    FetchedDocument, FocusArea, PageType, ParameterTable, ReadApiDocsRequest,
    ReadApiDocsSummaryRequest, ReadMultipleApiDocsRequest,
};

/// Default User-Agent of the primary header profile
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Description of `read_api_docs` for LLM consumption
pub const READ_API_DOCS_DESCRIPTION: &str = r#"Reads an API documentation page (HTML, OpenAPI/Swagger JSON or plain text).

- Retries with several browser-like header profiles
- Pretty-prints JSON documents
- Summarizes automatically when the content exceeds maxLength
- Detects JavaScript-rendered pages and reports what can be inferred"#;

/// Description of `read_multiple_api_docs` for LLM consumption
pub const READ_MULTIPLE_API_DOCS_DESCRIPTION: &str = r#"Reads several API documentation pages concurrently and returns one summarized section per URL.

A failing URL only affects its own section."#;

/// Description of `read_api_docs_summary` for LLM consumption
pub const READ_API_DOCS_SUMMARY_DESCRIPTION: &str = r#"Reads an API documentation page and returns a compact summary: endpoints, authentication, parameter tables, code examples and base URLs."#;

/// Description of `extract_api_structure` for LLM consumption
pub const EXTRACT_API_STRUCTURE_DESCRIPTION: &str = r#"Extracts structured API facts from a documentation page as JSON.

focusAreas: endpoints, authentication, parameters, examples, errors, ratelimits
(default: endpoints, authentication, parameters, examples)"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# Docscout

Reads remote API documentation and returns bounded text suited to a limited context window.

## Tools

### read_api_docs
- `url` (required): documentation URL (http:// or https://)
- `headers` (optional): extra HTTP headers, e.g. an Authorization header
- `maxLength` (optional): content budget in characters (default 15000)
- `extractSummary` (optional): return a summary instead of the content

Content longer than `maxLength` is summarized automatically; JSON is pretty-printed.

### read_multiple_api_docs
- `urls` (required): list of documentation URLs
- `headers` (optional): headers sent with every URL
- `maxLength` (optional): per-document budget (default 8000)

Returns `=== Document N ===` sections in input order. Each document is summarized.

### read_api_docs_summary
- `url` (required), `headers` (optional)

OpenAPI/Swagger documents yield title, version, server, path count and endpoint lines.
HTML pages yield sections, endpoints, parameter tables, code examples, authentication and base URLs.
Plain text yields an overview plus endpoint, authentication and parameter lines.

### extract_api_structure
- `url` (required), `headers` (optional)
- `focusAreas` (optional): any of endpoints, authentication, parameters, examples, errors, ratelimits

Returns JSON with `url`, `contentType`, `pageType` (`static` or `spa`), `focusAreas` and one field per requested area.
At most 50 endpoints are listed (`omittedEndpoints` counts the rest). When the report would exceed the content
budget, trailing entries are dropped and `truncated` is set.

## Examples

### Read an OpenAPI document
```json
{"url": "https://api.example.com/openapi.json"}
```

### Summarize a reference page with a token
```json
{"url": "https://docs.example.com/api", "headers": {"Authorization": "Bearer <token>"}, "extractSummary": true}
```

### Extract error codes and rate limits
```json
{"url": "https://docs.example.com/errors", "focusAreas": ["errors", "ratelimits"]}
```

## Error Handling
- Unreachable pages, HTTP errors, oversized or empty responses are retried, then reported as text with suggestions
- JavaScript-rendered pages are reported with their title, description, script bundles and URL-based hints
- Malformed arguments are reported as text; unknown focus areas are ignored
- Only an unknown tool name is a protocol error
"#;
