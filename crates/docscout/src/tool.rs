//! Tool builder and command surface

use crate::batch::process_batch;
use crate::config::Config;
use crate::error::{FetchError, ToolError};
use crate::fetchers::{ContentFetcher, Fetcher};
use crate::pipeline::{read_document, ReadOptions};
use crate::report;
use crate::structure::build_report;
use crate::types::{
    ExtractApiStructureRequest, FetchRequest, ReadApiDocsRequest, ReadApiDocsSummaryRequest,
    ReadMultipleApiDocsRequest,
};
use crate::{
    EXTRACT_API_STRUCTURE_DESCRIPTION, READ_API_DOCS_DESCRIPTION,
    READ_API_DOCS_SUMMARY_DESCRIPTION, READ_MULTIPLE_API_DOCS_DESCRIPTION, TOOL_LLMTXT,
};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub const READ_API_DOCS: &str = "read_api_docs";
pub const READ_MULTIPLE_API_DOCS: &str = "read_multiple_api_docs";
pub const READ_API_DOCS_SUMMARY: &str = "read_api_docs_summary";
pub const EXTRACT_API_STRUCTURE: &str = "extract_api_structure";

/// Every command name, in listing order
pub const TOOL_NAMES: [&str; 4] = [
    READ_API_DOCS,
    READ_MULTIPLE_API_DOCS,
    READ_API_DOCS_SUMMARY,
    EXTRACT_API_STRUCTURE,
];

/// Name, description and argument schema of one command
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Builder for configuring the tool
#[derive(Default)]
pub struct ToolBuilder {
    config: Option<Config>,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl ToolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this configuration instead of the defaults
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Acquire documents through a custom fetcher
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn build(self) -> Tool {
        let config = Arc::new(self.config.unwrap_or_default());
        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(ContentFetcher::new(Arc::clone(&config))),
        };
        Tool { config, fetcher }
    }
}

/// Configured documentation reader
///
/// Every command returns text. Acquisition failures and malformed arguments
/// are rendered into the returned report; only an unknown command name
/// produces a [`ToolError`].
#[derive(Clone)]
pub struct Tool {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
}

impl Default for Tool {
    fn default() -> Self {
        ToolBuilder::new().build()
    }
}

fn schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_default()
}

/// Deserialize command arguments, rendering malformed ones as a failure report
fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, String> {
    let url = arguments
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    serde_json::from_value(arguments).map_err(|err| {
        debug!(error = %err, "Malformed tool arguments");
        report::invalid_arguments(&url, &err.to_string())
    })
}

/// Arguments of a single-document command; a missing url is a fetch failure
fn parse_document_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, String> {
    if arguments.get("url").map_or(true, Value::is_null) {
        return Err(report::failure("", &FetchError::MissingUrl));
    }
    parse_arguments(arguments)
}

fn fetch_request(url: &str, headers: Option<HashMap<String, String>>) -> FetchRequest {
    FetchRequest::new(url).headers(headers.unwrap_or_default())
}

impl Tool {
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Command listing for `tools/list`
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: READ_API_DOCS,
                description: READ_API_DOCS_DESCRIPTION,
                input_schema: schema::<ReadApiDocsRequest>(),
            },
            ToolDefinition {
                name: READ_MULTIPLE_API_DOCS,
                description: READ_MULTIPLE_API_DOCS_DESCRIPTION,
                input_schema: schema::<ReadMultipleApiDocsRequest>(),
            },
            ToolDefinition {
                name: READ_API_DOCS_SUMMARY,
                description: READ_API_DOCS_SUMMARY_DESCRIPTION,
                input_schema: schema::<ReadApiDocsSummaryRequest>(),
            },
            ToolDefinition {
                name: EXTRACT_API_STRUCTURE,
                description: EXTRACT_API_STRUCTURE_DESCRIPTION,
                input_schema: schema::<ExtractApiStructureRequest>(),
            },
        ]
    }

    /// Read one document, as content or as a summary
    pub async fn read_api_docs(&self, req: ReadApiDocsRequest) -> String {
        let options = ReadOptions {
            max_length: req.max_length.unwrap_or(self.config.max_content_length),
            summarize: req.wants_summary(),
        };
        let request = fetch_request(&req.url, req.headers);
        read_document(self.fetcher.as_ref(), &self.config, &request, options).await
    }

    /// Read several documents concurrently into one numbered report
    pub async fn read_multiple_api_docs(&self, req: ReadMultipleApiDocsRequest) -> String {
        let max_length = req.max_length.unwrap_or(self.config.batch_max_length);
        process_batch(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.config),
            &req.urls,
            &req.headers.unwrap_or_default(),
            max_length,
        )
        .await
    }

    /// Read one document and always summarize it
    pub async fn read_api_docs_summary(&self, req: ReadApiDocsSummaryRequest) -> String {
        let options = ReadOptions {
            max_length: self.config.max_content_length,
            summarize: true,
        };
        let request = fetch_request(&req.url, req.headers);
        read_document(self.fetcher.as_ref(), &self.config, &request, options).await
    }

    /// Extract the requested focus areas as a JSON report
    pub async fn extract_api_structure(&self, req: ExtractApiStructureRequest) -> String {
        let focus_areas = req.effective_focus_areas();
        let request = fetch_request(&req.url, req.headers);
        match self.fetcher.fetch(&request).await {
            Ok(document) => report::structure(&build_report(
                &document,
                &focus_areas,
                self.config.max_content_length,
            )),
            Err(err) => report::failure(&request.url, &err),
        }
    }

    /// Dispatch a command by name with JSON arguments
    pub async fn call(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        debug!(tool = name, "Tool call");
        let text = match name {
            READ_API_DOCS => match parse_document_arguments(arguments) {
                Ok(req) => self.read_api_docs(req).await,
                Err(report) => report,
            },
            READ_MULTIPLE_API_DOCS => match parse_arguments(arguments) {
                Ok(req) => self.read_multiple_api_docs(req).await,
                Err(report) => report,
            },
            READ_API_DOCS_SUMMARY => match parse_document_arguments(arguments) {
                Ok(req) => self.read_api_docs_summary(req).await,
                Err(report) => report,
            },
            EXTRACT_API_STRUCTURE => match parse_document_arguments(arguments) {
                Ok(req) => self.extract_api_structure(req).await,
                Err(report) => report,
            },
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };
        Ok(text)
    }
}
