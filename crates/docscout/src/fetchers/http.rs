//! Retrying HTTP fetcher
//!
//! Every attempt pass walks the full header profile set; the first
//! successful sub-attempt ends the whole loop. The fixed retry delay is
//! only applied between passes.

use crate::config::Config;
use crate::error::FetchError;
use crate::fetchers::{validate_url, Fetcher};
use crate::normalize::DocumentFormat;
use crate::profiles::{HeaderProfile, HeaderProfileSet};
use crate::spa;
use crate::types::{FetchRequest, FetchedDocument};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Bodies shorter than this (in characters) are treated as placeholders
const MIN_BODY_CHARS: usize = 100;

/// HTTP fetcher with header rotation, retries and size guards
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    config: Arc<Config>,
}

impl ContentFetcher {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// One GET with one header profile
    async fn attempt(
        &self,
        request: &FetchRequest,
        url: &Url,
        profile: &HeaderProfile,
    ) -> Result<FetchedDocument, FetchError> {
        let client = reqwest::Client::builder()
            .default_headers(profile.headers().clone())
            .timeout(request.timeout.unwrap_or_else(|| self.config.timeout()))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(FetchError::ClientBuildError)?;

        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let declared_length: Option<u64> = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        let limit = self.config.max_response_size;
        if let Some(size) = declared_length {
            if size > limit {
                return Err(FetchError::ResponseTooLarge { size, limit });
            }
        }

        let body = read_body_limited(response, limit).await?;
        let content = String::from_utf8_lossy(&body).into_owned();

        let length = content.chars().count();
        if length < MIN_BODY_CHARS {
            return Err(FetchError::EmptyBody { length });
        }

        let spa_fallback = self.detect_shell(&request.url, content_type.as_deref(), &content);

        Ok(FetchedDocument {
            url: request.url.clone(),
            content,
            content_type,
            status_code: status.as_u16(),
            spa_fallback,
        })
    }

    /// Fallback report for script-rendered shells, if detection is on
    fn detect_shell(&self, url: &str, content_type: Option<&str>, content: &str) -> Option<String> {
        if !self.config.enable_java_script_detection {
            return None;
        }
        // Schema documents are never page shells
        if DocumentFormat::detect(content_type, content) == DocumentFormat::Json {
            return None;
        }
        if !spa::is_spa(content) {
            return None;
        }
        debug!(url = %url, "Detected script-rendered page");
        Some(spa::extract_fallback(
            content,
            url,
            self.config.extract_from_partial_content,
        ))
    }
}

#[async_trait]
impl Fetcher for ContentFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedDocument, FetchError> {
        let url = validate_url(&request.url, &self.config)?;
        let profiles = HeaderProfileSet::for_request(&self.config, &request.headers);
        let attempts = request.max_retries.unwrap_or(self.config.max_retries).max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(self.config.retry_delay()).await;
            }

            for profile in profiles.iter() {
                debug!(url = %request.url, attempt, profile = profile.name(), "Fetching");
                match self.attempt(request, &url, profile).await {
                    Ok(document) => {
                        info!(
                            url = %request.url,
                            attempt,
                            profile = profile.name(),
                            status = document.status_code,
                            "Fetched document"
                        );
                        return Ok(document);
                    }
                    Err(err) if !err.is_retryable() => return Err(err),
                    Err(err) => {
                        warn!(
                            url = %request.url,
                            attempt,
                            profile = profile.name(),
                            error = %err,
                            "Fetch attempt failed"
                        );
                        last_error = Some(err);
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| FetchError::RequestError("no fetch attempt was made".to_string())))
    }
}

/// Stream the body, failing as soon as it outgrows `limit` bytes
async fn read_body_limited(response: reqwest::Response, limit: u64) -> Result<Bytes, FetchError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::from_reqwest)?;
        let size = (body.len() + chunk.len()) as u64;
        if size > limit {
            return Err(FetchError::ResponseTooLarge { size, limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(config: Config) -> ContentFetcher {
        ContentFetcher::new(Arc::new(config))
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_scheme_without_retrying() {
        let fetcher = fetcher(Config {
            retry_delay_ms: 60_000,
            ..Default::default()
        });
        let result = fetcher.fetch(&FetchRequest::new("ftp://example.com")).await;
        assert!(matches!(result, Err(FetchError::InvalidUrlScheme)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_empty_url() {
        let fetcher = fetcher(Config::default());
        let result = fetcher.fetch(&FetchRequest::new("")).await;
        assert!(matches!(result, Err(FetchError::MissingUrl)));
    }

    #[test]
    fn test_detect_shell_respects_toggle() {
        let shell = r#"<html><body><div id="root"></div><script src="/main.js"></script></body></html>"#;

        let enabled = fetcher(Config::default());
        let report = enabled.detect_shell("https://example.com/docs", Some("text/html"), shell);
        assert!(report.is_some());

        let disabled = fetcher(Config {
            enable_java_script_detection: false,
            ..Default::default()
        });
        assert!(disabled
            .detect_shell("https://example.com/docs", Some("text/html"), shell)
            .is_none());
    }

    #[test]
    fn test_detect_shell_skips_json() {
        let fetcher = fetcher(Config::default());
        let body = r#"{"note": "<div id=\"root\"></div>"}"#;
        assert!(fetcher
            .detect_shell("https://example.com/spec", Some("application/json"), body)
            .is_none());
    }

    #[test]
    fn test_fetcher_name() {
        assert_eq!(fetcher(Config::default()).name(), "http");
    }
}
