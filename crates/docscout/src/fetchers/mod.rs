//! Document acquisition
//!
//! The command surface only sees the [`Fetcher`] trait, so the
//! pipelines can run against the real HTTP fetcher or any other source of
//! documents.

mod http;

pub use http::ContentFetcher;

use crate::config::Config;
use crate::error::FetchError;
use crate::types::{FetchRequest, FetchedDocument};
use async_trait::async_trait;
use url::Url;

/// Source of documents for the read and extraction pipelines
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &'static str;

    /// Acquire one document
    ///
    /// Returns the document on the first successful sub-attempt, or the
    /// last observed error once every attempt has failed.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedDocument, FetchError>;
}

/// Check a URL against scheme rules and the configured prefix lists
///
/// These checks happen before any network traffic and are never retried.
pub fn validate_url(url: &str, config: &Config) -> Result<Url, FetchError> {
    if url.trim().is_empty() {
        return Err(FetchError::MissingUrl);
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(FetchError::InvalidUrlScheme);
    }

    let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrlScheme)?;

    if !config.allow_prefixes.is_empty()
        && !config
            .allow_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix))
    {
        return Err(FetchError::BlockedUrl);
    }

    if config
        .block_prefixes
        .iter()
        .any(|prefix| url.starts_with(prefix))
    {
        return Err(FetchError::BlockedUrl);
    }

    Ok(parsed)
}
