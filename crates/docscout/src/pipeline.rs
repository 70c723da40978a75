//! Single-document read pipeline
//!
//! fetch → shell check → normalize → summarize or truncate → envelope

use crate::config::Config;
use crate::fetchers::Fetcher;
use crate::normalize::normalize;
use crate::report::{self, Payload};
use crate::summary::summarize;
use crate::truncate::truncate;
use crate::types::{FetchRequest, FetchedDocument};

/// Per-call knobs of the read pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Content budget for this call
    pub max_length: usize,
    /// Summarize regardless of size
    pub summarize: bool,
}

/// Fetch one document and render it, failures included
pub async fn read_document(
    fetcher: &dyn Fetcher,
    config: &Config,
    request: &FetchRequest,
    options: ReadOptions,
) -> String {
    match fetcher.fetch(request).await {
        Ok(document) => render_document(&document, config, options),
        Err(err) => report::failure(&request.url, &err),
    }
}

/// Render a fetched document within the caller's budget
///
/// An explicit summary request always wins; otherwise content longer than
/// the budget is summarized when auto-summary is enabled and truncated when
/// it is not.
pub fn render_document(document: &FetchedDocument, config: &Config, options: ReadOptions) -> String {
    if let Some(fallback) = &document.spa_fallback {
        let fallback = truncate(fallback, options.max_length, config.smart_truncation);
        return report::spa_page(document, &fallback);
    }

    let content_type = document.content_type.as_deref();
    let normalized = normalize(&document.content, content_type);
    let oversize = normalized.chars().count() > options.max_length;
    let automatic = !options.summarize && config.auto_summary_for_large_content && oversize;

    let payload = if options.summarize || automatic {
        Payload::Summary {
            text: summarize(&normalized, content_type, config),
            automatic,
        }
    } else {
        Payload::Content(truncate(
            &normalized,
            options.max_length,
            config.smart_truncation,
        ))
    };

    report::document(document, &payload)
}
