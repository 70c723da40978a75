//! Concurrent multi-document reads

use crate::config::Config;
use crate::error::FetchError;
use crate::fetchers::Fetcher;
use crate::pipeline::{read_document, ReadOptions};
use crate::report;
use crate::truncate::{marker_length, truncate};
use crate::types::FetchRequest;
use futures::future::join_all;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{error, info};

const BATCH_HEADING: &str = "Batch read results:\n\n";

/// Read every URL concurrently and combine the reports
///
/// Each member is summarized and runs as its own task, so one failing or
/// panicking member only affects its own section. The combined report never
/// exceeds twice the configured content budget.
pub async fn process_batch(
    fetcher: Arc<dyn Fetcher>,
    config: Arc<Config>,
    urls: &[String],
    headers: &HashMap<String, String>,
    max_length: usize,
) -> String {
    if urls.is_empty() {
        return format!("{BATCH_HEADING}No URLs provided. Pass at least one documentation URL.");
    }

    info!(count = urls.len(), "Processing batch");

    let tasks = urls.iter().map(|url| {
        let fetcher = Arc::clone(&fetcher);
        let config = Arc::clone(&config);
        let request = FetchRequest::new(url.clone()).headers(headers.clone());
        tokio::spawn(async move {
            let options = ReadOptions {
                max_length,
                summarize: true,
            };
            read_document(fetcher.as_ref(), &config, &request, options).await
        })
    });
    let outcomes = join_all(tasks).await;

    let mut output = String::from(BATCH_HEADING);
    for (index, (url, outcome)) in urls.iter().zip(outcomes).enumerate() {
        let _ = writeln!(output, "=== Document {} ===", index + 1);
        match outcome {
            Ok(section) => output.push_str(&section),
            Err(join_error) => {
                error!(url = %url, error = %join_error, "Batch member task failed");
                let err = FetchError::RequestError(format!("task failed: {join_error}"));
                output.push_str(&report::failure(url, &err));
            }
        }
        output.push_str("\n\n");
    }

    let budget = (config.max_content_length * 2).saturating_sub(marker_length());
    truncate(&output, budget, config.smart_truncation)
}
