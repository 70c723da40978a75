//! HTTP identity profiles
//!
//! A profile is one coherent set of request headers presented as a single
//! client identity. Documentation sites that reject one identity often
//! accept another, so the fetcher walks an ordered set of them.

use crate::config::Config;
use crate::DEFAULT_USER_AGENT;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, USER_AGENT,
};
use std::collections::HashMap;
use tracing::warn;

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,application/json,text/plain,*/*;q=0.8";

const API_CLIENT_ACCEPT: &str = "application/json, text/plain, text/html;q=0.9, */*;q=0.8";

const FIREFOX_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

const API_CLIENT_USER_AGENT: &str = concat!("docscout/", env!("CARGO_PKG_VERSION"));

/// Named set of headers for one fetch sub-attempt
#[derive(Debug, Clone)]
pub struct HeaderProfile {
    name: &'static str,
    headers: HeaderMap,
}

impl HeaderProfile {
    fn new(name: &'static str, user_agent: &str, accept: &'static str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        Self { name, headers }
    }

    fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    /// Overlay caller-supplied headers, which win over profile values
    ///
    /// With `keep_identity` the profile's own User-Agent survives.
    fn with_caller_headers(mut self, caller: &HashMap<String, String>, keep_identity: bool) -> Self {
        for (name, value) in caller {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), _) if keep_identity && name == USER_AGENT => {}
                (Ok(name), Ok(value)) => {
                    self.headers.insert(name, value);
                }
                _ => warn!(header = %name, "Skipping invalid caller header"),
            }
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Ordered profiles tried on every attempt pass
#[derive(Debug, Clone)]
pub struct HeaderProfileSet {
    profiles: Vec<HeaderProfile>,
}

impl HeaderProfileSet {
    /// Build the profiles for one request
    ///
    /// With header rotation enabled this yields three distinct identities:
    /// the configured browser, a second browser and a plain API client.
    /// Otherwise only the configured identity is used. A caller User-Agent
    /// replaces the configured identity only, so rotation still varies it.
    pub fn for_request(config: &Config, caller: &HashMap<String, String>) -> Self {
        let configured = HeaderProfile::new("configured", &config.user_agent, BROWSER_ACCEPT)
            .with_header(ACCEPT_LANGUAGE, "en-US,en;q=0.9");

        let profiles = if config.retry_with_different_headers {
            vec![
                configured,
                HeaderProfile::new("firefox", FIREFOX_USER_AGENT, BROWSER_ACCEPT)
                    .with_header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
                    .with_header(CACHE_CONTROL, "no-cache"),
                HeaderProfile::new("api-client", API_CLIENT_USER_AGENT, API_CLIENT_ACCEPT),
            ]
        } else {
            vec![configured]
        };

        Self {
            profiles: profiles
                .into_iter()
                .enumerate()
                .map(|(index, profile)| profile.with_caller_headers(caller, index > 0))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderProfile> {
        self.profiles.iter()
    }
}
