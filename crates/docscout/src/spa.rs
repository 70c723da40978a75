//! Script-rendered shell page detection and fallback reporting
//!
//! A shell page serves an empty mount point and a script bundle; the actual
//! documentation only exists after client-side rendering. These pages are a
//! distinct content state rather than a failure, so instead of the body the
//! caller receives whatever metadata the shell carries plus guidance
//! inferred from the URL.

use crate::markup::Page;
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

/// Visible text below this many characters counts as "essentially empty"
const SHELL_TEXT_THRESHOLD: usize = 50;

static SHELL_SIGNATURES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Empty mount points
        r#"(?i)<div[^>]*\bid\s*=\s*["']?(?:root|app|__next|__nuxt|main-app)["']?[^>]*>\s*</div>"#,
        // Template and no-script warnings
        r"(?i)you need to enable javascript to run this app",
        r"(?i)please enable javascript",
        r"(?i)javascript is (?:required|disabled)",
        r"(?i)this (?:page|site) is a template",
        // Framework bootstraps
        r"(?i)__NEXT_DATA__|window\.__NUXT__|ng-version=|data-reactroot|data-v-app",
        r#"(?i)<script[^>]+src\s*=\s*["'][^"']*(?:react|vue|angular|svelte|ember)[^"']*["']"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("hardcoded regex pattern is valid"))
    .collect()
});

/// Fixed guidance bullets triggered by substrings of the URL
struct UrlHint {
    needles: &'static [&'static str],
    heading: &'static str,
    bullets: &'static [&'static str],
}

const URL_HINTS: &[UrlHint] = &[
    UrlHint {
        needles: &["oauth"],
        heading: "OAuth flow",
        bullets: &[
            "1. Redirect the user to the provider's authorization endpoint with client_id, redirect_uri, scope and state",
            "2. Exchange the returned authorization code at the token endpoint",
            "3. Send the access token as `Authorization: Bearer <token>` and refresh it before expiry",
        ],
    },
    UrlHint {
        needles: &["auth", "login", "token"],
        heading: "Authentication",
        bullets: &[
            "API keys are usually sent in an `X-API-Key` header or as an `api_key` query parameter",
            "Bearer tokens are sent as `Authorization: Bearer <token>`",
            "Basic auth sends base64(username:password) in the `Authorization` header",
        ],
    },
    UrlHint {
        needles: &["/docs/api", "/api-docs", "/api/", "/reference"],
        heading: "API reference",
        bullets: &[
            "Try the machine-readable spec next to the page: /openapi.json, /swagger.json or /v3/api-docs",
            "Reference pages often load their content from a JSON file visible in the network tab",
        ],
    },
    UrlHint {
        needles: &["swagger", "openapi", "redoc"],
        heading: "Swagger / OpenAPI viewer",
        bullets: &[
            "The viewer loads its spec from a URL configured in the page scripts (look for `url:` or `spec-url`)",
            "Fetch that spec URL directly to get the full API description",
        ],
    },
    UrlHint {
        needles: &["graphql"],
        heading: "GraphQL",
        bullets: &[
            "Send an introspection query to the GraphQL endpoint to retrieve the schema",
        ],
    },
];

/// Generic troubleshooting advice appended to every fallback and failure
pub const TROUBLESHOOTING: &[&str] = &[
    "Check whether the provider publishes a machine-readable spec (OpenAPI/Swagger JSON, Postman collection)",
    "Open the page in a browser and inspect the network traffic for the JSON the page loads",
    "Contact the API provider for documentation in a static format",
];

/// Whether the markup is a script-rendered shell
pub fn is_spa(body: &str) -> bool {
    if SHELL_SIGNATURES.iter().any(|re| re.is_match(body)) {
        return true;
    }
    is_bare_script_shell(body)
}

/// A page made of little more than external script references
fn is_bare_script_shell(body: &str) -> bool {
    let page = Page::parse(body);
    if page.script_sources().is_empty() {
        return false;
    }
    page.visible_text().chars().count() < SHELL_TEXT_THRESHOLD
}

/// Build the report returned in place of a shell page's body
///
/// With `include_metadata` the title, meta description and script bundles
/// of the shell are listed first. URL guidance and troubleshooting are
/// always present.
pub fn extract_fallback(body: &str, url: &str, include_metadata: bool) -> String {
    let mut output = String::from(
        "This page appears to be a single-page application (SPA): its content is rendered by JavaScript in the browser and is not present in the served HTML.\n",
    );

    if include_metadata {
        let page = Page::parse(body);
        if let Some(title) = page.title() {
            let _ = writeln!(output, "\nPage title: {title}");
        }
        if let Some(description) = page
            .meta_content("description")
            .or_else(|| page.meta_content("og:description"))
        {
            let _ = writeln!(output, "Description: {description}");
        }
        let scripts = page.script_sources();
        if !scripts.is_empty() {
            output.push_str("\nScript bundles:\n");
            for src in scripts {
                let _ = writeln!(output, "- {src}");
            }
        }
    }

    output.push('\n');
    output.push_str(&url_guidance(url));
    output
}

/// Guidance inferred from the URL, always ending with troubleshooting advice
pub fn url_guidance(url: &str) -> String {
    let lowered = url.to_lowercase();
    let mut output = String::new();

    for hint in URL_HINTS {
        if hint.needles.iter().any(|needle| lowered.contains(needle)) {
            let _ = writeln!(output, "{} (inferred from URL):", hint.heading);
            for bullet in hint.bullets {
                let _ = writeln!(output, "- {bullet}");
            }
            output.push('\n');
        }
    }

    output.push_str("Suggestions:\n");
    for tip in TROUBLESHOOTING {
        let _ = writeln!(output, "- {tip}");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_root_with_script_is_spa() {
        let html =
            r#"<html><body><div id="root"></div><script src="/static/js/main.js"></script></body></html>"#;
        assert!(is_spa(html));
    }

    #[test]
    fn test_prose_page_is_static() {
        let html = "<html><body><h1>Users API</h1><p>The users endpoint returns a paginated list of accounts. Each account carries an id, an email address and a creation timestamp.</p></body></html>";
        assert!(!is_spa(html));
    }

    #[test]
    fn test_plain_prose_is_static() {
        let text = "This reference describes every endpoint of the payments API, including request parameters, response fields and error codes.";
        assert!(text.len() >= 100);
        assert!(!is_spa(text));
    }

    #[test]
    fn test_template_warning_is_spa() {
        let html = "<noscript>You need to enable JavaScript to run this app.</noscript><div id=\"app\">loading</div>";
        assert!(is_spa(html));
    }

    #[test]
    fn test_bare_script_shell_is_spa() {
        let html = r#"<html><head><script src="/bundle.4f2a.js"></script></head><body>Loading</body></html>"#;
        assert!(is_spa(html));
    }

    #[test]
    fn test_framework_bundle_is_spa() {
        let html = r#"<html><body><p>Docs</p><script src="https://cdn.example.com/react-dom.production.min.js"></script></body></html>"#;
        assert!(is_spa(html));
    }

    #[test]
    fn test_fallback_includes_metadata() {
        let html = r#"<html><head><title>Acme API</title><meta name="description" content="Acme REST reference"></head>
            <body><div id="root"></div><script src="/static/js/main.js"></script><script src="/static/js/vendor.js"></script></body></html>"#;
        let report = extract_fallback(html, "https://acme.dev/docs/api/oauth", true);
        assert!(report.contains("Page title: Acme API"));
        assert!(report.contains("Description: Acme REST reference"));
        assert!(report.contains("- /static/js/main.js"));
        assert!(report.contains("- /static/js/vendor.js"));
        assert!(report.contains("OAuth flow (inferred from URL):"));
        assert!(report.contains("API reference (inferred from URL):"));
        assert!(report.contains("Suggestions:"));
    }

    #[test]
    fn test_fallback_without_metadata() {
        let html = r#"<title>Acme API</title><div id="root"></div><script src="/main.js"></script>"#;
        let report = extract_fallback(html, "https://acme.dev/", false);
        assert!(!report.contains("Page title"));
        assert!(!report.contains("/main.js"));
        assert!(report.contains("Suggestions:"));
    }

    #[test]
    fn test_url_guidance_without_signals() {
        let guidance = url_guidance("https://example.com/help");
        assert!(guidance.starts_with("Suggestions:"));
        for tip in TROUBLESHOOTING {
            assert!(guidance.contains(tip));
        }
    }
}
