//! Integration tests for docscout using wiremock

use docscout::{
    Config, ContentFetcher, ExtractApiStructureRequest, FetchError, FetchRequest, Fetcher,
    FocusArea, ReadApiDocsRequest, ReadApiDocsSummaryRequest, ReadMultipleApiDocsRequest, Tool,
    TRUNCATION_MARKER,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REFERENCE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Widgets API Reference</title></head>
<body>
  <h1>Widgets API</h1>
  <p>All requests need an API key sent in the <code>X-API-Key</code> header.</p>
  <h2>List widgets</h2>
  <p><code>GET /v1/widgets</code> returns every widget you own.</p>
  <table>
    <tr><th>Parameter</th><th>Type</th><th>Required</th></tr>
    <tr><td>limit</td><td>integer</td><td>no</td></tr>
    <tr><td>color</td><td>string</td><td>no</td></tr>
  </table>
  <pre>curl -H "X-API-Key: secret" https://widgets.example.com/api/v1/widgets</pre>
  <p>Exceeding 60 requests per minute returns HTTP 429.</p>
</body>
</html>"#;

const SHELL_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Acme Developer Portal</title><meta name="description" content="Build on Acme"></head>
<body><div id="root"></div><script src="/static/js/main.8f3a.js"></script><noscript>You need to enable JavaScript to run this app.</noscript></body>
</html>"#;

fn fast_config() -> Config {
    Config {
        retry_delay_ms: 0,
        timeout_ms: 5_000,
        ..Default::default()
    }
}

fn tool(config: Config) -> Tool {
    Tool::builder().config(config).build()
}

async fn serve(server: &MockServer, route: &str, body: &str, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), content_type))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_read_html_document() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/docs", REFERENCE_HTML, "text/html").await;

    let url = format!("{}/docs", mock_server.uri());
    let text = tool(fast_config())
        .read_api_docs(ReadApiDocsRequest::new(&url))
        .await;

    assert!(text.starts_with(&format!("URL: {url}\nContent-Type: text/html\nStatus: 200\n\nContent:\n")));
    assert!(text.contains("<h1>Widgets API</h1>"));
}

#[tokio::test]
async fn test_read_json_is_pretty_printed() {
    let mock_server = MockServer::start().await;
    let body = format!(r#"{{"name":"widgets","description":"{}"}}"#, "d".repeat(120));
    serve(&mock_server, "/spec.json", &body, "application/json").await;

    let text = tool(fast_config())
        .read_api_docs(ReadApiDocsRequest::new(format!("{}/spec.json", mock_server.uri())))
        .await;

    assert!(text.contains("Content:\n{\n  \"name\": \"widgets\",\n  \"description\": \"ddd"));
}

#[tokio::test]
async fn test_caller_headers_are_sent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(REFERENCE_HTML, "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = ReadApiDocsRequest::new(format!("{}/private", mock_server.uri()))
        .header("Authorization", "Bearer s3cret");
    let text = tool(fast_config()).read_api_docs(request).await;
    assert!(text.contains("Status: 200"));
}

#[tokio::test]
async fn test_http_error_exhausts_every_profile_on_every_attempt() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(9)
        .mount(&mock_server)
        .await;

    let url = format!("{}/missing", mock_server.uri());
    let fetcher = ContentFetcher::new(Arc::new(fast_config()));
    let result = fetcher.fetch(&FetchRequest::new(&url)).await;

    match result {
        Err(FetchError::HttpStatus { status, reason }) => {
            assert_eq!(status, 404);
            assert_eq!(reason, "Not Found");
        }
        other => panic!("expected HTTP 404, got {other:?}"),
    }
}

#[tokio::test]
async fn test_single_profile_without_rotation() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = Config {
        retry_with_different_headers: false,
        ..fast_config()
    };
    let text = tool(config)
        .read_api_docs(ReadApiDocsRequest::new(format!("{}/flaky", mock_server.uri())))
        .await;

    assert!(text.starts_with("Failed to read API documentation\n"));
    assert!(text.contains("Error: HTTP 503: Service Unavailable"));
    assert!(text.contains("Suggestions:"));
}

#[tokio::test]
async fn test_second_profile_succeeds() {
    let mock_server = MockServer::start().await;
    // Only the Firefox identity is let through
    Mock::given(method("GET"))
        .and(path("/picky"))
        .and(header(
            "user-agent",
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw(REFERENCE_HTML, "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/picky"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = ContentFetcher::new(Arc::new(fast_config()));
    let document = fetcher
        .fetch(&FetchRequest::new(format!("{}/picky", mock_server.uri())))
        .await
        .unwrap();
    assert_eq!(document.status_code, 200);
}

#[tokio::test]
async fn test_oversized_response_is_rejected() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/huge", &"x".repeat(5_000), "text/plain").await;

    let config = Config {
        max_response_size: 1_000,
        max_retries: 1,
        ..fast_config()
    };
    let fetcher = ContentFetcher::new(Arc::new(config));
    let result = fetcher
        .fetch(&FetchRequest::new(format!("{}/huge", mock_server.uri())))
        .await;

    assert!(matches!(
        result,
        Err(FetchError::ResponseTooLarge { limit: 1_000, .. })
    ));
}

#[tokio::test]
async fn test_short_body_is_a_failure() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/stub", "<html></html>", "text/html").await;

    let config = Config {
        max_retries: 1,
        ..fast_config()
    };
    let text = tool(config)
        .read_api_docs(ReadApiDocsRequest::new(format!("{}/stub", mock_server.uri())))
        .await;

    assert!(text.contains("Response body too short (13 characters)"));
}

#[tokio::test]
async fn test_shell_page_returns_fallback() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/docs/api", SHELL_HTML, "text/html").await;

    let text = tool(fast_config())
        .read_api_docs(ReadApiDocsRequest::new(format!("{}/docs/api", mock_server.uri())))
        .await;

    assert!(text.contains("Page type: SPA"));
    assert!(text.contains("Page title: Acme Developer Portal"));
    assert!(text.contains("- /static/js/main.8f3a.js"));
    assert!(text.contains("API reference (inferred from URL):"));
}

#[tokio::test]
async fn test_openapi_summary() {
    let mock_server = MockServer::start().await;
    let spec = json!({
        "openapi": "3.0.3",
        "info": {"title": "Widget Service", "version": "2.1.0", "description": "Manage widgets"},
        "servers": [{"url": "https://widgets.example.com/v2"}],
        "paths": {
            "/widgets": {"get": {"summary": "List"}},
            "/widgets/{id}": {"get": {"summary": "Fetch"}, "delete": {"summary": "Remove"}}
        }
    });
    serve(&mock_server, "/openapi.json", &spec.to_string(), "application/json").await;

    let text = tool(fast_config())
        .read_api_docs_summary(ReadApiDocsSummaryRequest {
            url: format!("{}/openapi.json", mock_server.uri()),
            headers: None,
        })
        .await;

    assert!(text.contains("Summary:\nAPI Specification: OpenAPI 3.0.3"));
    assert!(text.contains("Title: Widget Service"));
    assert!(text.contains("Server: https://widgets.example.com/v2"));
    assert!(text.contains("Paths: 2"));
    assert!(text.contains("- GET /widgets\n"));
    assert!(text.contains("- GET, DELETE /widgets/{id}\n"));
}

#[tokio::test]
async fn test_large_document_is_auto_summarized() {
    let mock_server = MockServer::start().await;
    let body = "GET /api/items returns items\n".repeat(2_000);
    serve(&mock_server, "/big.txt", &body, "text/plain").await;

    let text = tool(fast_config())
        .read_api_docs(ReadApiDocsRequest::new(format!("{}/big.txt", mock_server.uri())).max_length(500))
        .await;

    assert!(text.contains("Note: content exceeded the length budget"));
    assert!(text.contains("- GET /api/items"));
}

#[tokio::test]
async fn test_large_document_is_truncated_without_auto_summary() {
    let mock_server = MockServer::start().await;
    let body = "GET /api/items returns items\n".repeat(2_000);
    serve(&mock_server, "/big.txt", &body, "text/plain").await;

    let config = Config {
        auto_summary_for_large_content: false,
        ..fast_config()
    };
    let text = tool(config)
        .read_api_docs(ReadApiDocsRequest::new(format!("{}/big.txt", mock_server.uri())).max_length(500))
        .await;

    assert!(text.ends_with(TRUNCATION_MARKER));
    let content = text.split("Content:\n").nth(1).unwrap();
    assert!(content.chars().count() <= 500 + TRUNCATION_MARKER.chars().count());
}

#[tokio::test]
async fn test_batch_with_failing_member() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/one", REFERENCE_HTML, "text/html").await;
    serve(&mock_server, "/three", REFERENCE_HTML, "text/html").await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = fast_config();
    let budget = config.max_content_length;
    let urls = ["/one", "/two", "/three"]
        .iter()
        .map(|p| format!("{}{}", mock_server.uri(), p))
        .collect();
    let text = tool(config)
        .read_multiple_api_docs(ReadMultipleApiDocsRequest {
            urls,
            headers: None,
            max_length: None,
        })
        .await;

    let sections: Vec<&str> = text.split("=== Document ").skip(1).collect();
    assert_eq!(sections.len(), 3);
    assert!(sections[0].starts_with("1 ===\nURL: "));
    assert!(sections[0].contains("Summary:\nTitle: Widgets API Reference"));
    assert!(sections[1].starts_with("2 ===\nFailed to read API documentation"));
    assert!(sections[1].contains("HTTP 500: Internal Server Error"));
    assert!(sections[2].contains("Summary:\nTitle: Widgets API Reference"));
    assert!(text.chars().count() <= 2 * budget);
}

#[tokio::test]
async fn test_extract_structure() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/reference", REFERENCE_HTML, "text/html").await;

    let request = ExtractApiStructureRequest::new(format!("{}/reference", mock_server.uri())).focus([
        FocusArea::Endpoints,
        FocusArea::Authentication,
        FocusArea::Parameters,
        FocusArea::Examples,
        FocusArea::Errors,
        FocusArea::Ratelimits,
    ]);
    let text = tool(fast_config()).extract_api_structure(request).await;
    let report: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(report["pageType"], "static");
    assert_eq!(report["contentType"], "text/html");
    assert!(report["endpoints"]
        .as_array()
        .unwrap()
        .contains(&json!("GET /v1/widgets")));
    assert_eq!(report["authentication"], "API Key");
    assert_eq!(report["parameters"][0]["headers"], json!(["Parameter", "Type", "Required"]));
    assert_eq!(report["parameters"][0]["rows"].as_array().unwrap().len(), 2);
    assert_eq!(report["examples"][0]["language"], "curl");
    assert!(report["errors"].as_array().unwrap().contains(&json!("HTTP 429")));
    assert!(report["rateLimit"]
        .as_array()
        .unwrap()
        .contains(&json!("60 requests per minute")));
}

#[tokio::test]
async fn test_extract_structure_default_focus() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/reference", REFERENCE_HTML, "text/html").await;

    let text = tool(fast_config())
        .call(
            "extract_api_structure",
            json!({"url": format!("{}/reference", mock_server.uri())}),
        )
        .await
        .unwrap();
    let report: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(
        report["focusAreas"],
        json!(["endpoints", "authentication", "parameters", "examples"])
    );
    assert!(report.get("errors").is_none());
    assert!(report.get("rateLimit").is_none());
}

#[tokio::test]
async fn test_extract_structure_on_failure_returns_failure_text() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = Config {
        max_retries: 1,
        ..fast_config()
    };
    let text = tool(config)
        .extract_api_structure(ExtractApiStructureRequest::new(format!(
            "{}/gone",
            mock_server.uri()
        )))
        .await;
    assert!(text.starts_with("Failed to read API documentation"));
}

#[tokio::test]
async fn test_blocked_prefix_makes_no_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(REFERENCE_HTML, "text/html"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Config {
        block_prefixes: vec![mock_server.uri()],
        ..fast_config()
    };
    let text = tool(config)
        .read_api_docs(ReadApiDocsRequest::new(format!("{}/docs", mock_server.uri())))
        .await;
    assert!(text.contains("Error: Blocked URL: prefix not allowed"));
}

#[tokio::test]
async fn test_retry_delay_only_between_attempt_passes() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/unavailable"))
        .respond_with(ResponseTemplate::new(503))
        .expect(6)
        .mount(&mock_server)
        .await;

    let delay = Duration::from_millis(300);
    let config = Config {
        max_retries: 2,
        retry_delay_ms: 300,
        ..fast_config()
    };
    let fetcher = ContentFetcher::new(Arc::new(config));

    let started = Instant::now();
    let result = fetcher
        .fetch(&FetchRequest::new(format!("{}/unavailable", mock_server.uri())))
        .await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(FetchError::HttpStatus { status: 503, .. })));
    // One pause between the two passes; pausing between profiles would cost five
    assert!(elapsed >= delay, "finished too early: {elapsed:?}");
    assert!(elapsed < delay * 3, "paused between profiles: {elapsed:?}");
}

#[tokio::test]
async fn test_request_retry_count_overrides_config() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/unavailable"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = ContentFetcher::new(Arc::new(fast_config()));
    let request = FetchRequest::new(format!("{}/unavailable", mock_server.uri())).max_retries(1);
    let result = fetcher.fetch(&request).await;
    assert!(matches!(result, Err(FetchError::HttpStatus { status: 503, .. })));
}

#[tokio::test]
async fn test_request_timeout_overrides_config() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(REFERENCE_HTML, "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = Config {
        retry_with_different_headers: false,
        ..fast_config()
    };
    let fetcher = ContentFetcher::new(Arc::new(config));
    let request = FetchRequest::new(format!("{}/slow", mock_server.uri()))
        .timeout(Duration::from_millis(200))
        .max_retries(1);

    let started = Instant::now();
    let result = fetcher.fetch(&request).await;
    assert!(matches!(result, Err(FetchError::Timeout)), "got {result:?}");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_shell_page_fallback_is_truncated() {
    let mock_server = MockServer::start().await;
    let mut shell = String::from("<!DOCTYPE html><html><head><title>Portal</title></head><body><div id=\"root\"></div>");
    for i in 0..3_000 {
        shell.push_str(&format!("<script src=\"/static/js/chunk.{i}.js\"></script>"));
    }
    shell.push_str("</body></html>");
    serve(&mock_server, "/portal", &shell, "text/html").await;

    let request = ReadApiDocsRequest::new(format!("{}/portal", mock_server.uri())).max_length(1_000);
    let text = tool(fast_config()).read_api_docs(request).await;

    let (_, fallback) = text.split_once("Page type: SPA\n\n").unwrap();
    assert!(fallback.chars().count() <= 1_000 + TRUNCATION_MARKER.chars().count());
    assert!(fallback.ends_with(TRUNCATION_MARKER));
}

#[tokio::test]
async fn test_extract_structure_respects_content_budget() {
    let mock_server = MockServer::start().await;
    let mut page = String::from("<!DOCTYPE html><html><body><h1>Catalog API</h1>");
    for i in 0..500 {
        page.push_str(&format!(
            "<p><code>GET /v1/catalog/items/{i}</code></p><pre>curl https://catalog.example.com/v1/items/{i}\n  -H 'Accept: application/json'</pre>"
        ));
    }
    page.push_str("</body></html>");
    serve(&mock_server, "/catalog", &page, "text/html").await;

    let config = Config {
        max_content_length: 2_000,
        ..fast_config()
    };
    let text = tool(config)
        .extract_api_structure(ExtractApiStructureRequest::new(format!(
            "{}/catalog",
            mock_server.uri()
        )))
        .await;

    assert!(text.chars().count() <= 2_000);
    let report: Value = serde_json::from_str(&text).unwrap();
    let listed = report["endpoints"].as_array().unwrap().len();
    assert_eq!(listed as u64 + report["omittedEndpoints"].as_u64().unwrap(), 500);
}

#[tokio::test]
async fn test_call_without_url_is_failure_text() {
    let text = tool(fast_config())
        .call("read_api_docs", json!({"headers": {}}))
        .await
        .unwrap();
    assert!(text.starts_with("Failed to read API documentation\n"));
    assert!(text.contains("Error: Missing required parameter: url"));
}

#[tokio::test]
async fn test_call_unknown_tool() {
    let result = tool(fast_config()).call("read_everything", json!({})).await;
    assert!(matches!(result, Err(docscout::ToolError::UnknownTool(_))));
}
