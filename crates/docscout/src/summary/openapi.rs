//! OpenAPI / Swagger outlines and generic JSON structure summaries

use super::clip;
use serde_json::{Map, Value};
use std::fmt::Write;

/// Operations listed for a path, in display order
const METHODS: &[&str] = &["get", "post", "put", "delete", "patch"];

const MAX_ENDPOINT_LINES: usize = 10;
const MAX_DESCRIPTION_CHARS: usize = 200;
const MAX_FIELDS: usize = 5;
const MAX_DEPTH: usize = 3;

/// Summarize a parsed JSON document
///
/// Documents with a spec version and a path map get an API outline;
/// anything else gets a bounded description of its shape.
pub fn summarize(value: &Value) -> String {
    match spec_version(value) {
        Some(label) => outline(value, &label),
        None => structure(value),
    }
}

/// `"OpenAPI 3.0.1"` or `"Swagger 2.0"` for documents with a path map
fn spec_version(value: &Value) -> Option<String> {
    let root = value.as_object()?;
    root.get("paths")?.as_object()?;
    if let Some(version) = root.get("openapi") {
        Some(format!("OpenAPI {}", scalar(version)))
    } else {
        root.get("swagger")
            .map(|version| format!("Swagger {}", scalar(version)))
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One `METHOD[, METHOD...] /path` line per path with known operations
pub fn endpoint_lines(value: &Value) -> Vec<String> {
    let Some(paths) = value.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    paths
        .iter()
        .filter_map(|(path, item)| {
            let item = item.as_object()?;
            let methods: Vec<String> = METHODS
                .iter()
                .filter(|method| item.contains_key(**method))
                .map(|method| method.to_uppercase())
                .collect();
            (!methods.is_empty()).then(|| format!("{} {}", methods.join(", "), path))
        })
        .collect()
}

/// First server URL, or Swagger's host and base path
fn server(root: &Value) -> Option<String> {
    if let Some(url) = root
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first())
        .and_then(|server| server.get("url"))
        .and_then(Value::as_str)
    {
        return Some(url.to_string());
    }

    let host = root.get("host").and_then(Value::as_str)?;
    let scheme = root
        .get("schemes")
        .and_then(Value::as_array)
        .and_then(|schemes| schemes.first())
        .and_then(Value::as_str)
        .unwrap_or("https");
    let base_path = root.get("basePath").and_then(Value::as_str).unwrap_or("");
    Some(format!("{scheme}://{host}{base_path}"))
}

fn outline(root: &Value, label: &str) -> String {
    let mut output = format!("API Specification: {label}\n");
    let info = root.get("info");
    let info_field = |name: &str| info.and_then(|i| i.get(name)).and_then(Value::as_str);

    if let Some(title) = info_field("title") {
        let _ = writeln!(output, "Title: {title}");
    }
    if let Some(version) = info_field("version") {
        let _ = writeln!(output, "Version: {version}");
    }
    if let Some(description) = info_field("description") {
        let _ = writeln!(
            output,
            "Description: {}",
            clip(description.trim(), MAX_DESCRIPTION_CHARS)
        );
    }
    if let Some(server) = server(root) {
        let _ = writeln!(output, "Server: {server}");
    }

    let path_count = root
        .get("paths")
        .and_then(Value::as_object)
        .map_or(0, Map::len);
    let _ = writeln!(output, "Paths: {path_count}");

    let lines = endpoint_lines(root);
    if !lines.is_empty() {
        output.push_str("\nEndpoints:\n");
        for line in lines.iter().take(MAX_ENDPOINT_LINES) {
            let _ = writeln!(output, "- {line}");
        }
        if lines.len() > MAX_ENDPOINT_LINES {
            let _ = writeln!(
                output,
                "... and {} more",
                lines.len() - MAX_ENDPOINT_LINES
            );
        }
    }

    output
}

fn type_label(value: &Value) -> String {
    match value {
        Value::Object(map) => format!("object ({} fields)", map.len()),
        Value::Array(items) => format!("array ({} items)", items.len()),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Null => "null".to_string(),
    }
}

/// Shape of an arbitrary JSON document, bounded in depth and width
fn structure(value: &Value) -> String {
    let mut output = format!("JSON document: {}\n", type_label(value));
    describe(value, 1, &mut output);
    output
}

fn describe(value: &Value, depth: usize, output: &mut String) {
    if depth > MAX_DEPTH {
        return;
    }
    let indent = "  ".repeat(depth);

    match value {
        Value::Object(map) => {
            for (key, child) in map.iter().take(MAX_FIELDS) {
                let _ = writeln!(output, "{indent}{key}: {}", type_label(child));
                describe(child, depth + 1, output);
            }
            if map.len() > MAX_FIELDS {
                let _ = writeln!(
                    output,
                    "{indent}... and {} more fields",
                    map.len() - MAX_FIELDS
                );
            }
        }
        Value::Array(items) => {
            if let Some(first) = items.first() {
                let _ = writeln!(output, "{indent}[0]: {}", type_label(first));
                describe(first, depth + 1, output);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_openapi_outline() {
        let spec = json!({
            "openapi": "3.0.1",
            "info": {"title": "Pet Store", "version": "1.2.0"},
            "servers": [{"url": "https://api.pets.dev/v1"}],
            "paths": {
                "/pets": {"get": {}, "post": {}},
                "/pets/{id}": {"delete": {}, "parameters": []}
            }
        });
        let summary = summarize(&spec);
        assert!(summary.starts_with("API Specification: OpenAPI 3.0.1"));
        assert!(summary.contains("Title: Pet Store"));
        assert!(summary.contains("Version: 1.2.0"));
        assert!(summary.contains("Server: https://api.pets.dev/v1"));
        assert!(summary.contains("Paths: 2"));
        assert!(summary.contains("- GET, POST /pets\n"));
        assert!(summary.contains("- DELETE /pets/{id}\n"));
    }

    #[test]
    fn test_swagger_server_and_description() {
        let long = "x".repeat(500);
        let spec = json!({
            "swagger": "2.0",
            "info": {"title": "Legacy", "version": "0.9", "description": long},
            "host": "legacy.example.com",
            "basePath": "/v2",
            "schemes": ["http"],
            "paths": {}
        });
        let summary = summarize(&spec);
        assert!(summary.starts_with("API Specification: Swagger 2.0"));
        assert!(summary.contains("Server: http://legacy.example.com/v2"));
        assert!(summary.contains("Paths: 0"));
        let description = summary
            .lines()
            .find(|l| l.starts_with("Description: "))
            .unwrap();
        assert_eq!(description.len(), "Description: ".len() + 200 + 3);
    }

    #[test]
    fn test_endpoint_lines_capped_with_elision() {
        let mut paths = serde_json::Map::new();
        for i in 0..13 {
            paths.insert(format!("/items/{i}"), json!({"get": {}, "head": {}}));
        }
        let spec = json!({"openapi": "3.1.0", "info": {}, "paths": paths});
        let summary = summarize(&spec);
        assert!(summary.contains("Paths: 13"));
        assert_eq!(summary.matches("- GET /items/").count(), 10);
        assert!(summary.contains("... and 3 more"));
    }

    #[test]
    fn test_generic_structure_summary() {
        let doc = json!({
            "data": [{"id": 1, "tags": ["a"]}],
            "a": 1, "b": 2, "c": 3, "d": 4, "e": 5
        });
        let summary = summarize(&doc);
        assert!(summary.starts_with("JSON document: object (6 fields)"));
        assert!(summary.contains("  data: array (1 items)"));
        assert!(summary.contains("    [0]: object (2 fields)"));
        assert!(summary.contains("  ... and 1 more fields"));
    }

    #[test]
    fn test_structure_depth_is_bounded() {
        let mut doc = json!("leaf");
        for _ in 0..200 {
            doc = json!({ "nested": doc });
        }
        let summary = summarize(&doc);
        assert_eq!(summary.lines().count(), 1 + MAX_DEPTH);
    }

    #[test]
    fn test_paths_without_spec_version_is_generic() {
        let doc = json!({"paths": {"/a": {"get": {}}}});
        assert!(summarize(&doc).starts_with("JSON document:"));
    }
}
