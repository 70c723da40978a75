//! Docscout CLI - read API documentation from the command line or over MCP

mod mcp;

use clap::{Parser, Subcommand};
use docscout::{
    Config, ExtractApiStructureRequest, FocusArea, ReadApiDocsRequest, ReadApiDocsSummaryRequest,
    ReadMultipleApiDocsRequest, Tool, TOOL_LLMTXT,
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Docscout - API documentation reader for LLM tools
#[derive(Parser, Debug)]
#[command(name = "docscout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON configuration file (camelCase keys, all optional)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
    /// Read one documentation page
    Read {
        /// URL to read
        url: String,

        /// Return a summary instead of the content
        #[arg(long)]
        summary: bool,

        /// Content budget in characters
        #[arg(long)]
        max_length: Option<usize>,

        /// Extra request header, as 'Name: value' (repeatable)
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
    },
    /// Summarize one documentation page
    Summary {
        /// URL to summarize
        url: String,

        /// Extra request header, as 'Name: value' (repeatable)
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
    },
    /// Extract endpoints, auth, parameters and more as JSON
    Structure {
        /// URL to analyze
        url: String,

        /// Focus areas, comma separated
        #[arg(long, value_delimiter = ',')]
        focus: Vec<FocusArea>,

        /// Extra request header, as 'Name: value' (repeatable)
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
    },
    /// Read several pages concurrently
    Batch {
        /// URLs to read
        #[arg(required = true)]
        urls: Vec<String>,

        /// Per-document budget in characters
        #[arg(long)]
        max_length: Option<usize>,

        /// Extra request header, as 'Name: value' (repeatable)
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout belongs to the protocol and the reports
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docscout=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let tool = Tool::builder().config(config).build();

    let output = match cli.command {
        Some(Commands::Mcp) => {
            mcp::run_server(tool).await;
            return;
        }
        Some(Commands::Read {
            url,
            summary,
            max_length,
            headers,
        }) => {
            let request = ReadApiDocsRequest {
                url,
                headers: parse_headers(&headers),
                max_length,
                extract_summary: Some(summary),
            };
            tool.read_api_docs(request).await
        }
        Some(Commands::Summary { url, headers }) => {
            let request = ReadApiDocsSummaryRequest {
                url,
                headers: parse_headers(&headers),
            };
            tool.read_api_docs_summary(request).await
        }
        Some(Commands::Structure {
            url,
            focus,
            headers,
        }) => {
            let request = ExtractApiStructureRequest {
                url,
                headers: parse_headers(&headers),
                focus_areas: (!focus.is_empty()).then_some(focus),
            };
            tool.extract_api_structure(request).await
        }
        Some(Commands::Batch {
            urls,
            max_length,
            headers,
        }) => {
            let request = ReadMultipleApiDocsRequest {
                urls,
                headers: parse_headers(&headers),
                max_length,
            };
            tool.read_multiple_api_docs(request).await
        }
        None => {
            eprintln!("Usage: docscout read <URL>");
            eprintln!("   or: docscout mcp");
            eprintln!("   or: docscout --help");
            std::process::exit(1);
        }
    };

    writeln_safe(&output);
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, docscout::ConfigError> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Parse repeated `Name: value` arguments, skipping malformed ones
fn parse_headers(raw: &[String]) -> Option<HashMap<String, String>> {
    let headers: HashMap<String, String> = raw
        .iter()
        .filter_map(|header| {
            let (name, value) = header.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                eprintln!("Ignoring malformed header: {}", header);
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect();
    (!headers.is_empty()).then_some(headers)
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
