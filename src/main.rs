//! Local invoker for the edge rewrite functions.
//!
//! Runs one function against a CloudFront trigger event and prints what the
//! function hands back to the CDN.

use anyhow::{Context, Result};
use clap::Parser;
use edge_rewrites::{handler_for, FunctionKind, FunctionLog};
use serde_json::Value as JsonValue;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "edge-rewrites")]
#[command(author, version, about = "Run a CloudFront edge rewrite function locally")]
struct Args {
    /// Function to run
    #[arg(short, long, env = "EDGE_FUNCTION", value_enum)]
    function: FunctionKind,

    /// Event file path (YAML or JSON). Reads JSON from stdin if omitted.
    #[arg(short, long)]
    event: Option<PathBuf>,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print an example trigger event for the function and exit.
    #[arg(long)]
    example_event: bool,
}

fn example_event(kind: FunctionKind) -> &'static str {
    match kind {
        FunctionKind::DeeplinkIndex => {
            r#"{
  "Records": [
    {
      "cf": {
        "config": {
          "distributionDomainName": "d111111abcdef8.cloudfront.net",
          "distributionId": "EDFDVBD6EXAMPLE",
          "eventType": "origin-request",
          "requestId": "4TyzHTaYWb1GX1qTfsHhEqV6HUDd_BzoBZnwfnvQc_1oF26ClkoUSEQ=="
        },
        "request": {
          "clientIp": "203.0.113.178",
          "headers": {
            "host": [{ "key": "Host", "value": "d111111abcdef8.cloudfront.net" }]
          },
          "method": "GET",
          "querystring": "",
          "uri": "/blog/"
        }
      }
    }
  ]
}"#
        }
        FunctionKind::NoStoreCache => {
            r#"{
  "Records": [
    {
      "cf": {
        "config": {
          "distributionDomainName": "d111111abcdef8.cloudfront.net",
          "distributionId": "EDFDVBD6EXAMPLE",
          "eventType": "origin-response",
          "requestId": "4TyzHTaYWb1GX1qTfsHhEqV6HUDd_BzoBZnwfnvQc_1oF26ClkoUSEQ=="
        },
        "response": {
          "headers": {
            "cache-control": [{ "key": "Cache-Control", "value": "max-age=3600" }],
            "content-type": [{ "key": "Content-Type", "value": "text/html" }]
          },
          "status": "200",
          "statusDescription": "OK"
        }
      }
    }
  ]
}"#
        }
        FunctionKind::WwwToRootRedirect => {
            r#"{
  "Records": [
    {
      "cf": {
        "config": {
          "distributionDomainName": "d111111abcdef8.cloudfront.net",
          "distributionId": "EDFDVBD6EXAMPLE",
          "eventType": "viewer-request",
          "requestId": "4TyzHTaYWb1GX1qTfsHhEqV6HUDd_BzoBZnwfnvQc_1oF26ClkoUSEQ=="
        },
        "request": {
          "clientIp": "203.0.113.178",
          "headers": {
            "host": [{ "key": "Host", "value": "www.example.com" }]
          },
          "method": "GET",
          "querystring": "",
          "uri": "/a/b"
        }
      }
    }
  ]
}"#
        }
    }
}

/// Read the event document from a file (by extension) or from stdin.
fn load_event(path: Option<&PathBuf>) -> Result<JsonValue> {
    let Some(path) = path else {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read event from stdin")?;
        return serde_json::from_str(&content).context("Failed to parse event from stdin");
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event file: {}", path.display()))?;

    let event = if path
        .extension()
        .is_some_and(|e| e == "yaml" || e == "yml")
    {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    Ok(event)
}

/// Log to stderr so stdout carries only the function's output.
fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let fmt_layer = fmt::layer().with_writer(std::io::stderr);
    let fmt_layer = if args.json_logs {
        fmt_layer.json().boxed()
    } else {
        fmt_layer.boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args);

    if args.example_event {
        println!("{}", example_event(args.function));
        return Ok(());
    }

    let event = load_event(args.event.as_ref())?;

    let handler = handler_for(args.function, FunctionLog::current());

    info!(
        function = handler.name(),
        phase = %handler.phase(),
        event = ?args.event,
        "Invoking edge function"
    );

    let output = handler
        .handle_value(event)
        .with_context(|| format!("Edge function {} failed", args.function))?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}
