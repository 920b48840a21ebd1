// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Xenon CLI - Embedded Runtime Inspector
//!
//! Performs a request through an intercepted host and prints what the
//! inspector assembled from it.

use std::env;
use std::process::ExitCode;

use xenon::{HostRuntime, InspectorConfig, NetworkInspector, NetworkRecord, RequestInit};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("xenon=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "fetch" => {
            if args.len() < 3 {
                eprintln!("Usage: xenon fetch <url> [-X <method>] [-H <name: value>]... [-d <body>]");
                return ExitCode::from(1);
            }
            match parse_fetch_options(&args[3..]) {
                Ok(init) => fetch_url(&args[2], init).await,
                Err(e) => {
                    eprintln!("{}", e);
                    ExitCode::from(1)
                }
            }
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("xenon {}", xenon::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Xenon - Embedded Runtime Inspector

USAGE:
    xenon <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>     Fetch a URL through an intercepted host and print the records
    help            Show this help message
    version         Show version information

FETCH OPTIONS:
    -X <method>         Request method (default: GET)
    -H <name: value>    Request header, may be repeated
    -d <body>           Request body

EXAMPLES:
    xenon fetch https://example.com
    xenon fetch https://api.example.com/items -X POST -H "content-type: application/json" -d '{{"a":1}}'
"#
    );
}

fn parse_fetch_options(options: &[String]) -> Result<RequestInit, String> {
    let mut init = RequestInit::new();
    let mut headers = Vec::new();
    let mut iter = options.iter();

    while let Some(option) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("Missing value for {}", option))?;
        match option.as_str() {
            "-X" | "--method" => init = init.method(value.to_uppercase()),
            "-H" | "--header" => {
                let (name, value) = value
                    .split_once(':')
                    .ok_or_else(|| format!("Invalid header: {}", value))?;
                headers.push((name.trim().to_string(), value.trim().to_string()));
            }
            "-d" | "--data" => init = init.body(value.as_str()),
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    if !headers.is_empty() {
        init = init.headers(headers);
    }
    Ok(init)
}

async fn fetch_url(url: &str, init: RequestInit) -> ExitCode {
    println!("Fetching: {}", url);

    let host = HostRuntime::global();
    let inspector = NetworkInspector::new(InspectorConfig::new().auto_enabled(true));

    let response = match host.fetch(url, init).await {
        Ok(r) => r,
        Err(e) if e.is_timeout() => {
            eprintln!("Request timed out: {}", e);
            return ExitCode::from(1);
        }
        Err(e) => {
            eprintln!("Failed to fetch URL: {}", e);
            return ExitCode::from(1);
        }
    };

    println!("\n=== Response ===");
    println!("Status: {}", response.status);
    println!("URL: {}", response.url);
    println!("Size: {} bytes", response.body.len());

    match inspector.to_json() {
        Ok(json) => {
            println!("\n=== Records ({}) ===", inspector.store().len());
            println!("{}", json);
        }
        Err(e) => {
            eprintln!("Failed to serialize records: {}", e);
            return ExitCode::from(1);
        }
    }

    for (id, record) in inspector.network_requests() {
        if let NetworkRecord::Http(http) = record {
            println!("\n=== cURL ({}) ===", id);
            println!("{}", http.to_curl());
        }
    }

    ExitCode::SUCCESS
}
