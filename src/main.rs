// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Intranet Session CLI
//!
//! Fetches pages behind the SSO gateway using credentials from the
//! environment.

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use intranet_session::{Error, FetchResult, IntranetSession, SessionConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "intranet_session=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "fetch" => {
            let json = args.iter().any(|a| a == "--json");
            let paths: Vec<&str> = args[2..]
                .iter()
                .map(String::as_str)
                .filter(|a| *a != "--json")
                .collect();
            if paths.is_empty() {
                eprintln!("Usage: intranet-session fetch <path>... [--json]");
                return ExitCode::from(1);
            }
            fetch_paths(&paths, json).await
        }
        "logout" => logout().await,
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("intranet-session {}", intranet_session::VERSION);
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
        r#"Intranet Session - SSO Gateway Client

USAGE:
    intranet-session <COMMAND> [OPTIONS]

COMMANDS:
    fetch <path>... Fetch one or more paths through one session
    logout          Log the session out at the identity provider
    help            Show this help message
    version         Show version information

OPTIONS:
    --json          Print fetch results as JSON

ENVIRONMENT:
    INTRANET_HOST           Gateway host (required)
    INTRANET_USERNAME       Login username (required)
    INTRANET_PASSWORD       Login password (required)
    INTRANET_MAX_HOPS       Redirects followed per fetch (default 10)
    INTRANET_TIMEOUT_SECS   Per-request timeout (default 30)
    INTRANET_MAX_PENDING    Fetches allowed to wait for the session
    INTRANET_INSECURE       Accept invalid certificates (1/true/yes)
    RUST_LOG                Log filter (logs go to stderr)

EXAMPLES:
    intranet-session fetch /index.html
    intranet-session fetch /a /b /c --json
"#
    );
}

fn open_session() -> anyhow::Result<IntranetSession> {
    let config = SessionConfig::from_env().context("reading INTRANET_* configuration")?;
    let session = IntranetSession::new(config).context("building HTTP client")?;
    Ok(session)
}

async fn fetch_paths(paths: &[&str], json: bool) -> ExitCode {
    let session = match open_session() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open session: {:#}", e);
            return ExitCode::from(1);
        }
    };

    // All paths share the session and queue on its slot
    let results = join_all(paths.iter().map(|path| session.get(path))).await;

    let mut exit = ExitCode::SUCCESS;
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(fetched) => print_result(&fetched, json),
            Err(e) => {
                eprintln!("Failed to fetch {}: {}", path, e);
                exit = exit_code(&e);
            }
        }
    }

    let report = session.metrics();
    tracing::info!(
        operations = report.operations,
        requests = report.requests,
        hops = report.hops,
        logins = report.logins,
        "Done"
    );

    exit
}

async fn logout() -> ExitCode {
    let session = match open_session() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open session: {:#}", e);
            return ExitCode::from(1);
        }
    };

    match session.logout().await {
        Ok(result) => {
            println!("Logout: {} ({} bytes)", result.status_code, result.body.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Logout failed: {}", e);
            exit_code(&e)
        }
    }
}

fn print_result(result: &FetchResult, json: bool) {
    if json {
        match serde_json::to_string(result) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("Failed to encode result: {}", e),
        }
    } else {
        println!("=== {} [{}] ===", result.path, result.status_code);
        println!("{}", result.body);
    }
}

fn exit_code(error: &Error) -> ExitCode {
    if error.is_login_failure() {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}
