//! Tenderline server binary
//!
//! Starts the HTTP server for RFP dispatch and reply correlation.

use anyhow::Context;
use std::env;
use std::process;
use tenderline_server::{config::ServerConfig, start_server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        ServerConfig::from_file(config_path)
            .with_context(|| format!("loading {}", config_path))?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using defaults and environment");
        eprintln!("Usage: tenderline-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::from_env().context("reading environment")?
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Tenderline - RFP dispatch and reply correlation");
    println!();
    println!("USAGE:");
    println!("    tenderline-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG                                 Log filter (default: info)");
    println!("    SMTP_HOST, SMTP_PORT, SMTP_USER, SMTP_PASS");
    println!("    IMAP_HOST, IMAP_PORT, IMAP_USER, IMAP_PASS");
    println!("    LLM_ENDPOINT, LLM_MODEL");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain the sections");
    println!("    [server], [llm], [smtp], [imap], [registry], [documents],");
    println!("    [workflow] and any number of [[vendors]] entries.");
    println!();
}
