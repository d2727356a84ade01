//! OpenAPI from comments - command-line tool for generating OpenAPI documents.
//!
//! Operations, tags and API details are read from `OpenAPI` sections in the doc comments
//! of a Rust project; every type they reference is resolved from the project's source.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-comments [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! openapi-from-comments ./my-api-project -o openapi.yaml
//! ```
//!
//! Generate JSON documentation with bare schema names:
//! ```bash
//! openapi-from-comments ./my-api-project -f json -n simple -o openapi.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-comments ./my-api-project -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_comments::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("OpenAPI from comments starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
