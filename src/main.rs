//! Ballerina OpenAPI Generator - Command-line tool for generating OpenAPI documents.
//!
//! Reads Ballerina HTTP service models (YAML or JSON) and writes one OpenAPI 3.0 document
//! per service.
//!
//! # Usage
//!
//! ```bash
//! bal-openapi [OPTIONS] <INPUT>
//! ```
//!
//! # Examples
//!
//! Print the YAML documents of every service:
//! ```bash
//! bal-openapi ./model
//! ```
//!
//! Write JSON documents for one service into a directory:
//! ```bash
//! bal-openapi ./model -f json -s /petstore -o ./openapi
//! ```

use anyhow::Result;
use ballerina_openapi::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once for the verbose flag, initialize the logger, then validate
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Ballerina OpenAPI Generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
