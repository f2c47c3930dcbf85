//! WSDL from source - Command-line tool for generating WSDL service descriptions.
//!
//! This binary reflects the public methods of a Rust type (or a set of free
//! functions, or a JSON/YAML signature manifest) and writes a WSDL 1.1 document
//! describing them as SOAP operations.
//!
//! # Usage
//!
//! ```bash
//! wsdl-from-source [OPTIONS] <PATH>
//! ```
//!
//! # Examples
//!
//! Describe a service type in RPC style:
//! ```bash
//! wsdl-from-source ./my-service -c Calculator -u http://localhost/calc -o calc.wsdl
//! ```
//!
//! Describe free functions in document style with nested array types:
//! ```bash
//! wsdl-from-source ./my-service -F add -F ping -s document --strategy sequence
//! ```
//!
//! Describe everything in a manifest, with verbose logging:
//! ```bash
//! wsdl-from-source services.yaml -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use wsdl_from_source::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("WSDL generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("WSDL document generation completed successfully");

    Ok(())
}
