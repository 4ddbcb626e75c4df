//! Subcommand handlers.
//!
//! Each handler builds a report that renders either as text or as pretty
//! JSON on stdout. Logs go to stderr.

pub mod file_key;
pub mod fingerprint;

use std::fmt;

use serde::Serialize;

use crate::config::{CliConfig, OutputFormat};

/// Print `report` in the requested format.
pub fn emit<T: Serialize + fmt::Display>(format: OutputFormat, report: &T) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => println!("{report}"),
    }
    Ok(())
}

/// Print the effective configuration.
pub fn show_config(config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => {
            println!("# {}", CliConfig::config_path().display());
            print!("{}", toml::to_string_pretty(config)?);
        }
    }
    Ok(())
}
