//! Command line interface for the `vividus-status` binary.
//!
//! Loads a run configuration and known-issue registry, failing on malformed
//! registries, and optionally classifies a failure description against it.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `vividus-status` binary.
#[derive(Debug, Parser)]
#[command(
    name = "vividus-status",
    version,
    about = "Validate known-issue registries and classify assertion failures"
)]
pub struct Cli {
    /// Run configuration file (JSON).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Known-issue registry; overrides the configured path.
    #[arg(short, long)]
    pub registry: Option<PathBuf>,

    /// Run property matched by additional patterns, as NAME=VALUE.
    #[arg(short = 'D', long = "property", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Failure description to resolve against the registry.
    #[arg(short, long)]
    pub failure: Option<String>,

    /// Story the failure was raised in.
    #[arg(long, requires = "failure")]
    pub story: Option<String>,

    /// Scenario the failure was raised in.
    #[arg(long, requires = "failure")]
    pub scenario: Option<String>,

    /// Step the failure was raised in.
    #[arg(long, requires = "failure")]
    pub step: Option<String>,
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_owned(), value.to_owned())),
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}
