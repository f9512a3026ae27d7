// Command line interface
use crate::infrastructure::config::DEFAULT_CONFIG_PATH;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "appliance-telemetry", version, about = "Appliance power sessions")]
pub struct Cli {
    /// Settings file, extension optional
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the latest reading of each switch over HTTP
    Serve,
    /// Segment stored readings into sessions and write them as CSV
    Export {
        /// Only readings after this instant (RFC 3339 or YYYY-MM-DD, UTC)
        #[arg(short, long, value_parser = parse_cutoff)]
        after: DateTime<Utc>,

        /// Keep a final run that never returned to zero draw
        #[arg(long)]
        close_trailing: bool,

        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

pub fn parse_cutoff(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| format!("expected RFC 3339 or YYYY-MM-DD, got {:?}", value))
}
