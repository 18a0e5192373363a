//! Command-line configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::data::loader::DEFAULT_SHEET;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "purchase-dashboard", about, version)]
pub struct Args {
    /// Purchases workbook (or .csv/.json/.parquet) to load at startup.
    #[arg(env = "PURCHASE_DASHBOARD_DATA")]
    pub data: Option<PathBuf>,

    /// Sheet to read from spreadsheet files.
    #[arg(long, env = "PURCHASE_DASHBOARD_SHEET", default_value = DEFAULT_SHEET)]
    pub sheet: String,

    /// Increase output logging verbosity.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Default `env_logger` filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
