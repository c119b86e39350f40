//! Command-line arguments for the ticker board.
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use ticker_common::SortKey;

use crate::model::view::ViewQuery;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Local IP address to bind the snapshot (TCP) and update (UDP) listeners to.
    #[clap(long, default_value = "0.0.0.0")]
    pub bind_ip: String,

    /// JSON file with an initial snapshot to load before any feed connects.
    #[clap(long)]
    pub snapshot: Option<PathBuf>,

    /// Only show symbols containing this text (case-insensitive).
    #[clap(long, default_value = "")]
    pub filter: String,

    /// Column to sort by.
    #[clap(long, value_enum, default_value_t = SortKey::Symbol)]
    pub sort: SortKey,

    /// Sort in descending order.
    #[clap(long)]
    pub descending: bool,

    /// Maximum number of rows to print.
    #[clap(long, default_value_t = 30)]
    pub rows: usize,

    /// Minimum interval between redraws, in milliseconds.
    #[clap(long, default_value_t = 500)]
    pub refresh_ms: u64,

    /// How long a changed field stays marked, in milliseconds.
    #[clap(long, default_value_t = 1000)]
    pub flash_ms: u64,
}

impl Args {
    /// View parameters selected on the command line.
    pub fn view_query(&self) -> ViewQuery {
        ViewQuery {
            filter_text: self.filter.clone(),
            sort_key: self.sort,
            ascending: !self.descending,
        }
    }

    /// Redraw interval.
    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }

    /// Flash marker lifetime.
    pub fn flash_window(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }
}
