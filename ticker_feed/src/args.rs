//! Command-line arguments for the demo feed.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Board IP address (IPv4 or IPv6).
    #[clap(long, default_value = "127.0.0.1")]
    pub server_ip: String,

    /// Path to a JSON snapshot file (array of 24h ticker records) to start from.
    #[clap(long)]
    pub snapshot: String,

    /// Pause between update batches, in milliseconds.
    #[clap(long, default_value_t = 250)]
    pub interval_ms: u64,

    /// Number of instruments touched by each update batch.
    #[clap(long, default_value_t = 5)]
    pub batch_size: usize,

    /// Resend a full snapshot of the current state every N seconds.
    #[clap(long)]
    pub resnapshot_secs: Option<u64>,
}
