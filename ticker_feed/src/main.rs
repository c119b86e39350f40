//! Ticker Feed — a demo upstream for the ticker board. It loads a snapshot file, pushes
//! it to the board over TCP, and then streams random-walk update batches over UDP until
//! interrupted, optionally resending a full snapshot of its current state.
//!
//! Usage example (CLI):
//! ```bash
//! ticker_feed --server-ip 127.0.0.1 --snapshot ./demos/snapshot.json --interval-ms 250
//! ```
//!
//! The snapshot file is a JSON array of 24h ticker records; see `ticker_common::raw`.
#![warn(missing_docs)]
mod args;
mod model;
mod sender;

use crate::args::Args;
use crate::model::ticker_walk::TickerWalk;
use crate::sender::FeedSender;
use clap::Parser;
use log::{error, info, warn};
use std::fs;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};
use ticker_common::net::{SNAPSHOT_PORT, UPDATE_PORT, addr};
use ticker_common::raw::decode_snapshot;
use ticker_common::{Instrument, Result, TickerError};

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down feed...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| TickerError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let file_path = normalize_path(&args.snapshot);
    if !is_file_exist(&file_path) {
        return Err(TickerError::Format(format!(
            "Snapshot file not found: {}",
            file_path.display()
        )));
    }
    let records = decode_snapshot(&fs::read(&file_path)?)?;
    let instruments: Vec<Instrument> = records.iter().filter_map(Instrument::from_raw).collect();
    let mut walk = TickerWalk::new(instruments);
    info!("Loaded {} instruments from {}", walk.len(), file_path.display());
    if walk.is_empty() {
        warn!("Nothing to stream: no instrument in the snapshot has a usable price");
    }

    let server_ip = args.server_ip.trim().replace('"', "");
    let snapshot_address = addr(&server_ip, SNAPSHOT_PORT);
    let update_address = addr(&server_ip, UPDATE_PORT);

    FeedSender::send_snapshot(&snapshot_address, &walk.snapshot())?;

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    info!("Streaming updates from {} to {}", socket.local_addr()?, update_address);

    let interval = Duration::from_millis(args.interval_ms);
    let resnapshot = args.resnapshot_secs.map(Duration::from_secs);
    let mut last_snapshot = Instant::now();
    let mut rng = rand::rng();

    while !shutdown.load(Ordering::Relaxed) {
        thread::sleep(interval);

        if resnapshot.is_some_and(|every| last_snapshot.elapsed() >= every) {
            if let Err(e) = FeedSender::send_snapshot(&snapshot_address, &walk.snapshot()) {
                error!("Snapshot resend failed: {}", e);
            }
            last_snapshot = Instant::now();
        }

        let batch = walk.next_batch(&mut rng, args.batch_size);
        if batch.is_empty() {
            continue;
        }
        if let Err(e) = FeedSender::send_batch(&socket, &update_address, &batch) {
            error!("Sending batch failed: {}", e);
        }
    }

    info!("Feed stopped");
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &PathBuf) -> bool {
    path.exists() && path.is_file()
}
