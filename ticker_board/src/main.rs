//! Ticker board server.
//!
//! This binary owns the instrument store and wires it to its two upstream transports:
//!
//! - `SnapshotReceiver` — TCP listener; every connection delivers a full snapshot that
//!   replaces the table.
//! - `UpdateListener` — UDP listener; every datagram delivers an update batch that is
//!   merged into existing instruments.
//!
//! Concurrency:
//! - Both listeners run on their own threads and only decode; they hand decoded payloads
//!   to the main thread over `crossbeam_channel`s.
//! - The main thread is the single writer: it applies snapshots and batches in arrival
//!   order and redraws the view on a `tick` when the store or a flash marker changed.
//! - Flash markers expire on the tracker's own timer thread.
//! - Ctrl+C stops the main loop.
//!
//! Logging goes through `env_logger` (`RUST_LOG`); the table itself is printed to stdout.
#![warn(missing_docs)]
use clap::Parser;
use crossbeam_channel::{bounded, select, tick, unbounded};
use log::{error, info};
use std::fs;
use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use ticker_board::args::Args;
use ticker_board::model::flash_tracker::FlashTracker;
use ticker_board::model::store::InstrumentStore;
use ticker_board::model::view::ViewQuery;
use ticker_board::receiver::SnapshotReceiver;
use ticker_board::render::render_table;
use ticker_board::udp_listener::UpdateListener;
use ticker_common::net::{SNAPSHOT_PORT, UPDATE_PORT, addr};
use ticker_common::raw::{RawTicker24h, RawTickerUpdate, decode_snapshot};
use ticker_common::{Result, TickerError};

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let store = Arc::new(InstrumentStore::new(FlashTracker::with_window(
        args.flash_window(),
    )));
    if let Some(path) = &args.snapshot {
        let records = decode_snapshot(&fs::read(path)?)?;
        info!("Loading initial snapshot from {}", path.display());
        store.apply_snapshot(&records)?;
    }

    let (snapshot_tx, snapshot_rx) = unbounded::<Vec<RawTicker24h>>();
    let receiver = SnapshotReceiver::new(&addr(&args.bind_ip, SNAPSHOT_PORT))?;
    thread::spawn(move || {
        if let Err(e) = receiver.receive_loop_with_channel(snapshot_tx) {
            error!("Snapshot receiver loop failed: {}", e);
        }
    });

    let (update_tx, update_rx) = unbounded::<Vec<RawTickerUpdate>>();
    let update_socket = UdpSocket::bind(addr(&args.bind_ip, UPDATE_PORT))?;
    info!("Update UDP socket created on: {}", update_socket.local_addr()?);
    UpdateListener::start(update_socket, update_tx);

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down board...");
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| TickerError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;

    let store_events = store.subscribe()?;
    let flash_events = store.flash().subscribe();
    let refresh = tick(args.refresh());
    let query = args.view_query();
    let mut dirty = true;

    loop {
        select! {
            recv(snapshot_rx) -> msg => match msg {
                Ok(records) => {
                    store.apply_snapshot(&records)?;
                }
                Err(e) => {
                    error!("Snapshot channel closed: {}", e);
                    break;
                }
            },
            recv(update_rx) -> msg => match msg {
                Ok(batch) => {
                    store.apply_update(&batch)?;
                }
                Err(e) => {
                    error!("Update channel closed: {}", e);
                    break;
                }
            },
            recv(store_events) -> _ => dirty = true,
            recv(flash_events) -> _ => dirty = true,
            recv(refresh) -> _ => {
                if dirty {
                    draw(&store, &query, args.rows)?;
                    dirty = false;
                }
            },
            recv(shutdown_rx) -> _ => break,
        }
    }

    info!("Board stopped at store version {}", store.version()?);
    Ok(())
}

fn draw(store: &InstrumentStore, query: &ViewQuery, rows: usize) -> Result<()> {
    let view = store.view(query)?;
    println!();
    for line in render_table(&view, store.flash(), rows) {
        println!("{}", line);
    }
    println!("{} of {} instruments shown", view.len().min(rows), store.len()?);
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
