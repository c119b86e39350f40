//! Live instrument board.
//!
//! The board keeps one in-memory table of market instruments, fed by full snapshots
//! and incremental update batches, and renders filtered and sorted views of it with
//! recently changed cells marked.
//!
//! - `model` — the reconciliation engine: change detection, flash markers, the
//!   instrument store and view building.
//! - `render` — text rows for a view.
//! - `receiver` — TCP listener for full snapshots.
//! - `udp_listener` — UDP listener for update batches.
//! - `args` — command-line interface of the binary.
#![warn(missing_docs)]
pub mod args;
pub mod model;
pub mod receiver;
pub mod render;
pub mod udp_listener;
