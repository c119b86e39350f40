//! Reconciliation engine of the ticker board.
//!
//! - `change_detector` — decides whether a field change is visible on screen.
//! - `flash_tracker` — time-bounded "recently changed" markers with their own timer thread.
//! - `store` — the authoritative symbol -> instrument table fed by snapshots and updates.
//! - `view` — filtered and sorted projections of the table.

pub mod change_detector;
pub mod flash_tracker;
pub mod store;
pub mod view;
