//!
//! Common types and utilities shared by the ticker board and the demo feed.
//!
//! This crate aggregates:
//! - `error` — unified error type `TickerError` used across the workspace.
//! - `result` — handy `Result<T, TickerError>` alias.
//! - `fields` — the flashable numeric `Field`s and the sortable `SortKey`s.
//! - `instrument` — the `Instrument` record kept by the board.
//! - `raw` — raw snapshot/update payloads and their lenient decoders.
//! - `format` — display formatting for prices, volumes, percentages and times.
//! - `net` — networking constants and small helpers.
#![warn(missing_docs)]
pub mod error;
pub mod fields;
pub mod format;
pub mod instrument;
pub mod net;
pub mod raw;
pub mod result;

pub use error::TickerError;
pub use fields::{Field, SortKey};
pub use instrument::Instrument;
pub use result::Result;
