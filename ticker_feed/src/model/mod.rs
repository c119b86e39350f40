//! Synthetic market data for the demo feed.
//!
//! - `ticker_walk` — random-walk evolution of a snapshot into update batches.
pub mod ticker_walk;
