//! Instrument data model.
//!
//! An `Instrument` is the board's current state of one traded symbol. Numeric fields
//! hold raw, full-precision values; formatting for display lives in [`crate::format`].
//! A field that failed to parse upstream holds NaN.

use serde::{Deserialize, Serialize};

use crate::fields::Field;
use crate::raw::{RawTicker24h, parse_or_nan};

/// Current state of a single traded symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// Symbol as received from the snapshot (e.g., `BTCUSDT`).
    pub symbol: String,
    /// Last traded price.
    pub price: f64,
    /// Traded volume.
    pub volume: f64,
    /// Highest price of the window.
    pub high: f64,
    /// Lowest price of the window.
    pub low: f64,
    /// Signed price change of the window in percent.
    pub change_percent: f64,
    /// Exchange timestamp in milliseconds since the Unix epoch, if it parsed.
    pub exchange_time: Option<i64>,
}

impl Instrument {
    /// Map a raw snapshot record onto an instrument.
    ///
    /// Returns `None` only when the record carries no usable symbol. Malformed numeric
    /// fields become NaN without affecting the rest of the record.
    pub fn from_raw(raw: &RawTicker24h) -> Option<Self> {
        let symbol = raw.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            symbol: symbol.to_string(),
            price: parse_or_nan(raw.last_price.as_ref()),
            volume: parse_or_nan(raw.volume.as_ref()),
            high: parse_or_nan(raw.high_price.as_ref()),
            low: parse_or_nan(raw.low_price.as_ref()),
            change_percent: parse_or_nan(raw.price_change_percent.as_ref()),
            exchange_time: raw.close_time.as_ref().and_then(|t| t.to_millis()),
        })
    }

    /// Read a numeric field.
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Price => self.price,
            Field::Volume => self.volume,
            Field::High => self.high,
            Field::Low => self.low,
            Field::ChangePercent => self.change_percent,
        }
    }

    /// Overwrite a numeric field.
    pub fn set(&mut self, field: Field, value: f64) {
        match field {
            Field::Price => self.price = value,
            Field::Volume => self.volume = value,
            Field::High => self.high = value,
            Field::Low => self.low = value,
            Field::ChangePercent => self.change_percent = value,
        }
    }

    /// Case-insensitive lookup key of the symbol.
    pub fn key(&self) -> String {
        symbol_key(&self.symbol)
    }
}

/// Normalise a symbol for case-insensitive lookup.
pub fn symbol_key(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}
