//! Plain-text rendering of a view.
//!
//! Each row shows the formatted fields of one instrument plus its exchange time and
//! the local time of rendering. Cells whose field is flashing are prefixed with `*`.

use crate::model::flash_tracker::{FlashState, FlashTracker};
use chrono::{DateTime, Local};
use ticker_common::format::{
    format_change_percent, format_local, format_price, format_timestamp, format_volume,
};
use ticker_common::{Field, Instrument};

/// Column header matching [`render_row`].
pub fn header() -> String {
    format!(
        "{:<14} {:>16} {:>10} {:>16} {:>16} {:>10}  {:<19}  {:<19}",
        "SYMBOL", "PRICE", "VOLUME", "HIGH", "LOW", "CHANGE", "EXCHANGE TIME", "LOCAL TIME"
    )
}

/// Render one instrument with its flash markers.
pub fn render_row(instrument: &Instrument, flash: FlashState, now: &DateTime<Local>) -> String {
    let cell = |field: Field, text: String| {
        if flash.is_set(field) {
            format!("*{}", text)
        } else {
            text
        }
    };
    format!(
        "{:<14} {:>16} {:>10} {:>16} {:>16} {:>10}  {:<19}  {:<19}",
        instrument.symbol,
        cell(Field::Price, format_price(instrument.price)),
        cell(Field::Volume, format_volume(instrument.volume)),
        cell(Field::High, format_price(instrument.high)),
        cell(Field::Low, format_price(instrument.low)),
        cell(Field::ChangePercent, format_change_percent(instrument.change_percent)),
        format_timestamp(instrument.exchange_time),
        format_local(now),
    )
}

/// Render the header and up to `limit` rows of `view`.
pub fn render_table(view: &[Instrument], flash: &FlashTracker, limit: usize) -> Vec<String> {
    let now = Local::now();
    let mut lines = Vec::with_capacity(limit.min(view.len()) + 1);
    lines.push(header());
    lines.extend(
        view.iter()
            .take(limit)
            .map(|i| render_row(i, flash.flash_state(&i.symbol), &now)),
    );
    lines
}
