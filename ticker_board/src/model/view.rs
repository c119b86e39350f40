//! Filtered and sorted projections of the instrument table.
//!
//! A view is a pure function of the instruments and a [`ViewQuery`]. Sorting is
//! stable and a descending order reverses the comparator, not the input, so equal
//! keys keep their relative position in both directions.

use std::cmp::Ordering;
use ticker_common::{Instrument, SortKey};

/// Consumer-owned view parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    /// Case-insensitive substring matched against the symbol; empty matches all.
    pub filter_text: String,
    /// Column to order by.
    pub sort_key: SortKey,
    /// Direction of the order.
    pub ascending: bool,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            filter_text: String::new(),
            sort_key: SortKey::Symbol,
            ascending: true,
        }
    }
}

impl ViewQuery {
    /// Sort by `key`, or flip the direction if `key` is already the sort key.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.ascending = !self.ascending;
        } else {
            self.sort_key = key;
            self.ascending = true;
        }
    }
}

/// Build the filtered, ordered list of instruments for `query`.
pub fn build_view(instruments: &[Instrument], query: &ViewQuery) -> Vec<Instrument> {
    let needle = query.filter_text.trim().to_lowercase();
    let mut rows: Vec<Instrument> = instruments
        .iter()
        .filter(|i| needle.is_empty() || i.symbol.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        let ordering = compare(a, b, query.sort_key);
        if query.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
    rows
}

fn compare(a: &Instrument, b: &Instrument, key: SortKey) -> Ordering {
    match key {
        SortKey::Symbol => a.symbol.cmp(&b.symbol),
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::Volume => a.volume.total_cmp(&b.volume),
        SortKey::High => a.high.total_cmp(&b.high),
        SortKey::Low => a.low.total_cmp(&b.low),
        SortKey::ChangePercent => a.change_percent.total_cmp(&b.change_percent),
        SortKey::ExchangeTime => a.exchange_time.cmp(&b.exchange_time),
    }
}
