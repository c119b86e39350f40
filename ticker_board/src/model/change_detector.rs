//! Display-aware change detection.
//!
//! A change is significant only when it alters what the board shows. Prices, highs and
//! lows compare their 4-decimal rendering, volume compares its suffixed rendering, and
//! change percent compares its value rounded to two decimals.

use ticker_common::Field;
use ticker_common::format::{format_price, format_volume, round_percent};

/// Return `true` when moving `field` from `old` to `new` changes its displayed value.
pub fn is_significant(field: Field, old: f64, new: f64) -> bool {
    match field {
        Field::Price | Field::High | Field::Low => format_price(old) != format_price(new),
        Field::Volume => format_volume(old) != format_volume(new),
        Field::ChangePercent => !same_percent(old, new),
    }
}

fn same_percent(old: f64, new: f64) -> bool {
    if old.is_nan() || new.is_nan() {
        return old.is_nan() && new.is_nan();
    }
    round_percent(old) == round_percent(new)
}
