//! Display formatting for instrument fields.
//!
//! These functions define the canonical text of each column. The board's change
//! detection compares these strings, so two raw values that render the same are
//! considered unchanged.
//!
//! Fixed-decimal rendering goes through [`to_fixed`], which rounds exact ties away
//! from zero (`2.25` -> `2.3`) instead of to even as `{:.N}` does.

use chrono::{DateTime, Local, Utc};

/// Extra fractional digits inspected to tell an exact tie from a near one.
const TIE_DIGITS: usize = 40;

/// Render `value` with `decimals` fractional digits, rounding exact ties away from zero.
pub fn to_fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("{:.*}", decimals, value);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    let wide = format!("{:.*}", decimals + TIE_DIGITS, magnitude);
    let (head, tail) = wide.split_at(wide.len() - TIE_DIGITS);
    let tie = tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0');
    let digits = if tie {
        round_up(head.trim_end_matches('.'))
    } else {
        format!("{:.*}", decimals, magnitude)
    };
    format!("{}{}", sign, digits)
}

/// Add one unit in the last place of a plain decimal string.
fn round_up(digits: &str) -> String {
    let mut chars: Vec<char> = digits.chars().collect();
    for c in chars.iter_mut().rev() {
        match *c {
            '.' => continue,
            '9' => *c = '0',
            d => {
                *c = (d as u8 + 1) as char;
                return chars.into_iter().collect();
            }
        }
    }
    std::iter::once('1').chain(chars).collect()
}

/// Fixed 4-decimal price, e.g. `50000.0100`.
pub fn format_price(value: f64) -> String {
    to_fixed(value, 4)
}

/// Volume with a magnitude suffix: `1.5M`, `2.5K`, or a plain integer below 1000.
pub fn format_volume(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{}M", to_fixed(value / 1_000_000.0, 1))
    } else if value >= 1_000.0 {
        format!("{}K", to_fixed(value / 1_000.0, 1))
    } else {
        to_fixed(value, 0)
    }
}

/// Round a percentage to the two decimals it is displayed with.
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Change percent with two decimals and a `%` suffix, e.g. `-1.25%`.
pub fn format_change_percent(value: f64) -> String {
    // avoid "-0.00%"
    let rounded = round_percent(value) + 0.0;
    format!("{:.2}%", rounded)
}

/// Render a millisecond Unix timestamp in the local time zone.
///
/// Returns `-` when the timestamp is missing or out of range.
pub fn format_timestamp(millis: Option<i64>) -> String {
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|utc| format_local(&utc.with_timezone(&Local)))
        .unwrap_or_else(|| "-".to_string())
}

/// Render a local time the same way exchange timestamps are rendered.
pub fn format_local(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_has_four_decimals() {
        assert_eq!(format_price(50000.0), "50000.0000");
        assert_eq!(format_price(0.123456), "0.1235");
        assert_eq!(format_price(100.00004), "100.0000");
        assert_eq!(format_price(100.00003), "100.0000");
        assert_eq!(format_price(f64::NAN), "NaN");
    }

    #[test]
    fn volume_suffixes() {
        assert_eq!(format_volume(1_500_000.0), "1.5M");
        assert_eq!(format_volume(2500.0), "2.5K");
        assert_eq!(format_volume(42.0), "42");
        assert_eq!(format_volume(1_000.0), "1.0K");
        assert_eq!(format_volume(999.4), "999");
        assert_eq!(format_volume(0.0), "0");
    }

    #[test]
    fn exact_ties_round_up() {
        assert_eq!(format_volume(2250.0), "2.3K");
        assert_eq!(format_volume(1_250_000.0), "1.3M");
        assert_eq!(format_volume(42.5), "43");
        assert_eq!(format_volume(999.5), "1000");
        assert_eq!(format_price(0.03125), "0.0313");
        assert_eq!(to_fixed(9.5, 0), "10");
        assert_eq!(to_fixed(-2.25, 1), "-2.3");
    }

    #[test]
    fn near_ties_keep_nearest_rounding() {
        // 9.95 and 1.005 are stored slightly below the written value
        assert_eq!(to_fixed(9.95, 1), "9.9");
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(format_volume(2249.0), "2.2K");
        assert_eq!(format_price(0.03124), "0.0312");
    }

    #[test]
    fn change_percent_two_decimals() {
        assert_eq!(format_change_percent(1.234), "1.23%");
        assert_eq!(format_change_percent(-0.5), "-0.50%");
        assert_eq!(format_change_percent(-0.001), "0.00%");
        assert_eq!(round_percent(2.456), 2.46);
    }

    #[test]
    fn missing_timestamp_renders_dash() {
        assert_eq!(format_timestamp(None), "-");
        assert_eq!(format_timestamp(Some(i64::MAX)), "-");
        assert_eq!(format_timestamp(Some(0)).len(), "1970-01-01 00:00:00".len());
    }
}
