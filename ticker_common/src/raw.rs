//! Raw upstream payloads and their lenient decoders.
//!
//! Two payload shapes arrive from upstream:
//! - a full snapshot: a JSON array of 24h ticker records ([`RawTicker24h`]) whose numeric
//!   fields are usually decimal text (`"lastPrice": "50000.01000000"`);
//! - an update batch: a JSON array of short-keyed ticker updates ([`RawTickerUpdate`]),
//!   where a missing key means "this field did not change".
//!
//! Decoding never fails because of one bad record or field. Entries that are not
//! objects decode to an empty record (no symbol) so they keep their position in the
//! input, and numeric fields of unexpected shape become [`RawNumber::Other`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TickerError;
use crate::result::Result;

/// Numeric field as received on the wire: a JSON number, decimal text, or anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    /// Plain JSON number.
    Number(f64),
    /// Decimal-formatted text.
    Text(String),
    /// Any other JSON value; never parses.
    Other(Value),
}

impl RawNumber {
    /// Parse as a real number, `None` when the text is malformed.
    pub fn parse(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
            RawNumber::Other(_) => None,
        }
    }

    /// Parse as a real number, substituting NaN when malformed.
    pub fn to_f64(&self) -> f64 {
        self.parse().unwrap_or(f64::NAN)
    }

    /// Parse as an integral millisecond timestamp.
    pub fn to_millis(&self) -> Option<i64> {
        match self {
            RawNumber::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| float_to_millis(s.parse().ok()?))
            }
            other => float_to_millis(other.parse()?),
        }
    }
}

fn float_to_millis(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

/// Parse an optional raw field, NaN for both missing and malformed values.
pub fn parse_or_nan(raw: Option<&RawNumber>) -> f64 {
    raw.map(RawNumber::to_f64).unwrap_or(f64::NAN)
}

/// One record of a full 24h ticker snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicker24h {
    /// Instrument symbol, e.g. `BTCUSDT`.
    pub symbol: Option<String>,
    /// Last traded price.
    pub last_price: Option<RawNumber>,
    /// Traded base volume.
    pub volume: Option<RawNumber>,
    /// Highest price of the window.
    pub high_price: Option<RawNumber>,
    /// Lowest price of the window.
    pub low_price: Option<RawNumber>,
    /// Price change of the window in percent.
    pub price_change_percent: Option<RawNumber>,
    /// Window close time in milliseconds since the Unix epoch.
    pub close_time: Option<RawNumber>,
}

/// One short-keyed ticker update from the push stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTickerUpdate {
    /// Instrument symbol.
    #[serde(rename = "s")]
    pub symbol: Option<String>,
    /// New last price.
    #[serde(rename = "c", skip_serializing_if = "Option::is_none")]
    pub last_price: Option<RawNumber>,
    /// New volume.
    #[serde(rename = "v", skip_serializing_if = "Option::is_none")]
    pub volume: Option<RawNumber>,
    /// New high.
    #[serde(rename = "h", skip_serializing_if = "Option::is_none")]
    pub high_price: Option<RawNumber>,
    /// New low.
    #[serde(rename = "l", skip_serializing_if = "Option::is_none")]
    pub low_price: Option<RawNumber>,
    /// New change percent.
    #[serde(rename = "P", skip_serializing_if = "Option::is_none")]
    pub price_change_percent: Option<RawNumber>,
    /// Statistics close time in milliseconds, when the stream supplies it.
    #[serde(rename = "C", skip_serializing_if = "Option::is_none")]
    pub close_time: Option<RawNumber>,
}

/// Decode a snapshot payload: a JSON array of ticker records.
///
/// Returns an error only when the payload itself is not a JSON array. Individual
/// entries that do not decode become `RawTicker24h::default()`.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Vec<RawTicker24h>> {
    let values: Vec<Value> = serde_json::from_slice(bytes)?;
    Ok(values
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .collect())
}

/// Decode an update batch.
///
/// Accepts a JSON array of updates, a single update object, or a combined-stream
/// wrapper `{"stream": ..., "data": ...}` around either.
pub fn decode_update_batch(bytes: &[u8]) -> Result<Vec<RawTickerUpdate>> {
    let value: Value = serde_json::from_slice(bytes)?;
    updates_from_value(value)
}

fn updates_from_value(value: Value) -> Result<Vec<RawTickerUpdate>> {
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap_or_default())
            .collect()),
        Value::Object(mut map) if map.contains_key("stream") => match map.remove("data") {
            Some(data) => updates_from_value(data),
            None => Ok(Vec::new()),
        },
        Value::Object(map) => Ok(vec![
            serde_json::from_value(Value::Object(map)).unwrap_or_default(),
        ]),
        other => Err(TickerError::Format(format!(
            "update batch must be an array or object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_number_parses_text_and_numbers() {
        assert_eq!(RawNumber::Text("50000.01000000".into()).to_f64(), 50000.01);
        assert_eq!(RawNumber::Number(3.5).to_f64(), 3.5);
        assert!(RawNumber::Text("abc".into()).to_f64().is_nan());
        assert!(RawNumber::Other(Value::Bool(true)).to_f64().is_nan());
        assert!(parse_or_nan(None).is_nan());
    }

    #[test]
    fn raw_number_millis() {
        assert_eq!(RawNumber::Number(1672515782136.0).to_millis(), Some(1672515782136));
        assert_eq!(RawNumber::Text("1672515782136".into()).to_millis(), Some(1672515782136));
        assert_eq!(RawNumber::Number(1.5).to_millis(), None);
        assert_eq!(RawNumber::Text("soon".into()).to_millis(), None);
    }

    #[test]
    fn decode_snapshot_keeps_positions_of_bad_entries() {
        let json = br#"[
            {"symbol": "BTCUSDT", "lastPrice": "50000.00", "volume": "12.5",
             "highPrice": "51000", "lowPrice": "49000", "priceChangePercent": "-1.25",
             "closeTime": 1672515782136, "count": 10},
            42,
            {"symbol": "ETHUSDT", "lastPrice": "oops", "volume": {"nested": 1}}
        ]"#;

        let records = decode_snapshot(json).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].symbol.as_deref(), Some("BTCUSDT"));
        assert_eq!(records[0].close_time, Some(RawNumber::Number(1672515782136.0)));
        assert_eq!(records[1], RawTicker24h::default());
        assert_eq!(records[2].symbol.as_deref(), Some("ETHUSDT"));
        assert!(parse_or_nan(records[2].last_price.as_ref()).is_nan());
        assert!(parse_or_nan(records[2].volume.as_ref()).is_nan());
    }

    #[test]
    fn decode_snapshot_rejects_non_array_payload() {
        assert!(decode_snapshot(br#"{"symbol": "BTCUSDT"}"#).is_err());
        assert!(decode_snapshot(b"not json").is_err());
    }

    #[test]
    fn decode_update_batch_shapes() {
        let batch = decode_update_batch(br#"[{"e":"24hrTicker","s":"BTCUSDT","c":"50001.00","p":"1.0","P":"0.50"}]"#)
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].symbol.as_deref(), Some("BTCUSDT"));
        assert_eq!(batch[0].last_price, Some(RawNumber::Text("50001.00".into())));
        assert_eq!(batch[0].price_change_percent, Some(RawNumber::Text("0.50".into())));
        assert!(batch[0].volume.is_none());

        let single = decode_update_batch(br#"{"s":"ETHUSDT","v":"100"}"#).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].symbol.as_deref(), Some("ETHUSDT"));

        let wrapped = decode_update_batch(
            br#"{"stream":"!ticker@arr","data":[{"s":"A"},{"s":"B"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[1].symbol.as_deref(), Some("B"));

        assert!(decode_update_batch(b"17").is_err());
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let update = RawTickerUpdate {
            symbol: Some("BTCUSDT".into()),
            last_price: Some(RawNumber::Text("1.0".into())),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"s":"BTCUSDT","c":"1.0"}"#);
    }
}
