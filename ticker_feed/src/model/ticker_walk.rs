//! Random-walk ticker generator.
//!
//! `TickerWalk` starts from the instruments of a snapshot and moves a random subset of
//! them on every batch:
//! - price takes a uniform step in `[-1%, +1%]`, clamped to stay positive;
//! - volume only grows;
//! - high/low widen to include the new price;
//! - change percent is recomputed against the implied open price.
//!
//! The same state can be exported as a full snapshot, so periodic resends stay
//! consistent with the updates already streamed.

use chrono::Utc;
use rand::Rng;
use rand::seq::index;
use ticker_common::Instrument;
use ticker_common::raw::{RawNumber, RawTicker24h, RawTickerUpdate};

struct WalkState {
    instrument: Instrument,
    open: f64,
}

/// Evolving state of every instrument the feed publishes.
pub struct TickerWalk {
    states: Vec<WalkState>,
}

impl TickerWalk {
    /// Start a walk from `instruments`. Instruments without a usable price are left out.
    pub fn new(instruments: Vec<Instrument>) -> Self {
        let states = instruments
            .into_iter()
            .filter(|i| i.price.is_finite() && i.price > 0.0)
            .map(|instrument| {
                let open = implied_open(instrument.price, instrument.change_percent);
                WalkState { instrument, open }
            })
            .collect();
        Self { states }
    }

    /// Number of instruments in the walk.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the walk has no instruments.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Calculate the next price using a small random walk around `current_price`.
    pub fn next_price<R: Rng>(rng: &mut R, current_price: f64) -> f64 {
        let change: f64 = rng.random_range(-0.01..0.01);
        let new_price = current_price * (1.0 + change);
        new_price.max(0.00000001)
    }

    /// Move up to `size` random instruments one step and describe the moves as updates.
    pub fn next_batch<R: Rng>(&mut self, rng: &mut R, size: usize) -> Vec<RawTickerUpdate> {
        let amount = size.min(self.states.len());
        let close_time = Utc::now().timestamp_millis();

        index::sample(rng, self.states.len(), amount)
            .into_iter()
            .map(|slot| {
                let traded: f64 = rng.random_range(0.0..50.0);
                let price = Self::next_price(rng, self.states[slot].instrument.price);
                let state = &mut self.states[slot];
                let inst = &mut state.instrument;
                inst.price = price;
                inst.volume = if inst.volume.is_finite() { inst.volume + traded } else { traded };
                inst.high = inst.high.max(price);
                inst.low = inst.low.min(price);
                inst.change_percent = (price - state.open) / state.open * 100.0;
                inst.exchange_time = Some(close_time);

                RawTickerUpdate {
                    symbol: Some(inst.symbol.clone()),
                    last_price: Some(decimal(inst.price)),
                    volume: Some(decimal(inst.volume)),
                    high_price: Some(decimal(inst.high)),
                    low_price: Some(decimal(inst.low)),
                    price_change_percent: Some(RawNumber::Text(format!("{:.3}", inst.change_percent))),
                    close_time: Some(RawNumber::Number(close_time as f64)),
                }
            })
            .collect()
    }

    /// Export the current state as a full snapshot.
    pub fn snapshot(&self) -> Vec<RawTicker24h> {
        self.states
            .iter()
            .map(|state| {
                let inst = &state.instrument;
                RawTicker24h {
                    symbol: Some(inst.symbol.clone()),
                    last_price: Some(decimal(inst.price)),
                    volume: Some(decimal(inst.volume)),
                    high_price: Some(decimal(inst.high)),
                    low_price: Some(decimal(inst.low)),
                    price_change_percent: Some(RawNumber::Text(format!("{:.3}", inst.change_percent))),
                    close_time: inst.exchange_time.map(|t| RawNumber::Number(t as f64)),
                }
            })
            .collect()
    }
}

fn implied_open(price: f64, change_percent: f64) -> f64 {
    let open = price / (1.0 + change_percent / 100.0);
    if open.is_finite() && open > 0.0 { open } else { price }
}

fn decimal(value: f64) -> RawNumber {
    RawNumber::Text(format!("{:.8}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn instrument(symbol: &str, price: f64) -> Instrument {
        Instrument {
            symbol: symbol.to_string(),
            price,
            volume: 1000.0,
            high: price,
            low: price,
            change_percent: 0.0,
            exchange_time: Some(1_700_000_000_000),
        }
    }

    fn walk() -> TickerWalk {
        TickerWalk::new(vec![
            instrument("BTCUSDT", 50000.0),
            instrument("ETHUSDT", 3000.0),
            instrument("SOLUSDT", 150.0),
            instrument("BROKEN", f64::NAN),
        ])
    }

    #[test]
    fn unusable_prices_are_left_out() {
        assert_eq!(walk().len(), 3);
        assert!(TickerWalk::new(Vec::new()).is_empty());
    }

    #[test]
    fn next_price_stays_within_one_percent() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let price = TickerWalk::next_price(&mut rng, 100.0);
            assert!((99.0..=101.0).contains(&price));
        }
    }

    #[test]
    fn batch_touches_distinct_instruments() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut walk = walk();

        let batch = walk.next_batch(&mut rng, 2);
        assert_eq!(batch.len(), 2);
        let symbols: HashSet<_> = batch.iter().filter_map(|u| u.symbol.clone()).collect();
        assert_eq!(symbols.len(), 2);

        assert_eq!(walk.next_batch(&mut rng, 10).len(), 3);
    }

    #[test]
    fn batch_keeps_high_low_consistent() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut walk = walk();
        for _ in 0..50 {
            walk.next_batch(&mut rng, 3);
        }
        for record in walk.snapshot() {
            let price = record.last_price.unwrap().to_f64();
            let high = record.high_price.unwrap().to_f64();
            let low = record.low_price.unwrap().to_f64();
            assert!(low <= price + 1e-6 && price <= high + 1e-6);
            assert!(record.volume.unwrap().to_f64() >= 1000.0);
        }
    }

    #[test]
    fn snapshot_round_trips_into_instruments() {
        let snapshot = walk().snapshot();
        assert_eq!(snapshot.len(), 3);
        let btc = Instrument::from_raw(&snapshot[0]).unwrap();
        assert_eq!(btc.symbol, "BTCUSDT");
        assert_eq!(btc.price, 50000.0);
        assert_eq!(btc.exchange_time, Some(1_700_000_000_000));
    }
}
