//! The authoritative symbol -> instrument table.
//!
//! The store is fed from two directions:
//! - [`InstrumentStore::apply_snapshot`] replaces the whole table with the first
//!   [`SNAPSHOT_LIMIT`] records of a full snapshot and clears every flash marker.
//! - [`InstrumentStore::apply_update`] patches existing instruments field by field.
//!   Only display-significant changes are written, and each of them marks the field in
//!   the [`FlashTracker`]. Updates never create instruments.
//!
//! Both operations hold the write lock for the whole snapshot or batch, so readers see
//! either the state before it or the state after it. Subscribers get exactly one
//! [`StoreEvent`] per applied snapshot or batch, sent after the lock is released.

use crate::model::change_detector::is_significant;
use crate::model::flash_tracker::FlashTracker;
use crate::model::view::{ViewQuery, build_view};
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, RwLock};
use ticker_common::instrument::symbol_key;
use ticker_common::raw::{RawNumber, RawTicker24h, RawTickerUpdate};
use ticker_common::{Field, Instrument, Result};

/// Maximum number of snapshot records kept, taken in input order.
pub const SNAPSHOT_LIMIT: usize = 1000;

/// Outcome of one snapshot application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    /// Records in the payload.
    pub received: usize,
    /// Records dropped by the [`SNAPSHOT_LIMIT`].
    pub truncated: usize,
    /// Instruments now in the store.
    pub loaded: usize,
    /// Records without a usable symbol.
    pub skipped: usize,
    /// Records repeating an earlier symbol.
    pub duplicates: usize,
}

/// Outcome of one update batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Records in the batch.
    pub records: usize,
    /// Records that matched a stored instrument.
    pub matched: usize,
    /// Records for symbols the store does not hold.
    pub unknown_symbols: usize,
    /// Fields written because their displayed value changed.
    pub changed_fields: usize,
    /// Supplied fields whose text did not parse.
    pub malformed_fields: usize,
}

/// Notification sent once per applied snapshot or batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The table was replaced.
    SnapshotApplied {
        /// Store version after the snapshot.
        version: u64,
        /// What the snapshot did.
        summary: SnapshotSummary,
    },
    /// An update batch was merged.
    BatchApplied {
        /// Store version after the batch.
        version: u64,
        /// What the batch did.
        summary: UpdateSummary,
    },
}

#[derive(Default)]
struct Table {
    instruments: Vec<Instrument>,
    index: HashMap<String, usize>,
    version: u64,
}

/// Instrument table shared between the writer and any number of readers.
pub struct InstrumentStore {
    table: RwLock<Table>,
    flash: FlashTracker,
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl InstrumentStore {
    /// Create an empty store that reports changes to `flash`.
    pub fn new(flash: FlashTracker) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            flash,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Replace the whole table with the first [`SNAPSHOT_LIMIT`] records of `records`.
    pub fn apply_snapshot(&self, records: &[RawTicker24h]) -> Result<SnapshotSummary> {
        let mut summary = SnapshotSummary {
            received: records.len(),
            truncated: records.len().saturating_sub(SNAPSHOT_LIMIT),
            ..Default::default()
        };

        let mut instruments = Vec::with_capacity(records.len().min(SNAPSHOT_LIMIT));
        let mut index = HashMap::new();
        for raw in records.iter().take(SNAPSHOT_LIMIT) {
            let Some(instrument) = Instrument::from_raw(raw) else {
                summary.skipped += 1;
                continue;
            };
            match index.entry(instrument.key()) {
                Entry::Occupied(_) => {
                    debug!("Duplicate symbol {} in snapshot ignored", instrument.symbol);
                    summary.duplicates += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(instruments.len());
                    instruments.push(instrument);
                }
            }
        }
        summary.loaded = instruments.len();

        let version = {
            let mut table = self.table.write()?;
            self.flash.clear();
            table.instruments = instruments;
            table.index = index;
            table.version += 1;
            table.version
        };

        if summary.skipped > 0 || summary.truncated > 0 {
            warn!(
                "Snapshot: skipped {} records without symbol, truncated {} beyond {}",
                summary.skipped, summary.truncated, SNAPSHOT_LIMIT
            );
        }
        info!(
            "Snapshot applied (version {}): {} instruments loaded",
            version, summary.loaded
        );
        self.notify(StoreEvent::SnapshotApplied { version, summary });
        Ok(summary)
    }

    /// Merge a batch of updates into existing instruments.
    pub fn apply_update(&self, updates: &[RawTickerUpdate]) -> Result<UpdateSummary> {
        let mut summary = UpdateSummary {
            records: updates.len(),
            ..Default::default()
        };

        let version = {
            let mut table = self.table.write()?;
            let Table {
                instruments, index, ..
            } = &mut *table;

            for update in updates {
                let Some(&slot) = update
                    .symbol
                    .as_deref()
                    .and_then(|symbol| index.get(&symbol_key(symbol)))
                else {
                    summary.unknown_symbols += 1;
                    continue;
                };
                summary.matched += 1;
                let instrument = &mut instruments[slot];

                for (field, raw) in update_fields(update) {
                    let Some(raw) = raw else { continue };
                    let Some(new) = raw.parse() else {
                        summary.malformed_fields += 1;
                        continue;
                    };
                    if is_significant(field, instrument.get(field), new) {
                        instrument.set(field, new);
                        self.flash.mark_changed(&instrument.symbol, field);
                        summary.changed_fields += 1;
                    }
                }

                if let Some(raw) = &update.close_time {
                    match raw.to_millis() {
                        Some(time) if instrument.exchange_time.is_none_or(|old| time >= old) => {
                            instrument.exchange_time = Some(time);
                        }
                        Some(_) => {}
                        None => summary.malformed_fields += 1,
                    }
                }
            }

            table.version += 1;
            table.version
        };

        debug!(
            "Batch applied (version {}): {} records, {} matched, {} unknown, {} fields changed, {} malformed",
            version,
            summary.records,
            summary.matched,
            summary.unknown_symbols,
            summary.changed_fields,
            summary.malformed_fields
        );
        self.notify(StoreEvent::BatchApplied { version, summary });
        Ok(summary)
    }

    /// Consistent copy of every instrument, in snapshot order.
    pub fn current(&self) -> Result<Vec<Instrument>> {
        Ok(self.table.read()?.instruments.clone())
    }

    /// Look up one instrument by symbol, ignoring ASCII case.
    pub fn get(&self, symbol: &str) -> Result<Option<Instrument>> {
        let table = self.table.read()?;
        Ok(table
            .index
            .get(&symbol_key(symbol))
            .map(|&slot| table.instruments[slot].clone()))
    }

    /// Filtered and sorted projection of the current table.
    pub fn view(&self, query: &ViewQuery) -> Result<Vec<Instrument>> {
        let table = self.table.read()?;
        Ok(build_view(&table.instruments, query))
    }

    /// Number of instruments held.
    pub fn len(&self) -> Result<usize> {
        Ok(self.table.read()?.instruments.len())
    }

    /// Whether the store holds no instruments.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of snapshots and batches applied so far.
    pub fn version(&self) -> Result<u64> {
        Ok(self.table.read()?.version)
    }

    /// Flash markers written by this store.
    pub fn flash(&self) -> &FlashTracker {
        &self.flash
    }

    /// Receive one [`StoreEvent`] per applied snapshot or batch.
    pub fn subscribe(&self) -> Result<Receiver<StoreEvent>> {
        let (tx, rx) = unbounded();
        self.subscribers.lock()?.push(tx);
        Ok(rx)
    }

    fn notify(&self, event: StoreEvent) {
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.retain(|tx| tx.send(event.clone()).is_ok()),
            Err(e) => warn!("Store subscribers unavailable: {}", e),
        }
    }
}

fn update_fields(update: &RawTickerUpdate) -> [(Field, Option<&RawNumber>); 5] {
    [
        (Field::Price, update.last_price.as_ref()),
        (Field::Volume, update.volume.as_ref()),
        (Field::High, update.high_price.as_ref()),
        (Field::Low, update.low_price.as_ref()),
        (Field::ChangePercent, update.price_change_percent.as_ref()),
    ]
}
