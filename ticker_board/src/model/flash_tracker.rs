//! Time-bounded "recently changed" markers.
//!
//! The tracker keeps one deadline per `(symbol, field)`, with symbols matched ignoring
//! ASCII case as the store does. A marker is set by
//! [`FlashTracker::mark_changed`] and reads as flashing until its deadline passes.
//! Marking the same key again moves the deadline forward instead of adding a second
//! expiry.
//!
//! Expiry is driven by a background timer thread, not by later updates:
//! - `mark_changed` records the deadline and arms the timer thread through a channel.
//! - The timer thread sleeps until the earliest armed deadline, then removes the marker
//!   if that deadline is still the current one. Stale arms (the key was marked again or
//!   cleared meanwhile) are no-ops, so at most one expiry takes effect per key.
//! - Every effective expiry is broadcast as a [`FlashExpired`] event to subscribers.
//!
//! The marker table lock is held only for single map operations, so the timer thread
//! never holds it while an update batch needs it.
//!
//! The thread exits once every clone of the tracker has been dropped.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{trace, warn};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use ticker_common::Field;
use ticker_common::instrument::symbol_key;

/// How long a field stays marked after its last significant change.
pub const FLASH_WINDOW: Duration = Duration::from_millis(1000);

type FlashKey = (String, Field);

fn flash_key(symbol: &str, field: Field) -> FlashKey {
    (symbol_key(symbol), field)
}

/// Current deadline of a key and the symbol spelling it was marked with.
struct Marker {
    deadline: Instant,
    symbol: String,
}

/// Notification that a field stopped flashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashExpired {
    /// Symbol of the instrument, as passed to the last `mark_changed`.
    pub symbol: String,
    /// Field whose marker expired.
    pub field: Field,
}

/// Flash markers of one instrument, indexed by [`Field::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlashState([bool; 5]);

impl FlashState {
    /// Whether `field` is currently flashing.
    pub fn is_set(&self, field: Field) -> bool {
        self.0[field.index()]
    }

    /// Whether any field is currently flashing.
    pub fn any(&self) -> bool {
        self.0.iter().any(|set| *set)
    }
}

struct Arm {
    key: FlashKey,
    deadline: Instant,
}

/// Per-instrument, per-field flash markers with automatic expiry.
///
/// Cloning is cheap; clones share the same markers and timer thread.
#[derive(Clone)]
pub struct FlashTracker {
    window: Duration,
    markers: Arc<Mutex<HashMap<FlashKey, Marker>>>,
    subscribers: Arc<Mutex<Vec<Sender<FlashExpired>>>>,
    timer_tx: Sender<Arm>,
}

impl FlashTracker {
    /// Create a tracker with the default [`FLASH_WINDOW`].
    pub fn new() -> Self {
        Self::with_window(FLASH_WINDOW)
    }

    /// Create a tracker whose markers last for `window`.
    pub fn with_window(window: Duration) -> Self {
        let markers = Arc::new(Mutex::new(HashMap::new()));
        let subscribers = Arc::new(Mutex::new(Vec::new()));
        let (timer_tx, timer_rx) = unbounded::<Arm>();

        let timer_markers = Arc::clone(&markers);
        let timer_subscribers = Arc::clone(&subscribers);
        thread::spawn(move || run_timer(timer_rx, timer_markers, timer_subscribers));

        Self {
            window,
            markers,
            subscribers,
            timer_tx,
        }
    }

    /// Marker lifetime of this tracker.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Mark `field` of `symbol` as changed now and (re)start its expiry window.
    pub fn mark_changed(&self, symbol: &str, field: Field) {
        let key = flash_key(symbol, field);
        let deadline = Instant::now() + self.window;
        let marker = Marker {
            deadline,
            symbol: symbol.to_string(),
        };
        lock(&self.markers).insert(key.clone(), marker);
        if self.timer_tx.send(Arm { key, deadline }).is_err() {
            warn!("Flash timer thread is gone; {} {} will not expire", symbol, field);
        }
    }

    /// Whether `field` of `symbol` changed within the last window.
    pub fn is_flashing(&self, symbol: &str, field: Field) -> bool {
        let now = Instant::now();
        lock(&self.markers)
            .get(&flash_key(symbol, field))
            .is_some_and(|marker| now < marker.deadline)
    }

    /// All markers of `symbol` at once.
    pub fn flash_state(&self, symbol: &str) -> FlashState {
        let now = Instant::now();
        let markers = lock(&self.markers);
        let mut state = FlashState::default();
        for field in Field::ALL {
            state.0[field.index()] = markers
                .get(&flash_key(symbol, field))
                .is_some_and(|marker| now < marker.deadline);
        }
        state
    }

    /// Drop every marker. Pending timers for them become no-ops.
    pub fn clear(&self) {
        lock(&self.markers).clear();
    }

    /// Number of markers that have not been expired by the timer thread yet.
    pub fn pending(&self) -> usize {
        lock(&self.markers).len()
    }

    /// Receive a [`FlashExpired`] event for every marker that times out.
    pub fn subscribe(&self) -> Receiver<FlashExpired> {
        let (tx, rx) = unbounded();
        lock(&self.subscribers).push(tx);
        rx
    }
}

impl Default for FlashTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_timer(
    rx: Receiver<Arm>,
    markers: Arc<Mutex<HashMap<FlashKey, Marker>>>,
    subscribers: Arc<Mutex<Vec<Sender<FlashExpired>>>>,
) {
    let mut armed: BinaryHeap<Reverse<(Instant, FlashKey)>> = BinaryHeap::new();

    loop {
        let next = match armed.peek() {
            Some(Reverse((deadline, _))) => {
                rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match next {
            Ok(arm) => armed.push(Reverse((arm.deadline, arm.key))),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        while let Some(Reverse((deadline, _))) = armed.peek() {
            if *deadline > now {
                break;
            }
            let Some(Reverse((deadline, key))) = armed.pop() else {
                break;
            };
            if let Some(symbol) = expire(&markers, &key, deadline) {
                trace!("Flash expired: {} {}", symbol, key.1);
                let event = FlashExpired {
                    symbol,
                    field: key.1,
                };
                lock(&subscribers).retain(|tx| tx.send(event.clone()).is_ok());
            }
        }
    }
}

/// Remove the marker only if `deadline` is still the one it carries.
fn expire(
    markers: &Mutex<HashMap<FlashKey, Marker>>,
    key: &FlashKey,
    deadline: Instant,
) -> Option<String> {
    let mut markers = lock(markers);
    if markers.get(key).is_some_and(|marker| marker.deadline == deadline) {
        markers.remove(key).map(|marker| marker.symbol)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    #[test]
    fn marker_is_set_immediately_and_expires_without_updates() {
        let tracker = FlashTracker::with_window(WINDOW);
        assert!(!tracker.is_flashing("BTCUSDT", Field::Price));

        tracker.mark_changed("BTCUSDT", Field::Price);
        assert!(tracker.is_flashing("BTCUSDT", Field::Price));
        assert!(!tracker.is_flashing("BTCUSDT", Field::Volume));
        assert!(!tracker.is_flashing("ETHUSDT", Field::Price));

        thread::sleep(WINDOW + Duration::from_millis(100));
        assert!(!tracker.is_flashing("BTCUSDT", Field::Price));
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn second_mark_extends_the_window() {
        let tracker = FlashTracker::with_window(WINDOW);
        let expired = tracker.subscribe();

        tracker.mark_changed("BTCUSDT", Field::Price);
        thread::sleep(Duration::from_millis(60));
        tracker.mark_changed("BTCUSDT", Field::Price);
        thread::sleep(Duration::from_millis(60));

        // past the first deadline, before the second
        assert!(tracker.is_flashing("BTCUSDT", Field::Price));
        assert!(expired.try_recv().is_err());

        let event = expired.recv_timeout(Duration::from_millis(500)).unwrap();
        assert_eq!(
            event,
            FlashExpired {
                symbol: "BTCUSDT".to_string(),
                field: Field::Price,
            }
        );
        assert!(!tracker.is_flashing("BTCUSDT", Field::Price));
        assert!(expired.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn cleared_markers_never_fire() {
        let tracker = FlashTracker::with_window(WINDOW);
        let expired = tracker.subscribe();

        tracker.mark_changed("BTCUSDT", Field::High);
        tracker.clear();
        assert!(!tracker.is_flashing("BTCUSDT", Field::High));
        assert_eq!(tracker.pending(), 0);
        assert!(expired.recv_timeout(WINDOW * 3).is_err());
    }

    #[test]
    fn flash_state_collects_fields() {
        let tracker = FlashTracker::with_window(Duration::from_secs(5));
        tracker.mark_changed("ETHUSDT", Field::Low);
        tracker.mark_changed("ETHUSDT", Field::ChangePercent);

        let state = tracker.flash_state("ETHUSDT");
        assert!(state.any());
        assert!(state.is_set(Field::Low));
        assert!(state.is_set(Field::ChangePercent));
        assert!(!state.is_set(Field::Price));
        assert!(!tracker.flash_state("BTCUSDT").any());
    }

    #[test]
    fn lookups_ignore_symbol_case() {
        let tracker = FlashTracker::with_window(WINDOW);
        let expired = tracker.subscribe();

        tracker.mark_changed("BTCUSDT", Field::Price);
        assert!(tracker.is_flashing("btcusdt", Field::Price));
        assert!(tracker.flash_state("BtcUsdt").is_set(Field::Price));

        tracker.mark_changed("btcusdt", Field::Price);
        assert_eq!(tracker.pending(), 1);

        let event = expired.recv_timeout(Duration::from_millis(500)).unwrap();
        assert_eq!(event.symbol, "btcusdt");
        assert!(!tracker.is_flashing("BTCUSDT", Field::Price));
    }

    #[test]
    fn clones_share_markers() {
        let tracker = FlashTracker::with_window(Duration::from_secs(5));
        let other = tracker.clone();
        other.mark_changed("BTCUSDT", Field::Volume);
        assert!(tracker.is_flashing("BTCUSDT", Field::Volume));
        assert_eq!(tracker.window(), Duration::from_secs(5));
    }
}
