//! TCP snapshot receiver.
//!
//! Each accepted connection delivers one full snapshot: a JSON array of raw ticker
//! records, terminated by the sender closing its write half. Decoded snapshots are
//! forwarded over a channel to the thread that owns store writes. A connection that
//! fails to read or decode is logged and dropped without affecting later ones.
//!
//! Connections are served one at a time, so each read is bounded both in size and in
//! total time. A client that stalls or streams without end is cut off and the next
//! connection is accepted.

use crossbeam_channel::Sender;
use log::{debug, error, info, warn};
use std::io::{ErrorKind, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};
use ticker_common::raw::{RawTicker24h, decode_snapshot};
use ticker_common::{Result, TickerError};

/// Largest snapshot payload accepted from one connection.
pub const MAX_SNAPSHOT_BYTES: usize = 16 * 1024 * 1024;

/// Time a client gets to deliver its whole snapshot.
pub const READ_DEADLINE: Duration = Duration::from_secs(10);

/// TCP listener that accepts full snapshots from an upstream feed.
pub struct SnapshotReceiver {
    /// The underlying TCP listening socket.
    socket: TcpListener,
    max_bytes: usize,
    deadline: Duration,
}

impl SnapshotReceiver {
    /// Bind a new TCP receiver to the provided `bind_addr` (e.g., `0.0.0.0:8080`).
    pub fn new(bind_addr: &str) -> Result<Self> {
        Self::with_limits(bind_addr, MAX_SNAPSHOT_BYTES, READ_DEADLINE)
    }

    /// Bind a receiver that rejects payloads over `max_bytes` and connections that
    /// have not finished sending within `deadline`.
    pub fn with_limits(bind_addr: &str, max_bytes: usize, deadline: Duration) -> Result<Self> {
        let socket = TcpListener::bind(bind_addr)?;
        Ok(Self {
            socket,
            max_bytes,
            deadline,
        })
    }

    /// Address the receiver is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Blocking loop that accepts connections, reads one snapshot per connection and
    /// forwards it to `tx`. Returns only when `tx` is disconnected.
    pub fn receive_loop_with_channel(self, tx: Sender<Vec<RawTicker24h>>) -> Result<()> {
        info!("Snapshot TCP server is started on {}", self.socket.local_addr()?);

        for stream in self.socket.incoming() {
            match stream {
                Ok(stream) => {
                    let peer = stream.peer_addr().ok();
                    debug!("Snapshot connection from {:?}", peer);
                    match read_snapshot(stream, self.max_bytes, self.deadline) {
                        Ok(records) => {
                            info!("Received snapshot of {} records from {:?}", records.len(), peer);
                            tx.send(records)
                                .map_err(|e| TickerError::ChannelSend(e.to_string()))?;
                        }
                        Err(e) => warn!("Rejected snapshot from {:?}: {}", peer, e),
                    }
                }
                Err(e) => error!("TCP connection error: {}", e),
            }
        }
        Ok(())
    }
}

fn read_snapshot(
    mut stream: TcpStream,
    max_bytes: usize,
    deadline: Duration,
) -> Result<Vec<RawTicker24h>> {
    let started = Instant::now();
    let mut payload = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let remaining = deadline.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(deadline_exceeded(deadline));
        }
        stream.set_read_timeout(Some(remaining))?;
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if payload.len() + n > max_bytes {
                    return Err(TickerError::Format(format!(
                        "snapshot exceeds {} bytes",
                        max_bytes
                    )));
                }
                payload.extend_from_slice(&chunk[..n]);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(deadline_exceeded(deadline));
            }
            Err(e) => return Err(e.into()),
        }
    }
    decode_snapshot(&payload)
}

fn deadline_exceeded(deadline: Duration) -> TickerError {
    TickerError::Format(format!("snapshot not completed within {:?}", deadline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::io::Write;
    use std::net::Shutdown;
    use std::thread;

    fn send(addr: SocketAddr, payload: &[u8]) {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(payload).unwrap();
        stream.shutdown(Shutdown::Write).unwrap();
    }

    #[test]
    fn forwards_snapshots_and_survives_bad_payloads() {
        let receiver = SnapshotReceiver::new("127.0.0.1:0").unwrap();
        let addr = receiver.local_addr().unwrap();
        let (tx, rx) = unbounded();
        thread::spawn(move || receiver.receive_loop_with_channel(tx));

        send(addr, b"this is not json");
        send(addr, br#"[{"symbol":"BTCUSDT","lastPrice":"50000.00"},{"symbol":"ETHUSDT"}]"#);

        let records = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].symbol.as_deref(), Some("BTCUSDT"));
        assert_eq!(records[1].symbol.as_deref(), Some("ETHUSDT"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn oversized_snapshot_is_rejected() {
        let receiver = SnapshotReceiver::with_limits("127.0.0.1:0", 64, READ_DEADLINE).unwrap();
        let addr = receiver.local_addr().unwrap();
        let (tx, rx) = unbounded();
        thread::spawn(move || receiver.receive_loop_with_channel(tx));

        // the receiver may drop the connection before the write half is closed
        let mut big = TcpStream::connect(addr).unwrap();
        let _ = big.write_all(&[b' '; 1024]);
        let _ = big.shutdown(Shutdown::Write);

        send(addr, br#"[{"symbol":"BTCUSDT"}]"#);

        let records = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol.as_deref(), Some("BTCUSDT"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stalled_client_does_not_block_later_snapshots() {
        let deadline = Duration::from_millis(200);
        let receiver =
            SnapshotReceiver::with_limits("127.0.0.1:0", MAX_SNAPSHOT_BYTES, deadline).unwrap();
        let addr = receiver.local_addr().unwrap();
        let (tx, rx) = unbounded();
        thread::spawn(move || receiver.receive_loop_with_channel(tx));

        // sends a fragment and keeps the connection open
        let mut stalled = TcpStream::connect(addr).unwrap();
        stalled.write_all(b"[").unwrap();

        send(addr, br#"[{"symbol":"ETHUSDT"}]"#);

        let records = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(records[0].symbol.as_deref(), Some("ETHUSDT"));
        assert!(rx.try_recv().is_err());
        drop(stalled);
    }
}
