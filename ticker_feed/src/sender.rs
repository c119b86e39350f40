//! Sending snapshots and update batches to the board.
//!
//! Snapshots go over TCP, one connection per snapshot, with the write half closed to
//! mark the end of the payload. Update batches go over UDP, one JSON array per datagram.
use log::{debug, info};
use std::io::Write;
use std::net::{Shutdown, TcpStream, UdpSocket};
use ticker_common::net::MAX_DATAGRAM;
use ticker_common::raw::{RawTicker24h, RawTickerUpdate};
use ticker_common::{Result, TickerError};

/// Helper type for pushing data to the board.
pub struct FeedSender;

impl FeedSender {
    /// Send a full snapshot to the board's TCP address.
    pub fn send_snapshot(target_addr: &str, records: &[RawTicker24h]) -> Result<()> {
        let payload = serde_json::to_vec(records)?;
        let mut stream = TcpStream::connect(target_addr)
            .map_err(|e| TickerError::Format(format!("Failed to connect to board: {}", e)))?;
        stream.write_all(&payload)?;
        stream.shutdown(Shutdown::Write)?;
        info!("Snapshot of {} records sent to {}", records.len(), target_addr);
        Ok(())
    }

    /// Send one update batch as a single datagram.
    pub fn send_batch(socket: &UdpSocket, target_addr: &str, batch: &[RawTickerUpdate]) -> Result<()> {
        let payload = serde_json::to_vec(batch)?;
        if payload.len() > MAX_DATAGRAM {
            return Err(TickerError::Format(format!(
                "Batch of {} bytes does not fit in one datagram",
                payload.len()
            )));
        }
        socket.send_to(&payload, target_addr)?;
        debug!("Batch of {} updates sent to {}", batch.len(), target_addr);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;
    use ticker_common::raw::{RawNumber, decode_snapshot, decode_update_batch};

    #[test]
    fn snapshot_arrives_as_one_payload() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let reader = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut payload = Vec::new();
            stream.read_to_end(&mut payload).unwrap();
            payload
        });

        let records = vec![RawTicker24h {
            symbol: Some("BTCUSDT".into()),
            last_price: Some(RawNumber::Text("50000.00".into())),
            ..Default::default()
        }];
        FeedSender::send_snapshot(&addr, &records).unwrap();

        let payload = reader.join().unwrap();
        assert_eq!(decode_snapshot(&payload).unwrap(), records);
    }

    #[test]
    fn batch_arrives_as_one_datagram() {
        let board = UdpSocket::bind("127.0.0.1:0").unwrap();
        board.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let target = board.local_addr().unwrap().to_string();
        let feed = UdpSocket::bind("127.0.0.1:0").unwrap();

        let batch = vec![RawTickerUpdate {
            symbol: Some("ETHUSDT".into()),
            volume: Some(RawNumber::Text("12.5".into())),
            ..Default::default()
        }];
        FeedSender::send_batch(&feed, &target, &batch).unwrap();

        let mut buf = [0u8; 1024];
        let size = board.recv(&mut buf).unwrap();
        assert_eq!(decode_update_batch(&buf[..size]).unwrap(), batch);
    }
}
