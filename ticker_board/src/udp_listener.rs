//! UDP listener for update batches.

use crossbeam_channel::Sender;
use log::{debug, error, warn};
use std::net::UdpSocket;
use std::thread::{self, JoinHandle};
use ticker_common::net::MAX_DATAGRAM;
use ticker_common::raw::{RawTickerUpdate, decode_update_batch};

/// UDP listener that receives update batches, one JSON batch per datagram,
/// and forwards them to the thread that owns store writes.
pub struct UpdateListener;

impl UpdateListener {
    /// Spawn a background thread that reads datagrams from `socket`, decodes each into
    /// a batch and sends it to `tx`. Undecodable datagrams are dropped. The thread ends
    /// when `tx` is disconnected.
    pub fn start(socket: UdpSocket, tx: Sender<Vec<RawTickerUpdate>>) -> JoinHandle<()> {
        thread::spawn(move || {
            let mut buf = vec![0u8; MAX_DATAGRAM];
            loop {
                match socket.recv_from(&mut buf) {
                    Ok((size, addr)) => match decode_update_batch(&buf[..size]) {
                        Ok(batch) => {
                            debug!("Received batch of {} updates from {}", batch.len(), addr);
                            if tx.send(batch).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Dropped datagram from {}: {}", addr, e),
                    },
                    Err(e) => error!("UDP receive error: {}", e),
                }
            }
        })
    }
}
