//! Shared networking constants and helpers used by the board and the feed.

/// TCP port on which the board accepts full snapshots (feed -> board).
pub const SNAPSHOT_PORT: u16 = 8080;
/// UDP port on which the board accepts update batches (feed -> board).
pub const UPDATE_PORT: u16 = 8081;
/// Largest update datagram the board reads in one `recv_from`.
pub const MAX_DATAGRAM: usize = 65_507;

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}
