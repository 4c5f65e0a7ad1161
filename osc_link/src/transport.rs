//! Transport seam — where encoded messages leave the process.
//!
//! Delivery is fire-and-forget over an unordered, unreliable channel: a
//! dropped note must never block or delay the next one, so send failures are
//! logged and discarded.

use std::io;
use std::net::UdpSocket;
use std::sync::Mutex;

use log::{debug, warn};

use crate::{encode_message, OscArg};

// ════════════════════════════════════════════════════════════════════════════
// Transport trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver one addressed, typed message.
///
/// Implementations take `&self` so a single transport can be shared across
/// voices and the beat scheduler thread.
pub trait Transport: Send + Sync {
    fn send(&self, address: &str, args: &[OscArg]);
}

// ════════════════════════════════════════════════════════════════════════════
// UdpTransport — the real thing
// ════════════════════════════════════════════════════════════════════════════

/// Default destination: the port Ableton + Max for Live listens on.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 22345;

/// OSC over UDP to a fixed destination.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind an ephemeral local socket and aim it at `host:port`.
    pub fn new(host: &str, port: u16) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect((host, port))?;
        Ok(UdpTransport { socket })
    }

    pub fn with_defaults() -> io::Result<Self> {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl Transport for UdpTransport {
    fn send(&self, address: &str, args: &[OscArg]) {
        let bytes = encode_message(address, args);
        if let Err(e) = self.socket.send(&bytes) {
            // Fire-and-forget: log and drop, never retry or surface.
            warn!("udp send to {address} failed: {e}");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NullTransport — discard everything
// ════════════════════════════════════════════════════════════════════════════

/// Swallows all messages.  Used when no synthesizer is reachable, so a
/// session can still run (dry-run mode).
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&self, address: &str, args: &[OscArg]) {
        debug!("null transport drop: {address} {args:?}");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RecordingTransport — capture for assertions
// ════════════════════════════════════════════════════════════════════════════

/// Records every message for later inspection.  The assertion surface for
/// engine tests.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, Vec<OscArg>)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far, in order.
    pub fn sent(&self) -> Vec<(String, Vec<OscArg>)> {
        self.sent.lock().expect("recording transport poisoned").clone()
    }

    /// Addresses only, in send order.
    pub fn addresses(&self) -> Vec<String> {
        self.sent().into_iter().map(|(a, _)| a).collect()
    }

    /// Number of messages whose address equals `address`.
    pub fn count_of(&self, address: &str) -> usize {
        self.sent().iter().filter(|(a, _)| a == address).count()
    }

    pub fn clear(&self) {
        self.sent.lock().expect("recording transport poisoned").clear();
    }
}

impl Transport for RecordingTransport {
    fn send(&self, address: &str, args: &[OscArg]) {
        self.sent
            .lock()
            .expect("recording transport poisoned")
            .push((address.to_string(), args.to_vec()));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_transport_captures_in_order() {
        let t = RecordingTransport::new();
        t.send("/a", &[OscArg::Int(1)]);
        t.send("/b", &[]);
        t.send("/a", &[OscArg::Int(2)]);
        assert_eq!(t.addresses(), vec!["/a", "/b", "/a"]);
        assert_eq!(t.count_of("/a"), 2);
    }

    #[test]
    fn udp_transport_send_never_panics_unreachable() {
        // Nothing listens here; fire-and-forget must swallow the outcome.
        let t = UdpTransport::new("127.0.0.1", 1).expect("bind");
        t.send("/nobody", &[OscArg::Int(1)]);
    }
}
