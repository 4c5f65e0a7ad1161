//! # osc_link
//!
//! Outbound control messages for the Instrumove engine.  Notes are sent to
//! an external synthesizer (Ableton + Max for Live in the reference setup)
//! as OSC messages over UDP — fire-and-forget, no acknowledgement, no retry.
//!
//! * [`encode_message`] — OSC 1.0 message bytes, written directly
//!   (no codec crate required).
//! * [`Transport`] — the delivery seam; [`UdpTransport`] for the real thing,
//!   [`NullTransport`] when no destination exists, [`RecordingTransport`]
//!   for tests.
//! * [`Instrument`] — a named voice handle speaking the
//!   `/{name}start` / `/{name}stop` / `/{name}state` address scheme.
//!
//! With the `midi` feature enabled, [`midi::MidiTransport`] bridges the same
//! messages onto a local MIDI output port instead.

pub mod instrument;
#[cfg(feature = "midi")]
pub mod midi;
pub mod transport;

pub use instrument::{Instrument, LooperState};
pub use transport::{NullTransport, RecordingTransport, Transport, UdpTransport};

// ════════════════════════════════════════════════════════════════════════════
// OscArg — typed message arguments
// ════════════════════════════════════════════════════════════════════════════

/// A single typed OSC argument.
#[derive(Clone, Debug, PartialEq)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    Str(String),
}

impl OscArg {
    fn type_tag(&self) -> u8 {
        match self {
            OscArg::Int(_) => b'i',
            OscArg::Float(_) => b'f',
            OscArg::Str(_) => b's',
        }
    }
}

impl From<i32> for OscArg {
    fn from(v: i32) -> Self {
        OscArg::Int(v)
    }
}

impl From<f32> for OscArg {
    fn from(v: f32) -> Self {
        OscArg::Float(v)
    }
}

impl From<&str> for OscArg {
    fn from(v: &str) -> Self {
        OscArg::Str(v.to_string())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Encoding — OSC 1.0 message bytes
// ════════════════════════════════════════════════════════════════════════════

/// Encode one OSC message: padded address, `,`-prefixed type-tag string,
/// then big-endian arguments, every string NUL-terminated and padded to a
/// 4-byte boundary.
pub fn encode_message(address: &str, args: &[OscArg]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(address.len() + 8 + args.len() * 8);
    write_padded_str(&mut buf, address);

    let mut tags = Vec::with_capacity(args.len() + 1);
    tags.push(b',');
    for arg in args {
        tags.push(arg.type_tag());
    }
    write_padded_bytes(&mut buf, &tags);

    for arg in args {
        match arg {
            OscArg::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
            OscArg::Float(v) => buf.extend_from_slice(&v.to_be_bytes()),
            OscArg::Str(s) => write_padded_str(&mut buf, s),
        }
    }
    buf
}

fn write_padded_str(buf: &mut Vec<u8>, s: &str) {
    write_padded_bytes(buf, s.as_bytes());
}

/// Append `bytes` plus a terminating NUL, padded with NULs to 4 bytes.
fn write_padded_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(bytes);
    let pad = 4 - (bytes.len() % 4);
    buf.extend(std::iter::repeat(0u8).take(pad));
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
