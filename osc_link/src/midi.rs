//! Local-MIDI bridge (feature = `midi`).
//!
//! Maps the `/{name}start` / `/{name}stop` message scheme onto a MIDI output
//! port so a local softsynth can stand in for the OSC destination.  Looper
//! `state` messages have no MIDI equivalent and are dropped.

use std::collections::HashMap;
use std::sync::Mutex;

use log::{info, warn};

use crate::{OscArg, Transport};

// ════════════════════════════════════════════════════════════════════════════
// Port selection
// ════════════════════════════════════════════════════════════════════════════

/// Open the first usable MIDI output port, preferring a visible softsynth.
fn open_midi_output() -> Option<midir::MidiOutputConnection> {
    let midi_out = match midir::MidiOutput::new("instrumove") {
        Ok(m) => m,
        Err(e) => {
            warn!("MIDI init error: {e}");
            return None;
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports found");
        return None;
    }

    let port_idx = ports
        .iter()
        .enumerate()
        .find(|(_, p)| {
            midi_out
                .port_name(p)
                .map(|n| {
                    let n = n.to_lowercase();
                    n.contains("fluid")
                        || n.contains("timidity")
                        || n.contains("microsoft")
                        || n.contains("gm")
                        || n.contains("synth")
                })
                .unwrap_or(false)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out
        .port_name(port)
        .unwrap_or_else(|_| "Unknown".to_string());
    info!("opening MIDI port: {name}");

    match midi_out.connect(port, "instrumove-out") {
        Ok(conn) => Some(conn),
        Err(e) => {
            warn!("failed to connect MIDI port: {e}");
            None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiTransport
// ════════════════════════════════════════════════════════════════════════════

struct MidiState {
    conn: Option<midir::MidiOutputConnection>,
    /// Last pitch started per voice name — note-off needs it back.
    active_pitch: HashMap<String, u8>,
}

/// [`Transport`] backend that plays notes on a local MIDI port.
pub struct MidiTransport {
    state: Mutex<MidiState>,
}

impl MidiTransport {
    /// Opens the first available port; with none available every send is a
    /// logged no-op, mirroring the fire-and-forget UDP path.
    pub fn new() -> Self {
        MidiTransport {
            state: Mutex::new(MidiState {
                conn: open_midi_output(),
                active_pitch: HashMap::new(),
            }),
        }
    }
}

impl Default for MidiTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MidiTransport {
    fn send(&self, address: &str, args: &[OscArg]) {
        let mut state = self.state.lock().expect("midi transport poisoned");

        if let Some(name) = address.strip_prefix('/').and_then(|a| a.strip_suffix("start")) {
            let (pitch, velocity, channel) = match args {
                [OscArg::Int(p), OscArg::Int(v), OscArg::Int(c), ..] => (*p, *v, *c),
                _ => {
                    warn!("malformed start message on {address}");
                    return;
                }
            };
            let pitch = pitch.clamp(0, 127) as u8;
            let velocity = velocity.clamp(0, 127) as u8;
            // Wire channel is 1-based; MIDI status nibble is 0-based.
            let channel = (channel - 1).clamp(0, 15) as u8;
            let name = name.to_string();
            if let Some(prev) = state.active_pitch.insert(name, pitch) {
                if let Some(conn) = state.conn.as_mut() {
                    let _ = conn.send(&[0x80 | channel, prev, 0]);
                }
            }
            if let Some(conn) = state.conn.as_mut() {
                let _ = conn.send(&[0x90 | channel, pitch, velocity]);
            }
        } else if let Some(name) = address.strip_prefix('/').and_then(|a| a.strip_suffix("stop")) {
            if let Some(pitch) = state.active_pitch.remove(name) {
                if let Some(conn) = state.conn.as_mut() {
                    let _ = conn.send(&[0x80, pitch, 0]);
                }
            }
        }
        // `state` addresses: no MIDI equivalent.
    }
}
