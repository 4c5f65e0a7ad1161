//! Named voice handles.
//!
//! An [`Instrument`] is one logical synthesizer voice.  Its name is baked
//! into the message addresses the receiving patch listens on:
//! `/{name}start`, `/{name}stop`, `/{name}state`.

use std::sync::Arc;

use log::info;

use crate::{OscArg, Transport};

/// Wire defaults for note-on messages.
pub const DEFAULT_VELOCITY: i32 = 127;
pub const DEFAULT_DURATION_MS: i32 = 500;
pub const DEFAULT_MIDI_CHANNEL: i32 = 1;

// ════════════════════════════════════════════════════════════════════════════
// LooperState — companion looper/recorder signalling
// ════════════════════════════════════════════════════════════════════════════

/// Commands understood by a looping/recording collaborator listening on the
/// voice's `state` address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LooperState {
    Overdub,
    Play,
    Stop,
}

impl LooperState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LooperState::Overdub => "Overdub",
            LooperState::Play => "Play",
            LooperState::Stop => "Stop",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Instrument
// ════════════════════════════════════════════════════════════════════════════

/// One logical voice on the external synthesizer.
#[derive(Clone)]
pub struct Instrument {
    name: String,
    transport: Arc<dyn Transport>,
}

impl Instrument {
    pub fn new(name: &str, transport: Arc<dyn Transport>) -> Self {
        Instrument {
            name: name.to_string(),
            transport,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Note-on with wire defaults (velocity 127, 500 ms, channel 1,
    /// no sustain).
    pub fn play_note(&self, pitch: i32) {
        self.play_note_full(pitch, DEFAULT_VELOCITY, DEFAULT_DURATION_MS, 0);
    }

    /// Note-on: `/{name}start (pitch, velocity, channel, duration, sustain)`.
    pub fn play_note_full(&self, pitch: i32, velocity: i32, duration_ms: i32, sustain: i32) {
        info!(
            "playing {} pitch={} velocity={} duration={} sustain={}",
            self.name, pitch, velocity, duration_ms, sustain
        );
        self.transport.send(
            &format!("/{}start", self.name),
            &[
                OscArg::Int(pitch),
                OscArg::Int(velocity),
                OscArg::Int(DEFAULT_MIDI_CHANNEL),
                OscArg::Int(duration_ms),
                OscArg::Int(sustain),
            ],
        );
    }

    /// Note-off: `/{name}stop (1)`.
    pub fn stop_note(&self) {
        info!("stopping {}", self.name);
        self.transport
            .send(&format!("/{}stop", self.name), &[OscArg::Int(1)]);
    }

    /// Looper signalling: `/{name}state ("Overdub"|"Play"|"Stop")`.
    pub fn send_state(&self, state: LooperState) {
        self.transport.send(
            &format!("/{}state", self.name),
            &[OscArg::Str(state.as_str().to_string())],
        );
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingTransport;

    fn rig() -> (Arc<RecordingTransport>, Instrument) {
        let t = Arc::new(RecordingTransport::new());
        let i = Instrument::new("instr0", t.clone() as Arc<dyn Transport>);
        (t, i)
    }

    #[test]
    fn play_note_uses_wire_defaults() {
        let (t, i) = rig();
        i.play_note(60);
        let sent = t.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "/instr0start");
        assert_eq!(
            sent[0].1,
            vec![
                OscArg::Int(60),
                OscArg::Int(127),
                OscArg::Int(1),
                OscArg::Int(500),
                OscArg::Int(0),
            ]
        );
    }

    #[test]
    fn sustained_note_carries_flag() {
        let (t, i) = rig();
        i.play_note_full(60, 127, 500, 1);
        assert_eq!(t.sent()[0].1[4], OscArg::Int(1));
    }

    #[test]
    fn stop_note_sends_one() {
        let (t, i) = rig();
        i.stop_note();
        let sent = t.sent();
        assert_eq!(sent[0].0, "/instr0stop");
        assert_eq!(sent[0].1, vec![OscArg::Int(1)]);
    }

    #[test]
    fn state_sends_string() {
        let (t, i) = rig();
        i.send_state(LooperState::Overdub);
        let sent = t.sent();
        assert_eq!(sent[0].0, "/instr0state");
        assert_eq!(sent[0].1, vec![OscArg::Str("Overdub".into())]);
    }
}
