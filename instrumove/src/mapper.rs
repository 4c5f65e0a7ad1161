//! Velocity → voice mapping policy.
//!
//! Each configured (steady, moving) joint pair owns two voices: a "fast"
//! percussive voice whose pitch tracks the moving joint's height, and a
//! sustained "slow" voice.  At most one of the two sounds at a time, and
//! every transition is debounced through [`VoiceState`] — a voice already in
//! the requested state emits nothing.

use std::sync::Arc;

use log::debug;

use joint_stream::{JointHistory, JointId, VelocityEstimator};
use osc_link::{Instrument, Transport};

use crate::config::JointPairConfig;
use crate::frame::BodyFrame;

// ════════════════════════════════════════════════════════════════════════════
// Thresholds and pitch constants
// ════════════════════════════════════════════════════════════════════════════

/// Relative speed above which the fast voice plays.
pub const FAST_THRESHOLD: f64 = 2.0;

/// Relative speed above which the slow voice plays (sustained-eligible
/// pairs only).
pub const SLOW_THRESHOLD: f64 = 0.2;

/// Span of the height-mapped pitch range.
pub const PITCH_SPAN: i32 = 30;

/// Bottom of the height-mapped pitch range.
pub const PITCH_OFFSET: i32 = 50;

/// Constant pitch of the sustained slow voice.
pub const SUSTAINED_PITCH: i32 = 60;

const DEFAULT_VELOCITY: i32 = 127;
const DEFAULT_DURATION_MS: i32 = 500;

// ════════════════════════════════════════════════════════════════════════════
// VoiceState — debounced playing/stopped flag
// ════════════════════════════════════════════════════════════════════════════

/// One voice and whether it is currently sounding.
///
/// The only mutators are [`ensure_playing`](Self::ensure_playing) and
/// [`ensure_stopped`](Self::ensure_stopped), both idempotent: exactly one
/// note-on per stopped→playing transition, exactly one note-off per
/// playing→stopped transition, nothing otherwise.
pub struct VoiceState {
    voice: Instrument,
    playing: bool,
}

impl VoiceState {
    pub fn new(voice: Instrument) -> Self {
        VoiceState {
            voice,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn ensure_playing(&mut self, pitch: i32, sustain: i32) {
        if !self.playing {
            self.voice
                .play_note_full(pitch, DEFAULT_VELOCITY, DEFAULT_DURATION_MS, sustain);
            self.playing = true;
        }
    }

    pub fn ensure_stopped(&mut self) {
        if self.playing {
            self.voice.stop_note();
            self.playing = false;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PairVoices — the two voices of one joint pair
// ════════════════════════════════════════════════════════════════════════════

struct PairVoices {
    config: JointPairConfig,
    slow: VoiceState,
    fast: VoiceState,
}

impl PairVoices {
    /// Slow and fast must never sound together; reaching that state is a
    /// mapper logic fault.
    fn check_exclusion(&self) {
        debug_assert!(
            !(self.slow.is_playing() && self.fast.is_playing()),
            "slow and fast voice both playing for pair {:?}→{:?}",
            self.config.steady,
            self.config.moving,
        );
    }
}

// ════════════════════════════════════════════════════════════════════════════
// VoiceMapper
// ════════════════════════════════════════════════════════════════════════════

/// Converts per-pair relative velocities and hand state into voice commands.
pub struct VoiceMapper {
    pairs: Vec<PairVoices>,
}

impl VoiceMapper {
    /// Build voice state for every configured pair, one [`Instrument`] per
    /// voice over the shared transport.
    pub fn new(configs: &[JointPairConfig], transport: Arc<dyn Transport>) -> Self {
        let pairs = configs
            .iter()
            .map(|c| PairVoices {
                config: c.clone(),
                slow: VoiceState::new(Instrument::new(&c.slow_voice, transport.clone())),
                fast: VoiceState::new(Instrument::new(&c.fast_voice, transport.clone())),
            })
            .collect();
        VoiceMapper { pairs }
    }

    /// Map one frame (tempo already established).
    pub fn map_frame(&mut self, history: &JointHistory, frame: &BodyFrame) {
        // Silence gesture overrides everything.
        if frame.hands.both_closed() {
            self.stop_all();
            return;
        }

        let estimator = VelocityEstimator::new(history);
        for pair in &mut self.pairs {
            let speed = estimator.relative_speed(pair.config.steady, pair.config.moving);
            debug!(
                "{:?}→{:?} relative speed {speed:.3}",
                pair.config.steady, pair.config.moving
            );

            if speed > FAST_THRESHOLD {
                pair.slow.ensure_stopped();
                let pitch = pitch_for_height(moving_height(pair.config.moving, history, frame));
                pair.fast.ensure_playing(pitch, 0);
            } else if pair.config.sustained_eligible && speed > SLOW_THRESHOLD {
                // Slow sustained notes only for arm pairs — leg movement
                // sustains turn the mix into cacophony.
                pair.fast.ensure_stopped();
                pair.slow.ensure_playing(SUSTAINED_PITCH, 1);
            } else {
                pair.fast.ensure_stopped();
                pair.slow.ensure_stopped();
            }

            pair.check_exclusion();
        }
    }

    /// Stop every voice across every pair (idempotent per voice).
    pub fn stop_all(&mut self) {
        for pair in &mut self.pairs {
            pair.slow.ensure_stopped();
            pair.fast.ensure_stopped();
        }
    }

    /// True iff any voice of any pair is sounding.
    pub fn any_playing(&self) -> bool {
        self.pairs
            .iter()
            .any(|p| p.slow.is_playing() || p.fast.is_playing())
    }
}

/// Current height (Y) of the moving joint: the frame's value when present,
/// else the most recent history sample, else mid-range zero.
fn moving_height(moving: JointId, history: &JointHistory, frame: &BodyFrame) -> f64 {
    frame
        .joints
        .get(&moving)
        .map(|p| p.y)
        .or_else(|| history.nth_most_recent(moving, 0).map(|s| s.position.y))
        .unwrap_or(0.0)
}

/// Linear height → pitch map: y in roughly [-1, 1] lands in
/// [`PITCH_OFFSET`] ..= [`PITCH_OFFSET`] + 2×[`PITCH_SPAN`], clamped to MIDI.
fn pitch_for_height(y: f64) -> i32 {
    ((y * PITCH_SPAN as f64) as i32 + PITCH_SPAN + PITCH_OFFSET).clamp(0, 127)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
