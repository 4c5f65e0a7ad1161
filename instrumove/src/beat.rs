//! Beat / time-signature detection (state machine).
//!
//! The performer counts the piece in with hand gestures.  Starting from
//! both hands closed, opening the **right** hand is a stressed (accented)
//! beat and opening the **left** hand a regular beat — both edge-triggered
//! against the previous frame, so holding a hand open fires nothing.
//!
//! Detected beat timestamps accumulate until the establishment rule fires;
//! the mean inter-beat interval then becomes the fixed metronome period and
//! the detector is read-only from that point on (`Learning → Established`,
//! no way back).

use log::info;

use osc_link::{Instrument, LooperState};

use crate::hand::{HandPair, HandState};

// ════════════════════════════════════════════════════════════════════════════
// Configuration
// ════════════════════════════════════════════════════════════════════════════

/// How a learning session decides the tempo is settled.  Exactly one rule is
/// active per session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EstablishRule {
    /// Establish once the stressed-beat count exceeds this minimum.
    StressedBeatMinimum(usize),
    /// Establish on the first frame with both hands open.
    BothHandsOpen,
}

#[derive(Clone, Debug)]
pub struct BeatConfig {
    pub rule: EstablishRule,
    /// Count-in / metronome accent pitch.
    pub stressed_pitch: i32,
    /// Count-in / metronome regular pitch.
    pub regular_pitch: i32,
    /// Period used when establishment fires before two beats were recorded
    /// (possible under `BothHandsOpen`): one beat at 120 BPM.
    pub fallback_period_ms: f64,
}

impl Default for BeatConfig {
    fn default() -> Self {
        BeatConfig {
            rule: EstablishRule::StressedBeatMinimum(3),
            stressed_pitch: 40,
            regular_pitch: 60,
            fallback_period_ms: 500.0,
        }
    }
}

/// The fixed grid computed at establishment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tempo {
    pub period_ms: f64,
    /// Metronome ticks per accent: every `accent_ratio`-th tick is stressed.
    pub accent_ratio: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// BeatDetector
// ════════════════════════════════════════════════════════════════════════════

/// `Learning` until the establishment rule fires, then `Established` forever.
pub struct BeatDetector {
    config: BeatConfig,
    voice: Instrument,
    beat_times: Vec<f64>,
    stressed_count: usize,
    tempo: Option<Tempo>,
}

impl BeatDetector {
    /// A fresh detector announces itself to the looper (`"Overdub"`): the
    /// count-in gets recorded.
    pub fn new(config: BeatConfig, voice: Instrument) -> Self {
        voice.send_state(LooperState::Overdub);
        BeatDetector {
            config,
            voice,
            beat_times: Vec::new(),
            stressed_count: 0,
            tempo: None,
        }
    }

    pub fn is_established(&self) -> bool {
        self.tempo.is_some()
    }

    pub fn tempo(&self) -> Option<Tempo> {
        self.tempo
    }

    pub fn voice(&self) -> &Instrument {
        &self.voice
    }

    /// Stressed beat: right hand opens while the left stays closed, coming
    /// out of both-closed.
    fn is_stressed_beat(current: HandPair, previous: HandPair) -> bool {
        current.left == HandState::Closed
            && current.right == HandState::Open
            && previous.both_closed()
    }

    /// Regular beat: left hand opens while the right stays closed, coming
    /// out of both-closed.
    fn is_regular_beat(current: HandPair, previous: HandPair) -> bool {
        current.left == HandState::Open
            && current.right == HandState::Closed
            && previous.both_closed()
    }

    /// Feed one frame's hand states.  Returns the [`Tempo`] on the single
    /// establishing frame, `None` otherwise.  After establishment the
    /// detector ignores further input.
    pub fn check_for_beats(
        &mut self,
        current: HandPair,
        previous: HandPair,
        timestamp_ms: f64,
    ) -> Option<Tempo> {
        if self.tempo.is_some() {
            return None;
        }

        if Self::is_stressed_beat(current, previous) {
            info!("stressed beat {} at {timestamp_ms} ms", self.stressed_count);
            self.beat_times.push(timestamp_ms);
            self.stressed_count += 1;
            self.voice.play_note(self.config.stressed_pitch);
        } else if Self::is_regular_beat(current, previous) {
            info!("regular beat {} at {timestamp_ms} ms", self.beat_times.len());
            self.beat_times.push(timestamp_ms);
            self.voice.play_note(self.config.regular_pitch);
        }

        let should_establish = match self.config.rule {
            EstablishRule::StressedBeatMinimum(min) => self.stressed_count > min,
            EstablishRule::BothHandsOpen => current.both_open(),
        };

        if should_establish {
            // The establishing gesture itself is not part of the played
            // grid: drop one stressed beat before deriving the ratio.
            self.stressed_count = self.stressed_count.saturating_sub(1);
            Some(self.establish())
        } else {
            None
        }
    }

    /// Fix the grid: period is the mean of consecutive beat-time diffs over
    /// the total beat count, accent ratio the rounded beats-per-stressed-beat.
    fn establish(&mut self) -> Tempo {
        let period_ms = if self.beat_times.len() >= 2 {
            let sum: f64 = self
                .beat_times
                .windows(2)
                .map(|w| w[1] - w[0])
                .sum();
            sum / self.beat_times.len() as f64
        } else {
            self.config.fallback_period_ms
        };

        let accent_ratio = if self.stressed_count > 0 {
            ((self.beat_times.len() as f64 / self.stressed_count as f64).round() as u64).max(1)
        } else {
            4
        };

        info!(
            "establishing time signature: period {period_ms:.1} ms, accent every {accent_ratio}"
        );
        // Count-in recorded; tell the looper to stop overdubbing.
        self.voice.send_state(LooperState::Stop);

        let tempo = Tempo {
            period_ms,
            accent_ratio,
        };
        self.tempo = Some(tempo);
        tempo
    }

    pub fn config(&self) -> &BeatConfig {
        &self.config
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::HandState;
    use osc_link::{OscArg, RecordingTransport, Transport};
    use std::sync::Arc;

    fn rig(rule: EstablishRule) -> (Arc<RecordingTransport>, BeatDetector) {
        let t = Arc::new(RecordingTransport::new());
        let voice = Instrument::new("beat0", t.clone() as Arc<dyn Transport>);
        let config = BeatConfig {
            rule,
            ..BeatConfig::default()
        };
        (t, BeatDetector::new(config, voice))
    }

    fn closed() -> HandPair {
        HandPair::closed()
    }

    fn left_open() -> HandPair {
        HandPair::new(HandState::Open, HandState::Closed)
    }

    fn right_open() -> HandPair {
        HandPair::new(HandState::Closed, HandState::Open)
    }

    /// One full stressed-beat gesture: open the right hand out of
    /// both-closed at `t`, close it again 100 ms later.
    fn stressed_gesture(d: &mut BeatDetector, t: f64) -> Option<Tempo> {
        let established = d.check_for_beats(right_open(), closed(), t);
        let after = d.check_for_beats(closed(), right_open(), t + 100.0);
        established.or(after)
    }

    #[test]
    fn new_detector_announces_overdub() {
        let (t, _d) = rig(EstablishRule::StressedBeatMinimum(3));
        assert_eq!(t.addresses(), vec!["/beat0state"]);
        assert_eq!(t.sent()[0].1, vec![OscArg::Str("Overdub".into())]);
    }

    #[test]
    fn beats_are_edge_triggered() {
        let (t, mut d) = rig(EstablishRule::StressedBeatMinimum(3));
        t.clear();
        // Closed/Closed → Open/Closed fires a regular beat.
        assert!(d.check_for_beats(left_open(), closed(), 0.0).is_none());
        assert_eq!(t.count_of("/beat0start"), 1);
        // Held open: no prior both-closed, no beat.
        d.check_for_beats(left_open(), left_open(), 33.0);
        assert_eq!(t.count_of("/beat0start"), 1);
    }

    #[test]
    fn stressed_and_regular_use_their_pitches() {
        let (t, mut d) = rig(EstablishRule::StressedBeatMinimum(3));
        d.check_for_beats(right_open(), closed(), 0.0);
        d.check_for_beats(left_open(), closed(), 500.0);
        let notes: Vec<_> = t
            .sent()
            .into_iter()
            .filter(|(a, _)| a == "/beat0start")
            .collect();
        assert_eq!(notes[0].1[0], OscArg::Int(40));
        assert_eq!(notes[1].1[0], OscArg::Int(60));
    }

    #[test]
    fn establishes_once_after_minimum_exceeded() {
        let (_t, mut d) = rig(EstablishRule::StressedBeatMinimum(3));
        let mut established_at = None;
        for i in 0..6 {
            let t0 = i as f64 * 500.0;
            if let Some(tempo) = stressed_gesture(&mut d, t0) {
                established_at = Some((i, tempo));
                break;
            }
        }
        // Minimum 3 → the fourth stressed beat establishes.
        let (i, tempo) = established_at.expect("never established");
        assert_eq!(i, 3);
        assert!(d.is_established());
        // Further gestures change nothing.
        assert!(stressed_gesture(&mut d, 10_000.0).is_none());
        assert_eq!(d.tempo(), Some(tempo));
    }

    #[test]
    fn period_is_mean_diff_over_total_count() {
        let (_t, mut d) = rig(EstablishRule::StressedBeatMinimum(3));
        let mut tempo = None;
        for i in 0..4 {
            if let Some(tp) = stressed_gesture(&mut d, i as f64 * 500.0) {
                tempo = Some(tp);
            }
        }
        let tempo = tempo.expect("established");
        // 4 beats at 0,500,1000,1500: Σdiffs = 1500 over count 4 → 375 ms.
        assert!((tempo.period_ms - 375.0).abs() < 1e-9);
        // All four beats stressed, count normalised to 3 → ratio round(4/3)=1.
        assert_eq!(tempo.accent_ratio, 1);
    }

    #[test]
    fn accent_ratio_counts_regulars() {
        let (_t, mut d) = rig(EstablishRule::StressedBeatMinimum(1));
        // stressed, 3 regulars, stressed → establishes on second stressed.
        d.check_for_beats(right_open(), closed(), 0.0);
        d.check_for_beats(closed(), right_open(), 100.0);
        for i in 0..3 {
            let t0 = 500.0 + i as f64 * 500.0;
            d.check_for_beats(left_open(), closed(), t0);
            d.check_for_beats(closed(), left_open(), t0 + 100.0);
        }
        let tempo = d
            .check_for_beats(right_open(), closed(), 2000.0)
            .expect("established");
        // 5 beats, stressed count 2 → normalised 1 → accent every 5th tick.
        assert_eq!(tempo.accent_ratio, 5);
        // Period: Σdiffs 2000 over 5 beats → 400 ms.
        assert!((tempo.period_ms - 400.0).abs() < 1e-9);
    }

    #[test]
    fn both_hands_open_rule_establishes_immediately() {
        let (t, mut d) = rig(EstablishRule::BothHandsOpen);
        let tempo = d
            .check_for_beats(HandPair::open(), closed(), 0.0)
            .expect("established");
        // No recorded beats → fallback period.
        assert!((tempo.period_ms - 500.0).abs() < 1e-9);
        assert!(d.is_established());
        // Looper told to stop.
        assert_eq!(t.count_of("/beat0state"), 2);
    }

    #[test]
    fn establishment_sends_looper_stop() {
        let (t, mut d) = rig(EstablishRule::StressedBeatMinimum(1));
        stressed_gesture(&mut d, 0.0);
        stressed_gesture(&mut d, 500.0);
        let states: Vec<_> = t
            .sent()
            .into_iter()
            .filter(|(a, _)| a == "/beat0state")
            .collect();
        assert_eq!(states.last().unwrap().1, vec![OscArg::Str("Stop".into())]);
    }
}
