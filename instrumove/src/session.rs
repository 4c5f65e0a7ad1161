//! Session wiring.
//!
//! A [`Session`] owns everything mutable for one tracked performance: the
//! joint history, the beat detector, the voice mapper, and (once tempo is
//! established) the metronome thread.  All of that shared state lives behind
//! one coarse `Mutex` — the frame callback and scheduler ticks both go
//! through it, so they never interleave.
//!
//! Frames arrive sequentially (the sensor collaborator never delivers
//! concurrently); the scheduler fires on its own clock.  Teardown flips a
//! flag under the lock before joining the scheduler thread, so no tick can
//! emit after teardown begins.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use log::info;

use joint_stream::{JointHistory, TimedSample};
use osc_link::{Instrument, Transport};

use crate::beat::BeatDetector;
use crate::config::SessionConfig;
use crate::frame::BodyFrame;
use crate::hand::HandPair;
use crate::mapper::VoiceMapper;
use crate::scheduler::BeatScheduler;

// ════════════════════════════════════════════════════════════════════════════
// Engine — the mutable state behind the lock
// ════════════════════════════════════════════════════════════════════════════

/// Everything the frame path and the scheduler share.
pub struct Engine {
    pub(crate) history: JointHistory,
    pub(crate) detector: BeatDetector,
    pub(crate) mapper: VoiceMapper,
    pub(crate) prev_hands: HandPair,
    /// Metronome ticks emitted so far (drives accent alternation).
    pub(crate) beats_played: u64,
    /// Set under the lock at the start of teardown; a scheduler tick that
    /// observes it emits nothing.
    pub(crate) shutting_down: bool,
}

impl Engine {
    pub(crate) fn new(config: &SessionConfig, transport: Arc<dyn Transport>) -> Self {
        let beat_voice = Instrument::new(&config.beat_voice, transport.clone());
        Engine {
            history: JointHistory::new(config.history_capacity),
            detector: BeatDetector::new(config.beat.clone(), beat_voice),
            mapper: VoiceMapper::new(&config.pairs, transport),
            prev_hands: HandPair::default(),
            beats_played: 0,
            shutting_down: false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

/// One tracked performance, start to finish.
pub struct Session {
    engine: Arc<Mutex<Engine>>,
    scheduler: Option<BeatScheduler>,
    beat_voice: Instrument,
    accent_pitch: i32,
    regular_pitch: i32,
    shut_down: bool,
}

impl Session {
    pub fn new(config: SessionConfig, transport: Arc<dyn Transport>) -> Self {
        let engine = Engine::new(&config, transport.clone());
        let beat_voice = engine.detector.voice().clone();
        Session {
            engine: Arc::new(Mutex::new(engine)),
            scheduler: None,
            beat_voice,
            accent_pitch: config.beat.stressed_pitch,
            regular_pitch: config.beat.regular_pitch,
            shut_down: false,
        }
    }

    /// Ingest one body frame.
    ///
    /// Appends every joint to the history, then either feeds the beat
    /// detector (learning phase) or the voice mapper (established phase).
    /// On the establishing frame the metronome thread is started.
    pub fn process_frame(&mut self, frame: &BodyFrame) {
        let established_now = {
            let mut engine = self.engine.lock().expect("engine lock poisoned");
            if engine.shutting_down {
                return;
            }

            for (&joint, &position) in &frame.joints {
                engine
                    .history
                    .append(joint, TimedSample::new(frame.timestamp_ms, position));
            }

            let result = if !engine.detector.is_established() {
                let prev = engine.prev_hands;
                engine
                    .detector
                    .check_for_beats(frame.hands, prev, frame.timestamp_ms)
            } else {
                let Engine {
                    history, mapper, ..
                } = &mut *engine;
                mapper.map_frame(history, frame);
                None
            };

            engine.prev_hands = frame.hands;
            result
        };

        // Spawn outside the lock; ticks take it themselves.
        if let Some(tempo) = established_now {
            info!(
                "tempo established: {:.1} ms period, accent every {}",
                tempo.period_ms, tempo.accent_ratio
            );
            self.scheduler = Some(BeatScheduler::spawn(
                tempo,
                self.accent_pitch,
                self.regular_pitch,
                self.beat_voice.clone(),
                self.engine.clone(),
            ));
        }
    }

    pub fn is_established(&self) -> bool {
        self.engine
            .lock()
            .expect("engine lock poisoned")
            .detector
            .is_established()
    }

    /// Tear the session down: silence every voice, stop the metronome, and
    /// wait for its thread to exit.  Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        {
            let mut engine = self.engine.lock().expect("engine lock poisoned");
            engine.shutting_down = true;
            engine.mapper.stop_all();
        }
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.shutdown();
        }
        info!("session shut down");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Drive a session from a frame channel until the source disconnects, then
/// shut down.
pub fn run(session: &mut Session, frames: Receiver<BodyFrame>) {
    for frame in frames {
        session.process_frame(&frame);
    }
    session.shutdown();
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beat::{BeatConfig, EstablishRule};
    use crate::hand::HandState;
    use joint_stream::{JointId, Point3};
    use osc_link::RecordingTransport;
    use std::time::Duration;

    const MOVING: JointId = JointId::HandLeft;

    fn rig() -> (Arc<RecordingTransport>, Session) {
        let t = Arc::new(RecordingTransport::new());
        let session = Session::new(SessionConfig::default(), t.clone() as Arc<dyn Transport>);
        (t, session)
    }

    fn still_frame(t_ms: f64, hands: HandPair) -> BodyFrame {
        let mut f = BodyFrame::new(t_ms).with_hands(hands);
        for pair in crate::config::default_pairs() {
            f = f
                .with_joint(pair.steady, Point3::default())
                .with_joint(pair.moving, Point3::default());
        }
        f
    }

    /// Count the session in with `n` stressed-beat gestures, 500 ms apart.
    fn count_in(session: &mut Session, n: usize) -> f64 {
        let mut t_ms = 0.0;
        for _ in 0..n {
            session.process_frame(&still_frame(t_ms, HandPair::closed()));
            session.process_frame(&still_frame(
                t_ms + 100.0,
                HandPair::new(HandState::Closed, HandState::Open),
            ));
            t_ms += 500.0;
        }
        t_ms
    }

    /// A frame at `t_ms` with the left hand at `x`, everything else still.
    fn moving_frame(t_ms: f64, x: f64) -> BodyFrame {
        let mut f = still_frame(t_ms, HandPair::new(HandState::Open, HandState::Unknown));
        f.joints.insert(MOVING, Point3::new(x, 0.0, 0.0));
        f
    }

    #[test]
    fn learning_phase_plays_count_in_notes() {
        let (t, mut session) = rig();
        count_in(&mut session, 2);
        assert_eq!(t.count_of("/beat0start"), 2);
        assert!(!session.is_established());
        session.shutdown();
    }

    #[test]
    fn four_stressed_beats_establish_tempo() {
        let (_t, mut session) = rig();
        count_in(&mut session, 4);
        assert!(session.is_established());
        session.shutdown();
    }

    #[test]
    fn established_session_maps_motion_to_notes() {
        let (t, mut session) = rig();
        let t0 = count_in(&mut session, 4);
        session.shutdown_scheduler_for_test();
        t.clear();

        // Fast hand motion: 3 m/s relative to the shoulder.
        let mut x = 0.0;
        for i in 0..5 {
            session.process_frame(&moving_frame(t0 + i as f64 * 10.0, x));
            x += 0.03;
        }
        assert_eq!(t.count_of("/instr1start"), 1);

        // Freeze: the fast voice stops exactly once.
        for i in 5..12 {
            session.process_frame(&moving_frame(t0 + i as f64 * 10.0, x));
        }
        assert_eq!(t.count_of("/instr1stop"), 1);
        session.shutdown();
    }

    #[test]
    fn silence_gesture_stops_everything_immediately() {
        let (t, mut session) = rig();
        let t0 = count_in(&mut session, 4);
        session.shutdown_scheduler_for_test();

        let mut x = 0.0;
        for i in 0..5 {
            session.process_frame(&moving_frame(t0 + i as f64 * 10.0, x));
            x += 0.03;
        }
        assert_eq!(t.count_of("/instr1start"), 1);

        session.process_frame(&still_frame(t0 + 50.0, HandPair::closed()));
        assert_eq!(t.count_of("/instr1stop"), 1);
        session.shutdown();
    }

    #[test]
    fn shutdown_silences_and_is_idempotent() {
        let (t, mut session) = rig();
        let t0 = count_in(&mut session, 4);
        let mut x = 0.0;
        for i in 0..5 {
            session.process_frame(&moving_frame(t0 + i as f64 * 10.0, x));
            x += 0.03;
        }
        session.shutdown();
        assert_eq!(t.count_of("/instr1stop"), 1);
        let sent = t.sent().len();
        // No beats, no notes after teardown — even with frames still coming.
        std::thread::sleep(Duration::from_millis(50));
        session.process_frame(&moving_frame(t0 + 100.0, 10.0));
        session.shutdown();
        assert_eq!(t.sent().len(), sent);
    }

    #[test]
    fn both_hands_open_rule_is_available() {
        let t = Arc::new(RecordingTransport::new());
        let config = SessionConfig {
            beat: BeatConfig {
                rule: EstablishRule::BothHandsOpen,
                ..BeatConfig::default()
            },
            ..SessionConfig::default()
        };
        let mut session = Session::new(config, t.clone() as Arc<dyn Transport>);
        session.process_frame(&still_frame(0.0, HandPair::closed()));
        session.process_frame(&still_frame(33.0, HandPair::open()));
        assert!(session.is_established());
        session.shutdown();
    }

    #[test]
    fn run_drains_source_then_shuts_down() {
        let (t, mut session) = rig();
        let frames: Vec<BodyFrame> = (0..3)
            .map(|i| still_frame(i as f64 * 33.0, HandPair::closed()))
            .collect();
        let rx = crate::frame::spawn_frame_source(crate::frame::ScriptedFrameSource::new(
            frames,
            Duration::ZERO,
        ));
        run(&mut session, rx);
        // Overdub announcement went out; session ended cleanly.
        assert_eq!(t.count_of("/beat0state"), 1);
    }
}

#[cfg(test)]
impl Session {
    /// Stop just the metronome so timing-sensitive assertions aren't raced
    /// by scheduler ticks.
    fn shutdown_scheduler_for_test(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.shutdown();
        }
    }
}
