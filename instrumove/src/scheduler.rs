//! Metronome thread.
//!
//! Spawned once the tempo is established; emits one beat note per period,
//! accenting every `accent_ratio`-th tick.  The timer is a `recv_timeout`
//! loop on a command channel, so the thread wakes either on the period or on
//! a quit message (teardown).
//!
//! Each tick takes the engine lock before emitting, so a tick and a frame
//! callback never interleave, and a session that has begun teardown (flag
//! flipped under that same lock) emits nothing further.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use osc_link::Instrument;

use crate::beat::Tempo;
use crate::session::Engine;

enum SchedulerCommand {
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// BeatScheduler
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the metronome thread.
pub struct BeatScheduler {
    cmd_tx: Sender<SchedulerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl BeatScheduler {
    /// Spawn the metronome at the established tempo.  `voice` is the beat
    /// instrument; `engine` is the session's shared state.
    pub fn spawn(
        tempo: Tempo,
        accent_pitch: i32,
        regular_pitch: i32,
        voice: Instrument,
        engine: Arc<Mutex<Engine>>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SchedulerCommand>();

        let handle = thread::spawn(move || {
            let period = Duration::from_micros((tempo.period_ms.max(1.0) * 1000.0) as u64);
            loop {
                match cmd_rx.recv_timeout(period) {
                    Ok(SchedulerCommand::Quit) | Err(RecvTimeoutError::Disconnected) => return,
                    Err(RecvTimeoutError::Timeout) => {
                        let mut engine = engine.lock().expect("engine lock poisoned");
                        if engine.shutting_down {
                            return;
                        }
                        let accent = engine.beats_played % tempo.accent_ratio == 0;
                        debug!("beat tick {} accent={accent}", engine.beats_played);
                        voice.play_note(if accent { accent_pitch } else { regular_pitch });
                        engine.beats_played += 1;
                    }
                }
            }
        });

        BeatScheduler {
            cmd_tx,
            handle: Some(handle),
        }
    }

    /// Stop the metronome and wait for the thread to finish.  Combined with
    /// the teardown flag this is synchronous: once it returns, no further
    /// tick will ever emit.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(SchedulerCommand::Quit);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
