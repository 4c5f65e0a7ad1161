//! # instrumove
//!
//! Motion-to-music decision engine.  A sensor collaborator delivers body
//! frames (3D joint positions plus two discrete hand states); this crate
//! turns them into note-on/note-off control messages for an external
//! synthesizer, via [`osc_link`].
//!
//! ## Gesture → sound mapping
//!
//! | Gesture | Phase | Effect |
//! |---|---|---|
//! | Right hand opens out of both-closed | learning | stressed beat (accent count-in note) |
//! | Left hand opens out of both-closed | learning | regular beat (count-in note) |
//! | Enough stressed beats | learning → established | tempo fixed; metronome starts |
//! | Fast limb movement (> 2.0 m/s relative) | established | "fast" voice note, pitch from limb height |
//! | Slow arm movement (> 0.2 m/s relative) | established | sustained "slow" voice note |
//! | Stillness | established | active voice stops |
//! | Both hands closed | any | every voice silenced |
//!
//! ## Architecture
//!
//! Per frame: joint positions go into a bounded [`joint_stream::JointHistory`];
//! while the tempo is unestablished the [`beat::BeatDetector`] watches
//! hand-state edges; afterwards the [`mapper::VoiceMapper`] converts relative
//! joint-pair velocities into idempotent voice commands.  Once tempo is
//! established a [`scheduler::BeatScheduler`] thread emits metronome beats,
//! sharing one coarse lock with the frame path.  [`session::Session`] owns
//! all of it.

pub mod beat;
pub mod config;
pub mod frame;
pub mod hand;
pub mod mapper;
pub mod scheduler;
pub mod session;

pub use beat::{BeatConfig, BeatDetector, EstablishRule, Tempo};
pub use config::{JointPairConfig, SessionConfig};
pub use frame::{spawn_frame_source, BodyFrame, FrameSource, ScriptedFrameSource};
pub use hand::{HandPair, HandState};
pub use mapper::VoiceMapper;
pub use session::Session;
