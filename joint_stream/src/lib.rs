//! # joint_stream
//!
//! Body-tracking primitives for the Instrumove motion-to-music engine:
//!
//! * [`TimedSample`] — a timestamped 3D joint position.
//! * [`JointHistory`] — a bounded per-joint FIFO of the most recent samples,
//!   with "n-th most recent" lookups and inter-sample time deltas.
//! * [`VelocityEstimator`] — outlier-resistant relative speed between a
//!   (steady, moving) joint pair, computed from the history.
//!
//! The crate is sensor-agnostic: whatever delivers frames (hardware SDK,
//! recording, synthetic script) just appends one [`TimedSample`] per tracked
//! joint per frame.

pub mod history;
pub mod sample;
pub mod velocity;

pub use history::JointHistory;
pub use sample::{JointId, Point3, TimedSample};
pub use velocity::VelocityEstimator;
