//! Body frames and frame sources.
//!
//! The public interface is a stream of [`BodyFrame`]s over an `mpsc`
//! channel.  Consumers don't care whether frames came from real tracking
//! hardware or a scripted replay — the [`FrameSource`] trait unifies both.
//! A hardware SDK binding would implement `FrameSource` the same way the
//! scripted source does.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use joint_stream::{JointId, Point3};

use crate::hand::HandPair;

// ════════════════════════════════════════════════════════════════════════════
// BodyFrame
// ════════════════════════════════════════════════════════════════════════════

/// One tracked body frame: joint positions, hand states, and a timestamp
/// (milliseconds, monotonic within the session; frame rate may be irregular).
#[derive(Clone, Debug)]
pub struct BodyFrame {
    pub timestamp_ms: f64,
    pub joints: HashMap<JointId, Point3>,
    pub hands: HandPair,
}

impl BodyFrame {
    pub fn new(timestamp_ms: f64) -> Self {
        BodyFrame {
            timestamp_ms,
            joints: HashMap::new(),
            hands: HandPair::default(),
        }
    }

    pub fn with_joint(mut self, joint: JointId, position: Point3) -> Self {
        self.joints.insert(joint, position);
        self
    }

    pub fn with_hands(mut self, hands: HandPair) -> Self {
        self.hands = hands;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait — unified interface for hardware and replay
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`BodyFrame`]s over a channel.
///
/// Frames are delivered one at a time, never concurrently.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<BodyFrame>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source<F: FrameSource>(source: F) -> Receiver<BodyFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedFrameSource — replay a prepared frame sequence
// ════════════════════════════════════════════════════════════════════════════

/// Replays a prepared sequence of frames with a fixed inter-frame delay.
/// Stands in for tracking hardware in demos and tests.
pub struct ScriptedFrameSource {
    pub frames: Vec<BodyFrame>,
    pub interval: Duration,
}

impl ScriptedFrameSource {
    pub fn new(frames: Vec<BodyFrame>, interval: Duration) -> Self {
        ScriptedFrameSource { frames, interval }
    }
}

impl FrameSource for ScriptedFrameSource {
    fn run(self: Box<Self>, tx: Sender<BodyFrame>) {
        for frame in self.frames {
            if tx.send(frame).is_err() {
                return;
            }
            thread::sleep(self.interval);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::HandState;

    #[test]
    fn scripted_source_delivers_all_frames_in_order() {
        let frames: Vec<BodyFrame> = (0..5).map(|i| BodyFrame::new(i as f64 * 33.0)).collect();
        let rx = spawn_frame_source(ScriptedFrameSource::new(frames, Duration::ZERO));
        let got: Vec<BodyFrame> = rx.iter().collect();
        assert_eq!(got.len(), 5);
        assert_eq!(got[0].timestamp_ms, 0.0);
        assert_eq!(got[4].timestamp_ms, 132.0);
    }

    #[test]
    fn builder_sets_joints_and_hands() {
        let f = BodyFrame::new(10.0)
            .with_joint(JointId::HandLeft, Point3::new(0.1, 0.2, 0.3))
            .with_hands(HandPair::new(HandState::Open, HandState::Closed));
        assert_eq!(f.joints[&JointId::HandLeft].y, 0.2);
        assert_eq!(f.hands.left, HandState::Open);
    }
}
