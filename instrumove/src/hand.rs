//! Discrete hand states, as classified by the sensor.

// ════════════════════════════════════════════════════════════════════════════
// HandState
// ════════════════════════════════════════════════════════════════════════════

/// Sensor-reported hand posture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandState {
    Open,
    Closed,
    /// Index-and-middle "lasso" posture.
    Lasso,
    #[default]
    Unknown,
}

// ════════════════════════════════════════════════════════════════════════════
// HandPair
// ════════════════════════════════════════════════════════════════════════════

/// The two hand states of one frame.  Independent of the joint histories;
/// the frame loop keeps the previous frame's pair for edge detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandPair {
    pub left: HandState,
    pub right: HandState,
}

impl HandPair {
    pub fn new(left: HandState, right: HandState) -> Self {
        HandPair { left, right }
    }

    pub fn closed() -> Self {
        HandPair::new(HandState::Closed, HandState::Closed)
    }

    pub fn open() -> Self {
        HandPair::new(HandState::Open, HandState::Open)
    }

    /// The global-silence gesture.
    pub fn both_closed(&self) -> bool {
        self.left == HandState::Closed && self.right == HandState::Closed
    }

    pub fn both_open(&self) -> bool {
        self.left == HandState::Open && self.right == HandState::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_closed_requires_both() {
        assert!(HandPair::closed().both_closed());
        assert!(!HandPair::new(HandState::Closed, HandState::Open).both_closed());
        assert!(!HandPair::new(HandState::Closed, HandState::Unknown).both_closed());
    }
}
