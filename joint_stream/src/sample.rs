//! Value types shared across the tracking pipeline.

// ════════════════════════════════════════════════════════════════════════════
// JointId — tracked anatomical landmarks
// ════════════════════════════════════════════════════════════════════════════

/// A tracked anatomical landmark.
///
/// The set mirrors the upper/lower-body joints the default pair mappings
/// reference; sensors that track more simply ignore the rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointId {
    Head,
    SpineBase,
    ShoulderLeft,
    ShoulderRight,
    ElbowLeft,
    ElbowRight,
    WristLeft,
    WristRight,
    HandLeft,
    HandRight,
    HipLeft,
    HipRight,
    KneeLeft,
    KneeRight,
    AnkleLeft,
    AnkleRight,
}

// ════════════════════════════════════════════════════════════════════════════
// Point3 — camera-space position
// ════════════════════════════════════════════════════════════════════════════

/// A 3D position in camera space (metres).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    /// Component-wise difference `self − other`.
    pub fn sub(&self, other: &Point3) -> Point3 {
        Point3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TimedSample — one joint observation
// ════════════════════════════════════════════════════════════════════════════

/// A single joint observation: position plus the frame timestamp.
///
/// Timestamps are milliseconds, monotonic within a session. Immutable once
/// created; owned by the [`JointHistory`](crate::JointHistory) slot holding it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedSample {
    pub timestamp_ms: f64,
    pub position: Point3,
}

impl TimedSample {
    pub fn new(timestamp_ms: f64, position: Point3) -> Self {
        TimedSample {
            timestamp_ms,
            position,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_is_componentwise() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(0.5, -1.0, 3.0);
        assert_eq!(a.sub(&b), Point3::new(0.5, 3.0, 0.0));
    }
}
