//! Relative velocity estimation between a (steady, moving) joint pair.
//!
//! Speed is measured in the steady joint's reference frame so that whole-body
//! drift (the performer stepping sideways) does not read as gesture motion.
//! A single glitched tracking frame would otherwise spike the reading, so
//! the full-history path takes the **median** of three consecutive two-point
//! estimates instead of a mean.

use crate::history::JointHistory;
use crate::sample::{JointId, Point3};

// ════════════════════════════════════════════════════════════════════════════
// VelocityEstimator
// ════════════════════════════════════════════════════════════════════════════

/// Read-only view over a [`JointHistory`] that produces relative speed
/// estimates for joint pairs.
pub struct VelocityEstimator<'a> {
    history: &'a JointHistory,
}

impl<'a> VelocityEstimator<'a> {
    pub fn new(history: &'a JointHistory) -> Self {
        VelocityEstimator { history }
    }

    /// Speed of `moving` relative to `steady`, in metres per second.
    ///
    /// Returns `0.0` when fewer than three samples exist for either joint —
    /// a defined "insufficient data" result, not an error; downstream
    /// thresholds treat zero as "no movement".
    ///
    /// With exactly three samples the estimate is a single two-point
    /// difference whose Δt stays in milliseconds (no ×1000 scaling).  The
    /// full four-sample path scales each estimate to per-second units and
    /// returns the median of the three.  The short path's unscaled Δt is
    /// intentional: the downstream fast-note threshold was tuned against it,
    /// and normalising would move the crossover during the first frames of
    /// a session.
    pub fn relative_speed(&self, steady: JointId, moving: JointId) -> f64 {
        let h = self.history;
        for n in 0..3 {
            if !h.exists_at(steady, n) || !h.exists_at(moving, n) {
                return 0.0;
            }
        }

        let d0 = self.displacement_at(steady, moving, 0);
        let d1 = self.displacement_at(steady, moving, 1);

        if !h.exists_at(steady, 3) || !h.exists_at(moving, 3) {
            return distance_between(&d0, &d1) / h.millis_between(moving, 1, 0);
        }

        let d2 = self.displacement_at(steady, moving, 2);
        let d3 = self.displacement_at(steady, moving, 3);

        median3(
            distance_between(&d0, &d1) * 1000.0 / h.millis_between(moving, 1, 0),
            distance_between(&d1, &d2) * 1000.0 / h.millis_between(moving, 2, 1),
            distance_between(&d2, &d3) * 1000.0 / h.millis_between(moving, 3, 2),
        )
    }

    /// Convenience form for a `(steady, moving)` tuple.
    pub fn relative_speed_for(&self, pair: (JointId, JointId)) -> f64 {
        self.relative_speed(pair.0, pair.1)
    }

    /// Displacement vector `steady − moving` at recency index `n`.
    ///
    /// A missing sample at `n` yields the zero vector (coincident points),
    /// biasing that two-point estimate toward zero rather than failing.
    fn displacement_at(&self, steady: JointId, moving: JointId, n: usize) -> Point3 {
        match (
            self.history.nth_most_recent(steady, n),
            self.history.nth_most_recent(moving, n),
        ) {
            (Some(s), Some(m)) => s.position.sub(&m.position),
            _ => Point3::default(),
        }
    }
}

/// Euclidean distance between two displacement vectors.
///
/// Takes per-axis absolute differences before squaring — redundant under
/// squaring, but harmless.
fn distance_between(a: &Point3, b: &Point3) -> f64 {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    let dz = (b.z - a.z).abs();
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Median of three by pairwise comparison; ties fall through to `d3`.
fn median3(d1: f64, d2: f64, d3: f64) -> f64 {
    if (d1 > d2 && d1 < d3) || (d1 < d2 && d1 > d3) {
        return d1;
    }
    if (d2 > d1 && d2 < d3) || (d2 < d1 && d2 > d3) {
        return d2;
    }
    d3
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
