//! Bounded per-joint sample history.
//!
//! One [`JointHistory`] lives per tracking session.  The frame-ingestion step
//! appends one sample per tracked joint per frame; everything else only
//! reads.  Each joint keeps at most `capacity` samples — the oldest falls
//! off the front when a new one arrives.

use std::collections::{HashMap, VecDeque};

use crate::sample::{JointId, TimedSample};

/// Default number of samples retained per joint.
pub const DEFAULT_CAPACITY: usize = 5;

// ════════════════════════════════════════════════════════════════════════════
// JointHistory
// ════════════════════════════════════════════════════════════════════════════

/// Bounded FIFO of [`TimedSample`]s per joint.
///
/// Recency indices count backwards from the newest sample: `n = 0` is the
/// most recent, `n = 1` the one before it, and so on.
#[derive(Debug)]
pub struct JointHistory {
    samples: HashMap<JointId, VecDeque<TimedSample>>,
    capacity: usize,
}

impl Default for JointHistory {
    fn default() -> Self {
        JointHistory::new(DEFAULT_CAPACITY)
    }
}

impl JointHistory {
    pub fn new(capacity: usize) -> Self {
        JointHistory {
            samples: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample for `joint`, evicting the oldest first if the joint
    /// is already at capacity.  Never fails on a full buffer.
    pub fn append(&mut self, joint: JointId, sample: TimedSample) {
        let queue = self.samples.entry(joint).or_default();
        while queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(sample);
    }

    /// True iff `joint` has been observed and `n` is a valid recency index
    /// for it.  Unknown joints answer `false`, never panic.
    pub fn exists_at(&self, joint: JointId, n: usize) -> bool {
        self.samples
            .get(&joint)
            .map(|q| n < q.len())
            .unwrap_or(false)
    }

    /// The sample `n` steps back from the most recent, or `None` when the
    /// joint is unknown or `n` is out of range.
    pub fn nth_most_recent(&self, joint: JointId, n: usize) -> Option<&TimedSample> {
        let queue = self.samples.get(&joint)?;
        let len = queue.len();
        if n >= len {
            return None;
        }
        queue.get(len - n - 1)
    }

    /// `timestamp(n_second) − timestamp(n_first)`, in milliseconds.
    ///
    /// Precondition: both indices exist for `joint` — callers validate with
    /// [`exists_at`](Self::exists_at) first.  Panics on violation rather
    /// than silently clamping.
    pub fn millis_between(&self, joint: JointId, n_first: usize, n_second: usize) -> f64 {
        let first = self
            .nth_most_recent(joint, n_first)
            .expect("millis_between: n_first out of range");
        let second = self
            .nth_most_recent(joint, n_second)
            .expect("millis_between: n_second out of range");
        second.timestamp_ms - first.timestamp_ms
    }

    /// Number of samples currently retained for `joint`.
    pub fn len(&self, joint: JointId) -> usize {
        self.samples.get(&joint).map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, joint: JointId) -> bool {
        self.len(joint) == 0
    }

    /// Retention limit per joint.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all recorded samples (session reset).
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
