//! Session configuration: which joint pairs drive which voices.
//!
//! Defined at startup, read-only thereafter.

use joint_stream::JointId;

use crate::beat::BeatConfig;

// ════════════════════════════════════════════════════════════════════════════
// JointPairConfig
// ════════════════════════════════════════════════════════════════════════════

/// One (steady, moving) joint pair and the two voices it drives.
#[derive(Clone, Debug)]
pub struct JointPairConfig {
    /// The reference-frame joint.
    pub steady: JointId,
    /// The joint whose motion is measured.
    pub moving: JointId,
    /// Voice name for sustained slow notes.
    pub slow_voice: String,
    /// Voice name for percussive fast notes.
    pub fast_voice: String,
    /// Whether slow sustained notes are allowed for this pair (arms yes,
    /// legs no).
    pub sustained_eligible: bool,
}

impl JointPairConfig {
    pub fn new(
        steady: JointId,
        moving: JointId,
        slow_voice: &str,
        fast_voice: &str,
        sustained_eligible: bool,
    ) -> Self {
        JointPairConfig {
            steady,
            moving,
            slow_voice: slow_voice.to_string(),
            fast_voice: fast_voice.to_string(),
            sustained_eligible,
        }
    }
}

/// The stock mapping: both shoulder→hand pairs (sustained-eligible) and
/// both hip→knee pairs (fast-only), voices `instr0`..`instr7`.
pub fn default_pairs() -> Vec<JointPairConfig> {
    vec![
        JointPairConfig::new(
            JointId::ShoulderLeft,
            JointId::HandLeft,
            "instr0",
            "instr1",
            true,
        ),
        JointPairConfig::new(
            JointId::ShoulderRight,
            JointId::HandRight,
            "instr2",
            "instr3",
            true,
        ),
        JointPairConfig::new(
            JointId::HipLeft,
            JointId::KneeLeft,
            "instr4",
            "instr5",
            false,
        ),
        JointPairConfig::new(
            JointId::HipRight,
            JointId::KneeRight,
            "instr6",
            "instr7",
            false,
        ),
    ]
}

// ════════════════════════════════════════════════════════════════════════════
// SessionConfig
// ════════════════════════════════════════════════════════════════════════════

/// Full configuration for one tracking session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Samples retained per joint.
    pub history_capacity: usize,
    pub pairs: Vec<JointPairConfig>,
    pub beat: BeatConfig,
    /// Voice name of the metronome/count-in instrument.
    pub beat_voice: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            history_capacity: joint_stream::history::DEFAULT_CAPACITY,
            pairs: default_pairs(),
            beat: BeatConfig::default(),
            beat_voice: "beat0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pairs_are_arms_then_legs() {
        let pairs = default_pairs();
        assert_eq!(pairs.len(), 4);
        assert!(pairs[0].sustained_eligible);
        assert!(pairs[1].sustained_eligible);
        assert!(!pairs[2].sustained_eligible);
        assert!(!pairs[3].sustained_eligible);
        // Voice names are distinct.
        let mut names: Vec<_> = pairs
            .iter()
            .flat_map(|p| [p.slow_voice.clone(), p.fast_voice.clone()])
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
    }
}
