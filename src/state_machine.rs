//! Repetition state machine
//!
//! Advances the repetition phase from one joint angle per frame and reports
//! when a repetition boundary is crossed. At most one boundary per call.

use crate::types::{Phase, RepPattern, Thresholds};

/// Result of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub phase: Phase,
    pub rep_completed: bool,
}

impl Transition {
    fn to(phase: Phase) -> Self {
        Self {
            phase,
            rep_completed: false,
        }
    }

    fn complete(phase: Phase) -> Self {
        Self {
            phase,
            rep_completed: true,
        }
    }
}

/// Phase transition function
pub struct RepStateMachine;

impl RepStateMachine {
    /// Compute the next phase for `angle` given the current `phase`
    pub fn step(
        pattern: RepPattern,
        thresholds: &Thresholds,
        phase: Phase,
        angle: f64,
    ) -> Transition {
        // The flexed phase a repetition must pass through, the phase a
        // completed repetition lands in, and the angle that enters the former.
        let (flexed, finished, entry_threshold) = match pattern {
            RepPattern::FlexionFirst => (Phase::Down, Phase::Up, thresholds.down),
            RepPattern::ExtensionFirst => (Phase::Up, Phase::Down, thresholds.up),
        };

        if angle > thresholds.start {
            if phase == flexed {
                Transition::complete(finished)
            } else {
                Transition::to(Phase::Start)
            }
        } else if angle < entry_threshold {
            Transition::to(flexed)
        } else {
            Transition::to(phase)
        }
    }
}
