//! Form scoring
//!
//! Maps (exercise kind, phase, joint angle) to an integer score in 0-100.
//! Each kind judges form only in its critical phase, using a descending set
//! of inclusive angle bands around the ideal; every other phase gets a fixed
//! high score.

use crate::types::{ExerciseKind, Phase};

/// Minimum score for a completed repetition to be counted
pub const PERFECT_FORM_THRESHOLD: u8 = 85;

/// Below this the form is called poor rather than merely imperfect
pub const POOR_FORM_THRESHOLD: u8 = 60;

/// Score outside the critical phase
pub const TRANSITION_PHASE_SCORE: u8 = 95;

/// Score for kinds without a band table
pub const DEFAULT_FORM_SCORE: u8 = 80;

/// Score an engine reports right after a reset
pub const RESET_FORM_SCORE: u8 = 100;

/// Inclusive angle band mapped to a fixed score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBand {
    pub min: f64,
    pub max: f64,
    pub score: u8,
}

impl ScoreBand {
    const fn new(min: f64, max: f64, score: u8) -> Self {
        Self { min, max, score }
    }

    fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }
}

/// Band table for one exercise kind, narrowest band first
#[derive(Debug, Clone, Copy)]
pub struct ScoringProfile {
    pub critical_phase: Phase,
    pub bands: &'static [ScoreBand],
    /// Score when the angle falls outside every band
    pub floor: u8,
}

impl ScoringProfile {
    fn score(&self, phase: Phase, angle: f64) -> u8 {
        if phase != self.critical_phase {
            return TRANSITION_PHASE_SCORE;
        }

        self.bands
            .iter()
            .find(|band| band.contains(angle))
            .map_or(self.floor, |band| band.score)
    }
}

const SQUAT_PROFILE: ScoringProfile = ScoringProfile {
    critical_phase: Phase::Down,
    bands: &[
        ScoreBand::new(70.0, 90.0, 100),
        ScoreBand::new(65.0, 95.0, 90),
        ScoreBand::new(60.0, 100.0, 75),
        ScoreBand::new(50.0, 110.0, 60),
    ],
    floor: 40,
};

const PUSH_UP_PROFILE: ScoringProfile = ScoringProfile {
    critical_phase: Phase::Down,
    bands: &[
        ScoreBand::new(60.0, 90.0, 100),
        ScoreBand::new(55.0, 95.0, 90),
        ScoreBand::new(50.0, 100.0, 75),
    ],
    floor: 60,
};

const BICEP_CURL_PROFILE: ScoringProfile = ScoringProfile {
    critical_phase: Phase::Up,
    bands: &[
        ScoreBand::new(30.0, 50.0, 100),
        ScoreBand::new(25.0, 55.0, 90),
        ScoreBand::new(20.0, 60.0, 75),
    ],
    floor: 60,
};

impl ExerciseKind {
    /// Band table for this kind, if it has one
    pub fn scoring_profile(&self) -> Option<&'static ScoringProfile> {
        match self {
            ExerciseKind::Squat => Some(&SQUAT_PROFILE),
            ExerciseKind::PushUp => Some(&PUSH_UP_PROFILE),
            ExerciseKind::BicepCurl => Some(&BICEP_CURL_PROFILE),
            ExerciseKind::Generic => None,
        }
    }
}

/// Form scorer
pub struct FormScorer;

impl FormScorer {
    /// Score the joint angle for the given kind and phase
    pub fn score(kind: ExerciseKind, phase: Phase, angle: f64) -> u8 {
        match kind.scoring_profile() {
            Some(profile) => profile.score(phase, angle),
            None => DEFAULT_FORM_SCORE,
        }
    }

    /// Whether a repetition with this score counts
    pub fn passes_gate(score: u8) -> bool {
        score >= PERFECT_FORM_THRESHOLD
    }
}
