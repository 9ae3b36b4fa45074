//! Feedback generation
//!
//! Turns the current angle, phase and form score into a display line and a
//! spoken line. Rules are tried in priority order and the first that applies
//! wins:
//!
//! 1. form below the perfect-form gate
//! 2. the exercise's own feedback rules, in file order
//! 3. praise for good form
//! 4. a phase default

use crate::definition::FeedbackRule;
use crate::scoring::{PERFECT_FORM_THRESHOLD, POOR_FORM_THRESHOLD};
use crate::types::Phase;
use serde::{Deserialize, Serialize};

/// Score at or above which form is called perfect
pub const PERFECT_PRAISE_THRESHOLD: u8 = 95;

/// Display text plus voice text; an empty voice line means stay silent
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Feedback {
    pub display: String,
    pub voice: String,
}

impl Feedback {
    fn new(display: &str, voice: &str) -> Self {
        Self {
            display: display.to_string(),
            voice: voice.to_string(),
        }
    }
}

/// Feedback generator
pub struct FeedbackGenerator;

impl FeedbackGenerator {
    /// Pick the feedback for one frame
    pub fn generate(rules: &[FeedbackRule], angle: f64, phase: Phase, form_score: u8) -> Feedback {
        if form_score < PERFECT_FORM_THRESHOLD {
            return if form_score < POOR_FORM_THRESHOLD {
                Feedback::new(
                    "Poor Form!",
                    "Focus on your form! Slow down and control the movement!",
                )
            } else {
                Feedback::new(
                    "Improve Form",
                    "Almost there! Adjust your form slightly for perfect reps!",
                )
            };
        }

        if let Some(rule) = rules.iter().find(|rule| rule.matches(angle, phase)) {
            return Feedback::new(&rule.message, &rule.voice);
        }

        if form_score >= PERFECT_PRAISE_THRESHOLD {
            return Feedback::new("Perfect Form!", "Excellent technique! Keep it up!");
        }
        if form_score >= PERFECT_FORM_THRESHOLD {
            return Feedback::new("Good Form", "Great form! This rep will count!");
        }

        // Only reachable if the gate and the praise thresholds drift apart
        match phase {
            Phase::Start => Feedback::new("Ready", "Ready for next rep"),
            Phase::Down => Feedback::new("Good depth!", ""),
            Phase::Up => Feedback::new("Great rep!", ""),
        }
    }
}
