//! Exercise engine
//!
//! The per-frame orchestrator. One [`ExerciseEngine`] owns the mutable state
//! of one exercise session (phase, repetition count, last feedback) and
//! shares its [`ExerciseDefinition`] read-only.
//!
//! Per-frame stages:
//! 1. Locate the three configured joints
//! 2. Compute the joint angle
//! 3. Score form against the current (pre-transition) phase
//! 4. Step the repetition state machine
//! 5. Apply the perfect-form gate on a repetition boundary
//! 6. Generate feedback against the new (post-transition) phase
//!
//! Frames without a usable pose never touch the state.

use crate::angle::checked_joint_angle;
use crate::announcer;
use crate::definition::{builtin, ExerciseDefinition};
use crate::error::EngineError;
use crate::feedback::FeedbackGenerator;
use crate::scoring::{FormScorer, RESET_FORM_SCORE};
use crate::state_machine::RepStateMachine;
use crate::types::{FrameResult, FrameStatus, LandmarkFrame, Phase, RepEvent};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

const NO_POSE_FEEDBACK: &str = "No pose detected";
const MISSING_LANDMARKS_FEEDBACK: &str = "Required landmarks not detected";
const ANGLE_ERROR_FEEDBACK: &str = "Error calculating angle";

/// Deepest point of the current repetition
#[derive(Debug, Clone, Copy, PartialEq)]
struct RepDepth {
    angle: f64,
    form_score: u8,
}

/// Stateful repetition counter for a single exercise
#[derive(Debug, Clone)]
pub struct ExerciseEngine {
    definition: Arc<ExerciseDefinition>,
    phase: Phase,
    rep_count: u32,
    form_score: u8,
    feedback: String,
    voice_message: String,
    rep_depth: Option<RepDepth>,
}

impl ExerciseEngine {
    /// Create an engine in the START phase with a zero count
    pub fn new(definition: Arc<ExerciseDefinition>) -> Self {
        Self {
            definition,
            phase: Phase::Start,
            rep_count: 0,
            form_score: RESET_FORM_SCORE,
            feedback: String::new(),
            voice_message: String::new(),
            rep_depth: None,
        }
    }

    /// Create an engine for a built-in exercise (`squat`, `pushup`, `bicep_curl`)
    pub fn builtin(key: &str) -> Result<Self, EngineError> {
        Ok(Self::new(Arc::new(builtin(key)?)))
    }

    /// Create an engine from a YAML or JSON definition file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Ok(Self::new(Arc::new(ExerciseDefinition::from_file(path)?)))
    }

    /// Announcement to speak when this exercise begins
    pub fn start_announcement(&self) -> String {
        announcer::exercise_started(self.definition.name())
    }

    /// Process one landmark frame
    pub fn process(&mut self, frame: &LandmarkFrame) -> FrameResult {
        if frame.is_empty() {
            return self.untracked(FrameStatus::NoPose, NO_POSE_FEEDBACK);
        }

        let joints = self.definition.landmarks();
        let (Some(proximal), Some(vertex), Some(distal)) = (
            frame.point(joints.proximal),
            frame.point(joints.vertex),
            frame.point(joints.distal),
        ) else {
            return self.untracked(FrameStatus::MissingLandmarks, MISSING_LANDMARKS_FEEDBACK);
        };

        let Some(angle) = checked_joint_angle(proximal, vertex, distal) else {
            return self.untracked(FrameStatus::AngleError, ANGLE_ERROR_FEEDBACK);
        };

        self.advance(angle)
    }

    /// Parse a JSON landmark frame and process it
    pub fn process_json(&mut self, frame_json: &str) -> Result<FrameResult, EngineError> {
        let frame: LandmarkFrame = serde_json::from_str(frame_json)
            .map_err(|e| EngineError::InvalidFrame(e.to_string()))?;
        Ok(self.process(&frame))
    }

    /// Zero the counter and return to START. The definition is kept.
    pub fn reset(&mut self) {
        self.rep_count = 0;
        self.phase = Phase::Start;
        self.feedback.clear();
        self.voice_message.clear();
        self.form_score = RESET_FORM_SCORE;
        self.rep_depth = None;
        info!("{}: counter reset", self.definition.name());
    }

    pub fn definition(&self) -> &Arc<ExerciseDefinition> {
        &self.definition
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    /// Score from the last tracked frame, or 100 after a reset
    pub fn form_score(&self) -> u8 {
        self.form_score
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn voice_message(&self) -> &str {
        &self.voice_message
    }

    fn advance(&mut self, angle: f64) -> FrameResult {
        let kind = self.definition.kind();
        let critical = kind.critical_phase();

        let form_score = FormScorer::score(kind, self.phase, angle);
        let transition =
            RepStateMachine::step(kind.rep_pattern(), self.definition.thresholds(), self.phase, angle);

        if transition.phase != self.phase {
            debug!(
                "{}: {} -> {} at {:.1} deg",
                self.definition.name(),
                self.phase,
                transition.phase,
                angle
            );
        }

        let rep_event = if transition.rep_completed {
            let depth = self.rep_depth.take();
            let rep_score = depth.map_or(form_score, |d| d.form_score);
            Some(self.complete_rep(rep_score))
        } else {
            if transition.phase == critical {
                self.track_depth(critical, angle);
            } else if transition.phase == Phase::Start {
                self.rep_depth = None;
            }
            None
        };

        self.phase = transition.phase;

        let feedback = FeedbackGenerator::generate(
            self.definition.feedback_rules(),
            angle,
            self.phase,
            form_score,
        );
        self.form_score = form_score;
        self.feedback = feedback.display;
        self.voice_message = feedback.voice;

        FrameResult {
            rep_count: self.rep_count,
            phase: self.phase,
            feedback: self.feedback.clone(),
            voice_message: self.voice_message.clone(),
            form_score,
            status: FrameStatus::Tracked,
            angle: Some(angle),
            rep_event,
        }
    }

    /// Keep the most flexed angle seen in the critical phase, scored against it
    fn track_depth(&mut self, critical: Phase, angle: f64) {
        let entering = self.phase != critical;
        let deeper = self.rep_depth.map_or(true, |d| angle < d.angle);
        if entering || deeper {
            self.rep_depth = Some(RepDepth {
                angle,
                form_score: FormScorer::score(self.definition.kind(), critical, angle),
            });
        }
    }

    fn complete_rep(&mut self, rep_score: u8) -> RepEvent {
        let name = self.definition.name();
        if FormScorer::passes_gate(rep_score) {
            self.rep_count += 1;
            info!("{name}: rep {} counted (form {rep_score})", self.rep_count);
            RepEvent::Counted {
                rep_count: self.rep_count,
                form_score: rep_score,
                announcement: announcer::rep_counted(self.rep_count, name),
            }
        } else {
            info!("{name}: rep rejected (form {rep_score})");
            RepEvent::Rejected {
                form_score: rep_score,
                announcement: announcer::rep_rejected(rep_score),
            }
        }
    }

    fn untracked(&self, status: FrameStatus, feedback: &str) -> FrameResult {
        FrameResult {
            rep_count: self.rep_count,
            phase: self.phase,
            feedback: feedback.to_string(),
            voice_message: String::new(),
            form_score: 0,
            status,
            angle: None,
            rep_event: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{joints, Landmark};
    use pretty_assertions::assert_eq;

    /// Three joints forming `degrees` at the vertex
    fn make_frame(ids: (u32, u32, u32), degrees: f64) -> LandmarkFrame {
        let rad = degrees.to_radians();
        LandmarkFrame::new(vec![
            Landmark::new(ids.0, 1.0, 0.0),
            Landmark::new(ids.1, 0.0, 0.0),
            Landmark::new(ids.2, rad.cos(), rad.sin()),
        ])
    }

    fn leg(degrees: f64) -> LandmarkFrame {
        make_frame((joints::LEFT_HIP, joints::LEFT_KNEE, joints::LEFT_ANKLE), degrees)
    }

    fn arm(degrees: f64) -> LandmarkFrame {
        make_frame(
            (joints::LEFT_SHOULDER, joints::LEFT_ELBOW, joints::LEFT_WRIST),
            degrees,
        )
    }

    fn squat() -> ExerciseEngine {
        ExerciseEngine::builtin("squat").unwrap()
    }

    #[test]
    fn test_new_engine_state() {
        let engine = squat();
        assert_eq!(engine.phase(), Phase::Start);
        assert_eq!(engine.rep_count(), 0);
        assert_eq!(engine.form_score(), 100);
        assert!(engine.feedback().is_empty());
    }

    #[test]
    fn test_squat_rep_counted() {
        let mut engine = squat();

        let first = engine.process(&leg(80.0));
        assert_eq!(first.phase, Phase::Down);
        // Scored against START, the phase the frame arrived in
        assert_eq!(first.form_score, 95);

        let held = engine.process(&leg(75.0));
        assert_eq!(held.phase, Phase::Down);
        assert_eq!(held.form_score, 100);

        let top = engine.process(&leg(170.0));
        assert_eq!(top.phase, Phase::Up);
        assert_eq!(top.rep_count, 1);
        assert_eq!(
            top.rep_event,
            Some(RepEvent::Counted {
                rep_count: 1,
                form_score: 100,
                announcement: "Perfect Squat! One quality rep!".to_string(),
            })
        );
    }

    #[test]
    fn test_too_deep_squat_rejected() {
        let mut engine = squat();
        engine.process(&leg(80.0));
        engine.process(&leg(40.0));
        let top = engine.process(&leg(170.0));

        assert_eq!(top.rep_count, 0);
        assert_eq!(top.phase, Phase::Up);
        assert_eq!(
            top.rep_event,
            Some(RepEvent::Rejected {
                form_score: 40,
                announcement: "Rep not counted! Focus on proper form!".to_string(),
            })
        );
    }

    #[test]
    fn test_depth_sample_restarts_each_rep() {
        let mut engine = squat();
        engine.process(&leg(40.0));
        engine.process(&leg(170.0));
        assert_eq!(engine.rep_count(), 0);

        engine.process(&leg(80.0));
        let top = engine.process(&leg(170.0));
        assert_eq!(top.rep_count, 1);
    }

    #[test]
    fn test_bicep_curl_rep() {
        let mut engine = ExerciseEngine::builtin("bicep_curl").unwrap();

        let up = engine.process(&arm(40.0));
        assert_eq!(up.phase, Phase::Up);
        let held = engine.process(&arm(40.0));
        assert_eq!(held.form_score, 100);

        let down = engine.process(&arm(170.0));
        assert_eq!(down.phase, Phase::Down);
        assert_eq!(down.rep_count, 1);
    }

    #[test]
    fn test_untracked_frames_leave_state_alone() {
        let mut engine = squat();
        engine.process(&leg(80.0));
        let before = (engine.phase(), engine.rep_count(), engine.feedback().to_string());

        let empty = engine.process(&LandmarkFrame::default());
        assert_eq!(empty.status, FrameStatus::NoPose);
        assert_eq!(empty.as_tuple(), (0, Phase::Down, "No pose detected", "", 0));

        let mut partial = leg(170.0);
        partial.landmarks.pop();
        let missing = engine.process(&partial);
        assert_eq!(missing.status, FrameStatus::MissingLandmarks);
        assert_eq!(missing.feedback, "Required landmarks not detected");
        assert_eq!(missing.form_score, 0);

        let mut broken = leg(170.0);
        broken.landmarks[0].x = f64::NAN;
        let nan = engine.process(&broken);
        assert_eq!(nan.status, FrameStatus::AngleError);
        assert_eq!(nan.feedback, "Error calculating angle");

        let after = (engine.phase(), engine.rep_count(), engine.feedback().to_string());
        assert_eq!(before, after);
    }

    #[test]
    fn test_collapsed_segment_does_not_spoil_rep() {
        let mut engine = squat();
        engine.process(&leg(80.0));
        engine.process(&leg(75.0));

        // Hip reported on top of the knee
        let mut collapsed = leg(75.0);
        collapsed.landmarks[0].x = 0.0;
        collapsed.landmarks[0].y = 0.0;
        let glitch = engine.process(&collapsed);
        assert_eq!(glitch.status, FrameStatus::AngleError);
        assert_eq!(glitch.as_tuple(), (0, Phase::Down, "Error calculating angle", "", 0));
        assert_eq!(glitch.angle, None);

        let top = engine.process(&leg(170.0));
        assert_eq!(top.rep_count, 1);
        assert_eq!(
            top.rep_event,
            Some(RepEvent::Counted {
                rep_count: 1,
                form_score: 100,
                announcement: "Perfect Squat! One quality rep!".to_string(),
            })
        );
    }

    #[test]
    fn test_collapsed_segment_from_start_stays_in_start() {
        let mut engine = squat();
        let mut collapsed = leg(170.0);
        collapsed.landmarks[2] = Landmark::new(joints::LEFT_ANKLE, 0.0, 0.0);

        let result = engine.process(&collapsed);
        assert_eq!(result.status, FrameStatus::AngleError);
        assert_eq!(engine.phase(), Phase::Start);
    }

    #[test]
    fn test_reset() {
        let mut engine = squat();
        engine.process(&leg(80.0));
        engine.process(&leg(170.0));
        engine.process(&leg(80.0));
        assert_eq!(engine.rep_count(), 1);

        engine.reset();
        assert_eq!(engine.rep_count(), 0);
        assert_eq!(engine.phase(), Phase::Start);
        assert_eq!(engine.form_score(), 100);
        assert!(engine.feedback().is_empty());
        assert!(engine.voice_message().is_empty());

        // The pre-reset depth does not carry over
        let top = engine.process(&leg(170.0));
        assert_eq!(top.rep_event, None);
    }

    #[test]
    fn test_process_json() {
        let mut engine = squat();
        let result = engine
            .process_json(r#"{"landmarks": [{"id": 23, "x": 0.0, "y": 0.0}]}"#)
            .unwrap();
        assert_eq!(result.status, FrameStatus::MissingLandmarks);

        let err = engine.process_json("{not json").unwrap_err();
        assert!(matches!(err, EngineError::InvalidFrame(_)));
    }

    #[test]
    fn test_start_announcement() {
        let engine = ExerciseEngine::builtin("pushup").unwrap();
        assert_eq!(
            engine.start_announcement(),
            format!("Starting {}. Get into position!", engine.definition().name())
        );
    }
}
