//! Core types for the Rep Flux engine
//!
//! This module defines the data that flows through one engine call: the
//! landmark frame coming from a pose detector, the repetition phase, the
//! per-exercise thresholds, and the result handed back to the UI/voice layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Joint identifier in the pose detector's vocabulary
pub type JointId = u32;

/// MediaPipe pose landmark ids used by the built-in exercises
pub mod joints {
    use super::JointId;

    pub const LEFT_SHOULDER: JointId = 11;
    pub const RIGHT_SHOULDER: JointId = 12;
    pub const LEFT_ELBOW: JointId = 13;
    pub const RIGHT_ELBOW: JointId = 14;
    pub const LEFT_WRIST: JointId = 15;
    pub const RIGHT_WRIST: JointId = 16;
    pub const LEFT_HIP: JointId = 23;
    pub const RIGHT_HIP: JointId = 24;
    pub const LEFT_KNEE: JointId = 25;
    pub const RIGHT_KNEE: JointId = 26;
    pub const LEFT_ANKLE: JointId = 27;
    pub const RIGHT_ANKLE: JointId = 28;
}

/// 2D point in pixel or normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A single detected joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: JointId,
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(id: JointId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// All joints detected in one video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture time, if the producer supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Detected joints (order is not significant)
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp: None,
            landmarks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Look up a joint's position. When a joint id repeats, the last one wins.
    pub fn point(&self, id: JointId) -> Option<Point> {
        self.landmarks
            .iter()
            .rev()
            .find(|landmark| landmark.id == id)
            .map(Landmark::point)
    }
}

/// Stage of a repetition cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    #[default]
    Start,
    Down,
    Up,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Start => "START",
            Phase::Down => "DOWN",
            Phase::Up => "UP",
        }
    }

    /// Case-insensitive parse of `START`, `DOWN` or `UP`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "START" => Some(Phase::Start),
            "DOWN" => Some(Phase::Down),
            "UP" => Some(Phase::Up),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which way round a repetition runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepPattern {
    /// START -> DOWN -> UP; the joint flexes first (squat, push-up)
    FlexionFirst,
    /// START -> UP -> DOWN; the joint flexes into UP (bicep curl)
    ExtensionFirst,
}

/// Closed set of exercise kinds, selected once when a definition loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Squat,
    PushUp,
    BicepCurl,
    /// Any other movement: flexion-first counting with a fixed form score
    Generic,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::PushUp => "push_up",
            ExerciseKind::BicepCurl => "bicep_curl",
            ExerciseKind::Generic => "generic",
        }
    }

    /// Infer the kind from a free-form exercise name
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("squat") {
            ExerciseKind::Squat
        } else if lower.contains("push") {
            ExerciseKind::PushUp
        } else if lower.contains("bicep") {
            ExerciseKind::BicepCurl
        } else {
            ExerciseKind::Generic
        }
    }

    pub fn rep_pattern(&self) -> RepPattern {
        match self {
            ExerciseKind::BicepCurl => RepPattern::ExtensionFirst,
            ExerciseKind::Squat | ExerciseKind::PushUp | ExerciseKind::Generic => {
                RepPattern::FlexionFirst
            }
        }
    }

    /// Phase in which form is actually judged
    pub fn critical_phase(&self) -> Phase {
        match self.rep_pattern() {
            RepPattern::FlexionFirst => Phase::Down,
            RepPattern::ExtensionFirst => Phase::Up,
        }
    }
}

/// Named joint-angle thresholds in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Extension beyond this completes (or resets) a repetition
    pub start: f64,
    /// Flexion below this enters DOWN (flexion-first kinds)
    pub down: f64,
    /// Flexion below this enters UP (extension-first kinds)
    pub up: f64,
    /// Carried from the definition for consumers; the engine does not gate on it
    pub feedback: f64,
}

/// Ideal joint-angle band in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerfectRange {
    pub min: f64,
    pub max: f64,
}

impl PerfectRange {
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }
}

/// The three joints whose angle is measured, vertex in the middle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkTriple {
    pub proximal: JointId,
    pub vertex: JointId,
    pub distal: JointId,
}

/// How a frame was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    /// Angle computed and state machine advanced
    Tracked,
    /// The frame held no landmarks at all
    NoPose,
    /// At least one of the three configured joints was absent
    MissingLandmarks,
    /// Coordinates were unusable for angle computation
    AngleError,
}

impl FrameStatus {
    pub fn is_tracked(&self) -> bool {
        matches!(self, FrameStatus::Tracked)
    }
}

/// Outcome of a detected repetition boundary.
///
/// The announcement is a priority utterance for the voice layer, unlike the
/// per-frame voice message which the voice layer may rate-limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepEvent {
    /// Passed the perfect-form gate and was added to the count
    Counted {
        rep_count: u32,
        form_score: u8,
        announcement: String,
    },
    /// Completed but discarded by the perfect-form gate
    Rejected { form_score: u8, announcement: String },
}

/// Everything one `process` call reports back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub rep_count: u32,
    pub phase: Phase,
    pub feedback: String,
    pub voice_message: String,
    pub form_score: u8,
    pub status: FrameStatus,
    /// Measured joint angle, when one could be computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_event: Option<RepEvent>,
}

impl FrameResult {
    /// `(rep_count, phase, feedback, voice_message, form_score)`
    pub fn as_tuple(&self) -> (u32, Phase, &str, &str, u8) {
        (
            self.rep_count,
            self.phase,
            &self.feedback,
            &self.voice_message,
            self.form_score,
        )
    }
}
