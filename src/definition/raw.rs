//! Declarative exercise file schema
//!
//! Mirrors the on-disk YAML/JSON layout one-to-one. Everything is optional at
//! this level; [`ExerciseDefinition::from_raw`](super::ExerciseDefinition::from_raw)
//! applies defaults and rejects what cannot be used.

use crate::types::{ExerciseKind, JointId};
use serde::{Deserialize, Serialize};

/// Default extension threshold (degrees)
pub const DEFAULT_START_THRESHOLD: f64 = 160.0;
/// Default flexion threshold for DOWN (degrees)
pub const DEFAULT_DOWN_THRESHOLD: f64 = 90.0;
/// Default flexion threshold for UP (degrees)
pub const DEFAULT_UP_THRESHOLD: f64 = 50.0;
/// Default feedback threshold (degrees)
pub const DEFAULT_FEEDBACK_THRESHOLD: f64 = 100.0;
/// Default ideal band lower bound (degrees)
pub const DEFAULT_PERFECT_RANGE_MIN: f64 = 70.0;
/// Default ideal band upper bound (degrees)
pub const DEFAULT_PERFECT_RANGE_MAX: f64 = 90.0;

/// Exercise file as written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExerciseDefinition {
    /// Display name; also drives kind inference when `kind` is absent
    #[serde(default)]
    pub name: Option<String>,
    /// Explicit exercise kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ExerciseKind>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Joints whose angle is tracked
    #[serde(default)]
    pub landmarks: Option<RawLandmarks>,
    /// Angle thresholds and ideal range
    #[serde(default)]
    pub parameters: RawParameters,
    /// Ordered feedback rules
    #[serde(default)]
    pub feedback: Vec<RawFeedbackRule>,
}

/// Joint ids keyed by body part.
///
/// Exactly one family is expected: hip/knee/ankle, shoulder/elbow/wrist, or
/// the anatomical-neutral proximal/vertex/distal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLandmarks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hip: Option<JointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knee: Option<JointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ankle: Option<JointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoulder: Option<JointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elbow: Option<JointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrist: Option<JointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximal: Option<JointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex: Option<JointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distal: Option<JointId>,
}

/// Numeric parameters, all in degrees
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_threshold_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_threshold_down: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_threshold_up: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfect_range_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfect_range_max: Option<f64>,
}

/// One feedback rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFeedbackRule {
    /// Condition expression, e.g. `angle < 60 and state == "DOWN"`
    pub condition: String,
    /// Text shown on screen
    pub message: String,
    /// Text spoken aloud; the message is spoken when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl RawExerciseDefinition {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_with_integer_thresholds() {
        let raw = RawExerciseDefinition::from_yaml(
            r#"
name: Squat
landmarks:
  hip: 23
  knee: 25
  ankle: 27
parameters:
  angle_threshold_start: 160
  angle_threshold_down: 90.5
feedback:
  - condition: "angle < 60"
    message: "Too deep!"
"#,
        )
        .unwrap();

        assert_eq!(raw.name.as_deref(), Some("Squat"));
        assert_eq!(raw.landmarks.as_ref().unwrap().knee, Some(25));
        assert_eq!(raw.parameters.angle_threshold_start, Some(160.0));
        assert_eq!(raw.parameters.angle_threshold_down, Some(90.5));
        assert_eq!(raw.parameters.angle_threshold_up, None);
        assert_eq!(raw.feedback.len(), 1);
        assert!(raw.feedback[0].voice.is_none());
    }

    #[test]
    fn test_parse_json_with_kind() {
        let raw = RawExerciseDefinition::from_json(
            r#"{"name": "Press", "kind": "push_up", "landmarks": {"proximal": 1, "vertex": 2, "distal": 3}}"#,
        )
        .unwrap();

        assert_eq!(raw.kind, Some(ExerciseKind::PushUp));
        assert_eq!(raw.landmarks.unwrap().vertex, Some(2));
        assert!(raw.feedback.is_empty());
    }
}
