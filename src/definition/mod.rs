//! Exercise definitions
//!
//! An [`ExerciseDefinition`] is the immutable description of one exercise:
//! which joints to measure, the angle thresholds that drive the repetition
//! state machine, and the ordered feedback rules. Definitions are loaded and
//! validated once, then shared read-only between engines.

mod catalog;
mod condition;
mod raw;

pub use catalog::*;
pub use condition::*;
pub use raw::*;

use crate::error::EngineError;
use crate::types::{ExerciseKind, LandmarkTriple, PerfectRange, Phase, Thresholds};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A feedback rule ready for evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRule {
    pub condition: Condition,
    pub message: String,
    pub voice: String,
}

impl FeedbackRule {
    pub fn matches(&self, angle: f64, phase: Phase) -> bool {
        self.condition.matches(angle, phase)
    }
}

/// Validated, immutable exercise definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseDefinition {
    name: String,
    kind: ExerciseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    landmarks: LandmarkTriple,
    thresholds: Thresholds,
    perfect_range: PerfectRange,
    feedback_rules: Vec<FeedbackRule>,
}

impl ExerciseDefinition {
    /// Load a definition file; `.json` files are read as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Parse and validate a YAML definition
    pub fn from_yaml_str(yaml: &str) -> Result<Self, EngineError> {
        Self::from_raw(RawExerciseDefinition::from_yaml(yaml)?)
    }

    /// Parse and validate a JSON definition
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        Self::from_raw(RawExerciseDefinition::from_json(json)?)
    }

    /// Validate a raw definition, applying defaults for missing parameters
    pub fn from_raw(raw: RawExerciseDefinition) -> Result<Self, EngineError> {
        let name = raw
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| EngineError::MissingField("name".to_string()))?;

        let kind = raw.kind.unwrap_or_else(|| ExerciseKind::from_name(&name));

        let landmarks = resolve_landmarks(
            raw.landmarks
                .as_ref()
                .ok_or_else(|| EngineError::MissingField("landmarks".to_string()))?,
        )?;

        let params = &raw.parameters;
        let thresholds = Thresholds {
            start: parameter(
                &name,
                "angle_threshold_start",
                params.angle_threshold_start,
                DEFAULT_START_THRESHOLD,
            )?,
            down: parameter(
                &name,
                "angle_threshold_down",
                params.angle_threshold_down,
                DEFAULT_DOWN_THRESHOLD,
            )?,
            up: parameter(
                &name,
                "angle_threshold_up",
                params.angle_threshold_up,
                DEFAULT_UP_THRESHOLD,
            )?,
            feedback: parameter(
                &name,
                "feedback_threshold",
                params.feedback_threshold,
                DEFAULT_FEEDBACK_THRESHOLD,
            )?,
        };

        let perfect_range = PerfectRange {
            min: parameter(
                &name,
                "perfect_range_min",
                params.perfect_range_min,
                DEFAULT_PERFECT_RANGE_MIN,
            )?,
            max: parameter(
                &name,
                "perfect_range_max",
                params.perfect_range_max,
                DEFAULT_PERFECT_RANGE_MAX,
            )?,
        };
        if perfect_range.min > perfect_range.max {
            return Err(EngineError::InvalidThreshold(format!(
                "perfect_range_min ({}) exceeds perfect_range_max ({})",
                perfect_range.min, perfect_range.max
            )));
        }

        let feedback_rules = raw
            .feedback
            .into_iter()
            .map(|rule| {
                let message = rule.message.trim().to_string();
                if message.is_empty() {
                    return Err(EngineError::MissingField(format!(
                        "feedback message for condition '{}'",
                        rule.condition
                    )));
                }
                Ok(FeedbackRule {
                    condition: Condition::parse(&rule.condition)?,
                    voice: rule.voice.unwrap_or_else(|| message.clone()),
                    message,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        Ok(Self {
            name,
            kind,
            description: raw.description,
            landmarks,
            thresholds,
            perfect_range,
            feedback_rules,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn landmarks(&self) -> LandmarkTriple {
        self.landmarks
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn perfect_range(&self) -> PerfectRange {
        self.perfect_range
    }

    pub fn feedback_rules(&self) -> &[FeedbackRule] {
        &self.feedback_rules
    }
}

/// Pick the landmark family present in the file
fn resolve_landmarks(raw: &RawLandmarks) -> Result<LandmarkTriple, EngineError> {
    let (family, ids) = if raw.hip.is_some() {
        ("hip/knee/ankle", (raw.hip, raw.knee, raw.ankle))
    } else if raw.shoulder.is_some() {
        ("shoulder/elbow/wrist", (raw.shoulder, raw.elbow, raw.wrist))
    } else if raw.proximal.is_some() {
        ("proximal/vertex/distal", (raw.proximal, raw.vertex, raw.distal))
    } else {
        return Err(EngineError::InvalidLandmarks(
            "expected hip/knee/ankle, shoulder/elbow/wrist or proximal/vertex/distal".to_string(),
        ));
    };

    let (Some(proximal), Some(vertex), Some(distal)) = ids else {
        return Err(EngineError::InvalidLandmarks(format!(
            "{family} requires all three joints"
        )));
    };

    if proximal == vertex || vertex == distal || proximal == distal {
        return Err(EngineError::InvalidLandmarks(format!(
            "{family} joints must be distinct, got {proximal}/{vertex}/{distal}"
        )));
    }

    Ok(LandmarkTriple {
        proximal,
        vertex,
        distal,
    })
}

fn parameter(
    exercise: &str,
    key: &str,
    value: Option<f64>,
    default: f64,
) -> Result<f64, EngineError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(EngineError::InvalidThreshold(format!(
            "{key} must be finite, got {v}"
        ))),
        None => {
            debug!("{exercise}: {key} not set, using default {default}");
            Ok(default)
        }
    }
}
