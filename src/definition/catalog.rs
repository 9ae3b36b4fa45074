//! Built-in exercise catalog
//!
//! Definitions shipped with the crate, embedded from `exercises/*.yaml`.

use super::ExerciseDefinition;
use crate::error::EngineError;

/// An exercise that ships with the crate
#[derive(Debug, Clone, Copy)]
pub struct BuiltinExercise {
    /// Stable lookup key
    pub key: &'static str,
    /// Human-readable name
    pub display_name: &'static str,
    pub description: &'static str,
    /// YAML source of the definition
    pub source: &'static str,
}

impl BuiltinExercise {
    /// Parse and validate the embedded definition
    pub fn load(&self) -> Result<ExerciseDefinition, EngineError> {
        ExerciseDefinition::from_yaml_str(self.source)
    }
}

pub const BUILTIN_EXERCISES: &[BuiltinExercise] = &[
    BuiltinExercise {
        key: "squat",
        display_name: "Squats",
        description: "Lower body strength exercise",
        source: include_str!("../../exercises/squat.yaml"),
    },
    BuiltinExercise {
        key: "pushup",
        display_name: "Push-ups",
        description: "Upper body strength exercise",
        source: include_str!("../../exercises/pushup.yaml"),
    },
    BuiltinExercise {
        key: "bicep_curl",
        display_name: "Bicep Curls",
        description: "Arm strength exercise",
        source: include_str!("../../exercises/bicep_curl.yaml"),
    },
];

/// Look up a built-in exercise by key (case-insensitive)
pub fn find_builtin(key: &str) -> Option<&'static BuiltinExercise> {
    let key = key.trim();
    BUILTIN_EXERCISES
        .iter()
        .find(|exercise| exercise.key.eq_ignore_ascii_case(key))
}

/// Load a built-in exercise definition by key
pub fn builtin(key: &str) -> Result<ExerciseDefinition, EngineError> {
    find_builtin(key)
        .ok_or_else(|| EngineError::UnknownExercise(key.to_string()))?
        .load()
}
