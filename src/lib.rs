//! Rep Flux - On-device exercise repetition counting from pose landmarks
//!
//! Flux turns a stream of pose-detector frames into repetition counts, form
//! scores and coaching feedback through a deterministic per-frame pipeline:
//! joint angle → form score → phase transition → perfect-form gate →
//! feedback.
//!
//! ## Modules
//!
//! - **Engine**: [`ExerciseEngine`] processes one frame at a time for one exercise
//! - **Definitions**: declarative YAML/JSON exercise files plus a built-in catalog
//! - **Sessions**: a single-writer [`Session`] publishing snapshots to readers

pub mod angle;
pub mod announcer;
pub mod definition;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod scoring;
pub mod session;
pub mod state_machine;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use definition::{builtin, find_builtin, BuiltinExercise, ExerciseDefinition, BUILTIN_EXERCISES};
pub use engine::ExerciseEngine;
pub use error::EngineError;
pub use feedback::{Feedback, FeedbackGenerator};
pub use scoring::{FormScorer, PERFECT_FORM_THRESHOLD};
pub use session::{Session, SessionSnapshot, SnapshotReader};
pub use state_machine::RepStateMachine;
pub use types::{
    ExerciseKind, FrameResult, FrameStatus, Landmark, LandmarkFrame, Phase, Point, RepEvent,
};

/// Library version
pub const FLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by diagnostics
pub const PRODUCER_NAME: &str = "rep-flux";
