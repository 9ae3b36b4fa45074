//! Exercise sessions
//!
//! A [`Session`] is the single writer for one camera/user: it owns an
//! [`ExerciseEngine`] and, after every mutation, publishes an immutable
//! [`SessionSnapshot`]. Any number of [`SnapshotReader`]s, on any thread,
//! can fetch the latest snapshot without touching the engine.

use crate::engine::ExerciseEngine;
use crate::types::{ExerciseKind, FrameResult, LandmarkFrame, Phase};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub exercise: String,
    pub kind: ExerciseKind,
    pub rep_count: u32,
    pub phase: Phase,
    pub feedback: String,
    pub voice_message: String,
    pub form_score: u8,
    /// Frames handed to the session since it started or last changed exercise
    pub frames_processed: u64,
    pub updated_at: DateTime<Utc>,
}

/// Cloneable read handle onto a session's latest snapshot
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    inner: Arc<RwLock<Arc<SessionSnapshot>>>,
}

impl SnapshotReader {
    fn new(snapshot: SessionSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// Latest published snapshot
    pub fn latest(&self) -> Arc<SessionSnapshot> {
        let guard = self.inner.read().unwrap_or_else(|poisoned| {
            warn!("session snapshot lock poisoned, recovering");
            poisoned.into_inner()
        });
        Arc::clone(&guard)
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| {
            warn!("session snapshot lock poisoned, recovering");
            poisoned.into_inner()
        });
        *guard = Arc::new(snapshot);
    }
}

/// One active exercise session
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    engine: ExerciseEngine,
    frames_processed: u64,
    reader: SnapshotReader,
}

impl Session {
    pub fn new(engine: ExerciseEngine) -> Self {
        let id = Uuid::new_v4();
        let snapshot = make_snapshot(id, &engine, 0);
        info!("session {id} started: {}", engine.definition().name());
        Self {
            id,
            started_at: Utc::now(),
            engine,
            frames_processed: 0,
            reader: SnapshotReader::new(snapshot),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn engine(&self) -> &ExerciseEngine {
        &self.engine
    }

    /// Handle for readers on other threads
    pub fn reader(&self) -> SnapshotReader {
        self.reader.clone()
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.reader.latest()
    }

    /// Feed one frame through the engine and publish the result
    pub fn process(&mut self, frame: &LandmarkFrame) -> FrameResult {
        let result = self.engine.process(frame);
        self.frames_processed += 1;
        self.publish();
        result
    }

    /// Reset the counter; returns the announcement to speak
    pub fn reset(&mut self) -> String {
        self.engine.reset();
        self.publish();
        crate::announcer::counter_reset()
    }

    /// Swap in a different exercise; returns the start announcement.
    ///
    /// The old engine is dropped whole, so no frame ever sees a mix of the
    /// two definitions.
    pub fn select_exercise(&mut self, engine: ExerciseEngine) -> String {
        info!(
            "session {}: switching {} -> {}",
            self.id,
            self.engine.definition().name(),
            engine.definition().name()
        );
        self.engine = engine;
        self.frames_processed = 0;
        self.publish();
        self.engine.start_announcement()
    }

    fn publish(&self) {
        self.reader
            .publish(make_snapshot(self.id, &self.engine, self.frames_processed));
    }
}

fn make_snapshot(id: Uuid, engine: &ExerciseEngine, frames_processed: u64) -> SessionSnapshot {
    let definition = engine.definition();
    SessionSnapshot {
        session_id: id,
        exercise: definition.name().to_string(),
        kind: definition.kind(),
        rep_count: engine.rep_count(),
        phase: engine.phase(),
        feedback: engine.feedback().to_string(),
        voice_message: engine.voice_message().to_string(),
        form_score: engine.form_score(),
        frames_processed,
        updated_at: Utc::now(),
    }
}
