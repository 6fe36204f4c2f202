//! Stream ownership
//!
//! The engine serves every open project but runs one stream at a time. The
//! guard remembers which stream this project started and answers whether the
//! project may tear down whatever is running now.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::{AudioEngine, StreamToken};
use crate::project::ProjectId;

pub struct StreamOwnershipGuard {
    project: ProjectId,
    engine: Arc<dyn AudioEngine>,
    token: Mutex<Option<StreamToken>>,
}

impl StreamOwnershipGuard {
    pub fn new(project: ProjectId, engine: Arc<dyn AudioEngine>) -> Self {
        Self {
            project,
            engine,
            token: Mutex::new(None),
        }
    }

    /// True when no stream is active, or the active one was started by this
    /// project.
    pub fn can_stop_audio_stream(&self) -> bool {
        !self.engine.is_stream_active() || self.engine.owning_project() == Some(self.project)
    }

    /// An active stream exists and belongs to this project.
    pub fn owns_active_stream(&self) -> bool {
        self.engine.is_stream_active() && self.engine.owning_project() == Some(self.project)
    }

    /// Remember the token of a stream this project just started.
    pub fn claim(&self, token: StreamToken) {
        *self.token.lock() = Some(token);
    }

    pub fn token(&self) -> Option<StreamToken> {
        *self.token.lock()
    }

    /// The stream this project started is still running.
    pub fn is_own_stream_active(&self) -> bool {
        self.token()
            .is_some_and(|token| self.engine.is_stream_active_token(token))
    }

    pub fn release(&self) {
        *self.token.lock() = None;
    }

    /// Tear down the active stream.
    ///
    /// # Panics
    ///
    /// Panics when another project owns the active stream. Callers check
    /// `can_stop_audio_stream` first; reaching this with a foreign stream
    /// means the transport state of two projects got mixed up.
    pub fn teardown(&self) {
        assert!(
            self.can_stop_audio_stream(),
            "project {} attempted to stop a stream owned by {:?}",
            self.project,
            self.engine.owning_project()
        );
        tracing::debug!("Tearing down stream {:?}", self.token());
        self.engine.stop_stream();
        self.release();
    }
}

impl std::fmt::Debug for StreamOwnershipGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamOwnershipGuard")
            .field("project", &self.project)
            .field("token", &self.token())
            .finish()
    }
}
