//! Audio Engine Boundary
//!
//! The transport drives an external real-time audio engine through two
//! traits:
//! - `AudioEngine`: the control surface (start/stop/pause a stream, queries)
//! - `AudioIoListener`: notifications the engine delivers from its own thread
//!
//! A `SimulatedEngine` implements the control surface in memory.

pub mod options;
pub mod simulated;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::DropoutInterval;
use crate::project::ProjectId;
use crate::tracks::{Track, TransportTracks};

pub use options::{PlaybackPolicy, StreamOptions};
pub use simulated::SimulatedEngine;

/// Opaque identifier of a started stream. Always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamToken(pub u32);

impl fmt::Display for StreamToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

/// Identifier of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

/// Failures reported by the engine control surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Audio device unavailable: {reason}")]
    DeviceUnavailable { reason: String },

    #[error("Audio engine is busy with another stream")]
    Busy,

    #[error("Requested region is empty")]
    EmptyRegion,

    #[error("No tracks to play or record")]
    NoAudioTracks,
}

impl EngineError {
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::DeviceUnavailable { .. } => "ENGINE_DEVICE_UNAVAILABLE",
            EngineError::Busy => "ENGINE_BUSY",
            EngineError::EmptyRegion => "ENGINE_EMPTY_REGION",
            EngineError::NoAudioTracks => "ENGINE_NO_AUDIO_TRACKS",
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::DeviceUnavailable { .. })
    }
}

/// Notifications the engine delivers from its real-time thread.
///
/// Implementations must return quickly: no blocking, no allocation, no I/O.
/// For one stream they arrive in the order
/// start recording, new blocks*, stop recording, commit.
pub trait AudioIoListener: Send + Sync {
    /// The stream rate is now `rate`.
    fn on_audio_io_rate(&self, rate: u32);

    /// Capture has begun.
    fn on_audio_io_start_recording(&self);

    /// Capture has ended.
    fn on_audio_io_stop_recording(&self);

    /// Captured blocks were appended; `None` means every capture track.
    fn on_audio_io_new_blocks(&self, tracks: Option<&[Arc<Track>]>);

    /// The recording is complete and may be made permanent. Once per session.
    fn on_commit_recording(&self);

    /// Sound activated recording crossed its threshold.
    fn on_sound_activation_threshold(&self);
}

/// Control surface of the real-time audio engine.
///
/// One engine instance serves every open project; at most one stream is
/// active at a time.
pub trait AudioEngine: Send + Sync {
    fn register_listener(&self, listener: Arc<dyn AudioIoListener>) -> ListenerId;

    fn unregister_listener(&self, id: ListenerId);

    /// Start playing `tracks.playback_tracks` and capturing into
    /// `tracks.capture_tracks` over `[t0, t1)`.
    fn start_stream(
        &self,
        tracks: &TransportTracks,
        t0: f64,
        t1: f64,
        options: &StreamOptions,
    ) -> std::result::Result<StreamToken, EngineError>;

    /// Tear down the active stream, if any.
    fn stop_stream(&self);

    /// Suspend or resume I/O without tearing the stream down.
    fn set_paused(&self, paused: bool);

    fn is_paused(&self) -> bool;

    /// A stream is open, including one that is still shutting down.
    fn is_busy(&self) -> bool;

    fn is_stream_active(&self) -> bool;

    fn is_stream_active_token(&self, token: StreamToken) -> bool;

    /// Project that started the active stream.
    fn owning_project(&self) -> Option<ProjectId>;

    /// Capture channels of the active stream; zero when only playing.
    fn capture_channels(&self) -> usize;

    /// Current play head of the active stream, in seconds.
    fn stream_time(&self) -> f64;

    /// Closest rate the device supports for `requested`.
    fn best_rate(&self, requested: u32) -> u32;

    /// Rate of the active stream.
    fn current_rate(&self) -> Option<u32>;

    /// Capture gaps detected during the most recent recording.
    fn lost_capture_intervals(&self) -> Vec<DropoutInterval>;
}

/// Keeps a listener registered for as long as it lives.
pub struct ListenerRegistration {
    engine: Arc<dyn AudioEngine>,
    id: ListenerId,
}

impl ListenerRegistration {
    pub fn register(engine: &Arc<dyn AudioEngine>, listener: Arc<dyn AudioIoListener>) -> Self {
        let id = engine.register_listener(listener);
        tracing::debug!("Registered audio listener {:?}", id);
        Self {
            engine: Arc::clone(engine),
            id,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        tracing::debug!("Unregistering audio listener {:?}", self.id);
        self.engine.unregister_listener(self.id);
    }
}
