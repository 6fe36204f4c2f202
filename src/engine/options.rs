//! Stream start options
//!
//! Everything the engine needs besides the tracks and time bounds. Built once
//! per transport operation; the playback policy chosen here holds for the
//! whole operation.

use serde::{Deserialize, Serialize};

use crate::engine::ListenerId;
use crate::project::ProjectId;

/// How the engine walks through the region while playing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PlaybackPolicy {
    /// Play the region once, straight through.
    Once,
    /// Follow live changes of the looping region; may loop.
    Looping {
        /// End of the last track when play started
        track_end: f64,
        /// End of the looping region when play started
        loop_end: f64,
    },
    /// Play around a prospective cut, skipping the audio to be removed.
    CutPreview { gap_start: f64, gap_length: f64 },
}

impl PlaybackPolicy {
    pub fn is_looping(&self) -> bool {
        matches!(self, PlaybackPolicy::Looping { .. })
    }
}

/// Options passed to `AudioEngine::start_stream`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamOptions {
    /// Project requesting the stream; it becomes the stream's owner.
    pub owner: Option<ProjectId>,

    /// Listener receiving this stream's notifications.
    pub listener: Option<ListenerId>,

    /// Requested stream rate in Hz.
    pub rate: u32,

    /// The looping region is enabled.
    pub loop_enabled: bool,

    pub policy: PlaybackPolicy,

    /// Where play actually begins when it differs from the region start.
    pub start_time: Option<f64>,

    /// Mixer stops reading tracks here; defaults to the region end.
    pub mixer_limit: Option<f64>,

    /// Rate may change during play (speed play).
    pub variable_speed: bool,

    /// Render note tracks as well as wave tracks.
    pub play_non_wave_tracks: bool,

    /// Sound activated recording level in dBFS, when enabled.
    pub sound_activation_level_db: Option<f64>,
}

impl StreamOptions {
    pub fn new(rate: u32) -> Self {
        Self {
            owner: None,
            listener: None,
            rate,
            loop_enabled: false,
            policy: PlaybackPolicy::Once,
            start_time: None,
            mixer_limit: None,
            variable_speed: false,
            play_non_wave_tracks: true,
            sound_activation_level_db: None,
        }
    }
}
