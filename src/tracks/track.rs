//! Track handles
//!
//! A track is shared between the project's track list and any transport
//! operation that captures into or plays from it, so it is always handed out
//! as `Arc<Track>`. The only fields written after creation are atomics: the
//! selection and record-arm flags (UI thread) and the captured block counter
//! (engine thread).

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier of a track within one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track-{}", self.0)
    }
}

/// What a track holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TrackKind {
    /// Sampled audio at a fixed rate
    Wave { rate: u32, channels: u16 },
    /// Playable, but carries no audio buffer (MIDI/cue playback)
    Note,
    /// Labels and markers; never played
    Label,
    /// Time warp envelope; never played
    Time,
}

impl TrackKind {
    /// Mono wave track at `rate`.
    pub fn wave(rate: u32) -> Self {
        TrackKind::Wave { rate, channels: 1 }
    }

    pub fn is_wave(&self) -> bool {
        matches!(self, TrackKind::Wave { .. })
    }

    /// Whether the engine can render this kind during playback.
    pub fn is_playable(&self) -> bool {
        matches!(self, TrackKind::Wave { .. } | TrackKind::Note)
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Wave { rate, channels } => write!(f, "Wave ({} Hz, {} ch)", rate, channels),
            TrackKind::Note => write!(f, "Note"),
            TrackKind::Label => write!(f, "Label"),
            TrackKind::Time => write!(f, "Time"),
        }
    }
}

/// One track of a project.
#[derive(Debug)]
pub struct Track {
    id: TrackId,
    name: String,
    kind: TrackKind,
    offset: f64,
    duration: f64,
    selected: AtomicBool,
    record_armed: AtomicBool,
    captured_blocks: AtomicU64,
}

impl Track {
    pub(crate) fn new(
        id: TrackId,
        name: impl Into<String>,
        kind: TrackKind,
        offset: f64,
        duration: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            offset,
            duration: duration.max(0.0),
            selected: AtomicBool::new(false),
            record_armed: AtomicBool::new(false),
            captured_blocks: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_wave(&self) -> bool {
        self.kind.is_wave()
    }

    pub fn is_playable(&self) -> bool {
        self.kind.is_playable()
    }

    /// Sample rate, for wave tracks only.
    pub fn rate(&self) -> Option<u32> {
        match self.kind {
            TrackKind::Wave { rate, .. } => Some(rate),
            _ => None,
        }
    }

    /// Channel count; zero for tracks without audio.
    pub fn channels(&self) -> u16 {
        match self.kind {
            TrackKind::Wave { channels, .. } => channels,
            _ => 0,
        }
    }

    pub fn start_time(&self) -> f64 {
        self.offset
    }

    pub fn end_time(&self) -> f64 {
        self.offset + self.duration
    }

    pub fn is_selected(&self) -> bool {
        self.selected.load(Ordering::Acquire)
    }

    pub fn set_selected(&self, selected: bool) {
        self.selected.store(selected, Ordering::Release);
    }

    pub fn is_record_armed(&self) -> bool {
        self.record_armed.load(Ordering::Acquire)
    }

    pub fn set_record_armed(&self, armed: bool) {
        self.record_armed.store(armed, Ordering::Release);
    }

    /// Number of captured blocks appended to this track so far.
    pub fn captured_blocks(&self) -> u64 {
        self.captured_blocks.load(Ordering::Acquire)
    }

    /// Record that one more block of captured audio arrived.
    ///
    /// Lock-free; safe to call from the engine thread.
    pub fn append_captured_block(&self) {
        self.captured_blocks.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn restore_captured_blocks(&self, count: u64) {
        self.captured_blocks.store(count, Ordering::Release);
    }
}
