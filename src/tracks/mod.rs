//! Track Model
//!
//! The slice of the project's track data the transport needs:
//! - Shared track handles with selection, record-arm and capture state
//! - The ordered track list with pending recording tracks
//! - The per-operation playback/capture track sets

pub mod list;
pub mod track;

use std::sync::Arc;

pub use list::TrackList;
pub use track::{Track, TrackId, TrackKind};

/// Ordered wave track handles, shared with the project's track list.
pub type WaveTrackArray = Vec<Arc<Track>>;

/// Tracks taking part in one transport operation.
///
/// Built fresh for every play or record request and owned by its caller.
#[derive(Debug, Clone, Default)]
pub struct TransportTracks {
    /// Wave tracks rendered during playback
    pub playback_tracks: WaveTrackArray,
    /// Wave tracks receiving captured audio
    pub capture_tracks: WaveTrackArray,
    /// Playable tracks without audio buffers (cue/note playback)
    pub other_playable_tracks: Vec<Arc<Track>>,
    /// Capture targets that were also playback sources before recording began
    pub preroll_tracks: WaveTrackArray,
}

impl TransportTracks {
    pub fn has_capture(&self) -> bool {
        !self.capture_tracks.is_empty()
    }

    pub fn has_playback(&self) -> bool {
        !self.playback_tracks.is_empty() || !self.other_playable_tracks.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_capture() && !self.has_playback()
    }

    /// Total capture channels across all capture tracks.
    pub fn capture_channels(&self) -> usize {
        self.capture_tracks
            .iter()
            .map(|t| t.channels() as usize)
            .sum()
    }

    pub fn is_playback_track(&self, id: TrackId) -> bool {
        self.playback_tracks.iter().any(|t| t.id() == id)
    }

    /// Stop playing a track, e.g. because it becomes a capture target.
    pub fn remove_playback_track(&mut self, id: TrackId) -> bool {
        let before = self.playback_tracks.len();
        self.playback_tracks.retain(|t| t.id() != id);
        self.playback_tracks.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transport_tracks() {
        let tracks = TransportTracks::default();
        assert!(tracks.is_empty());
        assert!(!tracks.has_capture());
        assert_eq!(tracks.capture_channels(), 0);
    }

    #[test]
    fn test_remove_playback_track() {
        let list = TrackList::new();
        let a = list.add_wave_track("A", 44100);
        let b = list.add_wave_track("B", 44100);

        let mut tracks = TransportTracks {
            playback_tracks: vec![Arc::clone(&a), Arc::clone(&b)],
            ..Default::default()
        };
        assert!(tracks.is_playback_track(a.id()));
        assert!(tracks.remove_playback_track(a.id()));
        assert!(!tracks.is_playback_track(a.id()));
        assert!(!tracks.remove_playback_track(a.id()));
        assert_eq!(tracks.playback_tracks.len(), 1);
    }

    #[test]
    fn test_capture_channels_sum() {
        let list = TrackList::new();
        let mono = list.add_wave_track("Mono", 44100);
        let stereo = list.add_track(
            "Stereo",
            TrackKind::Wave {
                rate: 44100,
                channels: 2,
            },
            0.0,
            0.0,
        );
        let tracks = TransportTracks {
            capture_tracks: vec![mono, stereo],
            ..Default::default()
        };
        assert_eq!(tracks.capture_channels(), 3);
    }
}
