//! Track list with pending (uncommitted) recording tracks
//!
//! Tracks created or appended to by a recording stay pending until the engine
//! commits the recording. Pending tracks can be applied (made permanent) or
//! cleared (discarded), which is how a cancelled recording leaves no trace.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::tracks::track::{Track, TrackId, TrackKind};

/// Ordered collection of a project's tracks.
#[derive(Debug, Default)]
pub struct TrackList {
    inner: RwLock<Inner>,
    next_id: AtomicU64,
}

#[derive(Debug, Default)]
struct Inner {
    tracks: Vec<Arc<Track>>,
    pending_new: Vec<Arc<Track>>,
    pending_changed: Vec<PendingChange>,
}

/// An existing track being appended to, with the state to restore on discard.
#[derive(Debug)]
struct PendingChange {
    track: Arc<Track>,
    blocks_before: u64,
}

impl TrackList {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> TrackId {
        TrackId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Append a permanent track.
    pub fn add_track(
        &self,
        name: impl Into<String>,
        kind: TrackKind,
        offset: f64,
        duration: f64,
    ) -> Arc<Track> {
        let track = Arc::new(Track::new(self.allocate_id(), name, kind, offset, duration));
        self.inner.write().tracks.push(Arc::clone(&track));
        track
    }

    /// Append an empty mono wave track.
    pub fn add_wave_track(&self, name: impl Into<String>, rate: u32) -> Arc<Track> {
        self.add_track(name, TrackKind::wave(rate), 0.0, 0.0)
    }

    pub fn remove(&self, id: TrackId) -> Option<Arc<Track>> {
        let mut inner = self.inner.write();
        let index = inner.tracks.iter().position(|t| t.id() == id)?;
        Some(inner.tracks.remove(index))
    }

    /// Snapshot of the permanent tracks in project order.
    pub fn tracks(&self) -> Vec<Arc<Track>> {
        self.inner.read().tracks.clone()
    }

    pub fn find(&self, id: TrackId) -> Option<Arc<Track>> {
        self.inner.read().tracks.iter().find(|t| t.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().tracks.is_empty()
    }

    /// Wave tracks in project order.
    pub fn wave_tracks(&self) -> Vec<Arc<Track>> {
        self.inner
            .read()
            .tracks
            .iter()
            .filter(|t| t.is_wave())
            .cloned()
            .collect()
    }

    pub fn selected_wave_tracks(&self) -> Vec<Arc<Track>> {
        self.inner
            .read()
            .tracks
            .iter()
            .filter(|t| t.is_wave() && t.is_selected())
            .cloned()
            .collect()
    }

    pub fn has_playable_tracks(&self) -> bool {
        self.inner.read().tracks.iter().any(|t| t.is_playable())
    }

    /// Earliest start among all tracks; zero when empty.
    pub fn start_time(&self) -> f64 {
        let inner = self.inner.read();
        inner
            .tracks
            .iter()
            .map(|t| t.start_time())
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Latest end among all tracks; zero when empty.
    pub fn end_time(&self) -> f64 {
        let inner = self.inner.read();
        inner
            .tracks
            .iter()
            .map(|t| t.end_time())
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    // ========================================================================
    // Pending tracks
    // ========================================================================

    /// Create a track that only becomes part of the list once applied.
    pub fn register_pending_new_track(
        &self,
        name: impl Into<String>,
        kind: TrackKind,
        offset: f64,
    ) -> Arc<Track> {
        let track = Arc::new(Track::new(self.allocate_id(), name, kind, offset, 0.0));
        self.inner.write().pending_new.push(Arc::clone(&track));
        track
    }

    /// Mark an existing track as being appended to.
    pub fn register_pending_changed_track(&self, track: &Arc<Track>) {
        let mut inner = self.inner.write();
        if inner
            .pending_changed
            .iter()
            .any(|change| Arc::ptr_eq(&change.track, track))
        {
            return;
        }
        inner.pending_changed.push(PendingChange {
            track: Arc::clone(track),
            blocks_before: track.captured_blocks(),
        });
    }

    /// Tracks created for a recording that has not been committed yet.
    pub fn pending_new_tracks(&self) -> Vec<Arc<Track>> {
        self.inner.read().pending_new.clone()
    }

    pub fn has_pending(&self) -> bool {
        let inner = self.inner.read();
        !inner.pending_new.is_empty() || !inner.pending_changed.is_empty()
    }

    /// Make pending tracks permanent. Returns how many tracks were affected.
    pub fn apply_pending(&self) -> usize {
        let mut inner = self.inner.write();
        let new_tracks = std::mem::take(&mut inner.pending_new);
        let changed = std::mem::take(&mut inner.pending_changed).len();
        let applied = new_tracks.len() + changed;
        inner.tracks.extend(new_tracks);
        applied
    }

    /// Drop pending new tracks and undo appends to existing ones.
    /// Returns how many tracks were affected.
    pub fn clear_pending(&self) -> usize {
        let mut inner = self.inner.write();
        let dropped = std::mem::take(&mut inner.pending_new).len();
        let changed = std::mem::take(&mut inner.pending_changed);
        for change in &changed {
            change.track.restore_captured_blocks(change.blocks_before);
        }
        dropped + changed.len()
    }
}
