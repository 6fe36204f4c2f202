//! In-memory audio engine
//!
//! Behaves like a real engine from the transport's point of view: one active
//! stream at a time, owner tracking, and listener notifications delivered in
//! stream order. It moves no audio. Tests and the CLI drive it explicitly
//! (deliver blocks, report dropouts, advance time, finish the stream).
//!
//! Listener callbacks are always invoked after the internal lock has been
//! released, so a listener may query the engine from inside a callback.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::{
    AudioEngine, AudioIoListener, EngineError, ListenerId, StreamOptions, StreamToken,
};
use crate::events::DropoutInterval;
use crate::project::ProjectId;
use crate::tracks::{Track, TrackId, TransportTracks};

/// Rates the simulated device accepts.
pub const SUPPORTED_RATES: &[u32] = &[
    8000, 11025, 16000, 22050, 32000, 44100, 48000, 88200, 96000,
];

/// What the most recent successful `start_stream` was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub struct StartRecord {
    pub token: StreamToken,
    pub t0: f64,
    pub t1: f64,
    pub options: StreamOptions,
    pub playback: Vec<TrackId>,
    pub capture: Vec<TrackId>,
}

struct ActiveStream {
    token: StreamToken,
    owner: Option<ProjectId>,
    listener: Option<Arc<dyn AudioIoListener>>,
    capture_channels: usize,
    rate: u32,
    t0: f64,
    t1: f64,
    elapsed: f64,
}

impl ActiveStream {
    fn time(&self) -> f64 {
        if self.t1 >= self.t0 {
            (self.t0 + self.elapsed).min(self.t1)
        } else {
            (self.t0 - self.elapsed).max(self.t1)
        }
    }

    fn finished(&self) -> bool {
        let length = (self.t1 - self.t0).abs();
        length.is_finite() && self.elapsed >= length
    }
}

#[derive(Default)]
struct EngineState {
    listeners: HashMap<ListenerId, Arc<dyn AudioIoListener>>,
    stream: Option<ActiveStream>,
    next_token: u32,
    paused: bool,
    lost_intervals: Vec<DropoutInterval>,
    fail_next_start: Option<String>,
    start_count: usize,
    last_start: Option<StartRecord>,
}

/// Engine that only tracks stream state.
#[derive(Default)]
pub struct SimulatedEngine {
    state: Mutex<EngineState>,
    next_listener: AtomicU64,
}

impl fmt::Debug for SimulatedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SimulatedEngine")
            .field("listeners", &state.listeners.len())
            .field("active", &state.stream.as_ref().map(|s| s.token))
            .field("paused", &state.paused)
            .finish()
    }
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn active_listener(&self) -> Option<Arc<dyn AudioIoListener>> {
        self.state
            .lock()
            .stream
            .as_ref()
            .and_then(|s| s.listener.clone())
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Number of streams started successfully so far.
    pub fn start_count(&self) -> usize {
        self.state.lock().start_count
    }

    pub fn last_start(&self) -> Option<StartRecord> {
        self.state.lock().last_start.clone()
    }

    /// Make the next `start_stream` fail as if the device could not be opened.
    pub fn fail_next_start(&self, reason: impl Into<String>) {
        self.state.lock().fail_next_start = Some(reason.into());
    }

    /// Deliver captured blocks to the active stream's listener.
    pub fn deliver_blocks(&self, tracks: Option<&[Arc<Track>]>) {
        if let Some(listener) = self.active_listener() {
            listener.on_audio_io_new_blocks(tracks);
        }
    }

    /// Record a capture gap in the current recording.
    pub fn report_dropout(&self, start: f64, duration: f64) {
        self.state
            .lock()
            .lost_intervals
            .push(DropoutInterval::new(start, duration));
    }

    /// The device switched rate mid-stream.
    pub fn change_rate(&self, rate: u32) {
        let listener = {
            let mut state = self.state.lock();
            match state.stream.as_mut() {
                Some(stream) => {
                    stream.rate = rate;
                    stream.listener.clone()
                }
                None => None,
            }
        };
        if let Some(listener) = listener {
            listener.on_audio_io_rate(rate);
        }
    }

    pub fn cross_sound_activation_threshold(&self) {
        if let Some(listener) = self.active_listener() {
            listener.on_sound_activation_threshold();
        }
    }

    /// Move the play head; the stream stops itself when it runs off the end.
    pub fn advance(&self, seconds: f64) {
        let finished = {
            let mut state = self.state.lock();
            let paused = state.paused;
            match state.stream.as_mut() {
                Some(stream) if !paused => {
                    stream.elapsed += seconds.max(0.0);
                    stream.finished()
                }
                _ => false,
            }
        };
        if finished {
            self.finish_stream();
        }
    }

    /// The engine ends the stream on its own (end of region, device loss).
    pub fn finish_stream(&self) {
        self.stop_stream();
    }
}

impl AudioEngine for SimulatedEngine {
    fn register_listener(&self, listener: Arc<dyn AudioIoListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed) + 1);
        self.state.lock().listeners.insert(id, listener);
        id
    }

    fn unregister_listener(&self, id: ListenerId) {
        self.state.lock().listeners.remove(&id);
    }

    fn start_stream(
        &self,
        tracks: &TransportTracks,
        t0: f64,
        t1: f64,
        options: &StreamOptions,
    ) -> std::result::Result<StreamToken, EngineError> {
        let (listener, rate, capturing, token) = {
            let mut state = self.state.lock();
            if let Some(reason) = state.fail_next_start.take() {
                return Err(EngineError::DeviceUnavailable { reason });
            }
            if state.stream.is_some() {
                return Err(EngineError::Busy);
            }
            if tracks.is_empty() {
                return Err(EngineError::NoAudioTracks);
            }

            let rate = self.best_rate(options.rate);
            let listener = options
                .listener
                .and_then(|id| state.listeners.get(&id).cloned());
            state.next_token += 1;
            let token = StreamToken(state.next_token);
            let capture_channels = tracks.capture_channels();

            state.stream = Some(ActiveStream {
                token,
                owner: options.owner,
                listener: listener.clone(),
                capture_channels,
                rate,
                t0,
                t1,
                elapsed: 0.0,
            });
            state.paused = false;
            if capture_channels > 0 {
                state.lost_intervals.clear();
            }
            state.start_count += 1;
            state.last_start = Some(StartRecord {
                token,
                t0,
                t1,
                options: options.clone(),
                playback: tracks
                    .playback_tracks
                    .iter()
                    .chain(tracks.other_playable_tracks.iter())
                    .map(|t| t.id())
                    .collect(),
                capture: tracks.capture_tracks.iter().map(|t| t.id()).collect(),
            });
            (listener, rate, capture_channels > 0, token)
        };

        if let Some(listener) = listener {
            listener.on_audio_io_rate(rate);
            if capturing {
                listener.on_audio_io_start_recording();
            }
        }
        Ok(token)
    }

    fn stop_stream(&self) {
        let stopped = {
            let mut state = self.state.lock();
            state.paused = false;
            state.stream.take()
        };

        if let Some(stream) = stopped {
            if let (Some(listener), true) = (stream.listener, stream.capture_channels > 0) {
                listener.on_audio_io_stop_recording();
                listener.on_commit_recording();
            }
        }
    }

    fn set_paused(&self, paused: bool) {
        self.state.lock().paused = paused;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn is_busy(&self) -> bool {
        self.state.lock().stream.is_some()
    }

    fn is_stream_active(&self) -> bool {
        self.state.lock().stream.is_some()
    }

    fn is_stream_active_token(&self, token: StreamToken) -> bool {
        self.state
            .lock()
            .stream
            .as_ref()
            .is_some_and(|s| s.token == token)
    }

    fn owning_project(&self) -> Option<ProjectId> {
        self.state.lock().stream.as_ref().and_then(|s| s.owner)
    }

    fn capture_channels(&self) -> usize {
        self.state
            .lock()
            .stream
            .as_ref()
            .map_or(0, |s| s.capture_channels)
    }

    fn stream_time(&self) -> f64 {
        self.state.lock().stream.as_ref().map_or(0.0, |s| s.time())
    }

    fn best_rate(&self, requested: u32) -> u32 {
        SUPPORTED_RATES
            .iter()
            .copied()
            .find(|&rate| rate >= requested)
            .unwrap_or(SUPPORTED_RATES[SUPPORTED_RATES.len() - 1])
    }

    fn current_rate(&self) -> Option<u32> {
        self.state.lock().stream.as_ref().map(|s| s.rate)
    }

    fn lost_capture_intervals(&self) -> Vec<DropoutInterval> {
        self.state.lock().lost_intervals.clone()
    }
}
