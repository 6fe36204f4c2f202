//! Project Audio Manager
//!
//! The transport facade of one project. Everything the command layer does to
//! the transport goes through here: play, record, pause, stop, the
//! play/stop/select gesture and recording cancellation.
//!
//! Engine notifications reach this type only through the bridge queue. The
//! UI side calls `process_notifications` to apply them in the order the
//! engine issued them; play and record requests drain the queue themselves
//! before starting a new stream, so a session's stop and commit are always
//! handled before the next session begins.

use std::sync::Arc;

use chrono::{DateTime, Local};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use crate::config::{TrackNamingConfig, TransportConfig};
use crate::engine::{
    AudioEngine, AudioIoListener, EngineError, ListenerRegistration, PlaybackPolicy,
    StreamOptions, StreamToken,
};
use crate::error::Result;
use crate::events::{EventBus, ProjectEvent, RecordingDropoutEvent};
use crate::project::{Project, SelectedRegion};
use crate::tracks::{Track, TrackKind, TransportTracks, WaveTrackArray};
use crate::transport::bridge::{AudioEngineBridge, EngineNotification};
use crate::transport::flags::{audio_io_not_busy_flag, can_stop_audio_stream_flag};
use crate::transport::ownership::StreamOwnershipGuard;
use crate::transport::rate::{self, PropertiesOfSelected};
use crate::transport::selection;
use crate::transport::state::{PlayMode, TransportPhase, TransportState};

/// What became of the tracks of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionOutcome {
    Open,
    Committed,
    Discarded,
}

#[derive(Debug)]
struct RecordingSession {
    capture_tracks: WaveTrackArray,
    /// The engine confirmed that capture began
    confirmed: bool,
    outcome: SessionOutcome,
}

/// Transport coordinator of one project.
pub struct ProjectAudioManager {
    project: Arc<Project>,
    engine: Arc<dyn AudioEngine>,
    config: TransportConfig,
    bridge: Arc<AudioEngineBridge>,
    registration: ListenerRegistration,
    guard: StreamOwnershipGuard,
    state: Mutex<TransportState>,
    last_play_mode: Mutex<PlayMode>,
    session: Mutex<Option<RecordingSession>>,
    events: EventBus,
}

impl ProjectAudioManager {
    /// Create the transport of `project` and register its listener with the
    /// engine. The listener stays registered until the manager is dropped.
    pub fn new(
        project: Arc<Project>,
        engine: Arc<dyn AudioEngine>,
        config: TransportConfig,
    ) -> Result<Self> {
        config.validate()?;

        let bridge = Arc::new(AudioEngineBridge::new(config.notification_queue_capacity));
        let listener: Arc<dyn AudioIoListener> = bridge.clone();
        let registration = ListenerRegistration::register(&engine, listener);
        let guard = StreamOwnershipGuard::new(project.id(), Arc::clone(&engine));

        tracing::info!("Transport ready for project '{}'", project.name());

        Ok(Self {
            project,
            engine,
            config,
            bridge,
            registration,
            guard,
            state: Mutex::new(TransportState::new()),
            last_play_mode: Mutex::new(PlayMode::default()),
            session: Mutex::new(None),
            events: EventBus::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    pub fn engine(&self) -> &Arc<dyn AudioEngine> {
        &self.engine
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// The listener registered with the engine.
    pub fn bridge(&self) -> &Arc<AudioEngineBridge> {
        &self.bridge
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> Receiver<ProjectEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    pub fn transport_state(&self) -> TransportState {
        *self.state.lock()
    }

    pub fn paused(&self) -> bool {
        self.state.lock().paused()
    }

    pub fn appending(&self) -> bool {
        self.state.lock().appending()
    }

    pub fn looping(&self) -> bool {
        self.state.lock().looping()
    }

    pub fn cutting(&self) -> bool {
        self.state.lock().cutting()
    }

    pub fn stopping(&self) -> bool {
        self.state.lock().stopping()
    }

    pub fn last_play_mode(&self) -> PlayMode {
        *self.last_play_mode.lock()
    }

    /// Rate last reported by the engine, for display only.
    pub fn displayed_rate(&self) -> u32 {
        self.bridge.displayed_rate()
    }

    /// This project's stream is running and only playing.
    pub fn playing(&self) -> bool {
        self.state.lock().is_playing()
            && self.guard.is_own_stream_active()
            && self.engine.capture_channels() == 0
    }

    /// This project's stream is running and capturing.
    pub fn recording(&self) -> bool {
        self.state.lock().is_recording()
            && self.guard.is_own_stream_active()
            && self.engine.capture_channels() > 0
    }

    pub fn can_stop_audio_stream(&self) -> bool {
        self.guard.can_stop_audio_stream()
    }

    pub fn is_timer_record_cancelled(&self) -> bool {
        self.bridge.is_timer_record_cancelled()
    }

    pub fn set_timer_record_cancelled(&self) {
        self.bridge.set_timer_record_cancelled();
    }

    pub fn reset_timer_record_cancelled(&self) {
        self.bridge.reset_timer_record_cancelled();
    }

    // ========================================================================
    // Track and Rate Policy
    // ========================================================================

    pub fn get_properties_of_selected(&self) -> PropertiesOfSelected {
        rate::get_properties_of_selected(&self.project)
    }

    pub fn choose_existing_recording_tracks(
        &self,
        selected_only: bool,
        target_rate: Option<u32>,
    ) -> WaveTrackArray {
        selection::choose_existing_recording_tracks(
            &self.project,
            selected_only,
            target_rate,
            self.config
                .match_recording_channels
                .then_some(self.config.recording_channels),
        )
    }

    pub fn use_duplex(&self, capture: &[Arc<Track>]) -> bool {
        let playback = selection::get_all_playback_tracks(self.project.tracks(), false, true);
        rate::use_duplex(&self.config, &playback, capture)
    }

    /// Play options of this project, routed to its listener.
    pub fn default_play_options(&self, new_default: bool) -> StreamOptions {
        let mut options = rate::default_play_options(&self.project, new_default);
        options.listener = Some(self.registration.id());
        options
    }

    pub fn default_speed_play_options(&self) -> StreamOptions {
        let mut options = rate::default_speed_play_options(&self.project, self.engine.as_ref());
        options.listener = Some(self.registration.id());
        options
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// The record command. Stops instead when already recording.
    ///
    /// Returns whether a recording started.
    pub fn on_record(&self, alt_appearance: bool) -> bool {
        if self.state.lock().is_recording() {
            self.stop(true);
            return false;
        }

        let append = alt_appearance == self.config.prefer_new_track_record;
        let selection = self.project.selected_region();
        let mut t0 = selection.t0();
        // No time selection records for an unlimited time.
        let mut t1 = if selection.is_point() {
            f64::MAX
        } else {
            selection.t1()
        };

        let mut options = self.default_play_options(false);
        if self.config.sound_activated_record {
            options.sound_activation_level_db = Some(self.config.sound_activation_level_db);
        }

        let selected = self.get_properties_of_selected();
        if selected.number_of_selected > 0 && !selected.all_same_rate {
            self.report_error(
                "MISMATCHED_SAMPLING_RATES",
                "Mismatched Sampling Rates",
                "The tracks selected for recording must all have the same sampling rate",
            );
            return false;
        }
        let rate_of_selected = selected.rate();

        let mut existing = Vec::new();
        if append {
            existing = self.choose_existing_recording_tracks(true, rate_of_selected);
            if existing.is_empty() {
                if selected.number_of_selected > 0 && rate_of_selected != Some(options.rate) {
                    self.report_error(
                        "TOO_FEW_COMPATIBLE_TRACKS",
                        "Too Few Compatible Tracks Selected",
                        "Too few tracks are selected for recording at this sample rate.\n\
                         (Two channels at the same sample rate are required for each \
                         stereo track)",
                    );
                    return false;
                }
                existing = self.choose_existing_recording_tracks(false, Some(options.rate));
            }

            if let Some(end) = existing.iter().map(|t| t.end_time()).reduce(f64::max) {
                // Never record over what is already there.
                t0 = t0.max(end);
            }

            t1 = if t0 <= selection.t0() && !selection.is_point() {
                selection.t1()
            } else {
                f64::MAX
            };
        }

        let mut transport = TransportTracks::default();
        if self.use_duplex(&existing) {
            transport = selection::get_all_playback_tracks(self.project.tracks(), false, true);
            for track in &existing {
                transport.remove_playback_track(track.id());
            }
        }
        transport.capture_tracks = existing;

        if let Some(rate) = rate_of_selected {
            options.rate = rate;
        }

        self.do_record(transport, t0, t1, alt_appearance, options)
    }

    /// Start capture into `tracks.capture_tracks`, or into a new track when
    /// that set is empty.
    ///
    /// Returns false when the request is not allowed (a stop is in progress,
    /// or another project's stream is running) or the engine fails to start.
    pub fn do_record(
        &self,
        tracks: TransportTracks,
        t0: f64,
        t1: f64,
        alt_appearance: bool,
        options: StreamOptions,
    ) -> bool {
        if self.stopping() {
            tracing::debug!("Record rejected: transport is stopping");
            return false;
        }
        if !self.make_record_allowed() {
            tracing::debug!("Record rejected: the engine is busy with another project");
            return false;
        }

        // Whatever the previous stream still has queued belongs to its session.
        self.process_notifications();
        if self.engine.is_busy() || !self.state.lock().is_idle() {
            return false;
        }

        let mut transport = tracks;
        let requested = std::mem::take(&mut transport.capture_tracks);
        let appending = !requested.is_empty();
        let list = self.project.tracks();
        let (mut t0, mut t1) = (t0, t1);

        if appending {
            for track in requested {
                if transport.is_playback_track(track.id()) {
                    transport.preroll_tracks.push(Arc::clone(&track));
                }
                list.register_pending_changed_track(&track);
                transport.capture_tracks.push(track);
            }
        } else {
            let rate = options.rate;
            if t0 < f64::MAX {
                t0 = snap_to_sample(t0, rate);
            }
            if t1 < f64::MAX {
                t1 = snap_to_sample(t1, rate);
            }
            let name = recording_track_name(
                &self.config.track_naming,
                list.wave_tracks().len(),
                Local::now(),
            );
            let track = list.register_pending_new_track(
                name,
                TrackKind::Wave {
                    rate,
                    channels: self.config.recording_channels,
                },
                t0,
            );
            transport.capture_tracks.push(track);
        }

        *self.session.lock() = Some(RecordingSession {
            capture_tracks: transport.capture_tracks.clone(),
            confirmed: false,
            outcome: SessionOutcome::Open,
        });

        tracing::debug!(
            "Record request (alt: {}, appending: {}) over [{}, {})",
            alt_appearance,
            appending,
            t0,
            t1
        );

        match self.start_stream(&transport, t0, t1, &options) {
            Ok(token) => {
                if let Err(err) = self.state.lock().begin_recording(appending) {
                    tracing::error!("{}", err);
                }
                tracing::info!(
                    "Recording started on {} ({} track(s), {} Hz)",
                    token,
                    transport.capture_tracks.len(),
                    options.rate
                );
                self.post_state_changed();
                true
            }
            Err(err) => {
                let discarded = self.discard_session();
                tracing::error!(
                    "Failed to start recording: {} ({} pending track(s) discarded)",
                    err,
                    discarded
                );
                self.report_error(
                    err.error_code(),
                    "Error",
                    &format!("Error opening recording device.\nError code: {}", err),
                );
                false
            }
        }
    }

    /// Throw away whatever the current or just-started recording created.
    ///
    /// Safe to call when nothing was recorded.
    pub fn cancel_recording(&self) {
        let discarded = self.discard_session();
        if self.state.lock().is_recording() {
            self.stop(true);
        }
        self.project.history().rollback_state();
        tracing::info!("Recording cancelled; {} track(s) discarded", discarded);
        self.events
            .post(ProjectEvent::RecordingDiscarded { tracks: discarded });
    }

    /// Stop the stream first when it is ours; a foreign stream blocks.
    fn make_record_allowed(&self) -> bool {
        if audio_io_not_busy_flag().is_enabled(self) {
            return true;
        }
        if !can_stop_audio_stream_flag().is_enabled(self) {
            return false;
        }
        self.stop(true);
        audio_io_not_busy_flag().is_enabled(self)
    }

    fn discard_session(&self) -> usize {
        if let Some(session) = self.session.lock().as_mut() {
            if session.outcome == SessionOutcome::Open {
                session.outcome = SessionOutcome::Discarded;
            }
        }
        self.project.tracks().clear_pending()
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Play `region` in `mode`.
    ///
    /// Returns the stream token, or `None` when play could not start: another
    /// project owns the engine, the engine is busy, a cut preview has nothing
    /// to cut, there is nothing to play, or the device failed.
    pub fn play_play_region(
        &self,
        region: SelectedRegion,
        options: StreamOptions,
        mode: PlayMode,
        backwards: bool,
    ) -> Option<StreamToken> {
        if !self.can_stop_audio_stream() {
            return None;
        }

        self.process_notifications();
        if self.engine.is_busy() || !self.state.lock().is_idle() {
            return None;
        }

        let new_default = mode == PlayMode::LoopedPlay;
        let cut_preview = mode == PlayMode::CutPreviewPlay;
        let (mut t0, mut t1) = (region.t0(), region.t1());

        if cut_preview && t0 == t1 {
            return None;
        }

        *self.last_play_mode.lock() = mode;

        let list = self.project.tracks();
        let mut options = options;
        let non_wave_too = options.play_non_wave_tracks;
        let has_audio = if non_wave_too {
            list.has_playable_tracks()
        } else {
            !list.wave_tracks().is_empty()
        };
        if !has_audio {
            tracing::debug!("Nothing to play");
            return None;
        }

        let latest_end = list.end_time();

        if t0 == t1 {
            if new_default {
                let selected = self.project.selected_region();
                if t0 > selected.t0() && t0 < selected.t1() {
                    t0 = selected.t0();
                    t1 = selected.t1();
                } else {
                    // Loop the whole project, starting from the cursor.
                    options.start_time.get_or_insert(t0);
                    t0 = list.start_time();
                    t1 = latest_end;
                }
            } else {
                if t0 < 0.0 {
                    t0 = list.start_time();
                } else if t0 > latest_end {
                    t0 = latest_end;
                }
                t1 = latest_end;
            }
        } else {
            t0 = t0.min(latest_end).max(0.0);
            t1 = t1.min(latest_end).max(0.0);
        }

        if t0 == t1 {
            return None;
        }
        if backwards {
            std::mem::swap(&mut t0, &mut t1);
        }

        let (start, end) = if cut_preview {
            let (tless, tgreater) = (t0.min(t1), t0.max(t1));
            options.policy = PlaybackPolicy::CutPreview {
                gap_start: tless,
                gap_length: tgreater - tless,
            };
            let before = tless - self.config.cut_preview_before_secs;
            let after = tgreater + self.config.cut_preview_after_secs;
            if backwards {
                (after, before)
            } else {
                (before, after)
            }
        } else {
            let mut mixer_limit = t1;
            if new_default {
                mixer_limit = latest_end;
                if options.start_time.is_some_and(|start| start >= t1) {
                    t1 = latest_end;
                }
            }
            options.mixer_limit = Some(mixer_limit);
            (t0, t1)
        };

        let playback = selection::get_all_playback_tracks(list, false, non_wave_too);
        match self.start_stream(&playback, start, end, &options) {
            Ok(token) => {
                if let Err(err) = self.state.lock().begin_playback(mode) {
                    tracing::error!("{}", err);
                }
                tracing::info!("{} play started on {} over [{}, {})", mode, token, start, end);
                self.post_state_changed();
                Some(token)
            }
            Err(err) => {
                tracing::error!("Failed to start playback: {}", err);
                self.report_error(
                    err.error_code(),
                    "Error",
                    "Error opening sound device.\nTry changing the audio host, playback \
                     device and the project sample rate.",
                );
                None
            }
        }
    }

    /// Play the looping region when it is active, otherwise the selection.
    pub fn play_current_region(&self, new_default: bool, cutpreview: bool) -> Option<StreamToken> {
        if !self.can_stop_audio_stream() {
            return None;
        }

        let cutpreview = cutpreview && !new_default;
        let options = self.default_play_options(new_default);
        let mode = if cutpreview {
            PlayMode::CutPreviewPlay
        } else if new_default {
            PlayMode::LoopedPlay
        } else {
            PlayMode::NormalPlay
        };

        let region = self.project.view().effective_play_region();
        self.play_play_region(region, options, mode, false)
    }

    // ========================================================================
    // Pause and Stop
    // ========================================================================

    /// The pause command: toggle pause of this project's stream.
    pub fn on_pause(&self) {
        if !self.can_stop_audio_stream() {
            return;
        }

        let toggled = self.state.lock().toggle_pause();
        if let Some(paused) = toggled {
            self.engine.set_paused(paused);
            tracing::debug!("Transport {}", if paused { "paused" } else { "resumed" });
            self.post_state_changed();
        }
    }

    /// Toggle pause from outside the command layer. A stream owned by another
    /// project is paused in the engine without touching this project's state.
    pub fn pause(&self) {
        if self.can_stop_audio_stream() {
            self.on_pause();
        } else {
            self.engine.set_paused(!self.engine.is_paused());
        }
    }

    /// Stop the transport. With `stop_stream` unset the engine is assumed to
    /// have stopped already and is not told.
    ///
    /// Every transport flag is clear afterwards. When another project owns the
    /// running stream, only this project's flags are reset.
    pub fn stop(&self, stop_stream: bool) {
        if !self.can_stop_audio_stream() {
            let changed = {
                let mut state = self.state.lock();
                let changed = !state.is_idle();
                state.begin_stopping();
                state.finish_stopping();
                changed
            };
            self.guard.release();
            if changed {
                self.post_state_changed();
            }
            return;
        }

        if !self.state.lock().begin_stopping() {
            return;
        }

        if stop_stream && self.guard.owns_active_stream() {
            self.guard.teardown();
        } else {
            self.guard.release();
        }
        self.engine.set_paused(false);

        let stopped_from = {
            let mut state = self.state.lock();
            let from = state.stopping_from();
            state.finish_stopping();
            from
        };
        if let Some(phase) = stopped_from.filter(|p| *p != TransportPhase::Idle) {
            tracing::info!("Transport stopped while {}", phase);
            self.post_state_changed();
        }
    }

    pub fn stop_if_paused(&self) {
        if self.paused() {
            self.stop(true);
        }
    }

    /// The play/stop/select gesture.
    ///
    /// While this project's stream runs, the selection moves to the play head
    /// and the transport stops. While stopped, the current region starts
    /// playing. Returns whether either happened; always false while a stop is
    /// in progress.
    pub fn do_play_stop_select(&self, click: bool, shift: bool) -> bool {
        if self.stopping() {
            return false;
        }

        if self.guard.is_own_stream_active() {
            let time = self.engine.stream_time();
            let mut selection = self.project.selected_region();

            if shift && click {
                let (mut t0, mut t1) = (selection.t0(), selection.t1());
                if time < t0 {
                    t0 = time;
                } else if time > t1 {
                    t1 = time;
                } else if (t0 - time).abs() < (t1 - time).abs() {
                    t0 = time;
                } else {
                    t1 = time;
                }
                selection.set_times(t0, t1);
            } else if click {
                selection = SelectedRegion::point(time.max(0.0));
            } else {
                selection.set_t0(time);
            }

            self.project.set_selected_region(selection);
            self.project.history().modify_state();
            self.stop(true);
            return true;
        }

        if self.engine.is_busy() {
            return false;
        }
        self.play_current_region(false, false).is_some()
    }

    pub fn play_stop_select(&self) -> bool {
        self.do_play_stop_select(false, false)
    }

    // ========================================================================
    // Engine Notifications
    // ========================================================================

    /// Apply every queued engine notification in order. Returns how many
    /// were handled.
    ///
    /// Afterwards, a stream of this project that ended on its own (end of
    /// region, device loss) stops the transport.
    pub fn process_notifications(&self) -> usize {
        let mut handled = 0;
        while let Some(notification) = self.bridge.next_notification() {
            self.handle_notification(notification);
            handled += 1;
        }

        let lost = self.bridge.take_overflow_count();
        if lost > 0 {
            tracing::warn!("Notification queue full; {} notification(s) were deferred", lost);
        }

        let active = matches!(
            self.state.lock().phase(),
            TransportPhase::Playing | TransportPhase::Recording
        );
        if active && !self.guard.is_own_stream_active() {
            tracing::debug!("Stream ended without a stop request");
            self.stop(false);
        }

        handled
    }

    fn handle_notification(&self, notification: EngineNotification) {
        match notification {
            EngineNotification::RateChanged { rate } => {
                tracing::debug!("Engine rate is now {} Hz", rate);
                self.events.post(ProjectEvent::StatusBarRefresh { rate });
            }
            EngineNotification::StartRecording => self.handle_start_recording(),
            EngineNotification::NewBlocks { all_capture_blocks } => {
                if all_capture_blocks > 0 {
                    let tracks = self
                        .session
                        .lock()
                        .as_ref()
                        .map(|s| s.capture_tracks.clone())
                        .unwrap_or_default();
                    for track in &tracks {
                        for _ in 0..all_capture_blocks {
                            track.append_captured_block();
                        }
                    }
                }
                self.project.history().request_autosave();
            }
            EngineNotification::StopRecording => self.handle_stop_recording(),
            EngineNotification::CommitRecording => self.handle_commit_recording(),
            EngineNotification::SoundActivation { crossings } => {
                if crossings % 2 == 1 {
                    self.pause();
                }
            }
            EngineNotification::CheckpointFailure => {
                self.stop(true);
                self.report_error(
                    "CHECKPOINT_FAILED",
                    "Warning",
                    "Recording could not be saved to disk and was stopped.",
                );
            }
        }
    }

    fn handle_start_recording(&self) {
        if self.bridge.is_timer_record_cancelled() {
            tracing::info!("Timer recording cancelled before capture began");
            self.stop(true);
            self.cancel_recording();
            return;
        }
        if let Some(session) = self.session.lock().as_mut() {
            session.confirmed = true;
        }
    }

    fn handle_stop_recording(&self) {
        if self.state.lock().is_recording() {
            self.stop(false);
        }

        let outcome = self.session.lock().as_ref().map(|s| s.outcome);
        let Some(outcome) = outcome else {
            tracing::debug!("Stop recording without a recording session");
            return;
        };

        if self.bridge.is_timer_record_cancelled() {
            if outcome == SessionOutcome::Open {
                let discarded = self.discard_session();
                self.project.history().rollback_state();
                self.events
                    .post(ProjectEvent::RecordingDiscarded { tracks: discarded });
            }
            self.bridge.reset_timer_record_cancelled();
            return;
        }
        if outcome == SessionOutcome::Discarded {
            return;
        }

        self.project.history().push_state("Recorded Audio", "Record");

        let dropouts = RecordingDropoutEvent::from_gaps(self.engine.lost_capture_intervals());
        if !dropouts.is_empty() {
            tracing::warn!(
                "Recording lost {:.3}s of audio in {} dropout(s)",
                dropouts.total_duration(),
                dropouts.intervals().len()
            );
            self.events.post(ProjectEvent::RecordingDropout(dropouts));
        }
    }

    fn handle_commit_recording(&self) {
        let previous = {
            let mut session = self.session.lock();
            session.as_mut().map(|s| {
                let previous = s.outcome;
                if previous == SessionOutcome::Open {
                    s.outcome = SessionOutcome::Committed;
                }
                (previous, s.confirmed)
            })
        };

        match previous {
            Some((SessionOutcome::Open, confirmed)) => {
                let applied = self.project.tracks().apply_pending();
                tracing::info!(
                    "Recording committed: {} track(s) (capture confirmed: {})",
                    applied,
                    confirmed
                );
                self.events
                    .post(ProjectEvent::RecordingCommitted { tracks: applied });
            }
            Some((SessionOutcome::Committed, _)) => {
                tracing::warn!("Recording already committed; repeated commit ignored");
            }
            Some((SessionOutcome::Discarded, _)) | None => {
                tracing::debug!("Nothing to commit");
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Start a stream owned by this project and reported to its listener,
    /// whatever the caller's options say.
    fn start_stream(
        &self,
        tracks: &TransportTracks,
        t0: f64,
        t1: f64,
        options: &StreamOptions,
    ) -> std::result::Result<StreamToken, EngineError> {
        let options = StreamOptions {
            owner: Some(self.project.id()),
            listener: Some(self.registration.id()),
            ..options.clone()
        };
        let token = self.engine.start_stream(tracks, t0, t1, &options)?;
        self.guard.claim(token);
        Ok(token)
    }

    fn post_state_changed(&self) {
        let state = self.transport_state();
        self.events.post(ProjectEvent::TransportStateChanged(state));
    }

    fn report_error(&self, code: &str, title: &str, message: &str) {
        tracing::error!("{}: {}", title, message);
        self.events.post(ProjectEvent::error(code, title, message));
    }
}

impl std::fmt::Debug for ProjectAudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectAudioManager")
            .field("project", &self.project.id())
            .field("state", &self.transport_state())
            .field("guard", &self.guard)
            .finish()
    }
}

/// Round `t` to the nearest sample boundary at `rate`.
fn snap_to_sample(t: f64, rate: u32) -> f64 {
    let rate = f64::from(rate);
    (t * rate).round() / rate
}

/// Name of a track created for a recording: the base name followed by the
/// enabled parts (track number, date, time), joined by underscores.
fn recording_track_name(
    naming: &TrackNamingConfig,
    wave_track_count: usize,
    now: DateTime<Local>,
) -> String {
    let mut parts = Vec::new();
    if naming.use_track_number {
        parts.push((wave_track_count + 1).to_string());
    }
    if naming.use_date_stamp {
        parts.push(now.format("%Y-%m-%d").to_string());
    }
    if naming.use_time_stamp {
        parts.push(now.format("%H-%M-%S").to_string());
    }
    let suffix = parts.join("_");
    let base = naming.base_name();

    if base.is_empty() {
        suffix
    } else if suffix.is_empty() {
        base.to_string()
    } else {
        format!("{}_{}", base, suffix)
    }
}
