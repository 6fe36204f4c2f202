//! Transport Scenario Tests
//!
//! End-to-end sessions of one project against the simulated engine.

use std::sync::Arc;

use approx::assert_relative_eq;
use crossbeam_channel::Receiver;
use pretty_assertions::assert_eq;

use nueva_transport::engine::AudioEngine;
use nueva_transport::project::HistoryAction;
use nueva_transport::transport::RATE_NOT_SELECTED;
use nueva_transport::{
    PlayMode, Project, ProjectAudioManager, ProjectEvent, SelectedRegion, SimulatedEngine,
    StreamOptions, Track, TrackKind, TransportConfig, TransportTracks,
};

fn setup(config: TransportConfig) -> (Arc<SimulatedEngine>, ProjectAudioManager) {
    let simulated = Arc::new(SimulatedEngine::new());
    let engine: Arc<dyn AudioEngine> = simulated.clone();
    let project = Arc::new(Project::new("Session", 44100));
    let manager = ProjectAudioManager::new(project, engine, config).unwrap();
    (simulated, manager)
}

fn channel_fit() -> TransportConfig {
    TransportConfig {
        match_recording_channels: true,
        ..Default::default()
    }
}

fn armed_track(manager: &ProjectAudioManager, name: &str, rate: u32, length: f64) -> Arc<Track> {
    let track = manager
        .project()
        .tracks()
        .add_track(name, TrackKind::wave(rate), 0.0, length);
    track.set_record_armed(true);
    track
}

fn drain(rx: &Receiver<ProjectEvent>) -> Vec<ProjectEvent> {
    rx.try_iter().collect()
}

fn assert_all_flags_clear(manager: &ProjectAudioManager) {
    assert!(!manager.paused());
    assert!(!manager.appending());
    assert!(!manager.looping());
    assert!(!manager.cutting());
    assert!(!manager.stopping());
}

// === Rate Properties ===

#[test]
fn test_mixed_selection_properties() {
    let (_engine, manager) = setup(TransportConfig::default());
    let list = manager.project().tracks();
    for (name, rate) in [("A", 44100), ("B", 44100), ("C", 48000)] {
        list.add_wave_track(name, rate).set_selected(true);
    }

    let props = manager.get_properties_of_selected();
    assert!(!props.all_same_rate);
    assert_eq!(props.rate_of_selected, RATE_NOT_SELECTED);
    assert_eq!(props.number_of_selected, 3);
}

// === Recording ===

#[test]
fn test_record_into_armed_track() {
    let (engine, manager) = setup(TransportConfig::default());
    let track = armed_track(&manager, "Vocals", 44100, 5.0);

    // Give the last play mode a non-default value first.
    manager.play_current_region(true, false).unwrap();
    manager.stop(true);
    manager.process_notifications();
    assert_eq!(manager.last_play_mode(), PlayMode::LoopedPlay);

    assert!(!manager.recording());
    assert!(manager.on_record(false));

    assert!(manager.recording());
    assert!(manager.appending());
    assert_eq!(manager.last_play_mode(), PlayMode::LoopedPlay);

    let start = engine.last_start().unwrap();
    assert_eq!(start.options.rate, 44100);
    assert_eq!(start.capture, vec![track.id()]);
    assert_relative_eq!(start.t0, 5.0);
    assert_eq!(start.t1, f64::MAX);
}

#[test]
fn test_low_level_record_owns_its_stream() {
    let (engine, manager) = setup(TransportConfig::default());

    assert!(manager.do_record(
        TransportTracks::default(),
        0.0,
        10.0,
        false,
        StreamOptions::new(44100),
    ));
    assert!(manager.recording());
    assert!(manager.can_stop_audio_stream());
    assert_eq!(engine.owning_project(), Some(manager.project().id()));

    manager.stop(true);
    manager.process_notifications();

    assert!(!engine.is_stream_active());
    assert!(!manager.project().tracks().has_pending());
    assert_eq!(manager.project().tracks().len(), 1);
}

#[test]
fn test_recording_commits_and_pushes_history() {
    let (engine, manager) = setup(TransportConfig::default());
    let rx = manager.subscribe();

    assert!(manager.on_record(true));
    for _ in 0..3 {
        engine.deliver_blocks(None);
    }
    manager.process_notifications();

    let pending = manager.project().tracks().pending_new_tracks();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].captured_blocks(), 3);
    assert!(manager.project().history().autosave_requests() >= 1);

    manager.stop(true);
    manager.process_notifications();

    assert_eq!(manager.project().tracks().len(), 1);
    let pushes = manager.project().history().entries_of(HistoryAction::Push);
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].description, "Recorded Audio");
    assert_eq!(pushes[0].short_name, "Record");

    let events = drain(&rx);
    assert!(events.contains(&ProjectEvent::StatusBarRefresh { rate: 44100 }));
    assert!(events.contains(&ProjectEvent::RecordingCommitted { tracks: 1 }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ProjectEvent::RecordingDropout(_))));
}

#[test]
fn test_dropouts_are_sorted_and_merged() {
    let (engine, manager) = setup(TransportConfig::default());
    let rx = manager.subscribe();

    assert!(manager.on_record(true));
    engine.report_dropout(2.0, 0.5);
    engine.report_dropout(1.0, 0.3);
    manager.stop(true);
    manager.process_notifications();

    let dropout = drain(&rx)
        .into_iter()
        .find_map(|e| match e {
            ProjectEvent::RecordingDropout(event) => Some(event),
            _ => None,
        })
        .expect("dropout event posted");

    let intervals = dropout.intervals();
    assert_eq!(intervals.len(), 2);
    assert_relative_eq!(intervals[0].start, 1.0);
    assert_relative_eq!(intervals[0].duration, 0.3);
    assert_relative_eq!(intervals[1].start, 2.0);
    assert_relative_eq!(intervals[1].duration, 0.5);
}

#[test]
fn test_append_records_within_selection() {
    let (engine, manager) = setup(TransportConfig::default());
    let track = armed_track(&manager, "A", 44100, 2.0);
    track.set_selected(true);
    manager
        .project()
        .set_selected_region(SelectedRegion::new(3.0, 6.0));

    assert!(manager.on_record(false));
    let start = engine.last_start().unwrap();
    assert_relative_eq!(start.t0, 3.0);
    assert_relative_eq!(start.t1, 6.0);
}

#[test]
fn test_no_armed_track_at_selected_rate_is_reported() {
    let (engine, manager) = setup(TransportConfig::default());
    let rx = manager.subscribe();
    // Selected at another rate than the project, but not armed.
    manager
        .project()
        .tracks()
        .add_track("A", TrackKind::wave(48000), 0.0, 1.0)
        .set_selected(true);

    assert!(!manager.on_record(false));
    assert_eq!(engine.start_count(), 0);
    assert!(drain(&rx).iter().any(|e| matches!(
        e,
        ProjectEvent::ErrorReported { title, .. } if title == "Too Few Compatible Tracks Selected"
    )));
}

#[test]
fn test_channel_fit_rejects_mono_track_for_stereo_input() {
    let (engine, manager) = setup(channel_fit());
    let rx = manager.subscribe();
    let track = armed_track(&manager, "A", 48000, 1.0);
    track.set_selected(true);

    assert!(!manager.on_record(false));
    assert_eq!(engine.start_count(), 0);
    assert!(drain(&rx).iter().any(|e| matches!(
        e,
        ProjectEvent::ErrorReported { title, .. } if title == "Too Few Compatible Tracks Selected"
    )));
}

#[test]
fn test_channel_fit_off_records_into_mono_track() {
    let (engine, manager) = setup(TransportConfig::default());
    let track = armed_track(&manager, "A", 48000, 1.0);
    track.set_selected(true);

    assert!(manager.on_record(false));
    let start = engine.last_start().unwrap();
    assert_eq!(start.capture, vec![track.id()]);
    assert_eq!(start.options.rate, 48000);
}

#[test]
fn test_duplex_plays_other_tracks() {
    let (engine, manager) = setup(TransportConfig::default());
    let target = armed_track(&manager, "Target", 44100, 1.0);
    let backing = manager.project().tracks().add_wave_track("Backing", 44100);

    assert!(manager.on_record(false));
    let start = engine.last_start().unwrap();
    assert_eq!(start.capture, vec![target.id()]);
    assert_eq!(start.playback, vec![backing.id()]);
}

#[test]
fn test_duplex_disabled_plays_nothing() {
    let config = TransportConfig {
        duplex: false,
        ..Default::default()
    };
    let (engine, manager) = setup(config);
    armed_track(&manager, "Target", 44100, 1.0);
    manager.project().tracks().add_wave_track("Backing", 44100);

    assert!(manager.on_record(false));
    assert!(engine.last_start().unwrap().playback.is_empty());
}

#[test]
fn test_new_track_bounds_snap_to_samples() {
    let (engine, manager) = setup(TransportConfig::default());
    manager
        .project()
        .set_selected_region(SelectedRegion::new(0.100_001, 0.5));

    assert!(manager.on_record(true));
    let start = engine.last_start().unwrap();
    assert_relative_eq!(start.t0 * 44100.0, 4410.0, epsilon = 1e-6);
    assert_relative_eq!(start.t0, 0.1, epsilon = 1e-4);

    let pending = manager.project().tracks().pending_new_tracks();
    assert_relative_eq!(pending[0].start_time(), start.t0);
}

// === Cancellation ===

#[test]
fn test_timer_cancel_before_capture() {
    let (engine, manager) = setup(TransportConfig::default());
    let rx = manager.subscribe();

    manager.set_timer_record_cancelled();
    assert!(manager.on_record(true));
    manager.process_notifications();

    assert!(!engine.is_stream_active());
    assert!(!manager.is_timer_record_cancelled());
    assert!(!manager.project().tracks().has_pending());
    assert!(manager.project().tracks().is_empty());
    assert_all_flags_clear(&manager);

    let events = drain(&rx);
    assert!(events.contains(&ProjectEvent::RecordingDiscarded { tracks: 1 }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ProjectEvent::RecordingCommitted { .. })));

    let history = manager.project().history();
    assert!(history.entries_of(HistoryAction::Push).is_empty());
    assert_eq!(history.entries_of(HistoryAction::Rollback).len(), 1);
}

#[test]
fn test_timer_cancel_during_capture() {
    let (_engine, manager) = setup(TransportConfig::default());
    let rx = manager.subscribe();

    assert!(manager.on_record(true));
    manager.process_notifications();

    manager.set_timer_record_cancelled();
    manager.stop(true);
    manager.process_notifications();

    assert!(!manager.is_timer_record_cancelled());
    assert!(manager.project().tracks().is_empty());
    assert!(drain(&rx).contains(&ProjectEvent::RecordingDiscarded { tracks: 1 }));
}

#[test]
fn test_cancel_restores_appended_track() {
    let (engine, manager) = setup(TransportConfig::default());
    let track = armed_track(&manager, "A", 44100, 1.0);
    track.append_captured_block();
    track.append_captured_block();

    assert!(manager.on_record(false));
    engine.deliver_blocks(Some(&[Arc::clone(&track)]));
    engine.deliver_blocks(None);
    manager.process_notifications();
    assert_eq!(track.captured_blocks(), 4);

    manager.cancel_recording();
    manager.process_notifications();

    assert_eq!(track.captured_blocks(), 2);
    assert!(!engine.is_stream_active());
    assert_all_flags_clear(&manager);
    assert!(manager
        .project()
        .history()
        .entries_of(HistoryAction::Push)
        .is_empty());
}

// === Stop Convergence ===

#[test]
fn test_stop_converges_from_every_state() {
    let (_engine, manager) = setup(TransportConfig::default());
    manager
        .project()
        .tracks()
        .add_track("A", TrackKind::wave(44100), 0.0, 10.0);
    manager
        .project()
        .set_selected_region(SelectedRegion::new(1.0, 2.0));

    for step in 0..5 {
        match step {
            1 => {
                manager.play_current_region(false, false);
            }
            2 => {
                manager.play_current_region(true, false);
                manager.on_pause();
            }
            3 => {
                manager.play_current_region(false, true);
            }
            4 => {
                manager.on_record(true);
                manager.on_pause();
            }
            _ => {}
        }
        manager.stop(true);
        assert_all_flags_clear(&manager);
        manager.stop(true);
        assert_all_flags_clear(&manager);
        manager.process_notifications();
        assert!(manager.transport_state().is_idle());
    }
}

// === Play/Stop/Select ===

#[test]
fn test_play_stop_select_round_trip() {
    let (engine, manager) = setup(TransportConfig::default());
    manager
        .project()
        .tracks()
        .add_track("A", TrackKind::wave(44100), 0.0, 10.0);

    assert!(manager.do_play_stop_select(false, false));
    assert!(manager.playing());

    engine.advance(1.5);
    assert!(manager.do_play_stop_select(false, false));
    assert!(!manager.playing());
    assert!(!engine.is_stream_active());
    assert_eq!(
        manager.project().selected_region(),
        SelectedRegion::point(1.5)
    );
}

#[test]
fn test_state_changes_are_posted() {
    let (_engine, manager) = setup(TransportConfig::default());
    manager
        .project()
        .tracks()
        .add_track("A", TrackKind::wave(44100), 0.0, 10.0);
    let rx = manager.subscribe();

    manager.play_current_region(false, false).unwrap();
    manager.stop(true);

    let states: Vec<_> = drain(&rx)
        .into_iter()
        .filter_map(|e| match e {
            ProjectEvent::TransportStateChanged(state) => Some(state.phase()),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            nueva_transport::TransportPhase::Playing,
            nueva_transport::TransportPhase::Idle
        ]
    );
}
