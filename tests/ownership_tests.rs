//! Ownership Tests
//!
//! Two projects sharing one audio engine.

use std::sync::Arc;

use nueva_transport::engine::AudioEngine;
use nueva_transport::transport::{audio_io_not_busy_flag, can_stop_audio_stream_flag};
use nueva_transport::{
    Project, ProjectAudioManager, SimulatedEngine, TrackKind, TransportConfig,
};

struct Studio {
    engine: Arc<SimulatedEngine>,
    a: ProjectAudioManager,
    b: ProjectAudioManager,
}

fn manager(engine: &Arc<SimulatedEngine>, name: &str) -> ProjectAudioManager {
    let project = Arc::new(Project::new(name, 44100));
    project
        .tracks()
        .add_track("Track", TrackKind::wave(44100), 0.0, 10.0);
    let engine: Arc<dyn AudioEngine> = engine.clone();
    ProjectAudioManager::new(project, engine, TransportConfig::default()).unwrap()
}

fn studio() -> Studio {
    let engine = Arc::new(SimulatedEngine::new());
    let a = manager(&engine, "A");
    let b = manager(&engine, "B");
    Studio { engine, a, b }
}

// === Stop Permission ===

#[test]
fn test_idle_engine_is_stoppable_by_anyone() {
    let s = studio();
    assert!(s.a.can_stop_audio_stream());
    assert!(s.b.can_stop_audio_stream());
    assert!(audio_io_not_busy_flag().is_enabled(&s.b));
}

#[test]
fn test_only_owner_can_stop() {
    let s = studio();
    s.a.play_current_region(false, false).unwrap();

    assert!(s.a.can_stop_audio_stream());
    assert!(!s.b.can_stop_audio_stream());
    assert!(can_stop_audio_stream_flag().is_enabled(&s.a));
    assert!(!can_stop_audio_stream_flag().is_enabled(&s.b));
    assert!(!audio_io_not_busy_flag().is_enabled(&s.a));
}

#[test]
fn test_foreign_stop_leaves_stream_running() {
    let s = studio();
    s.a.play_current_region(false, false).unwrap();

    s.b.stop(true);

    assert!(s.engine.is_stream_active());
    assert!(s.a.playing());
    assert!(!s.b.playing());
    assert!(s.b.transport_state().is_idle());
}

// === Starting While Busy ===

#[test]
fn test_foreign_stream_blocks_play_and_record() {
    let s = studio();
    s.a.play_current_region(false, false).unwrap();
    let starts = s.engine.start_count();

    assert!(s.b.play_current_region(false, false).is_none());
    assert!(!s.b.on_record(true));
    assert!(!s.b.do_play_stop_select(false, false));

    assert_eq!(s.engine.start_count(), starts);
    assert!(s.a.playing());
    assert!(!s.b.project().tracks().has_pending());
}

#[test]
fn test_record_replaces_own_playback() {
    let s = studio();
    s.a.play_current_region(false, false).unwrap();

    assert!(s.a.on_record(true));
    assert!(s.a.recording());
    assert!(!s.a.playing());
}

#[test]
fn test_released_engine_is_free_for_others() {
    let s = studio();
    s.a.play_current_region(false, false).unwrap();
    s.a.stop(true);
    s.a.process_notifications();

    assert!(s.b.play_current_region(false, false).is_some());
    assert!(s.b.playing());
    assert!(!s.a.can_stop_audio_stream());
}

// === Pause ===

#[test]
fn test_pause_command_ignores_foreign_stream() {
    let s = studio();
    s.a.play_current_region(false, false).unwrap();

    s.b.on_pause();
    assert!(!s.engine.is_paused());
    assert!(!s.b.paused());

    s.a.on_pause();
    assert!(s.engine.is_paused());
    assert!(s.a.paused());
}

#[test]
fn test_external_pause_toggles_foreign_stream() {
    let s = studio();
    s.a.play_current_region(false, false).unwrap();

    s.b.pause();
    assert!(s.engine.is_paused());
    assert!(!s.b.paused());
    assert!(!s.a.paused());
}

// === Stream End ===

#[test]
fn test_stream_end_stops_only_its_owner() {
    let s = studio();
    s.a.play_current_region(false, false).unwrap();

    s.engine.advance(20.0);
    assert!(!s.engine.is_stream_active());

    s.b.process_notifications();
    assert!(s.a.playing());

    s.a.process_notifications();
    assert!(!s.a.playing());
    assert!(s.a.transport_state().is_idle());
}
