//! CLI Command Implementations
//!
//! Each command builds an in-memory project from the described tracks, runs
//! the transport against the simulated engine and prints JSON to stdout.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::json;
use tracing::info;

use crate::cli::{GapSpec, SessionMode, TrackSpec};
use crate::config::TransportConfig;
use crate::engine::{AudioEngine, SimulatedEngine};
use crate::events::ProjectEvent;
use crate::project::{Project, SelectedRegion};
use crate::tracks::TrackKind;
use crate::transport::ProjectAudioManager;

/// Options of the `simulate` command.
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub mode: SessionMode,
    pub alt: bool,
    pub from: f64,
    pub to: Option<f64>,
    pub gaps: Vec<GapSpec>,
    pub blocks: u32,
    pub run_for: f64,
    pub length: f64,
    pub project_rate: u32,
}

/// Load the configuration file, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<TransportConfig> {
    match path {
        Some(path) => TransportConfig::load(path)
            .with_context(|| format!("loading transport config {}", path.display())),
        None => Ok(TransportConfig::default()),
    }
}

/// Build a project holding the described tracks.
pub fn build_project(tracks: &[TrackSpec], project_rate: u32, length: f64) -> Arc<Project> {
    let project = Arc::new(Project::new("cli", project_rate));
    for spec in tracks {
        let track = project.tracks().add_track(
            spec.name.as_str(),
            TrackKind::Wave {
                rate: spec.rate,
                channels: spec.channels,
            },
            0.0,
            length,
        );
        track.set_selected(spec.selected);
        track.set_record_armed(spec.armed);
    }
    project
}

fn manager_for(
    project: Arc<Project>,
    config: TransportConfig,
) -> anyhow::Result<(Arc<SimulatedEngine>, ProjectAudioManager)> {
    let simulated = Arc::new(SimulatedEngine::new());
    let engine: Arc<dyn AudioEngine> = simulated.clone();
    let manager = ProjectAudioManager::new(project, engine, config)?;
    Ok((simulated, manager))
}

/// Print rate properties, recording targets and whether duplex applies.
pub fn inspect(
    tracks: &[TrackSpec],
    selected_only: bool,
    rate: Option<u32>,
    project_rate: u32,
    config: TransportConfig,
) -> anyhow::Result<()> {
    info!("Inspecting {} track(s)", tracks.len());

    let project = build_project(tracks, project_rate, 0.0);
    let (_engine, manager) = manager_for(project, config)?;

    let properties = manager.get_properties_of_selected();
    let chosen: Vec<String> = manager
        .choose_existing_recording_tracks(selected_only, rate)
        .iter()
        .map(|t| t.name().to_string())
        .collect();

    let report = json!({
        "properties": properties,
        "recording_targets": chosen,
        "duplex": manager.use_duplex(&[]),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Run one session and print every posted event as a JSON line.
pub fn simulate(
    tracks: &[TrackSpec],
    options: &SimulateOptions,
    config: TransportConfig,
) -> anyhow::Result<()> {
    info!("Simulating {:?} session", options.mode);

    let project = build_project(tracks, options.project_rate, options.length);
    project.set_selected_region(match options.to {
        Some(to) => SelectedRegion::new(options.from, to),
        None => SelectedRegion::point(options.from),
    });

    let (engine, manager) = manager_for(project, config)?;
    let events = manager.subscribe();

    let started = match options.mode {
        SessionMode::Record => manager.on_record(options.alt),
        SessionMode::Play => manager.play_current_region(false, false).is_some(),
        SessionMode::Loop => manager.play_current_region(true, false).is_some(),
        SessionMode::CutPreview => manager.play_current_region(false, true).is_some(),
    };
    manager.process_notifications();

    if started {
        if options.mode == SessionMode::Record {
            for _ in 0..options.blocks {
                engine.deliver_blocks(None);
            }
            for gap in &options.gaps {
                engine.report_dropout(gap.0.start, gap.0.duration);
            }
        }
        engine.advance(options.run_for);
        manager.process_notifications();
        manager.stop(true);
        manager.process_notifications();
    }

    let mut posted = 0;
    for event in events.try_iter() {
        println!("{}", serde_json::to_string(&event)?);
        posted += 1;
        if let ProjectEvent::ErrorReported { title, .. } = &event {
            info!("Session reported an error: {}", title);
        }
    }
    info!("{} event(s) posted", posted);

    if !started {
        bail!("the transport did not start");
    }
    Ok(())
}
