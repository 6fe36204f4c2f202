//! Rate resolution and stream option defaults

use std::sync::Arc;

use serde::Serialize;

use crate::config::TransportConfig;
use crate::engine::{AudioEngine, PlaybackPolicy, StreamOptions};
use crate::project::Project;
use crate::tracks::{Track, TransportTracks};

/// Sentinel for "no rate decided".
pub const RATE_NOT_SELECTED: i32 = -1;

/// Summary of the selected wave tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertiesOfSelected {
    pub all_same_rate: bool,
    /// The common rate, or `RATE_NOT_SELECTED`
    pub rate_of_selected: i32,
    pub number_of_selected: usize,
}

impl Default for PropertiesOfSelected {
    fn default() -> Self {
        Self {
            all_same_rate: false,
            rate_of_selected: RATE_NOT_SELECTED,
            number_of_selected: 0,
        }
    }
}

impl PropertiesOfSelected {
    /// The common rate of the selection, if there is one.
    pub fn rate(&self) -> Option<u32> {
        u32::try_from(self.rate_of_selected).ok()
    }
}

fn rate_value(rate: u32) -> i32 {
    i32::try_from(rate).unwrap_or(i32::MAX)
}

/// Inspect the rates of the currently selected wave tracks.
pub fn get_properties_of_selected(project: &Project) -> PropertiesOfSelected {
    let selected = project.tracks().selected_wave_tracks();
    let mut rates = selected.iter().filter_map(|t| t.rate());

    let Some(first) = rates.next() else {
        return PropertiesOfSelected::default();
    };

    let all_same_rate = rates.all(|rate| rate == first);
    PropertiesOfSelected {
        all_same_rate,
        rate_of_selected: if all_same_rate {
            rate_value(first)
        } else {
            RATE_NOT_SELECTED
        },
        number_of_selected: selected.len(),
    }
}

/// Whether existing audio should play while recording into `capture`.
///
/// Duplex must be enabled and at least one playable track must remain once
/// the capture targets are taken out.
pub fn use_duplex(
    config: &TransportConfig,
    playback: &TransportTracks,
    capture: &[Arc<Track>],
) -> bool {
    if !config.duplex {
        return false;
    }
    let is_capture = |track: &Arc<Track>| capture.iter().any(|c| c.id() == track.id());
    playback.playback_tracks.iter().any(|t| !is_capture(t))
        || !playback.other_playable_tracks.is_empty()
}

/// Options for an ordinary play or record request.
///
/// With `new_default` the engine follows live changes of the looping region
/// and play begins at the left edge of the selection; otherwise the region is
/// played once. The choice holds until the stream ends.
pub fn default_play_options(project: &Project, new_default: bool) -> StreamOptions {
    let view = project.view();
    let mut options = StreamOptions::new(project.rate());
    options.owner = Some(project.id());
    options.loop_enabled = view.play_region.active;

    if new_default {
        options.policy = PlaybackPolicy::Looping {
            track_end: project.tracks().end_time(),
            loop_end: view.play_region.end,
        };
        options.start_time = Some(view.selected_region.t0());
    }

    options
}

/// Options for play at speed: the best device rate, with variable speed.
pub fn default_speed_play_options(project: &Project, engine: &dyn AudioEngine) -> StreamOptions {
    let mut options = default_play_options(project, false);
    options.rate = engine.best_rate(project.rate());
    options.variable_speed = true;
    options
}
