//! Project handle
//!
//! Everything the transport reads from a project: identity, project rate,
//! tracks, view state and history. Shared as `Arc<Project>` between the
//! transport facade and the UI.

pub mod history;
pub mod region;

use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tracks::TrackList;

pub use history::{HistoryAction, HistoryEntry, ProjectHistory};
pub use region::{PlayRegion, SelectedRegion, ViewInfo};

/// Identity of a project instance; used to decide stream ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open project.
#[derive(Debug)]
pub struct Project {
    id: ProjectId,
    name: String,
    rate: RwLock<u32>,
    tracks: TrackList,
    history: ProjectHistory,
    view: RwLock<ViewInfo>,
}

impl Project {
    /// Create an empty project with the given project rate.
    pub fn new(name: impl Into<String>, rate: u32) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            rate: RwLock::new(rate),
            tracks: TrackList::new(),
            history: ProjectHistory::new(),
            view: RwLock::new(ViewInfo::default()),
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Project rate, used for new tracks when nothing else decides.
    pub fn rate(&self) -> u32 {
        *self.rate.read()
    }

    pub fn set_rate(&self, rate: u32) {
        *self.rate.write() = rate;
    }

    pub fn tracks(&self) -> &TrackList {
        &self.tracks
    }

    pub fn history(&self) -> &ProjectHistory {
        &self.history
    }

    pub fn view(&self) -> ViewInfo {
        *self.view.read()
    }

    pub fn selected_region(&self) -> SelectedRegion {
        self.view.read().selected_region
    }

    pub fn set_selected_region(&self, region: SelectedRegion) {
        self.view.write().selected_region = region;
    }

    pub fn set_play_region(&self, region: PlayRegion) {
        self.view.write().play_region = region;
    }
}
