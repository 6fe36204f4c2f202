//! Time selection and play region

use serde::{Deserialize, Serialize};

/// A time selection, always ordered so that `t0 <= t1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectedRegion {
    t0: f64,
    t1: f64,
}

impl SelectedRegion {
    pub fn new(t0: f64, t1: f64) -> Self {
        if t0 <= t1 {
            Self { t0, t1 }
        } else {
            Self { t0: t1, t1: t0 }
        }
    }

    /// A point selection (cursor) at `t`.
    pub fn point(t: f64) -> Self {
        Self { t0: t, t1: t }
    }

    pub fn t0(&self) -> f64 {
        self.t0
    }

    pub fn t1(&self) -> f64 {
        self.t1
    }

    pub fn duration(&self) -> f64 {
        self.t1 - self.t0
    }

    pub fn is_point(&self) -> bool {
        self.t0 == self.t1
    }

    pub fn set_times(&mut self, t0: f64, t1: f64) {
        *self = Self::new(t0, t1);
    }

    /// Move the start; a start past the end collapses the selection to a point.
    pub fn set_t0(&mut self, t: f64) {
        self.t0 = t;
        if self.t1 < t {
            self.t1 = t;
        }
    }
}

/// The looping region shown on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayRegion {
    pub start: f64,
    pub end: f64,
    /// Looping play is enabled
    pub active: bool,
}

/// Per-project view state the transport reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewInfo {
    pub selected_region: SelectedRegion,
    pub play_region: PlayRegion,
}

impl ViewInfo {
    /// The region the play commands use: the looping region when it is
    /// active, otherwise the selection.
    pub fn effective_play_region(&self) -> SelectedRegion {
        if self.play_region.active {
            SelectedRegion::new(self.play_region.start, self.play_region.end)
        } else {
            self.selected_region
        }
    }
}
