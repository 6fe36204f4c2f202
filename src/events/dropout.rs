//! Recording dropout notification
//!
//! The engine reports capture gaps in whatever order and granularity it
//! detects them. Before posting, gaps are normalized into a list that is
//! sorted by start time with no two intervals overlapping or touching.

use serde::{Deserialize, Serialize};

/// A gap in captured audio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropoutInterval {
    /// Start time in seconds
    pub start: f64,
    /// Length in seconds
    pub duration: f64,
}

impl DropoutInterval {
    pub fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

impl From<(f64, f64)> for DropoutInterval {
    fn from((start, duration): (f64, f64)) -> Self {
        Self::new(start, duration)
    }
}

/// Posted after recording stops when dropouts were detected.
///
/// Intervals are disjoint and sorted increasingly. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingDropoutEvent {
    intervals: Vec<DropoutInterval>,
}

impl RecordingDropoutEvent {
    /// Merge raw engine gaps into a disjoint, sorted interval list.
    ///
    /// Gaps with a non-finite bound or a non-positive length are dropped.
    pub fn from_gaps<I, G>(gaps: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<DropoutInterval>,
    {
        let mut raw: Vec<DropoutInterval> = gaps
            .into_iter()
            .map(Into::into)
            .filter(|g| g.start.is_finite() && g.duration.is_finite() && g.duration > 0.0)
            .collect();
        raw.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut intervals: Vec<DropoutInterval> = Vec::with_capacity(raw.len());
        for gap in raw {
            match intervals.last_mut() {
                Some(last) if gap.start <= last.end() => {
                    let end = last.end().max(gap.end());
                    last.duration = end - last.start;
                }
                _ => intervals.push(gap),
            }
        }

        Self { intervals }
    }

    pub fn intervals(&self) -> &[DropoutInterval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Total length of audio lost, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.intervals.iter().map(|i| i.duration).sum()
    }
}
