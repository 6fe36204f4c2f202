//! Project Event Bus
//!
//! Fire-and-forget notifications from the transport to UI observers.
//! Events are posted on the UI side only, after engine notifications have
//! been drained from the real-time queue.

pub mod dropout;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use serde::Serialize;

use crate::transport::TransportState;

pub use dropout::{DropoutInterval, RecordingDropoutEvent};

/// Notifications observers can subscribe to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectEvent {
    /// The engine rate changed; the rate field of the status bar is stale.
    StatusBarRefresh { rate: u32 },

    /// Recording stopped and some captured audio was lost.
    RecordingDropout(RecordingDropoutEvent),

    /// Pending recording tracks became part of the project.
    RecordingCommitted { tracks: usize },

    /// Pending recording tracks were thrown away.
    RecordingDiscarded { tracks: usize },

    /// Transport flags changed.
    TransportStateChanged(TransportState),

    /// Something the user must be told about.
    ErrorReported {
        code: String,
        title: String,
        message: String,
    },
}

impl ProjectEvent {
    pub fn error(code: &str, title: &str, message: impl Into<String>) -> Self {
        ProjectEvent::ErrorReported {
            code: code.to_string(),
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Fan-out of project events to any number of subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<ProjectEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event posted from now on.
    pub fn subscribe(&self) -> Receiver<ProjectEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver `event` to all live subscribers; dropped receivers are pruned.
    /// Returns the number of subscribers reached.
    pub fn post(&self, event: ProjectEvent) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
