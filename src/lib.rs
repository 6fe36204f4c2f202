//! Nueva Transport - Audio Transport Coordination
//!
//! The play/record/pause/stop layer of an audio editor. For each open
//! project it decides what the transport is doing, which tracks take part in
//! an operation and at what rate, and turns notifications from the real-time
//! audio engine into ordered project updates and user-visible events.
//!
//! # Architecture
//!
//! - `tracks` / `project`: the slice of the project model the transport reads
//! - `engine`: the engine control surface and listener contract
//! - `transport`: selection policy, state machine, ownership, engine bridge
//!   and the `ProjectAudioManager` facade
//! - `events`: what observers are told
//!
//! Engine callbacks never block: they enqueue into a bounded channel that the
//! UI side drains with `ProjectAudioManager::process_notifications`.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod project;
pub mod tracks;
pub mod transport;

pub use config::TransportConfig;
pub use engine::{AudioEngine, AudioIoListener, SimulatedEngine, StreamOptions, StreamToken};
pub use error::{Result, TransportError};
pub use events::{EventBus, ProjectEvent, RecordingDropoutEvent};
pub use project::{Project, ProjectId, SelectedRegion};
pub use tracks::{Track, TrackId, TrackKind, TrackList, TransportTracks};
pub use transport::{PlayMode, ProjectAudioManager, TransportPhase, TransportState};
