//! Transport Coordination
//!
//! Decides what one project's transport is doing and drives the shared audio
//! engine accordingly:
//! - `selection` and `rate`: which tracks take part and at what rate
//! - `state`: the phase and modifiers of the transport
//! - `ownership`: which project may stop the running stream
//! - `bridge`: the engine listener and its notification queue
//! - `manager`: the facade the command layer calls

pub mod bridge;
pub mod flags;
pub mod manager;
pub mod ownership;
pub mod rate;
pub mod selection;
pub mod state;

pub use bridge::{AudioEngineBridge, EngineNotification};
pub use flags::{audio_io_not_busy_flag, can_stop_audio_stream_flag, CommandFlag};
pub use manager::ProjectAudioManager;
pub use ownership::StreamOwnershipGuard;
pub use rate::{
    default_play_options, default_speed_play_options, get_properties_of_selected, use_duplex,
    PropertiesOfSelected, RATE_NOT_SELECTED,
};
pub use selection::{choose_existing_recording_tracks, get_all_playback_tracks};
pub use state::{PlayMode, TransportModifiers, TransportPhase, TransportState};
