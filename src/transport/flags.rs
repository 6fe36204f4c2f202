//! Command enablement flags
//!
//! Named predicates a generic command layer can evaluate to decide whether
//! an action is currently legal for a project.

use std::fmt;

use crate::transport::ProjectAudioManager;

/// A named predicate over a project's transport.
#[derive(Clone, Copy)]
pub struct CommandFlag {
    pub name: &'static str,
    predicate: fn(&ProjectAudioManager) -> bool,
}

impl CommandFlag {
    pub fn new(name: &'static str, predicate: fn(&ProjectAudioManager) -> bool) -> Self {
        Self { name, predicate }
    }

    pub fn is_enabled(&self, manager: &ProjectAudioManager) -> bool {
        (self.predicate)(manager)
    }
}

impl fmt::Debug for CommandFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFlag").field("name", &self.name).finish()
    }
}

fn can_stop_audio_stream(manager: &ProjectAudioManager) -> bool {
    manager.can_stop_audio_stream()
}

fn audio_io_not_busy(manager: &ProjectAudioManager) -> bool {
    !manager.engine().is_busy()
}

static CAN_STOP_AUDIO_STREAM: CommandFlag = CommandFlag {
    name: "CanStopAudioStream",
    predicate: can_stop_audio_stream,
};

static AUDIO_IO_NOT_BUSY: CommandFlag = CommandFlag {
    name: "AudioIONotBusy",
    predicate: audio_io_not_busy,
};

/// Enabled when this project may stop the active stream (or none is active).
pub fn can_stop_audio_stream_flag() -> &'static CommandFlag {
    &CAN_STOP_AUDIO_STREAM
}

/// Enabled when the engine has no open stream.
pub fn audio_io_not_busy_flag() -> &'static CommandFlag {
    &AUDIO_IO_NOT_BUSY
}
