//! Transport State Machine
//!
//! One explicit phase (idle, playing, recording, stopping) plus orthogonal
//! modifiers (paused, appending, looping, cutting). Every transition checks
//! the resulting combination so impossible states cannot arise:
//! - Idle carries no modifiers
//! - Appending only while recording (or while that recording is stopping)
//! - Paused only while a stream is playing or recording

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};

/// How the last play operation was started. Fixed once play begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    #[default]
    NormalPlay,
    /// Disables auto-scrolling
    OneSecondPlay,
    /// Possibly looped play; disables auto-scrolling
    LoopedPlay,
    CutPreviewPlay,
}

impl PlayMode {
    /// Whether the UI should stop following the play head.
    pub fn suppresses_auto_scroll(&self) -> bool {
        matches!(self, PlayMode::OneSecondPlay | PlayMode::LoopedPlay)
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayMode::NormalPlay => write!(f, "Normal"),
            PlayMode::OneSecondPlay => write!(f, "One Second"),
            PlayMode::LoopedPlay => write!(f, "Looped"),
            PlayMode::CutPreviewPlay => write!(f, "Cut Preview"),
        }
    }
}

/// The exclusive part of the transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportPhase {
    #[default]
    Idle,
    Playing,
    Recording,
    /// A stop sequence is in progress
    Stopping,
}

impl fmt::Display for TransportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportPhase::Idle => write!(f, "Idle"),
            TransportPhase::Playing => write!(f, "Playing"),
            TransportPhase::Recording => write!(f, "Recording"),
            TransportPhase::Stopping => write!(f, "Stopping"),
        }
    }
}

/// Modifiers layered on top of the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransportModifiers {
    pub paused: bool,
    /// The last record request appends to existing tracks
    pub appending: bool,
    /// Potentially looping play
    pub looping: bool,
    /// Cut preview play
    pub cutting: bool,
}

/// Authoritative transport state of one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransportState {
    phase: TransportPhase,
    modifiers: TransportModifiers,
    /// Phase that was active when the current stop sequence began
    #[serde(skip)]
    stopping_from: Option<TransportPhase>,
}

impl TransportState {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(phase: TransportPhase, modifiers: TransportModifiers) -> Result<()> {
        let illegal = |reason: &str| {
            Err(TransportError::IllegalState {
                reason: format!("{} while {}", reason, phase),
            })
        };

        match phase {
            TransportPhase::Idle if modifiers != TransportModifiers::default() => {
                illegal("modifiers set")
            }
            TransportPhase::Playing if modifiers.appending => illegal("appending"),
            _ => Ok(()),
        }
    }

    fn apply(&mut self, phase: TransportPhase, modifiers: TransportModifiers) -> Result<()> {
        Self::validate(phase, modifiers)?;
        if phase != self.phase {
            tracing::debug!("[TRANSPORT] {} -> {}", self.phase, phase);
        }
        self.phase = phase;
        self.modifiers = modifiers;
        Ok(())
    }

    fn require_idle(&self, action: &'static str) -> Result<()> {
        if self.phase == TransportPhase::Idle {
            Ok(())
        } else {
            Err(TransportError::InvalidTransition {
                phase: self.phase,
                action,
            })
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Idle -> Playing. Looping and cutting follow the play mode.
    pub fn begin_playback(&mut self, mode: PlayMode) -> Result<()> {
        self.require_idle("start playback")?;
        self.apply(
            TransportPhase::Playing,
            TransportModifiers {
                looping: mode == PlayMode::LoopedPlay,
                cutting: mode == PlayMode::CutPreviewPlay,
                ..Default::default()
            },
        )
    }

    /// Idle -> Recording.
    pub fn begin_recording(&mut self, appending: bool) -> Result<()> {
        self.require_idle("start recording")?;
        self.apply(
            TransportPhase::Recording,
            TransportModifiers {
                appending,
                ..Default::default()
            },
        )
    }

    /// Flip the pause modifier of an active stream.
    ///
    /// Returns the new pause state, or `None` when nothing is playing or
    /// recording (pausing a stopped transport does nothing).
    pub fn toggle_pause(&mut self) -> Option<bool> {
        match self.phase {
            TransportPhase::Playing | TransportPhase::Recording => {
                self.modifiers.paused = !self.modifiers.paused;
                Some(self.modifiers.paused)
            }
            _ => None,
        }
    }

    /// Enter Stopping from any phase; modifiers stay until the stop finishes.
    ///
    /// Returns false if a stop is already in progress.
    pub fn begin_stopping(&mut self) -> bool {
        if self.phase == TransportPhase::Stopping {
            return false;
        }
        self.stopping_from = Some(self.phase);
        // Stopping accepts every modifier combination, so this cannot fail.
        self.phase = TransportPhase::Stopping;
        tracing::debug!("[TRANSPORT] stopping");
        true
    }

    /// Clear every modifier and return to Idle.
    pub fn finish_stopping(&mut self) {
        self.phase = TransportPhase::Idle;
        self.modifiers = TransportModifiers::default();
        self.stopping_from = None;
        tracing::debug!("[TRANSPORT] stopped");
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn phase(&self) -> TransportPhase {
        self.phase
    }

    pub fn modifiers(&self) -> TransportModifiers {
        self.modifiers
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TransportPhase::Idle
    }

    pub fn is_playing(&self) -> bool {
        self.phase == TransportPhase::Playing
    }

    pub fn is_recording(&self) -> bool {
        self.phase == TransportPhase::Recording
    }

    /// Phase the transport was in when the current stop began.
    pub fn stopping_from(&self) -> Option<TransportPhase> {
        self.stopping_from
    }

    pub fn paused(&self) -> bool {
        self.modifiers.paused
    }

    pub fn appending(&self) -> bool {
        self.modifiers.appending
    }

    pub fn looping(&self) -> bool {
        self.modifiers.looping
    }

    pub fn cutting(&self) -> bool {
        self.modifiers.cutting
    }

    pub fn stopping(&self) -> bool {
        self.phase == TransportPhase::Stopping
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phase)?;
        let m = self.modifiers;
        for (set, name) in [
            (m.paused, "paused"),
            (m.appending, "appending"),
            (m.looping, "looping"),
            (m.cutting, "cutting"),
        ] {
            if set {
                write!(f, "+{}", name)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
