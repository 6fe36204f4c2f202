//! Error handling for the transport coordinator
//!
//! Policy rejections (stopping a stream owned by another project, starting
//! while a stop is in progress) are not errors: they surface as `false` or
//! `None` returns. This type covers configuration, engine and state machine
//! failures.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;
use crate::transport::TransportPhase;

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Main error type for transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    // Configuration Errors
    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read config file: {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    // Engine Errors
    #[error("Audio engine error: {0}")]
    Engine(#[from] EngineError),

    // State Machine Errors
    #[error("Cannot {action} while transport is {phase}")]
    InvalidTransition {
        phase: TransportPhase,
        action: &'static str,
    },

    #[error("Illegal transport state: {reason}")]
    IllegalState { reason: String },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            TransportError::ConfigReadError { .. } => "CONFIG_READ_ERROR",
            TransportError::InvalidConfig { .. } => "INVALID_CONFIG",
            TransportError::Engine(err) => err.error_code(),
            TransportError::InvalidTransition { .. } => "INVALID_TRANSITION",
            TransportError::IllegalState { .. } => "ILLEGAL_STATE",
            TransportError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the transport in a clean stopped state and the
    /// user may simply try again.
    pub fn is_recoverable(&self) -> bool {
        match self {
            TransportError::Engine(err) => err.is_recoverable(),
            TransportError::InvalidTransition { .. } => true,
            TransportError::ConfigNotFound { .. } => true,
            TransportError::IllegalState { .. } => false,
            _ => false,
        }
    }
}
