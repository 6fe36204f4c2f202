//! Transport configuration
//!
//! Every policy constant the coordinator needs (duplex preference, recording
//! channel count, cut-preview margins, sound activation level, track naming)
//! comes from here. Loaded from JSON; missing fields fall back to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};

/// Default length of audio played before a prospective cut, in seconds.
const DEFAULT_CUT_PREVIEW_BEFORE_SECS: f64 = 2.0;

/// Default length of audio played after a prospective cut, in seconds.
const DEFAULT_CUT_PREVIEW_AFTER_SECS: f64 = 1.0;

/// Default sound activation level in dBFS.
const DEFAULT_SOUND_ACTIVATION_LEVEL_DB: f64 = -50.0;

/// Default capacity of the engine notification queue.
const DEFAULT_NOTIFICATION_QUEUE_CAPACITY: usize = 64;

/// Smallest notification queue that still holds one session's lifecycle
/// notifications plus the coalesced ones.
pub const MIN_NOTIFICATION_QUEUE_CAPACITY: usize = 8;

/// Transport preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Play existing tracks while recording.
    pub duplex: bool,

    /// Record into new tracks unless the alternate record gesture is used.
    pub prefer_new_track_record: bool,

    /// Number of input channels captured by a recording.
    pub recording_channels: u16,

    /// Only record into existing tracks whose channels add up to
    /// `recording_channels`.
    pub match_recording_channels: bool,

    /// Seconds of audio played before the cut during cut preview.
    pub cut_preview_before_secs: f64,

    /// Seconds of audio played after the cut during cut preview.
    pub cut_preview_after_secs: f64,

    /// Pause capture while the input stays below the activation level.
    pub sound_activated_record: bool,

    /// Input level that starts capture, in dBFS.
    pub sound_activation_level_db: f64,

    /// Capacity of the engine-to-UI notification queue.
    pub notification_queue_capacity: usize,

    /// Names given to tracks created for a recording.
    pub track_naming: TrackNamingConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            duplex: true,
            prefer_new_track_record: false,
            recording_channels: 2,
            match_recording_channels: false,
            cut_preview_before_secs: DEFAULT_CUT_PREVIEW_BEFORE_SECS,
            cut_preview_after_secs: DEFAULT_CUT_PREVIEW_AFTER_SECS,
            sound_activated_record: false,
            sound_activation_level_db: DEFAULT_SOUND_ACTIVATION_LEVEL_DB,
            notification_queue_capacity: DEFAULT_NOTIFICATION_QUEUE_CAPACITY,
            track_naming: TrackNamingConfig::default(),
        }
    }
}

/// Naming preferences for newly recorded tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackNamingConfig {
    pub default_track_name: String,
    pub recording_name_custom: bool,
    pub recording_track_name: String,
    pub use_track_number: bool,
    pub use_date_stamp: bool,
    pub use_time_stamp: bool,
}

impl Default for TrackNamingConfig {
    fn default() -> Self {
        Self {
            default_track_name: "Audio".to_string(),
            recording_name_custom: false,
            recording_track_name: String::new(),
            use_track_number: false,
            use_date_stamp: false,
            use_time_stamp: false,
        }
    }
}

impl TrackNamingConfig {
    /// Base name before any number or stamp suffix is applied.
    pub fn base_name(&self) -> &str {
        if self.recording_name_custom {
            &self.recording_track_name
        } else {
            &self.default_track_name
        }
    }
}

impl TransportConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TransportError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| TransportError::ConfigReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config = Self::from_json(&content)?;
        tracing::debug!("Loaded transport config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the transport cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.recording_channels == 0 {
            return Err(TransportError::InvalidConfig {
                reason: "recording_channels must be at least 1".to_string(),
            });
        }

        if !(self.cut_preview_before_secs >= 0.0 && self.cut_preview_after_secs >= 0.0) {
            return Err(TransportError::InvalidConfig {
                reason: "cut preview lengths must be non-negative".to_string(),
            });
        }

        if self.notification_queue_capacity < MIN_NOTIFICATION_QUEUE_CAPACITY {
            return Err(TransportError::InvalidConfig {
                reason: format!(
                    "notification_queue_capacity must be at least {}",
                    MIN_NOTIFICATION_QUEUE_CAPACITY
                ),
            });
        }

        if !self.sound_activation_level_db.is_finite() || self.sound_activation_level_db > 0.0 {
            return Err(TransportError::InvalidConfig {
                reason: "sound_activation_level_db must be a finite dBFS value <= 0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = TransportConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.duplex);
        assert_eq!(config.recording_channels, 2);
        assert!(!config.match_recording_channels);
        assert_eq!(config.track_naming.base_name(), "Audio");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TransportConfig::from_json(r#"{ "duplex": false }"#).unwrap();
        assert!(!config.duplex);
        assert_eq!(config.cut_preview_before_secs, 2.0);
        assert_eq!(config.notification_queue_capacity, 64);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = TransportConfig::from_json(r#"{ "recording_channels": 0 }"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");

        let err =
            TransportConfig::from_json(r#"{ "notification_queue_capacity": 2 }"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");

        let err = TransportConfig::from_json(r#"{ "cut_preview_after_secs": -1.0 }"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_custom_recording_name() {
        let config = TransportConfig::from_json(
            r#"{ "track_naming": { "recording_name_custom": true, "recording_track_name": "Take" } }"#,
        )
        .unwrap();
        assert_eq!(config.track_naming.base_name(), "Take");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "recording_channels": 1, "sound_activated_record": true }}"#).unwrap();

        let config = TransportConfig::load(file.path()).unwrap();
        assert_eq!(config.recording_channels, 1);
        assert!(config.sound_activated_record);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TransportConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_NOT_FOUND");
    }
}
