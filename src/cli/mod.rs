//! CLI Module
//!
//! Command-line front end for exercising the transport against the
//! simulated engine.

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};

use crate::events::DropoutInterval;

/// Nueva Transport - audio transport coordinator
#[derive(Parser, Debug)]
#[command(name = "nueva-transport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Transport configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show rate properties and recording targets for a track list
    #[command(name = "inspect")]
    Inspect {
        /// Track as name:rate[:channels][:flags], flags from s (selected), a (armed)
        #[arg(short, long = "track", required = true)]
        tracks: Vec<TrackSpec>,

        /// Only consider selected tracks as recording targets
        #[arg(long)]
        selected_only: bool,

        /// Only consider recording targets at this rate
        #[arg(long)]
        rate: Option<u32>,

        /// Project rate
        #[arg(long, default_value_t = 44100)]
        project_rate: u32,
    },

    /// Run one transport session on the simulated engine
    #[command(name = "simulate")]
    Simulate {
        /// Track as name:rate[:channels][:flags], flags from s (selected), a (armed)
        #[arg(short, long = "track")]
        tracks: Vec<TrackSpec>,

        /// What the session does
        #[arg(short, long, value_enum, default_value_t = SessionMode::Record)]
        mode: SessionMode,

        /// Use the alternate record gesture
        #[arg(long)]
        alt: bool,

        /// Selection start in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,

        /// Selection end in seconds; defaults to a point selection
        #[arg(long)]
        to: Option<f64>,

        /// Capture gap reported by the engine, as start:duration
        #[arg(long = "gap")]
        gaps: Vec<GapSpec>,

        /// Captured blocks delivered before stopping
        #[arg(long, default_value_t = 4)]
        blocks: u32,

        /// Seconds the stream runs before it is stopped
        #[arg(long, default_value_t = 1.0)]
        run_for: f64,

        /// Length of every described track in seconds
        #[arg(long, default_value_t = 10.0)]
        length: f64,

        /// Project rate
        #[arg(long, default_value_t = 44100)]
        project_rate: u32,
    },
}

/// Kind of session `simulate` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SessionMode {
    Record,
    Play,
    Loop,
    CutPreview,
}

/// A track described on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSpec {
    pub name: String,
    pub rate: u32,
    pub channels: u16,
    pub selected: bool,
    pub armed: bool,
}

impl FromStr for TrackSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let name = parts
            .next()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| format!("missing track name in '{}'", s))?;
        let rate = parts
            .next()
            .ok_or_else(|| format!("missing rate in '{}'", s))?
            .parse::<u32>()
            .map_err(|e| format!("invalid rate in '{}': {}", s, e))?;

        let mut spec = TrackSpec {
            name: name.to_string(),
            rate,
            channels: 1,
            selected: false,
            armed: false,
        };

        for part in parts {
            if let Ok(channels) = part.parse::<u16>() {
                if channels == 0 {
                    return Err(format!("track '{}' needs at least one channel", name));
                }
                spec.channels = channels;
                continue;
            }
            for flag in part.chars() {
                match flag {
                    's' => spec.selected = true,
                    'a' => spec.armed = true,
                    other => return Err(format!("unknown track flag '{}' in '{}'", other, s)),
                }
            }
        }

        Ok(spec)
    }
}

impl fmt::Display for TrackSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.rate, self.channels)?;
        if self.selected || self.armed {
            write!(f, ":")?;
            if self.selected {
                write!(f, "s")?;
            }
            if self.armed {
                write!(f, "a")?;
            }
        }
        Ok(())
    }
}

/// A capture gap given as `start:duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapSpec(pub DropoutInterval);

impl FromStr for GapSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (start, duration) = s
            .split_once(':')
            .ok_or_else(|| format!("expected start:duration, got '{}'", s))?;
        let start = start
            .parse::<f64>()
            .map_err(|e| format!("invalid gap start '{}': {}", start, e))?;
        let duration = duration
            .parse::<f64>()
            .map_err(|e| format!("invalid gap duration '{}': {}", duration, e))?;
        Ok(GapSpec(DropoutInterval::new(start, duration)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_spec() {
        let spec: TrackSpec = "Vocals:48000:2:sa".parse().unwrap();
        assert_eq!(
            spec,
            TrackSpec {
                name: "Vocals".to_string(),
                rate: 48000,
                channels: 2,
                selected: true,
                armed: true,
            }
        );
        assert_eq!(spec.to_string(), "Vocals:48000:2:sa");
    }

    #[test]
    fn test_parse_minimal_track_spec() {
        let spec: TrackSpec = "Bass:44100".parse().unwrap();
        assert_eq!(spec.channels, 1);
        assert!(!spec.selected && !spec.armed);

        let spec: TrackSpec = "Gtr:44100:a".parse().unwrap();
        assert!(spec.armed);
    }

    #[test]
    fn test_reject_bad_track_specs() {
        assert!("".parse::<TrackSpec>().is_err());
        assert!("Vox".parse::<TrackSpec>().is_err());
        assert!("Vox:fast".parse::<TrackSpec>().is_err());
        assert!("Vox:44100:0".parse::<TrackSpec>().is_err());
        assert!("Vox:44100:x".parse::<TrackSpec>().is_err());
    }

    #[test]
    fn test_parse_gap_spec() {
        let gap: GapSpec = "2.0:0.5".parse().unwrap();
        assert_eq!(gap.0, DropoutInterval::new(2.0, 0.5));
        assert!("2.0".parse::<GapSpec>().is_err());
    }

    #[test]
    fn test_cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "nueva-transport",
            "simulate",
            "--track",
            "A:44100:sa",
            "--gap",
            "2.0:0.5",
            "--gap",
            "1.0:0.3",
            "--mode",
            "cut-preview",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Simulate { tracks, gaps, mode, .. }) => {
                assert_eq!(tracks.len(), 1);
                assert_eq!(gaps.len(), 2);
                assert_eq!(mode, SessionMode::CutPreview);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
