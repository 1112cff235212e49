// Sequencer configuration - explicit context passed to each track

use std::path::Path;

use ron::{from_str as ron_from_str, ser::PrettyConfig, ser::to_string_pretty as ron_to_string};
use serde::{Deserialize, Serialize};

use crate::error::{SequencerError, SequencerResult};

/// Per-track settings that are not part of the musical sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Used until the host node reports its own rate
    pub sample_rate: f64,
    /// Virtual MIDI cable passed to the sink
    pub cable: u8,
    pub default_velocity: u8,
    pub default_channel: u8,
    /// Capacity of the preallocated sounding-note table
    pub max_sounding_notes: usize,
    /// Transport command ring size
    pub command_capacity: usize,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            cable: 0,
            default_velocity: 127,
            default_channel: 0,
            max_sounding_notes: 256,
            command_capacity: 64,
        }
    }
}

impl SequencerConfig {
    /// Parse and validate a RON document. Missing fields keep their defaults.
    pub fn from_ron_str(ron_data: &str) -> SequencerResult<Self> {
        let config: Self = ron_from_str(ron_data).map_err(|e| {
            SequencerError::Config(format!("Failed to deserialize from RON: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a RON file
    pub fn load(path: impl AsRef<Path>) -> SequencerResult<Self> {
        let ron_data = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_ron_str(&ron_data)?;
        log::debug!("loaded sequencer config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn to_ron_string(&self) -> SequencerResult<String> {
        ron_to_string(self, PrettyConfig::default())
            .map_err(|e| SequencerError::Config(format!("Failed to serialize to RON: {}", e)))
    }

    pub fn validate(&self) -> SequencerResult<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(SequencerError::Config(format!(
                "sample_rate {} must be > 0",
                self.sample_rate
            )));
        }
        if self.default_velocity > 127 {
            return Err(SequencerError::Config(format!(
                "default_velocity {} out of range 0-127",
                self.default_velocity
            )));
        }
        if self.default_channel > 15 {
            return Err(SequencerError::Config(format!(
                "default_channel {} out of range 0-15",
                self.default_channel
            )));
        }
        if self.max_sounding_notes == 0 || self.command_capacity == 0 {
            return Err(SequencerError::Config(
                "max_sounding_notes and command_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
