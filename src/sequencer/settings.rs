// Sequence settings - immutable snapshot of length, tempo and loop behaviour

use crate::error::{SequencerError, SequencerResult};

/// Length, tempo and looping of a sequence. Replaced wholesale on every change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceSettings {
    length: f64,
    tempo: f64,
    loop_enabled: bool,
    max_loops: u32,
}

impl SequenceSettings {
    /// Creates validated settings.
    ///
    /// `max_loops` of 0 loops forever.
    pub fn new(length: f64, tempo: f64, loop_enabled: bool, max_loops: u32) -> SequencerResult<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(SequencerError::InvalidSettings(format!(
                "length {} must be > 0 beats",
                length
            )));
        }
        if !tempo.is_finite() || tempo <= 0.0 {
            return Err(SequencerError::InvalidSettings(format!(
                "tempo {} must be > 0 BPM",
                tempo
            )));
        }

        Ok(Self {
            length,
            tempo,
            loop_enabled,
            max_loops,
        })
    }

    /// Length in beats
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Tempo in beats per minute
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    /// Number of loop iterations to play, 0 = infinite
    pub fn max_loops(&self) -> u32 {
        self.max_loops
    }

    pub fn with_length(self, length: f64) -> SequencerResult<Self> {
        Self::new(length, self.tempo, self.loop_enabled, self.max_loops)
    }

    pub fn with_tempo(self, tempo: f64) -> SequencerResult<Self> {
        Self::new(self.length, tempo, self.loop_enabled, self.max_loops)
    }

    pub fn with_loop_enabled(self, loop_enabled: bool) -> Self {
        Self {
            loop_enabled,
            ..self
        }
    }

    pub fn with_max_loops(self, max_loops: u32) -> Self {
        Self { max_loops, ..self }
    }
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            length: 4.0,
            tempo: 120.0,
            loop_enabled: true,
            max_loops: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SequenceSettings::default();
        assert_eq!(settings.length(), 4.0);
        assert_eq!(settings.tempo(), 120.0);
        assert!(settings.loop_enabled());
        assert_eq!(settings.max_loops(), 0);
    }

    #[test]
    fn test_rejects_bad_length_and_tempo() {
        assert!(SequenceSettings::new(0.0, 120.0, true, 0).is_err());
        assert!(SequenceSettings::new(-1.0, 120.0, true, 0).is_err());
        assert!(SequenceSettings::new(4.0, 0.0, true, 0).is_err());
        assert!(SequenceSettings::new(4.0, f64::NAN, true, 0).is_err());
    }

    #[test]
    fn test_with_replaces_one_field() {
        let settings = SequenceSettings::default().with_tempo(90.0).unwrap();
        assert_eq!(settings.tempo(), 90.0);
        assert_eq!(settings.length(), 4.0);

        let settings = settings.with_loop_enabled(false).with_max_loops(3);
        assert!(!settings.loop_enabled());
        assert_eq!(settings.max_loops(), 3);
    }

    #[test]
    fn test_failed_with_leaves_original() {
        let settings = SequenceSettings::default();
        assert!(settings.with_length(0.0).is_err());
        assert_eq!(settings.length(), 4.0);
    }
}
