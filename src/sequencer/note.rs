// Note representation for the sequencer
// A note is a pitch placed in beat time with a duration, velocity and channel

use crate::error::{SequencerError, SequencerResult};

/// A musical note in the sequencer
///
/// Positions and durations are in beats, independent of tempo and sample rate.
/// Notes are validated on construction and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    note: u8,
    velocity: u8,
    channel: u8,
    position: f64,
    duration: f64,
}

impl NoteEvent {
    /// Creates a validated note
    pub fn new(
        note: u8,
        velocity: u8,
        channel: u8,
        position: f64,
        duration: f64,
    ) -> SequencerResult<Self> {
        if note > 127 {
            return Err(SequencerError::InvalidEvent(format!(
                "note number {} outside 0-127",
                note
            )));
        }
        if velocity > 127 {
            return Err(SequencerError::InvalidEvent(format!(
                "velocity {} outside 0-127",
                velocity
            )));
        }
        if channel > 15 {
            return Err(SequencerError::InvalidEvent(format!(
                "channel {} outside 0-15",
                channel
            )));
        }
        if !position.is_finite() || position < 0.0 {
            return Err(SequencerError::InvalidEvent(format!(
                "position {} must be a finite beat offset >= 0",
                position
            )));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(SequencerError::InvalidEvent(format!(
                "duration {} must be a finite number of beats > 0",
                duration
            )));
        }

        Ok(Self {
            note,
            velocity,
            channel,
            position,
            duration,
        })
    }

    /// MIDI note number (0-127, where 60 = C4)
    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Start position in beats
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Duration in beats
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Beat at which the note is released
    pub fn end(&self) -> f64 {
        self.position + self.duration
    }
}
