// MIDI channel-voice messages - encoding for the sink

/// Controller number of the "All Notes Off" channel-mode message
pub const ALL_NOTES_OFF: u8 = 123;

/// Number of MIDI channels
pub const CHANNEL_COUNT: u8 = 16;

/// A 3-byte channel-voice message as handed to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl MidiMessage {
    /// "All Notes Off" on one channel, used as the global reset signal by panic
    pub fn all_notes_off(channel: u8) -> Self {
        MidiMessage::ControlChange {
            channel,
            controller: ALL_NOTES_OFF,
            value: 0,
        }
    }

    /// Encode as raw bytes.
    ///
    /// NoteOn is `[0x90|channel, note, velocity]`, NoteOff is `[0x80|channel, note, 0]`.
    /// Out-of-range channel and data values are masked into range.
    pub fn to_bytes(self) -> [u8; 3] {
        match self {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::NoteOff { channel, note } => [0x80 | (channel & 0x0F), note & 0x7F, 0],
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => [0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F],
        }
    }
}
