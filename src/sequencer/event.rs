// Trigger events - the discrete On/Off instants derived from notes

use std::cmp::Ordering;

use crate::midi::event::MidiMessage;

/// Kind of trigger. Declaration order is the tie-break order: Off sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TriggerKind {
    NoteOff,
    NoteOn,
}

/// A scheduled On or Off in beat time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    pub beat: f64,
    pub note: u8,
    pub velocity: u8,
    pub channel: u8,
    pub kind: TriggerKind,
    /// Add-order of the originating note, used only to break time ties
    pub source_index: usize,
}

impl TriggerEvent {
    /// Total order used for the ordered event list: beat, then Off before On,
    /// then add-order.
    pub fn schedule_cmp(&self, other: &Self) -> Ordering {
        self.beat
            .total_cmp(&other.beat)
            .then(self.kind.cmp(&other.kind))
            .then(self.source_index.cmp(&other.source_index))
    }

    /// The channel-voice message this trigger sends
    pub fn message(&self) -> MidiMessage {
        match self.kind {
            TriggerKind::NoteOn => MidiMessage::NoteOn {
                channel: self.channel,
                note: self.note,
                velocity: self.velocity,
            },
            TriggerKind::NoteOff => MidiMessage::NoteOff {
                channel: self.channel,
                note: self.note,
            },
        }
    }
}
