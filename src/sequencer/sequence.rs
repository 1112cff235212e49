// Note event sequence - accumulates notes and expands them into ordered triggers
// Control-thread only: it never touches engine state, it only produces snapshots

use crate::error::SequencerResult;
use crate::sequencer::event::{TriggerEvent, TriggerKind};
use crate::sequencer::note::NoteEvent;

/// Velocity used by [`NoteEventSequence::add`]
pub const DEFAULT_VELOCITY: u8 = 127;

/// An editable list of notes, kept in add-order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteEventSequence {
    notes: Vec<NoteEvent>,
}

impl NoteEventSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note with full velocity on channel 0
    pub fn add(&mut self, note: u8, position: f64, duration: f64) -> SequencerResult<()> {
        self.add_with(note, DEFAULT_VELOCITY, 0, position, duration)
    }

    /// Add a note with explicit velocity and channel
    pub fn add_with(
        &mut self,
        note: u8,
        velocity: u8,
        channel: u8,
        position: f64,
        duration: f64,
    ) -> SequencerResult<()> {
        let event = NoteEvent::new(note, velocity, channel, position, duration)?;
        self.notes.push(event);
        Ok(())
    }

    /// Add an already validated note
    pub fn add_note(&mut self, note: NoteEvent) {
        self.notes.push(note);
    }

    /// Remove every note starting at `position`. Returns how many were removed.
    pub fn remove_note_at(&mut self, position: f64) -> usize {
        let before = self.notes.len();
        self.notes.retain(|n| n.position() != position);
        before - self.notes.len()
    }

    /// Remove every note with this note number. Returns how many were removed.
    pub fn remove_all_instances_of(&mut self, note: u8) -> usize {
        let before = self.notes.len();
        self.notes.retain(|n| n.note() != note);
        before - self.notes.len()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Notes in add-order
    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Expand every note into its On and Off trigger and sort them.
    ///
    /// Ascending beat; equal beats put NoteOff before NoteOn, then keep add-order.
    /// The result depends only on the notes and their order, so calling this twice
    /// on an unmodified sequence yields identical lists.
    pub fn ordered_events(&self) -> Vec<TriggerEvent> {
        let mut events = Vec::with_capacity(self.notes.len() * 2);

        for (source_index, note) in self.notes.iter().enumerate() {
            events.push(TriggerEvent {
                beat: note.position(),
                note: note.note(),
                velocity: note.velocity(),
                channel: note.channel(),
                kind: TriggerKind::NoteOn,
                source_index,
            });
            events.push(TriggerEvent {
                beat: note.end(),
                note: note.note(),
                velocity: 0,
                channel: note.channel(),
                kind: TriggerKind::NoteOff,
                source_index,
            });
        }

        events.sort_by(|a, b| a.schedule_cmp(b));
        events
    }
}
