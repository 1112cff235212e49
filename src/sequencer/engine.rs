// Sequencer engine - Converts ordered trigger events into sample-accurate MIDI
// Owned by the render path: every method here runs to completion without
// allocating, locking or blocking.

use crate::audio::timing::{frames_to_beats, samples_per_beat};
use crate::messaging::command::TransportCommand;
use crate::midi::event::{CHANNEL_COUNT, MidiMessage};
use crate::sequencer::event::{TriggerEvent, TriggerKind};
use crate::sequencer::settings::SequenceSettings;
use crate::sequencer::transport::TransportState;

/// Default capacity of the sounding-note table
pub const DEFAULT_MAX_SOUNDING_NOTES: usize = 256;

/// A key whose On has been sent and whose Off has not.
/// `count` is the number of unreleased Ons for the same note and channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SoundingNote {
    note: u8,
    channel: u8,
    count: u32,
}

/// Real-time scheduler for one track.
///
/// Playback position is a continuous beat accumulator: each render call advances
/// it by exactly the beat span of the buffer, so the fractional phase between the
/// buffer grid and the event grid carries over from call to call and from loop
/// iteration to loop iteration.
#[derive(Debug)]
pub struct SequencerEngine {
    position: f64,
    state: TransportState,
    current_loop: u32,
    /// One entry per sounding key, in first-trigger order; never grows past `max_sounding`
    sounding: Vec<SoundingNote>,
    max_sounding: usize,
}

impl SequencerEngine {
    /// Create an engine whose sounding-note table holds `max_sounding_notes`.
    /// This is the only allocation the engine ever makes.
    pub fn new(max_sounding_notes: usize) -> Self {
        let max_sounding = max_sounding_notes.max(1);
        Self {
            position: 0.0,
            state: TransportState::Stopped,
            current_loop: 0,
            sounding: Vec::with_capacity(max_sounding),
            max_sounding,
        }
    }

    /// Playhead in beats (may be negative after `play_after_delay`)
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Index of the loop iteration being played, starting at 0
    pub fn current_loop(&self) -> u32 {
        self.current_loop
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Number of distinct keys currently sounding
    pub fn sounding_count(&self) -> usize {
        self.sounding.len()
    }

    /// Start playing from the current position. No-op when already playing.
    pub fn play(&mut self) {
        self.state = TransportState::Playing;
    }

    /// Reset position and loop counter, then play
    pub fn play_from_start(&mut self) {
        self.position = 0.0;
        self.current_loop = 0;
        self.state = TransportState::Playing;
    }

    /// Start after `beats` of silence: events become reachable once the playhead
    /// crosses 0.
    pub fn play_after_delay(&mut self, beats: f64) {
        self.seek(-beats);
        self.play();
    }

    /// Move the playhead. Play state and sounding notes are left alone.
    pub fn seek(&mut self, position: f64) {
        if position.is_finite() {
            self.position = position;
        }
    }

    pub fn rewind(&mut self) {
        self.seek(0.0);
    }

    /// Stop and release every sounding note, in trigger order, at offset 0
    pub fn stop(&mut self, emit: &mut impl FnMut(u32, MidiMessage)) {
        self.state = TransportState::Stopped;
        self.release_all(0, emit);
    }

    /// Release every sounding note without stopping the transport
    pub fn stop_playing_notes(&mut self, emit: &mut impl FnMut(u32, MidiMessage)) {
        self.release_all(0, emit);
    }

    /// Stop, release sounding notes, then send "All Notes Off" on every channel
    /// so a receiver is silenced even if note bookkeeping went wrong.
    pub fn panic(&mut self, emit: &mut impl FnMut(u32, MidiMessage)) {
        self.stop(emit);
        for channel in 0..CHANNEL_COUNT {
            emit(0, MidiMessage::all_notes_off(channel));
        }
    }

    /// Apply a queued transport command
    pub fn apply(&mut self, command: TransportCommand, emit: &mut impl FnMut(u32, MidiMessage)) {
        match command {
            TransportCommand::Play => self.play(),
            TransportCommand::PlayFromStart => self.play_from_start(),
            TransportCommand::PlayFrom(position) => {
                self.seek(position);
                self.play();
            }
            TransportCommand::Stop => self.stop(emit),
            TransportCommand::Seek(position) => self.seek(position),
            TransportCommand::StopPlayingNotes => self.stop_playing_notes(emit),
            TransportCommand::Panic => self.panic(emit),
        }
    }

    /// Render one buffer of `frame_count` frames.
    ///
    /// Emits `(sample offset within the buffer, message)` for every trigger whose
    /// beat falls in `[position, position + window)`, in ascending beat order, then
    /// advances the playhead by the window. A window crossing the loop end is split
    /// at the boundary. Notes still sounding there carry into the next iteration,
    /// except at the final wrap of a finite loop, where they are released.
    pub fn render(
        &mut self,
        events: &[TriggerEvent],
        settings: &SequenceSettings,
        sample_rate: f64,
        frame_count: u32,
        emit: &mut impl FnMut(u32, MidiMessage),
    ) {
        if !self.state.is_playing() || frame_count == 0 || sample_rate <= 0.0 {
            return;
        }

        let tempo = settings.tempo();
        let length = settings.length();
        let window = frames_to_beats(frame_count, sample_rate, tempo);
        let grid = BufferGrid {
            samples_per_beat: samples_per_beat(sample_rate, tempo),
            last_frame: frame_count - 1,
        };

        if !settings.loop_enabled() {
            let start = self.position;
            let end = start + window;
            self.emit_span(events, start, end.min(length), 0.0, &grid, emit);
            self.position = end;
            if end >= length {
                self.release_all(grid.offset(length - start), emit);
                self.state = TransportState::Stopped;
            }
            return;
        }

        let mut segment_start = self.position;
        // beats of this buffer already rendered, the offset base of the next segment
        let mut consumed = 0.0;
        let mut remaining = window;

        while segment_start + remaining > length {
            let segment_len = (length - segment_start).max(0.0);
            self.emit_span(events, segment_start, length, consumed, &grid, emit);
            consumed += segment_len;
            remaining -= segment_len;

            let boundary = grid.offset(consumed);
            self.emit_loop_end_offs(events, length, boundary, emit);

            let next_loop = self.current_loop + 1;
            if settings.max_loops() > 0 && next_loop >= settings.max_loops() {
                self.release_all(boundary, emit);
                self.state = TransportState::Stopped;
                self.position = 0.0;
                return;
            }
            self.current_loop = next_loop;
            segment_start = 0.0;
        }

        self.emit_span(
            events,
            segment_start,
            segment_start + remaining,
            consumed,
            &grid,
            emit,
        );
        self.position = segment_start + remaining;
    }

    /// Emit triggers with `from <= beat < to`, offset by `base` beats into the buffer
    fn emit_span(
        &mut self,
        events: &[TriggerEvent],
        from: f64,
        to: f64,
        base: f64,
        grid: &BufferGrid,
        emit: &mut impl FnMut(u32, MidiMessage),
    ) {
        if to <= from {
            return;
        }

        let first = events.partition_point(|e| e.beat < from);
        for event in events[first..].iter().take_while(|e| e.beat < to) {
            self.trigger(event, grid.offset(base + (event.beat - from)), emit);
        }
    }

    /// Offs placed exactly on the loop end close out the iteration that is ending
    fn emit_loop_end_offs(
        &mut self,
        events: &[TriggerEvent],
        length: f64,
        offset: u32,
        emit: &mut impl FnMut(u32, MidiMessage),
    ) {
        let first = events.partition_point(|e| e.beat < length);
        for event in events[first..].iter().take_while(|e| e.beat <= length) {
            if event.kind == TriggerKind::NoteOff {
                self.trigger(event, offset, emit);
            }
        }
    }

    fn trigger(
        &mut self,
        event: &TriggerEvent,
        offset: u32,
        emit: &mut impl FnMut(u32, MidiMessage),
    ) {
        let index = self
            .sounding
            .iter()
            .position(|s| s.note == event.note && s.channel == event.channel);

        match (event.kind, index) {
            (TriggerKind::NoteOn, Some(index)) => {
                let sounding = &mut self.sounding[index];
                sounding.count = sounding.count.saturating_add(1);
            }
            (TriggerKind::NoteOn, None) => {
                // a full table would have to grow; drop the note instead
                if self.sounding.len() >= self.max_sounding {
                    return;
                }
                self.sounding.push(SoundingNote {
                    note: event.note,
                    channel: event.channel,
                    count: 1,
                });
            }
            (TriggerKind::NoteOff, Some(index)) => {
                let sounding = &mut self.sounding[index];
                sounding.count -= 1;
                if sounding.count == 0 {
                    self.sounding.remove(index);
                }
            }
            (TriggerKind::NoteOff, None) => {}
        }
        emit(offset, event.message());
    }

    fn release_all(&mut self, offset: u32, emit: &mut impl FnMut(u32, MidiMessage)) {
        for sounding in self.sounding.drain(..) {
            emit(
                offset,
                MidiMessage::NoteOff {
                    channel: sounding.channel,
                    note: sounding.note,
                },
            );
        }
    }
}

impl Default for SequencerEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SOUNDING_NOTES)
    }
}

/// Beat → sample-offset mapping for one buffer
struct BufferGrid {
    samples_per_beat: f64,
    last_frame: u32,
}

impl BufferGrid {
    fn offset(&self, beats_into_buffer: f64) -> u32 {
        (beats_into_buffer * self.samples_per_beat)
            .round()
            .clamp(0.0, self.last_frame as f64) as u32
    }
}
