// Module midi - Channel-voice messages emitted by the sequencer

pub mod event;

pub use event::MidiMessage;
