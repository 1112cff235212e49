// Track sequencer - Sample-accurate MIDI sequencing driven by a host render callback

pub mod audio;
pub mod bridge;
pub mod config;
pub mod error;
pub mod messaging;
pub mod midi;
pub mod sequencer;
pub mod track;

// Re-export commonly used types for convenience
pub use audio::timing::render_count;
pub use bridge::{
    AudioTimeStamp, HostNode, MidiSink, ObserverToken, RenderAction, RenderBridge, RenderObserver,
};
pub use config::SequencerConfig;
pub use error::{SequencerError, SequencerResult};
pub use messaging::command::TransportCommand;
pub use midi::MidiMessage;
pub use sequencer::{
    NoteEvent, NoteEventSequence, SequenceSettings, SequencerEngine, TransportState, TriggerEvent,
    TriggerKind,
};
pub use track::SequencerTrack;
