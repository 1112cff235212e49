// Sequencer module - Note sequences, their ordered triggers and the real-time engine

pub mod engine;
pub mod event;
pub mod note;
pub mod sequence;
pub mod settings;
pub mod transport;

pub use engine::SequencerEngine;
pub use event::{TriggerEvent, TriggerKind};
pub use note::NoteEvent;
pub use sequence::NoteEventSequence;
pub use settings::SequenceSettings;
pub use transport::{SharedTransportState, TransportState};
