// Render bridge module - Handoff between the control context and the host render thread

pub mod host;
pub mod render;
pub mod snapshot;

pub use host::{HostNode, MidiSink, ObserverToken};
pub use render::{AudioTimeStamp, RenderAction, RenderBridge, RenderObserver};
pub use snapshot::{SequenceSnapshot, SnapshotSlot};
