// Host-facing interfaces - what the audio graph glue provides to a track

use std::sync::Arc;

use crate::bridge::render::RenderObserver;

/// Destination of scheduled MIDI bytes, typically a synthesizer node's
/// "schedule MIDI event" entry point.
///
/// Called on the render thread. Implementations must not block for long; the
/// sequencer calls it in ascending time order within a buffer.
pub trait MidiSink: Send + Sync {
    /// `offset` is the sample offset within the current buffer (>= 0, < frame count)
    fn schedule(&self, offset: u32, cable: u8, bytes: &[u8]);
}

impl<F> MidiSink for F
where
    F: Fn(u32, u8, &[u8]) + Send + Sync,
{
    fn schedule(&self, offset: u32, cable: u8, bytes: &[u8]) {
        self(offset, cable, bytes)
    }
}

/// Handle returned by a host when a render observer is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(pub u64);

/// An audio node the sequencer drives.
///
/// The host owns the render thread; the track hands its [`RenderObserver`] over
/// and gets it back on removal.
pub trait HostNode: Send + Sync {
    /// The node's MIDI input, or `None` while no render pipeline is attached
    fn midi_sink(&self) -> Option<Arc<dyn MidiSink>>;

    /// Take ownership of an observer and call it around every render.
    /// Gives the observer back when the node has no observer slot yet.
    fn add_render_observer(&self, observer: RenderObserver) -> Result<ObserverToken, RenderObserver>;

    /// Stop calling the observer and hand it back
    fn remove_render_observer(&self, token: ObserverToken) -> Option<RenderObserver>;
}
