// Transport commands - Control thread → render thread

/// A transport operation queued by the control context and applied by the
/// render context at the start of its next render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportCommand {
    /// Start playing from the current position
    Play,
    /// Reset position and loop counter, then play
    PlayFromStart,
    /// Seek to a beat position (possibly negative) and play
    PlayFrom(f64),
    /// Stop and release every sounding note
    Stop,
    /// Move the playhead without touching the play state
    Seek(f64),
    /// Release every sounding note, keep the transport running
    StopPlayingNotes,
    /// Stop, release sounding notes, then send the global reset
    Panic,
}
