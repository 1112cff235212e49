// Transport - Playback state and its published view
// The render path owns the real state; control threads read the copy published here

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Transport state (play/stop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }
}

/// Engine state as of the most recently completed render call.
/// Thread-safe via atomics: written by the render thread, read by control threads.
#[derive(Debug, Default)]
pub struct SharedTransportState {
    playing: AtomicBool,
    position_bits: AtomicU64,
    current_loop: AtomicU32,
    last_sample_time_bits: AtomicU64,
}

impl SharedTransportState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> TransportState {
        if self.playing.load(Ordering::Acquire) {
            TransportState::Playing
        } else {
            TransportState::Stopped
        }
    }

    /// Playhead in beats
    pub fn position(&self) -> f64 {
        f64::from_bits(self.position_bits.load(Ordering::Acquire))
    }

    pub fn current_loop(&self) -> u32 {
        self.current_loop.load(Ordering::Acquire)
    }

    /// Host sample time of the last pre-render call
    pub fn last_sample_time(&self) -> f64 {
        f64::from_bits(self.last_sample_time_bits.load(Ordering::Acquire))
    }

    /// Publish a completed render (or directly applied command)
    pub fn publish(&self, state: TransportState, position: f64, current_loop: u32) {
        self.position_bits.store(position.to_bits(), Ordering::Release);
        self.current_loop.store(current_loop, Ordering::Release);
        self.playing.store(state.is_playing(), Ordering::Release);
    }

    pub fn set_last_sample_time(&self, sample_time: f64) {
        self.last_sample_time_bits
            .store(sample_time.to_bits(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_state() {
        assert!(TransportState::Playing.is_playing());
        assert!(!TransportState::Stopped.is_playing());
        assert_eq!(TransportState::default(), TransportState::Stopped);
    }

    #[test]
    fn test_shared_state_starts_stopped_at_zero() {
        let shared = SharedTransportState::new();
        assert_eq!(shared.state(), TransportState::Stopped);
        assert_eq!(shared.position(), 0.0);
        assert_eq!(shared.current_loop(), 0);
        assert_eq!(shared.last_sample_time(), 0.0);
    }

    #[test]
    fn test_publish() {
        let shared = SharedTransportState::new();
        shared.publish(TransportState::Playing, -0.25, 3);
        shared.set_last_sample_time(1024.0);

        assert_eq!(shared.state(), TransportState::Playing);
        assert_eq!(shared.position(), -0.25);
        assert_eq!(shared.current_loop(), 3);
        assert_eq!(shared.last_sample_time(), 1024.0);
    }
}
