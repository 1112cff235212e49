// Sequence snapshots - immutable (events, settings) pairs handed to the render thread
//
// The control thread publishes a new snapshot with one atomic pointer swap. The
// replaced snapshot is parked until the render thread can no longer hold it, so
// memory is never freed on the render thread nor while a render may read it.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::bridge::host::MidiSink;
use crate::sequencer::event::TriggerEvent;
use crate::sequencer::settings::SequenceSettings;

/// Everything one render call needs besides the engine state
pub struct SequenceSnapshot {
    pub events: Vec<TriggerEvent>,
    pub settings: SequenceSettings,
    pub sample_rate: f64,
    pub sink: Arc<dyn MidiSink>,
    /// Increments with every install
    pub generation: u64,
}

impl std::fmt::Debug for SequenceSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceSnapshot")
            .field("events", &self.events.len())
            .field("settings", &self.settings)
            .field("sample_rate", &self.sample_rate)
            .field("generation", &self.generation)
            .finish()
    }
}

pub type SharedSnapshot = Arc<ArcSwapOption<SequenceSnapshot>>;

/// Control-side owner of the published snapshot
#[derive(Debug)]
pub struct SnapshotSlot {
    current: SharedSnapshot,
    retired: Vec<Arc<SequenceSnapshot>>,
    generation: u64,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self {
            current: Arc::new(ArcSwapOption::empty()),
            retired: Vec::new(),
            generation: 0,
        }
    }

    /// Handle for the render side
    pub fn shared(&self) -> SharedSnapshot {
        Arc::clone(&self.current)
    }

    /// Publish a new pair. The previous one stays alive until reclaimed.
    pub fn install(
        &mut self,
        events: Vec<TriggerEvent>,
        settings: SequenceSettings,
        sample_rate: f64,
        sink: Arc<dyn MidiSink>,
    ) -> u64 {
        self.generation += 1;
        let snapshot = Arc::new(SequenceSnapshot {
            events,
            settings,
            sample_rate,
            sink,
            generation: self.generation,
        });

        if let Some(previous) = self.current.swap(Some(snapshot)) {
            self.retired.push(previous);
        }
        self.reclaim();
        self.generation
    }

    /// Drop retired snapshots the render side no longer references.
    /// Returns how many were freed.
    pub fn reclaim(&mut self) -> usize {
        let before = self.retired.len();
        // swap() settles outstanding render-side borrows into real references,
        // so a count of 1 means only this list still holds the snapshot
        self.retired.retain(|s| Arc::strong_count(s) > 1);
        let freed = before - self.retired.len();
        if freed > 0 {
            log::debug!("reclaimed {} retired sequence snapshot(s)", freed);
        }
        freed
    }

    /// Snapshots waiting for the render side to let go
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Currently published snapshot
    pub fn current(&self) -> Option<Arc<SequenceSnapshot>> {
        self.current.load_full()
    }
}

impl Default for SnapshotSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn null_sink() -> Arc<dyn MidiSink> {
        Arc::new(|_: u32, _: u8, _: &[u8]| {})
    }

    #[test]
    fn test_install_publishes_and_counts_generations() {
        let mut slot = SnapshotSlot::new();
        assert!(slot.current().is_none());

        let generation = slot.install(Vec::new(), SequenceSettings::default(), 44100.0, null_sink());
        assert_eq!(generation, 1);

        let current = slot.current().unwrap();
        assert_eq!(current.generation, 1);
        assert_eq!(current.sample_rate, 44100.0);
    }

    #[test]
    fn test_unreferenced_snapshot_is_reclaimed_on_install() {
        let mut slot = SnapshotSlot::new();
        slot.install(Vec::new(), SequenceSettings::default(), 44100.0, null_sink());
        slot.install(Vec::new(), SequenceSettings::default(), 48000.0, null_sink());

        assert_eq!(slot.retired_count(), 0);
        assert_eq!(slot.generation(), 2);
    }

    #[test]
    fn test_snapshot_held_by_reader_is_parked() {
        let mut slot = SnapshotSlot::new();
        let shared = slot.shared();
        slot.install(Vec::new(), SequenceSettings::default(), 44100.0, null_sink());

        // a render call in flight
        let guard = shared.load();
        slot.install(Vec::new(), SequenceSettings::default(), 48000.0, null_sink());
        assert_eq!(slot.retired_count(), 1);

        let in_flight = guard.as_ref().map(|s| s.sample_rate);
        assert_eq!(in_flight, Some(44100.0));

        drop(guard);
        assert_eq!(slot.reclaim(), 1);
        assert_eq!(slot.retired_count(), 0);
    }
}
