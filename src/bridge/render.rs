// Render bridge - Control side installs snapshots and queues commands,
// render side (RenderObserver) consumes them once per audio buffer

use std::cell::UnsafeCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ringbuf::traits::{Consumer, Producer};

use crate::bridge::host::MidiSink;
use crate::bridge::snapshot::{SequenceSnapshot, SharedSnapshot, SnapshotSlot};
use crate::config::SequencerConfig;
use crate::error::{SequencerError, SequencerResult, concurrency_violation};
use crate::messaging::channels::{CommandConsumer, CommandProducer, create_command_channel};
use crate::messaging::command::TransportCommand;
use crate::midi::MidiMessage;
use crate::sequencer::engine::SequencerEngine;
use crate::sequencer::event::TriggerEvent;
use crate::sequencer::settings::SequenceSettings;
use crate::sequencer::transport::SharedTransportState;

/// Phase of a host render call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderAction {
    PreRender,
    PostRender,
}

/// Host time of a render call
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioTimeStamp {
    pub sample_time: f64,
}

impl AudioTimeStamp {
    pub fn new(sample_time: f64) -> Self {
        Self { sample_time }
    }
}

/// Control-context half of the bridge
pub struct RenderBridge {
    slot: SnapshotSlot,
    commands: CommandProducer,
    shared: Arc<SharedTransportState>,
}

impl RenderBridge {
    /// Create the bridge and the observer a host will call on its render thread
    pub fn new(config: &SequencerConfig) -> (Self, RenderObserver) {
        let slot = SnapshotSlot::new();
        let (commands, command_rx) = create_command_channel(config.command_capacity);
        let shared = SharedTransportState::new();

        let observer = RenderObserver {
            core: UnsafeCell::new(ObserverCore {
                engine: SequencerEngine::new(config.max_sounding_notes),
                commands: command_rx,
            }),
            in_render: AtomicBool::new(false),
            snapshot: slot.shared(),
            shared: Arc::clone(&shared),
            cable: config.cable,
        };

        (
            Self {
                slot,
                commands,
                shared,
            },
            observer,
        )
    }

    /// Install a new (events, settings) pair for the next render call.
    ///
    /// Never waits on the render thread; a render call already in progress keeps
    /// the pair it loaded.
    pub fn update(
        &mut self,
        events: Vec<TriggerEvent>,
        settings: SequenceSettings,
        sample_rate: f64,
        sink: Arc<dyn MidiSink>,
    ) -> SequencerResult<u64> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SequencerError::InvalidSettings(format!(
                "sample rate {} must be > 0 Hz",
                sample_rate
            )));
        }

        let event_count = events.len();
        let generation = self.slot.install(events, settings, sample_rate, sink);
        log::debug!(
            "installed sequence #{}: {} events, {:?} @ {} Hz",
            generation,
            event_count,
            settings,
            sample_rate
        );
        Ok(generation)
    }

    /// Queue a transport command for the start of the next render call
    pub fn send(&mut self, command: TransportCommand) -> SequencerResult<()> {
        self.commands.try_push(command).map_err(|rejected| {
            log::warn!("transport command queue full, dropped {:?}", rejected);
            SequencerError::CommandQueueFull
        })
    }

    /// Free snapshots the render side has let go of
    pub fn reclaim(&mut self) -> usize {
        self.slot.reclaim()
    }

    /// Snapshots still waiting to be freed
    pub fn retired_count(&self) -> usize {
        self.slot.retired_count()
    }

    pub fn current_snapshot(&self) -> Option<Arc<SequenceSnapshot>> {
        self.slot.current()
    }

    /// Engine state published after the most recent render call
    pub fn shared_state(&self) -> &Arc<SharedTransportState> {
        &self.shared
    }
}

impl std::fmt::Debug for RenderBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderBridge")
            .field("slot", &self.slot)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

struct ObserverCore {
    engine: SequencerEngine,
    commands: CommandConsumer,
}

/// Render-context half of the bridge: owns the engine.
///
/// Hosts call [`RenderObserver::observe`] around every render of the node the
/// track targets.
pub struct RenderObserver {
    // Reached only through `with_core` while `in_render` is held
    core: UnsafeCell<ObserverCore>,
    in_render: AtomicBool,
    snapshot: SharedSnapshot,
    shared: Arc<SharedTransportState>,
    cable: u8,
}

impl RenderObserver {
    /// Render callback. Only [`RenderAction::PreRender`] does work; the bus index
    /// is not used.
    ///
    /// Panics with a concurrency violation if entered while another call on the
    /// same observer is still running.
    pub fn observe(
        &self,
        action: RenderAction,
        timestamp: &AudioTimeStamp,
        frame_count: u32,
        _bus: usize,
    ) {
        if action != RenderAction::PreRender {
            return;
        }

        self.with_core("render observer entered concurrently", |core| {
            self.render(core, timestamp, frame_count)
        });
    }

    fn render(&self, core: &mut ObserverCore, timestamp: &AudioTimeStamp, frame_count: u32) {
        let ObserverCore { engine, commands } = core;

        self.shared.set_last_sample_time(timestamp.sample_time);

        let snapshot = self.snapshot.load();
        let cable = self.cable;

        match &*snapshot {
            Some(snapshot) => {
                let sink = &snapshot.sink;
                let mut emit = |offset: u32, message: MidiMessage| {
                    sink.schedule(offset, cable, &message.to_bytes());
                };
                while let Some(command) = commands.try_pop() {
                    engine.apply(command, &mut emit);
                }
                engine.render(
                    &snapshot.events,
                    &snapshot.settings,
                    snapshot.sample_rate,
                    frame_count,
                    &mut emit,
                );
            }
            None => {
                // nothing installed: nothing can be sounding either
                while let Some(command) = commands.try_pop() {
                    engine.apply(command, &mut |_, _| {});
                }
            }
        }

        self.shared
            .publish(engine.state(), engine.position(), engine.current_loop());
    }

    /// Apply a command right away, outside any render call. Used while the
    /// observer is not registered with a host, so no render can be running.
    pub fn apply_now(&self, command: TransportCommand) {
        self.with_core("detached observer applied while rendering", |core| {
            self.apply_detached(core, command)
        });
    }

    fn apply_detached(&self, core: &mut ObserverCore, command: TransportCommand) {
        let ObserverCore { engine, commands } = core;

        let snapshot = self.snapshot.load_full();
        let cable = self.cable;
        let mut emit = |offset: u32, message: MidiMessage| {
            if let Some(snapshot) = &snapshot {
                snapshot.sink.schedule(offset, cable, &message.to_bytes());
            }
        };

        // commands queued before a detach keep their order
        while let Some(queued) = commands.try_pop() {
            engine.apply(queued, &mut emit);
        }
        engine.apply(command, &mut emit);

        self.shared
            .publish(engine.state(), engine.position(), engine.current_loop());
    }

    /// Run `f` with exclusive access to the engine. Entering while another call
    /// holds it is a concurrency violation; nothing here ever waits.
    fn with_core<R>(&self, what: &'static str, f: impl FnOnce(&mut ObserverCore) -> R) -> R {
        if self.in_render.swap(true, Ordering::Acquire) {
            concurrency_violation(what);
        }
        let _held = InRender(&self.in_render);
        // SAFETY: `in_render` was clear and this call set it, so no other
        // reference to the core exists until `_held` drops.
        let core = unsafe { &mut *self.core.get() };
        f(core)
    }

    pub fn shared_state(&self) -> &Arc<SharedTransportState> {
        &self.shared
    }
}

// SAFETY: `core` is only reached through `with_core`, whose atomic flag admits
// one caller at a time; every other field is Sync.
unsafe impl Sync for RenderObserver {}

/// Clears the in-render flag when a call finishes, including by unwinding
struct InRender<'a>(&'a AtomicBool);

impl Drop for InRender<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for RenderObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderObserver")
            .field("shared", &self.shared)
            .field("cable", &self.cable)
            .finish_non_exhaustive()
    }
}
