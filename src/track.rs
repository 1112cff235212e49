// Sequencer track - Control-context API: notes, settings, transport and queries
//
// Every mutation commits locally, then rebuilds the ordered events and installs
// them with the current settings through the render bridge. Transport commands go through the bridge's
// command queue once the observer is registered with a host node, and are applied
// directly before that.

use std::sync::Arc;

use crate::bridge::host::{HostNode, ObserverToken};
use crate::bridge::render::{RenderBridge, RenderObserver};
use crate::config::SequencerConfig;
use crate::error::{SequencerError, SequencerResult};
use crate::messaging::command::TransportCommand;
use crate::sequencer::note::NoteEvent;
use crate::sequencer::sequence::NoteEventSequence;
use crate::sequencer::settings::SequenceSettings;

/// Where the render observer currently lives
enum ObserverHome {
    /// Owned by the track; no render call can reach the engine
    Detached(RenderObserver),
    /// Handed to a host node
    Attached {
        node: Arc<dyn HostNode>,
        token: ObserverToken,
    },
    /// Transiently empty while ownership moves
    Vacant,
}

/// One independently playing sequence of notes routed to a host node
pub struct SequencerTrack {
    config: SequencerConfig,
    settings: SequenceSettings,
    sequence: NoteEventSequence,
    sample_rate: f64,
    target: Option<Arc<dyn HostNode>>,
    bridge: RenderBridge,
    home: ObserverHome,
}

impl SequencerTrack {
    /// Create a track with no target node. Length 4 beats, 120 BPM, looping forever.
    pub fn new(config: SequencerConfig) -> SequencerResult<Self> {
        config.validate()?;
        let (bridge, observer) = RenderBridge::new(&config);

        Ok(Self {
            sample_rate: config.sample_rate,
            config,
            settings: SequenceSettings::default(),
            sequence: NoteEventSequence::new(),
            target: None,
            bridge,
            home: ObserverHome::Detached(observer),
        })
    }

    /// Create a track and attach it to `node` right away.
    ///
    /// A node that is not ready yet is not an error here; the track attaches on
    /// the next successful install.
    pub fn with_target(config: SequencerConfig, node: Arc<dyn HostNode>) -> SequencerResult<Self> {
        let mut track = Self::new(config)?;
        match track.set_target(Some(node)) {
            Ok(()) | Err(SequencerError::NotAttached(_)) => Ok(track),
            Err(e) => Err(e),
        }
    }

    // ---- Transport ----

    pub fn play(&mut self) -> SequencerResult<()> {
        self.transport(TransportCommand::Play)
    }

    pub fn play_from_start(&mut self) -> SequencerResult<()> {
        self.transport(TransportCommand::PlayFromStart)
    }

    /// Start playing after `beats` of silence
    pub fn play_after_delay(&mut self, beats: f64) -> SequencerResult<()> {
        self.transport(TransportCommand::PlayFrom(-beats))
    }

    /// Stop and release sounding notes
    pub fn stop(&mut self) -> SequencerResult<()> {
        self.transport(TransportCommand::Stop)
    }

    pub fn rewind(&mut self) -> SequencerResult<()> {
        self.seek(0.0)
    }

    /// Move the playhead. Sounding notes are not released.
    pub fn seek(&mut self, position: f64) -> SequencerResult<()> {
        if !position.is_finite() {
            return Err(SequencerError::InvalidSettings(format!(
                "seek position {} is not finite",
                position
            )));
        }
        self.transport(TransportCommand::Seek(position))
    }

    /// Release sounding notes without stopping
    pub fn stop_playing_notes(&mut self) -> SequencerResult<()> {
        self.transport(TransportCommand::StopPlayingNotes)
    }

    /// Stop, release sounding notes and send All Notes Off on every channel
    pub fn panic(&mut self) -> SequencerResult<()> {
        self.transport(TransportCommand::Panic)
    }

    fn transport(&mut self, command: TransportCommand) -> SequencerResult<()> {
        match &self.home {
            ObserverHome::Attached { .. } => self.bridge.send(command),
            ObserverHome::Detached(observer) => {
                observer.apply_now(command);
                Ok(())
            }
            ObserverHome::Vacant => Err(SequencerError::NotAttached(
                "render observer unavailable".to_string(),
            )),
        }
    }

    // ---- Sequence ----

    /// Add a note with the configured default velocity and channel
    pub fn add(&mut self, note: u8, position: f64, duration: f64) -> SequencerResult<()> {
        let event = NoteEvent::new(
            note,
            self.config.default_velocity,
            self.config.default_channel,
            position,
            duration,
        )
        .inspect_err(|e| log::warn!("{}", e))?;
        self.add_note(event)
    }

    pub fn add_note(&mut self, note: NoteEvent) -> SequencerResult<()> {
        self.sequence.add_note(note);
        self.reinstall()
    }

    /// Replace the whole sequence
    pub fn set_sequence(&mut self, sequence: NoteEventSequence) -> SequencerResult<()> {
        self.sequence = sequence;
        self.reinstall()
    }

    /// Remove every note
    pub fn clear(&mut self) -> SequencerResult<()> {
        self.sequence = NoteEventSequence::new();
        self.reinstall()
    }

    pub fn remove_note_at(&mut self, position: f64) -> SequencerResult<usize> {
        let removed = self.sequence.remove_note_at(position);
        self.reinstall()?;
        Ok(removed)
    }

    pub fn remove_all_instances_of(&mut self, note: u8) -> SequencerResult<usize> {
        let removed = self.sequence.remove_all_instances_of(note);
        self.reinstall()?;
        Ok(removed)
    }

    pub fn sequence(&self) -> &NoteEventSequence {
        &self.sequence
    }

    // ---- Settings ----

    /// Length in beats
    pub fn length(&self) -> f64 {
        self.settings.length()
    }

    pub fn set_length(&mut self, length: f64) -> SequencerResult<()> {
        self.settings = self.settings.with_length(length)?;
        self.reinstall()
    }

    /// Tempo in BPM
    pub fn tempo(&self) -> f64 {
        self.settings.tempo()
    }

    pub fn set_tempo(&mut self, tempo: f64) -> SequencerResult<()> {
        self.settings = self.settings.with_tempo(tempo)?;
        self.reinstall()
    }

    pub fn loop_enabled(&self) -> bool {
        self.settings.loop_enabled()
    }

    pub fn set_loop_enabled(&mut self, loop_enabled: bool) -> SequencerResult<()> {
        self.settings = self.settings.with_loop_enabled(loop_enabled);
        self.reinstall()
    }

    /// Loop iterations to play, 0 = forever
    pub fn number_of_loops(&self) -> u32 {
        self.settings.max_loops()
    }

    pub fn set_number_of_loops(&mut self, loops: u32) -> SequencerResult<()> {
        self.settings = self.settings.with_max_loops(loops);
        self.reinstall()
    }

    pub fn settings(&self) -> SequenceSettings {
        self.settings
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Follow a host sample-rate change
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> SequencerResult<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SequencerError::InvalidSettings(format!(
                "sample rate {} must be > 0 Hz",
                sample_rate
            )));
        }
        self.sample_rate = sample_rate;
        self.reinstall()
    }

    // ---- Target ----

    pub fn target(&self) -> Option<&Arc<dyn HostNode>> {
        self.target.as_ref()
    }

    /// Route the track to another node (or none). The observer moves with it.
    pub fn set_target(&mut self, node: Option<Arc<dyn HostNode>>) -> SequencerResult<()> {
        self.detach();
        self.target = node;
        if self.target.is_none() {
            return Ok(());
        }
        self.install()
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.home, ObserverHome::Attached { .. })
    }

    // ---- Queries (state after the last completed render call) ----

    pub fn is_playing(&self) -> bool {
        self.bridge.shared_state().state().is_playing()
    }

    pub fn current_position(&self) -> f64 {
        self.bridge.shared_state().position()
    }

    pub fn current_loop(&self) -> u32 {
        self.bridge.shared_state().current_loop()
    }

    /// Host sample time of the last pre-render call
    pub fn last_render_sample_time(&self) -> f64 {
        self.bridge.shared_state().last_sample_time()
    }

    /// Free snapshots no render call can still be reading
    pub fn reclaim(&mut self) -> usize {
        self.bridge.reclaim()
    }

    // ---- Install ----

    /// Rebuild the ordered events and hand them, with the current settings, to
    /// the render side. Registers the observer with the target on first success.
    ///
    /// Returns `NotAttached` while the target cannot take the sequence yet;
    /// calling again once it can installs the committed state exactly once.
    pub fn install(&mut self) -> SequencerResult<()> {
        let result = self.try_install();
        if let Err(SequencerError::NotAttached(reason)) = &result {
            log::warn!("sequence not installed: {}", reason);
        }
        result
    }

    /// Install after a committed mutation. `NotAttached` leaves the change in
    /// place for the next install and is not reported.
    fn reinstall(&mut self) -> SequencerResult<()> {
        match self.install() {
            Err(SequencerError::NotAttached(_)) => Ok(()),
            result => result,
        }
    }

    fn try_install(&mut self) -> SequencerResult<()> {
        let node = self
            .target
            .clone()
            .ok_or_else(|| SequencerError::NotAttached("no target node".to_string()))?;
        let sink = node.midi_sink().ok_or_else(|| {
            SequencerError::NotAttached("target node exposes no MIDI input".to_string())
        })?;

        self.bridge.update(
            self.sequence.ordered_events(),
            self.settings,
            self.sample_rate,
            sink,
        )?;
        self.attach(node)
    }

    fn attach(&mut self, node: Arc<dyn HostNode>) -> SequencerResult<()> {
        let observer = match std::mem::replace(&mut self.home, ObserverHome::Vacant) {
            ObserverHome::Detached(observer) => observer,
            attached => {
                self.home = attached;
                return Ok(());
            }
        };

        match node.add_render_observer(observer) {
            Ok(token) => {
                log::debug!("render observer registered ({:?})", token);
                self.home = ObserverHome::Attached { node, token };
                Ok(())
            }
            Err(observer) => {
                self.home = ObserverHome::Detached(observer);
                Err(SequencerError::NotAttached(
                    "target node has no render observer slot".to_string(),
                ))
            }
        }
    }

    fn detach(&mut self) {
        // a detached observer stays where it is
        let ObserverHome::Attached { node, token } = &self.home else {
            return;
        };
        let (node, token) = (Arc::clone(node), *token);

        match node.remove_render_observer(token) {
            Some(observer) => {
                log::debug!("render observer unregistered ({:?})", token);
                self.home = ObserverHome::Detached(observer);
            }
            None => {
                // the host dropped it; start over with a fresh engine
                log::warn!("host did not return render observer {:?}", token);
                let (bridge, observer) = RenderBridge::new(&self.config);
                self.bridge = bridge;
                self.home = ObserverHome::Detached(observer);
            }
        }
    }
}

impl Drop for SequencerTrack {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for SequencerTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequencerTrack")
            .field("settings", &self.settings)
            .field("notes", &self.sequence.len())
            .field("sample_rate", &self.sample_rate)
            .field("attached", &self.is_attached())
            .finish()
    }
}
