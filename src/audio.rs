//! Audio cue sink
//!
//! The simulation never touches an audio device. It calls an [`AudioSink`]
//! with one-shot cues and start/stop requests for UFO engine loops; the
//! platform layer owns the mixer. [`AudioQueue`] is the bundled sink: it
//! applies volumes, enforces a channel limit and queues commands for the
//! platform to drain once per frame.

use std::collections::BTreeMap;

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player fired a bullet
    ShotFired,
    /// Large asteroid broke apart
    LargeBreak,
    /// Medium or small asteroid broke apart
    MediumBreak,
    /// Ship destroyed
    Explosion,
}

impl SoundEffect {
    /// Mix volume before master scaling
    pub fn volume(self) -> f32 {
        match self {
            SoundEffect::ShotFired => 0.6,
            SoundEffect::LargeBreak | SoundEffect::Explosion => 0.9,
            SoundEffect::MediumBreak => 0.8,
        }
    }
}

/// Looping UFO engine sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineHum {
    Big,
    Small,
}

impl EngineHum {
    pub fn volume(self) -> f32 {
        0.4
    }
}

/// Handle for a running loop, returned by [`AudioSink::start_loop`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoopHandle(u32);

impl LoopHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Where the simulation sends its sound cues
pub trait AudioSink {
    /// Fire-and-forget cue
    fn play(&mut self, effect: SoundEffect);

    /// Start a looping sound; `None` when no channel is free
    fn start_loop(&mut self, hum: EngineHum) -> Option<LoopHandle>;

    /// Stop a loop previously started by this sink
    fn stop_loop(&mut self, handle: LoopHandle);

    /// Number of loops still running, if the sink tracks them
    fn active_loop_count(&self) -> Option<usize> {
        None
    }
}

/// Command for the platform audio layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCommand {
    Play {
        effect: SoundEffect,
        volume: f32,
    },
    StartLoop {
        handle: LoopHandle,
        hum: EngineHum,
        volume: f32,
    },
    StopLoop {
        handle: LoopHandle,
    },
}

/// Default mixer channel budget for loops
pub const DEFAULT_LOOP_CHANNELS: usize = 8;

/// Queueing sink with volume control and a loop channel budget
#[derive(Debug, Clone)]
pub struct AudioQueue {
    master_volume: f32,
    muted: bool,
    loop_channels: usize,
    next_handle: u32,
    active: BTreeMap<LoopHandle, EngineHum>,
    pending: Vec<AudioCommand>,
}

impl Default for AudioQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioQueue {
    pub fn new() -> Self {
        Self::with_loop_channels(DEFAULT_LOOP_CHANNELS)
    }

    pub fn with_loop_channels(loop_channels: usize) -> Self {
        Self {
            master_volume: 0.8,
            muted: false,
            loop_channels,
            next_handle: 1,
            active: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self, base: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * base
        }
    }

    /// Loops currently running, by handle
    pub fn active_loops(&self) -> impl Iterator<Item = (LoopHandle, EngineHum)> + '_ {
        self.active.iter().map(|(h, hum)| (*h, *hum))
    }

    /// Commands queued since the last drain
    pub fn pending(&self) -> &[AudioCommand] {
        &self.pending
    }

    /// Take every queued command (call once per frame from the platform)
    pub fn drain(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.pending)
    }
}

impl AudioSink for AudioQueue {
    fn play(&mut self, effect: SoundEffect) {
        let volume = self.effective_volume(effect.volume());
        if volume <= 0.0 {
            return;
        }
        log::trace!("cue {:?} at {:.2}", effect, volume);
        self.pending.push(AudioCommand::Play { effect, volume });
    }

    fn start_loop(&mut self, hum: EngineHum) -> Option<LoopHandle> {
        if self.active.len() >= self.loop_channels {
            log::debug!("no free channel for {:?} loop", hum);
            return None;
        }
        let handle = LoopHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.active.insert(handle, hum);
        // Muted loops still hold their channel so unmuting can resume them
        let volume = self.effective_volume(hum.volume());
        self.pending.push(AudioCommand::StartLoop {
            handle,
            hum,
            volume,
        });
        Some(handle)
    }

    fn stop_loop(&mut self, handle: LoopHandle) {
        if self.active.remove(&handle).is_some() {
            self.pending.push(AudioCommand::StopLoop { handle });
        } else {
            log::warn!("stop for unknown loop {:?}", handle);
        }
    }

    fn active_loop_count(&self) -> Option<usize> {
        Some(self.active.len())
    }
}
