//! Soundboard: theme channel, effect channels and the volume bus.

mod effects;
mod ramp;
mod theme;

pub use effects::{EffectBoard, EffectChange};
pub use ramp::Ramp;
pub use theme::{ThemeChange, ThemeMixer, Transport};

use std::time::{Duration, Instant};

use tavern_proto::config::MixerConfig;
use tavern_proto::protocol::Track;

use crate::backend::AudioBackend;

/// Everything the host needs after a clock tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    /// A theme crossfade is still running; keep ticking.
    pub fading: bool,
    /// Effects that ended or errored since the last tick; unhighlight them.
    pub finished_effects: Vec<String>,
}

/// Owns the backend, both channel kinds and the shared volume.
pub struct Soundboard<B: AudioBackend> {
    backend: B,
    theme: ThemeMixer<B::Voice>,
    effects: EffectBoard<B::Voice>,
    volume: f32,
    tick_interval: Duration,
}

impl<B: AudioBackend> Soundboard<B> {
    pub fn new(mut backend: B, config: &MixerConfig) -> Self {
        let voice = backend.open(None);
        Self {
            backend,
            theme: ThemeMixer::new(voice, config.fade_out(), config.fade_in()),
            effects: EffectBoard::new(),
            volume: config.default_volume.clamp(0.0, 1.0),
            tick_interval: config.tick_interval(),
        }
    }

    /// Current bus level (the slider value).
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Volume bus.  Applied to the theme voice and every active effect now;
    /// a running crossfade keeps the target it captured when it started.
    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        self.theme.set_volume(volume);
        self.effects.set_volume(volume);
    }

    pub fn play_theme(&mut self, track: &Track, now: Instant) -> ThemeChange {
        self.theme.play_theme(track, self.volume, now)
    }

    pub fn toggle_effect(&mut self, track: &Track) -> EffectChange {
        self.effects.toggle(&mut self.backend, track, self.volume)
    }

    /// Play/pause button for the theme channel.
    pub fn toggle_playback(&mut self) -> Option<Transport> {
        self.theme.toggle_playback()
    }

    pub fn tick(&mut self, now: Instant) -> TickReport {
        TickReport {
            fading: self.theme.tick(now),
            finished_effects: self.effects.reap(),
        }
    }

    /// How often [`Soundboard::tick`] should run while something is active.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn theme(&self) -> &ThemeMixer<B::Voice> {
        &self.theme
    }

    pub fn effects(&self) -> &EffectBoard<B::Voice> {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectBoard<B::Voice> {
        &mut self.effects
    }
}
