//! Background theme channel with crossfade.
//!
//! One looping voice.  Picking a different theme fades the voice to silence,
//! swaps the source and fades back in; picking the loaded theme toggles
//! pause/resume.  The whole fade-out/swap/fade-in sequence is a single
//! [`Crossfade`] value, so starting a new one drops the old one together with
//! its pending swap.

use std::time::{Duration, Instant};

use tavern_proto::protocol::Track;
use tracing::debug;

use super::ramp::Ramp;
use crate::backend::Voice;

/// In-flight crossfade.  At most one exists per mixer.
#[derive(Debug, Clone)]
enum Crossfade {
    /// Fading the old source out; `next` is loaded once the ramp completes.
    FadeOut { ramp: Ramp, next: Track, target: f32 },
    FadeIn { ramp: Ramp },
}

/// What a call to [`ThemeMixer::play_theme`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChange {
    /// Loaded theme was playing and is now paused.
    Paused,
    /// Loaded theme was paused and is playing again.
    Resumed,
    /// Nothing was loaded; the theme starts silent and fades in.
    FadingIn,
    /// Another theme was loaded; fading it out before the swap.
    Crossfading,
}

/// State of the theme transport, for the manual play/pause control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Playing,
    Paused,
}

impl Transport {
    /// Label for the play/pause button: the action it would perform.
    pub fn button_label(&self) -> &'static str {
        match self {
            Transport::Playing => "Pause",
            Transport::Paused => "Play",
        }
    }
}

pub struct ThemeMixer<V> {
    voice: V,
    /// Source currently set on the voice.
    loaded: Option<Track>,
    /// Highlighted list entry; moves at click time, before any swap.
    selected: Option<Track>,
    crossfade: Option<Crossfade>,
    fade_out: Duration,
    fade_in: Duration,
}

impl<V: Voice> ThemeMixer<V> {
    pub fn new(voice: V, fade_out: Duration, fade_in: Duration) -> Self {
        Self {
            voice,
            loaded: None,
            selected: None,
            crossfade: None,
            fade_out,
            fade_in,
        }
    }

    /// Select `track`.  `target` is the bus volume the fade-in ends on.
    pub fn play_theme(&mut self, track: &Track, target: f32, now: Instant) -> ThemeChange {
        if self.loaded.as_ref().map(|t| t.url == track.url).unwrap_or(false) {
            return match self.toggle() {
                Transport::Playing => ThemeChange::Resumed,
                Transport::Paused => ThemeChange::Paused,
            };
        }

        let change = if self.loaded.is_none() {
            self.load(track);
            self.crossfade = Some(Crossfade::FadeIn {
                ramp: Ramp::new(0.0, target, now, self.fade_in),
            });
            ThemeChange::FadingIn
        } else {
            // A silent voice (muted bus, fade-in just begun) fades from the target.
            let current = self.voice.volume();
            let from = if current > 0.0 { current } else { target };
            // Replaces any fade in flight, including its pending swap.
            self.crossfade = Some(Crossfade::FadeOut {
                ramp: Ramp::new(from, 0.0, now, self.fade_out),
                next: track.clone(),
                target,
            });
            ThemeChange::Crossfading
        };

        self.selected = Some(track.clone());
        change
    }

    /// Advance the running crossfade.  Returns true while one is active.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(fade) = self.crossfade.take() else {
            return false;
        };

        self.crossfade = match fade {
            Crossfade::FadeOut { ramp, next, target } => {
                self.voice.set_volume(ramp.level_at(now));
                if ramp.is_finished(now) {
                    self.voice.pause();
                    self.load(&next);
                    self.voice.rewind();
                    Some(Crossfade::FadeIn {
                        ramp: Ramp::new(0.0, target, now, self.fade_in),
                    })
                } else {
                    Some(Crossfade::FadeOut { ramp, next, target })
                }
            }
            Crossfade::FadeIn { ramp } => {
                self.voice.set_volume(ramp.level_at(now));
                if ramp.is_finished(now) {
                    None
                } else {
                    Some(Crossfade::FadeIn { ramp })
                }
            }
        };
        self.crossfade.is_some()
    }

    /// Manual play/pause control.  `None` when no theme is loaded.
    pub fn toggle_playback(&mut self) -> Option<Transport> {
        self.loaded.as_ref()?;
        Some(self.toggle())
    }

    /// Bus volume change; a running ramp overwrites it on its next tick.
    pub fn set_volume(&mut self, volume: f32) {
        self.voice.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.voice.volume()
    }

    pub fn transport(&self) -> Option<Transport> {
        self.loaded.as_ref()?;
        Some(if self.voice.is_paused() {
            Transport::Paused
        } else {
            Transport::Playing
        })
    }

    pub fn loaded(&self) -> Option<&Track> {
        self.loaded.as_ref()
    }

    pub fn selected(&self) -> Option<&Track> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, url: &str) -> bool {
        self.selected.as_ref().map(|t| t.url == url).unwrap_or(false)
    }

    pub fn is_fading(&self) -> bool {
        self.crossfade.is_some()
    }

    /// "Now playing" label.
    pub fn now_playing(&self) -> Option<String> {
        self.selected
            .as_ref()
            .map(|t| format!("Theme: {}", t.name))
    }

    fn load(&mut self, track: &Track) {
        self.voice.set_source(&track.url);
        self.voice.set_looping(true);
        self.voice.set_volume(0.0);
        if let Err(e) = self.voice.play() {
            // Selection still shows; the user can press play manually.
            debug!("Theme {} did not start: {}", track.url, e);
        }
        self.loaded = Some(track.clone());
    }

    fn toggle(&mut self) -> Transport {
        if self.voice.is_paused() {
            if let Err(e) = self.voice.play() {
                debug!("Theme resume failed: {}", e);
                return Transport::Paused;
            }
            Transport::Playing
        } else {
            self.voice.pause();
            Transport::Paused
        }
    }
}
