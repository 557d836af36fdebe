//! One-shot effect channels keyed by URL.
//!
//! Clicking an effect starts it; clicking it again while it plays stops it.
//! Distinct effects overlap freely and never interact with the theme channel.

use std::collections::HashMap;

use tavern_proto::protocol::Track;
use tracing::debug;

use crate::backend::{AudioBackend, PlaybackError, Voice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectChange {
    Started,
    /// It was already playing; now stopped and removed.
    Stopped,
    /// The voice refused to start.  It stays registered, so the effect is
    /// still highlighted and the next click stops it.
    Failed(PlaybackError),
}

pub struct EffectBoard<V> {
    active: HashMap<String, V>,
}

impl<V: Voice> Default for EffectBoard<V> {
    fn default() -> Self {
        Self {
            active: HashMap::new(),
        }
    }
}

impl<V: Voice> EffectBoard<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle<B>(&mut self, backend: &mut B, track: &Track, volume: f32) -> EffectChange
    where
        B: AudioBackend<Voice = V>,
    {
        if let Some(mut voice) = self.active.remove(&track.url) {
            voice.pause();
            voice.rewind();
            return EffectChange::Stopped;
        }

        let mut voice = backend.open(Some(&track.url));
        voice.set_looping(false);
        voice.set_volume(volume);
        let change = match voice.play() {
            Ok(()) => EffectChange::Started,
            Err(e) => {
                debug!("Effect {} did not start: {}", track.url, e);
                EffectChange::Failed(e)
            }
        };
        self.active.insert(track.url.clone(), voice);
        change
    }

    /// Drop every voice that ended or errored.  Returns their URLs.
    pub fn reap(&mut self) -> Vec<String> {
        let done: Vec<String> = self
            .active
            .iter()
            .filter(|(_, voice)| voice.is_done())
            .map(|(url, _)| url.clone())
            .collect();
        for url in &done {
            self.active.remove(url);
        }
        done
    }

    /// Host callback for "ended"/"error" on `url`.  Returns false if unknown.
    pub fn finish(&mut self, url: &str) -> bool {
        self.active.remove(url).is_some()
    }

    pub fn set_volume(&mut self, volume: f32) {
        for voice in self.active.values_mut() {
            voice.set_volume(volume);
        }
    }

    /// Highlight query for the effect list.
    pub fn is_playing(&self, url: &str) -> bool {
        self.active.contains_key(url)
    }

    pub fn playing(&self) -> impl Iterator<Item = &str> {
        self.active.keys().map(String::as_str)
    }

    pub fn volume_of(&self, url: &str) -> Option<f32> {
        self.active.get(url).map(|v| v.volume())
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{FakeBackend, FakeVoice};

    fn door() -> Track {
        Track::new("effects", "door.wav")
    }

    #[test]
    fn test_toggle_twice_starts_then_stops() {
        let mut backend = FakeBackend::default();
        let mut board: EffectBoard<FakeVoice> = EffectBoard::new();

        assert_eq!(board.toggle(&mut backend, &door(), 0.7), EffectChange::Started);
        assert!(board.is_playing(&door().url));
        let voice = backend.voice_for(&door().url).unwrap();
        {
            let state = voice.state.borrow();
            assert!(!state.looping);
            assert_eq!(state.volume, 0.7);
        }

        assert_eq!(board.toggle(&mut backend, &door(), 0.7), EffectChange::Stopped);
        assert!(!board.is_playing(&door().url));
        assert!(board.is_empty());
        let state = voice.state.borrow();
        assert!(state.paused);
        assert_eq!(state.rewinds, 1);
        // Stopping does not open a new voice.
        assert_eq!(backend.opened.len(), 1);
    }

    #[test]
    fn test_distinct_effects_overlap() {
        let mut backend = FakeBackend::default();
        let mut board: EffectBoard<FakeVoice> = EffectBoard::new();
        let thunder = Track::new("effects", "thunder.ogg");

        board.toggle(&mut backend, &door(), 1.0);
        board.toggle(&mut backend, &thunder, 1.0);
        assert_eq!(board.len(), 2);

        let mut urls: Vec<_> = board.playing().collect();
        urls.sort();
        assert_eq!(urls, vec![door().url.as_str(), thunder.url.as_str()]);
    }

    #[test]
    fn test_reap_removes_finished_only() {
        let mut backend = FakeBackend::default();
        let mut board: EffectBoard<FakeVoice> = EffectBoard::new();
        let thunder = Track::new("effects", "thunder.ogg");

        board.toggle(&mut backend, &door(), 1.0);
        board.toggle(&mut backend, &thunder, 1.0);
        backend.voice_for(&door().url).unwrap().state.borrow_mut().done = true;

        assert_eq!(board.reap(), vec![door().url]);
        assert!(!board.is_playing(&door().url));
        assert!(board.is_playing(&thunder.url));

        // Finished effects start fresh on the next click.
        assert_eq!(board.toggle(&mut backend, &door(), 1.0), EffectChange::Started);
        assert_eq!(backend.opened.len(), 3);
    }

    #[test]
    fn test_finish_callback() {
        let mut backend = FakeBackend::default();
        let mut board: EffectBoard<FakeVoice> = EffectBoard::new();
        board.toggle(&mut backend, &door(), 1.0);
        assert!(board.finish(&door().url));
        assert!(!board.finish(&door().url));
        assert!(board.is_empty());
    }

    #[test]
    fn test_blocked_start_stays_highlighted_until_toggled() {
        let mut backend = FakeBackend::default();
        let mut board: EffectBoard<FakeVoice> = EffectBoard::new();
        backend.block(&door().url);

        assert_eq!(
            board.toggle(&mut backend, &door(), 1.0),
            EffectChange::Failed(PlaybackError::Blocked)
        );
        assert!(board.is_playing(&door().url));

        assert_eq!(board.toggle(&mut backend, &door(), 1.0), EffectChange::Stopped);
        assert!(!board.is_playing(&door().url));
        assert_eq!(backend.opened.len(), 1);
    }

    #[test]
    fn test_blocked_start_is_reaped_when_voice_errors() {
        let mut backend = FakeBackend::default();
        let mut board: EffectBoard<FakeVoice> = EffectBoard::new();
        backend.block(&door().url);
        board.toggle(&mut backend, &door(), 1.0);

        backend.voice_for(&door().url).unwrap().state.borrow_mut().done = true;
        assert_eq!(board.reap(), vec![door().url]);
        assert!(board.is_empty());
    }
}
