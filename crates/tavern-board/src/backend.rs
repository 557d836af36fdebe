//! Audio output seam.
//!
//! The mixer never decodes or plays anything itself.  A host provides an
//! [`AudioBackend`] that opens [`Voice`]s (one per playing channel) for URLs
//! returned by the catalog; the mixer only drives their source, volume and
//! transport.

/// Why a voice refused to start.  The mixer logs these and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The host blocked playback until user interaction (autoplay policy).
    #[error("playback blocked until user interaction")]
    Blocked,
    #[error("cannot play {url}: {reason}")]
    Source { url: String, reason: String },
}

/// One audio channel.
pub trait Voice {
    /// Load a new source.  Does not start playback.
    fn set_source(&mut self, url: &str);
    fn set_looping(&mut self, looping: bool);
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Seek back to position zero.
    fn rewind(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    /// True once a non-looping voice reached its end or failed to decode.
    fn is_done(&self) -> bool;
}

pub trait AudioBackend {
    type Voice: Voice;

    /// Open an idle voice, optionally with a source already loaded.
    fn open(&mut self, url: Option<&str>) -> Self::Voice;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory backend that records what the mixer asked for.

    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    pub struct VoiceState {
        pub source: Option<String>,
        pub looping: bool,
        pub paused: bool,
        pub volume: f32,
        /// Number of `rewind` calls.
        pub rewinds: usize,
        /// Number of successful `play` calls.
        pub plays: usize,
        pub done: bool,
    }

    #[derive(Clone)]
    pub struct FakeVoice {
        pub state: Rc<RefCell<VoiceState>>,
        blocked: Rc<RefCell<HashSet<String>>>,
    }

    impl Voice for FakeVoice {
        fn set_source(&mut self, url: &str) {
            self.state.borrow_mut().source = Some(url.to_string());
        }

        fn set_looping(&mut self, looping: bool) {
            self.state.borrow_mut().looping = looping;
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            let mut state = self.state.borrow_mut();
            let url = state.source.clone().unwrap_or_default();
            if self.blocked.borrow().contains(&url) {
                state.paused = true;
                return Err(PlaybackError::Blocked);
            }
            state.paused = false;
            state.plays += 1;
            Ok(())
        }

        fn pause(&mut self) {
            self.state.borrow_mut().paused = true;
        }

        fn is_paused(&self) -> bool {
            self.state.borrow().paused
        }

        fn rewind(&mut self) {
            self.state.borrow_mut().rewinds += 1;
        }

        fn set_volume(&mut self, volume: f32) {
            self.state.borrow_mut().volume = volume;
        }

        fn volume(&self) -> f32 {
            self.state.borrow().volume
        }

        fn is_done(&self) -> bool {
            self.state.borrow().done
        }
    }

    /// Backend handing out [`FakeVoice`]s and remembering every one of them.
    #[derive(Default)]
    pub struct FakeBackend {
        pub opened: Vec<FakeVoice>,
        blocked: Rc<RefCell<HashSet<String>>>,
    }

    impl FakeBackend {
        /// Make `play` fail for `url`, like a browser autoplay block.
        pub fn block(&self, url: &str) {
            self.blocked.borrow_mut().insert(url.to_string());
        }

        /// Latest voice opened for `url`.
        pub fn voice_for(&self, url: &str) -> Option<FakeVoice> {
            self.opened
                .iter()
                .rev()
                .find(|v| v.state.borrow().source.as_deref() == Some(url))
                .cloned()
        }
    }

    impl AudioBackend for FakeBackend {
        type Voice = FakeVoice;

        fn open(&mut self, url: Option<&str>) -> FakeVoice {
            let voice = FakeVoice {
                state: Rc::new(RefCell::new(VoiceState {
                    source: url.map(str::to_string),
                    paused: true,
                    volume: 1.0,
                    ..VoiceState::default()
                })),
                blocked: self.blocked.clone(),
            };
            self.opened.push(voice.clone());
            voice
        }
    }
}
