//! Audio collaborators: narration and background music.
//!
//! Real playback lives outside the crate. `AudioHandle` is an owned value
//! passed to whoever needs it; there is no global mixer.

use log::debug;

use crate::schema::emotion::Emotion;

/// Text-to-speech narration.
pub trait NarrationService {
    /// Start speaking `text` with `voice`, cutting off any narration in
    /// progress.
    fn speak(&mut self, text: &str, voice: &str);
    fn stop(&mut self);
    fn is_speaking(&self) -> bool;
}

/// Per-emotion background music.
pub trait MusicService {
    /// Switch to the track for `emotion`, stopping the current one.
    fn play_for(&mut self, emotion: Emotion);
    fn stop(&mut self);
    fn current(&self) -> Option<Emotion>;
}

/// The narration and music services a session drives.
#[derive(Debug, Default)]
pub struct AudioHandle<N = SilentNarrator, M = SilentMusic> {
    pub narration: N,
    pub music: M,
}

impl<N: NarrationService, M: MusicService> AudioHandle<N, M> {
    pub fn new(narration: N, music: M) -> Self {
        AudioHandle { narration, music }
    }

    pub fn stop_all(&mut self) {
        self.narration.stop();
        self.music.stop();
    }
}

impl AudioHandle {
    pub fn silent() -> Self {
        Self::default()
    }
}

/// Narrator that plays nothing and remembers what it was asked to say.
#[derive(Debug, Clone, Default)]
pub struct SilentNarrator {
    /// Every `(voice, text)` request, in order.
    pub requests: Vec<(String, String)>,
    /// Requests cut off by a later `speak` or `stop`.
    pub interrupted: usize,
    active: Option<usize>,
}

impl SilentNarrator {
    /// Mark the current narration as finished.
    pub fn finish(&mut self) {
        self.active = None;
    }

    pub fn current_text(&self) -> Option<&str> {
        self.active.map(|i| self.requests[i].1.as_str())
    }
}

impl NarrationService for SilentNarrator {
    fn speak(&mut self, text: &str, voice: &str) {
        if self.active.is_some() {
            self.stop();
        }
        debug!("narrating with {voice}: {text}");
        self.requests.push((voice.to_string(), text.to_string()));
        self.active = Some(self.requests.len() - 1);
    }

    fn stop(&mut self) {
        if self.active.take().is_some() {
            self.interrupted += 1;
        }
    }

    fn is_speaking(&self) -> bool {
        self.active.is_some()
    }
}

/// Music player that plays nothing and keeps a history of tracks.
#[derive(Debug, Clone, Default)]
pub struct SilentMusic {
    pub history: Vec<Emotion>,
    current: Option<Emotion>,
}

impl MusicService for SilentMusic {
    fn play_for(&mut self, emotion: Emotion) {
        self.stop();
        debug!("music: {emotion}");
        self.history.push(emotion);
        self.current = Some(emotion);
    }

    fn stop(&mut self) {
        self.current = None;
    }

    fn current(&self) -> Option<Emotion> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_speech_supersedes_old() {
        let mut narrator = SilentNarrator::default();
        narrator.speak("first", "voice-a");
        narrator.speak("second", "voice-b");
        assert!(narrator.is_speaking());
        assert_eq!(narrator.current_text(), Some("second"));
        assert_eq!(narrator.interrupted, 1);
        assert_eq!(narrator.requests.len(), 2);
    }

    #[test]
    fn finished_speech_is_not_interrupted() {
        let mut narrator = SilentNarrator::default();
        narrator.speak("hello", "v");
        narrator.finish();
        narrator.speak("again", "v");
        narrator.stop();
        assert!(!narrator.is_speaking());
        assert_eq!(narrator.interrupted, 1);
    }

    #[test]
    fn music_switches_tracks() {
        let mut audio = AudioHandle::silent();
        audio.music.play_for(Emotion::Joy);
        audio.music.play_for(Emotion::Fear);
        assert_eq!(audio.music.current(), Some(Emotion::Fear));
        assert_eq!(audio.music.history, vec![Emotion::Joy, Emotion::Fear]);
        audio.stop_all();
        assert_eq!(audio.music.current(), None);
    }
}
