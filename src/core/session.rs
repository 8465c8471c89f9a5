//! A play session: one reading of the player's text and the level built
//! from it. Replaced wholesale on the next reading.

use log::info;
use thiserror::Error;

use crate::core::audio::{AudioHandle, MusicService, NarrationService};
use crate::core::collision::Pickup;
use crate::core::interpret::{interpret, EmotionClassifier, MoodReading, NarrativeWriter};
use crate::core::pipeline::LevelGenerator;
use crate::core::profile::PhysicsProfile;
use crate::core::store::{LevelStore, StoreError};
use crate::schema::level::{LevelData, LevelError};

/// Coins needed before the goal counts.
pub const COINS_NEEDED: u32 = 5;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("level error: {0}")]
    Level(#[from] LevelError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Score and win state for the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub score: u32,
    pub coins_needed: u32,
    pub reached_goal: bool,
    pub won: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Progress {
            score: 0,
            coins_needed: COINS_NEEDED,
            reached_goal: false,
            won: false,
        }
    }
}

impl Progress {
    /// Apply pickups; returns true on the frame the level is won.
    pub fn record(&mut self, pickups: &[Pickup]) -> bool {
        for pickup in pickups {
            match pickup {
                Pickup::Coin => self.score += 1,
                Pickup::Goal => self.reached_goal = true,
            }
        }
        if !self.won && self.reached_goal && self.score >= self.coins_needed {
            self.won = true;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub reading: MoodReading,
    pub level: LevelData,
    pub physics: PhysicsProfile,
    pub progress: Progress,
}

impl Session {
    /// Interpret `text`, generate its level, and start narration and music.
    pub fn begin<C, W, N, M>(
        text: &str,
        classifier: &C,
        writer: &W,
        generator: &LevelGenerator,
        audio: &mut AudioHandle<N, M>,
    ) -> Result<Session, SessionError>
    where
        C: EmotionClassifier + ?Sized,
        W: NarrativeWriter + ?Sized,
        N: NarrationService,
        M: MusicService,
    {
        let reading = interpret(text, classifier, writer);
        let level = generator.generate(reading.emotion)?;
        let physics = generator.profiles().physics(reading.emotion).clone();

        audio.music.play_for(reading.emotion);
        audio
            .narration
            .speak(&reading.narrative, reading.atmosphere.narrator_voice);
        info!("session started: {} level, seed {:?}", reading.emotion, level.seed);

        Ok(Session {
            reading,
            level,
            physics,
            progress: Progress::default(),
        })
    }

    /// Persist the level under `id`.
    pub fn save(&self, store: &LevelStore, id: u32) -> Result<(), SessionError> {
        store.save(&self.level, id)?;
        Ok(())
    }

    /// Throw the level away and build a new one for the same reading.
    pub fn reset(&mut self, generator: &LevelGenerator) -> Result<(), SessionError> {
        self.level = generator.generate(self.reading.emotion)?;
        self.progress = Progress::default();
        Ok(())
    }

    pub fn end<N: NarrationService, M: MusicService>(self, audio: &mut AudioHandle<N, M>) {
        audio.stop_all();
    }
}
