//! Emotion profiles: per-emotion generation parameters and player physics.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::emotion::Emotion;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("unknown emotion in profile table: {0}")]
    UnknownEmotion(String),
    #[error("invalid profile for {emotion}: {reason}")]
    Invalid { emotion: Emotion, reason: String },
}

/// Generation parameters for one emotion. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionProfile {
    /// (min, max) ground platform run length, inclusive.
    pub platform_length: (usize, usize),
    /// (min, max) gap width between ground runs, inclusive.
    pub gap_size: (usize, usize),
    pub floating_platform_chance: f64,
    pub fg_tree_chance: f64,
    pub bg_tree_chance: f64,
    pub grass_chance: f64,
    pub coin_chance: f64,
}

impl EmotionProfile {
    /// The built-in profile for `emotion`.
    pub fn builtin(emotion: Emotion) -> EmotionProfile {
        match emotion {
            Emotion::Joy => EmotionProfile {
                platform_length: (6, 12),
                gap_size: (3, 5),
                floating_platform_chance: 0.55,
                fg_tree_chance: 0.22,
                bg_tree_chance: 0.33,
                grass_chance: 0.95,
                coin_chance: 0.6,
            },
            Emotion::Fear => EmotionProfile {
                platform_length: (2, 3),
                gap_size: (1, 2),
                floating_platform_chance: 0.1,
                fg_tree_chance: 0.08,
                bg_tree_chance: 0.17,
                grass_chance: 0.55,
                coin_chance: 0.3,
            },
            Emotion::Anger => EmotionProfile {
                platform_length: (1, 8),
                gap_size: (3, 7),
                floating_platform_chance: 0.77,
                fg_tree_chance: 0.09,
                bg_tree_chance: 0.15,
                grass_chance: 0.45,
                coin_chance: 0.15,
            },
            Emotion::Neutral => EmotionProfile {
                platform_length: (4, 10),
                gap_size: (2, 4),
                floating_platform_chance: 0.4,
                fg_tree_chance: 0.15,
                bg_tree_chance: 0.25,
                grass_chance: 0.85,
                coin_chance: 0.3,
            },
        }
    }

    pub fn validate(&self, emotion: Emotion) -> Result<(), ProfileError> {
        let invalid = |reason: String| ProfileError::Invalid { emotion, reason };
        let (pmin, pmax) = self.platform_length;
        if pmin == 0 || pmin > pmax {
            return Err(invalid(format!("platform_length ({pmin}, {pmax})")));
        }
        let (gmin, gmax) = self.gap_size;
        if gmin > gmax {
            return Err(invalid(format!("gap_size ({gmin}, {gmax})")));
        }
        for (name, p) in [
            ("floating_platform_chance", self.floating_platform_chance),
            ("fg_tree_chance", self.fg_tree_chance),
            ("bg_tree_chance", self.bg_tree_chance),
            ("grass_chance", self.grass_chance),
            ("coin_chance", self.coin_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("{name} = {p} outside [0, 1]")));
            }
        }
        Ok(())
    }
}

/// Player movement tuning for one emotion, in pixels per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsProfile {
    pub run_speed: f32,
    pub gravity: f32,
    /// Initial vertical velocity of a jump (negative is up).
    pub jump_speed: f32,
    pub max_fall_speed: f32,
    pub animation_speed: f32,
}

impl PhysicsProfile {
    pub fn builtin(emotion: Emotion) -> PhysicsProfile {
        let (run_speed, gravity, jump_speed, max_fall_speed, animation_speed) = match emotion {
            Emotion::Joy => (6.0, 0.4, -16.0, 8.0, 0.2),
            Emotion::Fear => (4.0, 1.3, -20.0, 18.0, 0.1),
            Emotion::Anger => (9.0, 1.3, -28.0, 20.0, 0.25),
            Emotion::Neutral => (5.0, 0.9, -20.0, 18.0, 0.15),
        };
        PhysicsProfile {
            run_speed,
            gravity,
            jump_speed,
            max_fall_speed,
            animation_speed,
        }
    }

    /// Every value must be finite, and falls must have a positive cap.
    pub fn validate(&self, emotion: Emotion) -> Result<(), ProfileError> {
        let invalid = |reason: String| ProfileError::Invalid { emotion, reason };
        for (name, v) in [
            ("run_speed", self.run_speed),
            ("gravity", self.gravity),
            ("jump_speed", self.jump_speed),
            ("max_fall_speed", self.max_fall_speed),
            ("animation_speed", self.animation_speed),
        ] {
            if !v.is_finite() {
                return Err(invalid(format!("{name} = {v} is not finite")));
            }
        }
        if self.max_fall_speed <= 0.0 {
            return Err(invalid(format!("max_fall_speed = {} must be positive", self.max_fall_speed)));
        }
        Ok(())
    }
}

/// Everything an emotion tunes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    pub generation: EmotionProfile,
    pub physics: PhysicsProfile,
}

impl MoodProfile {
    pub fn builtin(emotion: Emotion) -> MoodProfile {
        MoodProfile {
            generation: EmotionProfile::builtin(emotion),
            physics: PhysicsProfile::builtin(emotion),
        }
    }
}

// RON entries may override only one half of a profile.
#[derive(Debug, Deserialize)]
struct RonEntry {
    #[serde(default)]
    generation: Option<EmotionProfile>,
    #[serde(default)]
    physics: Option<PhysicsProfile>,
}

/// Lookup from emotion to profile. Holds an entry for every emotion, so
/// lookup is total.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTable {
    // indexed by `Emotion as usize`
    entries: [MoodProfile; 4],
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileTable {
    pub fn builtin() -> ProfileTable {
        ProfileTable {
            entries: Emotion::ALL.map(MoodProfile::builtin),
        }
    }

    /// Load overrides from a RON file on top of the built-in table.
    pub fn load_from_ron(path: &Path) -> Result<ProfileTable, ProfileError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse overrides from a RON string on top of the built-in table.
    ///
    /// Keys are lowercase emotion names; unknown keys are an error rather
    /// than silently folding into `neutral`.
    pub fn parse_ron(input: &str) -> Result<ProfileTable, ProfileError> {
        let raw: FxHashMap<String, RonEntry> = ron::from_str(input)?;
        let mut table = Self::builtin();
        for (key, entry) in raw {
            let emotion = match key.to_ascii_lowercase().as_str() {
                "joy" => Emotion::Joy,
                "fear" => Emotion::Fear,
                "anger" => Emotion::Anger,
                "neutral" => Emotion::Neutral,
                _ => return Err(ProfileError::UnknownEmotion(key)),
            };
            let slot = &mut table.entries[emotion as usize];
            if let Some(generation) = entry.generation {
                generation.validate(emotion)?;
                slot.generation = generation;
            }
            if let Some(physics) = entry.physics {
                physics.validate(emotion)?;
                slot.physics = physics;
            }
        }
        Ok(table)
    }

    pub fn get(&self, emotion: Emotion) -> &MoodProfile {
        &self.entries[emotion as usize]
    }

    pub fn generation(&self, emotion: Emotion) -> &EmotionProfile {
        &self.get(emotion).generation
    }

    pub fn physics(&self, emotion: Emotion) -> &PhysicsProfile {
        &self.get(emotion).physics
    }

    /// Look up by free-form label; unrecognized labels use `neutral`.
    pub fn for_label(&self, label: &str) -> &MoodProfile {
        self.get(Emotion::parse(label))
    }
}
