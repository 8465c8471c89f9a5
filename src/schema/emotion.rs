//! The emotion categories a reading resolves to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The emotion category driving generation and physics tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    Joy,
    Fear,
    Anger,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [Self::Joy, Self::Fear, Self::Anger, Self::Neutral];

    /// Read a label case-insensitively. Anything outside the four
    /// categories is read as `Neutral`.
    pub fn parse(label: &str) -> Emotion {
        match label.trim().to_ascii_lowercase().as_str() {
            "joy" => Self::Joy,
            "fear" => Self::Fear,
            "anger" => Self::Anger,
            _ => Self::Neutral,
        }
    }

    /// Lowercase canonical name, as used in file names and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Joy => "joy",
            Self::Fear => "fear",
            Self::Anger => "anger",
            Self::Neutral => "neutral",
        }
    }

    /// Returns the tag string for this emotion (e.g., "mood:fear").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Joy => "mood:joy",
            Self::Fear => "mood:fear",
            Self::Anger => "mood:anger",
            Self::Neutral => "mood:neutral",
        }
    }
}

impl Default for Emotion {
    fn default() -> Self {
        Self::Neutral
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Emotion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
