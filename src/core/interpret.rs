//! Mood interpretation: free text → emotion → narrative and atmosphere.
//!
//! Classification and narrative writing sit behind traits so an external
//! language-model service can be plugged in. The offline implementations
//! here are deterministic.

use log::{info, warn};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::schema::emotion::Emotion;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("service rejected the request: {0}")]
    Rejected(String),
}

/// Maps a player's free text to an emotion.
pub trait EmotionClassifier {
    fn classify(&self, text: &str) -> Result<Emotion, ClassifyError>;
}

/// Writes the short intro narrative for a reading.
pub trait NarrativeWriter {
    fn write(&self, text: &str, emotion: Emotion) -> Result<String, ClassifyError>;
}

const JOY_WORDS: &[&str] = &[
    "happy", "happiness", "joy", "joyful", "excited", "excitement", "exciting", "success",
    "successful", "succeeded", "love", "loved", "achievement", "achieved", "proud", "celebrate",
    "celebrated", "won", "win", "promotion", "passed", "great", "wonderful", "amazing",
];
const FEAR_WORDS: &[&str] = &[
    "worry", "worried", "worrying", "anxiety", "anxious", "stress", "stressed", "nervous",
    "uncertain", "uncertainty", "scared", "afraid", "fear", "terrified", "dread", "panic",
    "deadline", "exam",
];
const ANGER_WORDS: &[&str] = &[
    "frustration", "frustrated", "frustrating", "rage", "angry", "anger", "furious",
    "injustice", "unfair", "betrayal", "betrayed", "irritation", "irritated", "annoyed",
    "annoying", "hate", "mad",
];
const NEUTRAL_WORDS: &[&str] = &[
    "calm", "mundane", "thoughtful", "balanced", "ordinary", "routine", "fine", "okay", "usual",
];

/// Offline classifier counting vocabulary hits per emotion.
///
/// The emotion with the most hits wins; no hits or a tie between emotions
/// reads as `Neutral`.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    words: FxHashMap<String, Emotion>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordClassifier {
    pub fn empty() -> KeywordClassifier {
        KeywordClassifier {
            words: FxHashMap::default(),
        }
    }

    pub fn builtin() -> KeywordClassifier {
        let mut classifier = Self::empty();
        for (emotion, words) in [
            (Emotion::Joy, JOY_WORDS),
            (Emotion::Fear, FEAR_WORDS),
            (Emotion::Anger, ANGER_WORDS),
            (Emotion::Neutral, NEUTRAL_WORDS),
        ] {
            for word in words {
                classifier.insert(word, emotion);
            }
        }
        classifier
    }

    /// Add or reassign a vocabulary word. Matching is case-insensitive.
    pub fn insert(&mut self, word: &str, emotion: Emotion) {
        self.words.insert(word.to_lowercase(), emotion);
    }

    /// Hits per emotion, indexed by `Emotion as usize`.
    pub fn score(&self, text: &str) -> [usize; 4] {
        let mut hits = [0; 4];
        for word in text
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
        {
            if let Some(emotion) = self.words.get(&word.to_lowercase()) {
                hits[*emotion as usize] += 1;
            }
        }
        hits
    }
}

impl EmotionClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Result<Emotion, ClassifyError> {
        let hits = self.score(text);
        let best = hits.iter().copied().max().unwrap_or(0);
        if best == 0 {
            return Ok(Emotion::Neutral);
        }
        let mut leaders = Emotion::ALL.into_iter().filter(|e| hits[*e as usize] == best);
        match (leaders.next(), leaders.next()) {
            (Some(emotion), None) => Ok(emotion),
            _ => Ok(Emotion::Neutral),
        }
    }
}

/// Writer that always returns the built-in template for the emotion.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateWriter;

impl NarrativeWriter for TemplateWriter {
    fn write(&self, _text: &str, emotion: Emotion) -> Result<String, ClassifyError> {
        Ok(fallback_narrative(emotion).to_string())
    }
}

/// The canned three-sentence intro for an emotion.
pub fn fallback_narrative(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Joy => "Celebrating your success, you bound into a sunlit forest. Golden coins sparkle ahead. Your adventure begins!",
        Emotion::Fear => "Despite your worries, you step into misty shadows. Courage guides your paws. The challenge awaits!",
        Emotion::Anger => "Fueled by determination, you charge into a crimson realm. Your strength will overcome all. Victory awaits!",
        Emotion::Neutral => "Reflecting on your thoughts, you enter a peaceful clearing. Wisdom guides your path. The journey starts!",
    }
}

/// RGB endpoints of the fallback sky gradient, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyGradient {
    pub top: [u8; 3],
    pub bottom: [u8; 3],
}

impl SkyGradient {
    /// Colour of row `y` in a sky `height` rows tall.
    pub fn at(&self, y: usize, height: usize) -> [u8; 3] {
        let ratio = if height <= 1 {
            0.0
        } else {
            y.min(height - 1) as f32 / (height - 1) as f32
        };
        let mut out = [0; 3];
        for (i, c) in out.iter_mut().enumerate() {
            let (a, b) = (self.top[i] as f32, self.bottom[i] as f32);
            *c = (a + (b - a) * ratio).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

/// Presentation attached to an emotion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atmosphere {
    pub setting: &'static str,
    pub ambience: &'static str,
    pub adjectives: [&'static str; 5],
    pub sky: SkyGradient,
    /// Background music asset, relative to the audio directory.
    pub music_track: &'static str,
    /// Narration voice name passed to the speech service.
    pub narrator_voice: &'static str,
}

impl Atmosphere {
    pub fn for_emotion(emotion: Emotion) -> Atmosphere {
        match emotion {
            Emotion::Joy => Atmosphere {
                setting: "a vibrant emerald forest with golden sunbeams piercing through lush canopy",
                ambience: "chirping birds, rustling leaves, and the sweet scent of blooming flowers",
                adjectives: ["energetic", "optimistic", "bouncy", "radiant", "cheerful"],
                sky: SkyGradient { top: [255, 223, 0], bottom: [135, 206, 250] },
                music_track: "bgm/bgm_joy.wav",
                narrator_voice: "en-US-AvaMultilingualNeural",
            },
            Emotion::Fear => Atmosphere {
                setting: "a dark, mist-shrouded woodland where twisted trees cast eerie shadows",
                ambience: "haunting whispers, creaking branches, and the distant howl of unknown creatures",
                adjectives: ["cautious", "trembling", "alert", "nervous", "wary"],
                sky: SkyGradient { top: [25, 25, 112], bottom: [0, 0, 0] },
                music_track: "bgm/bgm_fear.wav",
                narrator_voice: "en-US-BrianMultilingualNeural",
            },
            Emotion::Anger => Atmosphere {
                setting: "a blazing crimson realm where jagged rocks pierce a blood-red sky",
                ambience: "crackling flames, thunderous roars, and the heat of molten earth",
                adjectives: ["fierce", "determined", "burning", "relentless", "powerful"],
                sky: SkyGradient { top: [220, 20, 60], bottom: [139, 0, 0] },
                music_track: "bgm/bgm_anger.wav",
                narrator_voice: "en-US-AndrewMultilingualNeural",
            },
            Emotion::Neutral => Atmosphere {
                setting: "a peaceful clearing under a calm azure sky with fluffy white clouds",
                ambience: "gentle breezes, distant waterfalls, and the quiet rustle of grass",
                adjectives: ["thoughtful", "balanced", "steady", "focused", "serene"],
                sky: SkyGradient { top: [135, 206, 235], bottom: [135, 206, 235] },
                music_track: "bgm/bgm_neutral.wav",
                narrator_voice: "en-IN-PrabhatNeural",
            },
        }
    }
}

/// The outcome of interpreting a piece of player text.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodReading {
    pub emotion: Emotion,
    pub narrative: String,
    pub atmosphere: Atmosphere,
}

/// Classify `text` and write its narrative.
///
/// Never fails: a classifier error reads as `Neutral` and a writer error
/// or blank narrative uses `fallback_narrative`.
pub fn interpret<C, W>(text: &str, classifier: &C, writer: &W) -> MoodReading
where
    C: EmotionClassifier + ?Sized,
    W: NarrativeWriter + ?Sized,
{
    let emotion = classifier.classify(text).unwrap_or_else(|e| {
        warn!("classification failed ({e}), reading as neutral");
        Emotion::Neutral
    });
    let narrative = match writer.write(text, emotion) {
        Ok(n) if !n.trim().is_empty() => n,
        Ok(_) => {
            warn!("narrative writer returned nothing, using template");
            fallback_narrative(emotion).to_string()
        }
        Err(e) => {
            warn!("narrative writing failed ({e}), using template");
            fallback_narrative(emotion).to_string()
        }
    };
    info!("interpreted input as {emotion}");
    MoodReading {
        emotion,
        narrative,
        atmosphere: Atmosphere::for_emotion(emotion),
    }
}
