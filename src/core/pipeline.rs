//! The generation pipeline: emotion → profile → terrain → floating
//! platforms → decoration → collectibles → markers.
//!
//! Each stage reads only the layers produced before it and owns the layer
//! it returns.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

use crate::core::collectibles::{place_coins, CoinPlan};
use crate::core::decoration::{background_palms, foreground_palms, grass};
use crate::core::floating::{plan_floating, FloatingPlan};
use crate::core::markers::{self, GoalPolicy};
use crate::core::profile::{ProfileError, ProfileTable};
use crate::core::terrain::{synthesize, TerrainPlan};
use crate::schema::emotion::Emotion;
use crate::schema::layer::{Layer, LayerKind, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::schema::level::{LevelData, LevelError};

/// Default ground surface row.
pub const DEFAULT_GROUND_ROW: usize = 8;

/// Level shape and marker policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub ground_row: usize,
    pub goal_policy: GoalPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_GROUND_ROW)
    }
}

impl GeneratorConfig {
    /// Panics on a shape the stages cannot work with: width below 20,
    /// height below 8, or a ground row outside `[5, height - 2]`.
    pub fn new(width: usize, height: usize, ground_row: usize) -> GeneratorConfig {
        assert!(width >= 20, "level width {width} is below 20");
        assert!(height >= 8, "level height {height} is below 8");
        assert!(
            (5..=height - 2).contains(&ground_row),
            "ground row {ground_row} outside [5, {}]",
            height - 2
        );
        GeneratorConfig {
            width,
            height,
            ground_row,
            goal_policy: GoalPolicy::default(),
        }
    }

    pub fn with_goal_policy(mut self, policy: GoalPolicy) -> Self {
        self.goal_policy = policy;
        self
    }
}

/// A level together with the placement records behind it.
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub level: LevelData,
    pub terrain: TerrainPlan,
    pub floating: FloatingPlan,
    pub coins: CoinPlan,
}

/// Produces levels from emotions. Built via `LevelGenerator::builder()`.
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    profiles: ProfileTable,
    config: GeneratorConfig,
    seed: Option<u64>,
}

/// Builder for constructing a `LevelGenerator`.
#[derive(Debug, Default)]
pub struct LevelGeneratorBuilder {
    seed: Option<u64>,
    profiles: Option<ProfileTable>,
    profiles_path: Option<PathBuf>,
    config: GeneratorConfig,
    goal_policy: Option<GoalPolicy>,
}

impl Default for LevelGenerator {
    fn default() -> Self {
        LevelGenerator {
            profiles: ProfileTable::builtin(),
            config: GeneratorConfig::default(),
            seed: None,
        }
    }
}

impl LevelGenerator {
    pub fn builder() -> LevelGeneratorBuilder {
        LevelGeneratorBuilder::default()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    /// Generate a level for `emotion`.
    ///
    /// With a configured seed every call reproduces the same level; without
    /// one, each call draws a fresh seed, which is recorded on the level.
    pub fn generate(&self, emotion: Emotion) -> Result<LevelData, LevelError> {
        self.generate_detailed(emotion).map(|g| g.level)
    }

    /// Generate from a free-form label; unrecognized labels use `neutral`.
    pub fn generate_label(&self, label: &str) -> Result<LevelData, LevelError> {
        self.generate(Emotion::parse(label))
    }

    /// Like `generate`, also returning the stage placement records.
    pub fn generate_detailed(&self, emotion: Emotion) -> Result<GeneratedLevel, LevelError> {
        let seed = self.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        self.run(emotion, Some(seed), &mut rng)
    }

    /// Generate with a caller-supplied random source. The level records no
    /// seed.
    pub fn generate_with_rng<R: Rng>(
        &self,
        emotion: Emotion,
        rng: &mut R,
    ) -> Result<GeneratedLevel, LevelError> {
        self.run(emotion, None, rng)
    }

    fn run<R: Rng>(
        &self,
        emotion: Emotion,
        seed: Option<u64>,
        rng: &mut R,
    ) -> Result<GeneratedLevel, LevelError> {
        let GeneratorConfig {
            width,
            height,
            ground_row,
            goal_policy,
        } = self.config;
        let profile = self.profiles.generation(emotion);

        let mut terrain = synthesize(width, height, ground_row, profile, rng);
        let floating = plan_floating(&mut terrain.layer, ground_row, profile, rng);
        let terrain_layer = &terrain.layer;

        let grass_layer = grass(terrain_layer, profile, rng);
        let bg_palms = background_palms(terrain_layer, profile, rng);
        let fg_palms = foreground_palms(terrain_layer, ground_row, profile, rng);
        let coins = place_coins(terrain_layer, &fg_palms, profile, rng);
        let player = markers::resolve(terrain_layer, ground_row, goal_policy);

        let mut layers = vec![
            terrain_layer.clone(),
            coins.layer.clone(),
            player,
            fg_palms,
            bg_palms,
            grass_layer,
        ];
        layers.extend(
            LayerKind::ALL
                .iter()
                .filter(|k| k.is_placeholder())
                .map(|k| Layer::new(*k, width, height)),
        );

        let level = LevelData::from_layers(emotion, seed, ground_row, layers)?;
        level.validate()?;

        info!(
            "generated {emotion} level {width}x{height} (seed {}): {} runs, {} gaps, {} floating tiles, {} coins ({} challenge)",
            seed.map_or_else(|| "external".to_string(), |s| s.to_string()),
            terrain.runs.len(),
            terrain.gaps.len(),
            floating.tile_count(),
            level.layer(LayerKind::Coins).count(|t| !t.is_air()),
            coins.challenge.len(),
        );

        Ok(GeneratedLevel {
            level,
            terrain,
            floating,
            coins,
        })
    }
}

impl LevelGeneratorBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Provide a profile table directly.
    pub fn profiles(mut self, profiles: ProfileTable) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Load profile overrides from a RON file at build time.
    pub fn profiles_file(mut self, path: impl AsRef<Path>) -> Self {
        self.profiles_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn goal_policy(mut self, policy: GoalPolicy) -> Self {
        self.goal_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<LevelGenerator, ProfileError> {
        // a file wins over a directly provided table
        let profiles = match self.profiles_path {
            Some(path) => ProfileTable::load_from_ron(&path)?,
            None => self.profiles.unwrap_or_default(),
        };
        let mut config = self.config;
        if let Some(policy) = self.goal_policy {
            config.goal_policy = policy;
        }
        Ok(LevelGenerator {
            profiles,
            config,
            seed: self.seed,
        })
    }
}
