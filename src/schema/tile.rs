//! Tile codes: the wire format shared by the generator, the level store
//! and any renderer. Codes are persisted to text files and must stay stable.

use serde::{Deserialize, Serialize};

use super::layer::LayerKind;

/// Number of grass variants; their codes are contiguous from `GRASS_BASE`.
pub const GRASS_VARIANTS: u8 = 5;
const GRASS_BASE: u8 = 19;

/// Semantic class of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileClass {
    Empty,
    /// Solid and collidable. Only meaningful in the terrain layer.
    Structural,
    /// Purely visual.
    Decorative,
    /// Non-solid but gameplay-relevant: pickups, spawn, goal.
    Marker,
}

/// A cell's role within a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tile {
    #[default]
    Air,
    PlatformTopLeft,
    PlatformTopMid,
    PlatformTopRight,
    PillarTop,
    PlatformLeft,
    GroundFill,
    PlatformRight,
    PillarMid,
    PillarBottom,
    FloatingLeft,
    FloatingMid,
    FloatingRight,
    SingleBlock,
    /// Any pickup; surface and challenge placements share the code.
    Coin,
    /// Grass tuft, variant in `0..GRASS_VARIANTS`.
    Grass(u8),
    SmallPalm,
    BackgroundPalm,
    PlayerSpawn,
    Goal,
}

impl Tile {
    /// A grass tile of the given variant.
    ///
    /// Panics if `variant >= GRASS_VARIANTS`.
    pub fn grass(variant: u8) -> Tile {
        assert!(
            variant < GRASS_VARIANTS,
            "grass variant {variant} out of range"
        );
        Tile::Grass(variant)
    }

    /// The persisted integer code.
    pub fn code(&self) -> u8 {
        match self {
            Self::Air => 0,
            Self::PlatformTopMid => 1,
            Self::PlatformTopRight => 2,
            Self::PillarTop => 3,
            Self::PlatformLeft => 4,
            Self::GroundFill => 5,
            Self::PlatformRight => 6,
            Self::PillarMid => 7,
            Self::PillarBottom => 8,
            Self::PlatformTopLeft => 9,
            Self::FloatingLeft => 12,
            Self::FloatingMid => 13,
            Self::FloatingRight => 14,
            Self::SingleBlock => 15,
            Self::Coin => 16,
            Self::Grass(variant) => GRASS_BASE + variant,
            Self::SmallPalm => 23,
            Self::BackgroundPalm => 25,
            Self::PlayerSpawn => 27,
            Self::Goal => 28,
        }
    }

    /// Decode a persisted code in the context of the layer it was read from.
    ///
    /// Grass variant 4 and the small palm share code 23, so the layer is
    /// needed to tell them apart. Codes that do not belong in `kind`
    /// return `None`.
    pub fn decode(kind: LayerKind, code: u8) -> Option<Tile> {
        if code == 0 {
            return Some(Self::Air);
        }
        match kind {
            LayerKind::Terrain => match code {
                1 => Some(Self::PlatformTopMid),
                2 => Some(Self::PlatformTopRight),
                3 => Some(Self::PillarTop),
                4 => Some(Self::PlatformLeft),
                5 => Some(Self::GroundFill),
                6 => Some(Self::PlatformRight),
                7 => Some(Self::PillarMid),
                8 => Some(Self::PillarBottom),
                9 => Some(Self::PlatformTopLeft),
                12 => Some(Self::FloatingLeft),
                13 => Some(Self::FloatingMid),
                14 => Some(Self::FloatingRight),
                15 => Some(Self::SingleBlock),
                _ => None,
            },
            LayerKind::Coins => match code {
                16 => Some(Self::Coin),
                _ => None,
            },
            LayerKind::Player => match code {
                27 => Some(Self::PlayerSpawn),
                28 => Some(Self::Goal),
                _ => None,
            },
            LayerKind::Grass if (GRASS_BASE..GRASS_BASE + GRASS_VARIANTS).contains(&code) => {
                Some(Self::Grass(code - GRASS_BASE))
            }
            LayerKind::FgPalms if code == 23 => Some(Self::SmallPalm),
            LayerKind::BgPalms if code == 25 => Some(Self::BackgroundPalm),
            _ => None,
        }
    }

    pub fn class(&self) -> TileClass {
        match self {
            Self::Air => TileClass::Empty,
            Self::Coin | Self::PlayerSpawn | Self::Goal => TileClass::Marker,
            Self::Grass(_) | Self::SmallPalm | Self::BackgroundPalm => TileClass::Decorative,
            _ => TileClass::Structural,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.class() == TileClass::Structural
    }

    pub fn is_air(&self) -> bool {
        matches!(self, Self::Air)
    }
}
