//! Decoration passes. Each reads only the terrain layer and returns its own
//! layer, so the three passes are independent of one another.

use rand::Rng;

use super::profile::EmotionProfile;
use crate::schema::layer::{Layer, LayerKind};
use crate::schema::tile::{Tile, GRASS_VARIANTS};

/// Chance of a palm on an elevated platform top, independent of emotion.
pub const PLATFORM_PALM_CHANCE: f64 = 0.2;
/// Background palms are never placed above this row.
const BG_TOP_ROW: usize = 3;
/// Topmost row scanned for elevated platform tops.
const PLATFORM_TOP_ROW: usize = 3;

/// Grass on every surface cell at `grass_chance`, variant picked uniformly.
pub fn grass<R: Rng>(terrain: &Layer, profile: &EmotionProfile, rng: &mut R) -> Layer {
    let mut layer = Layer::new(LayerKind::Grass, terrain.width(), terrain.height());
    for y in 0..terrain.height() - 1 {
        for x in 0..terrain.width() {
            if terrain.is_surface(x, y) && rng.gen_bool(profile.grass_chance) {
                layer.set(x, y, Tile::grass(rng.gen_range(0..GRASS_VARIANTS)));
            }
        }
    }
    layer
}

/// Background palms in clusters of one or two.
///
/// Every second column is scanned bottom-up and only its lowest surface is
/// considered. A cluster extends into the next column only where that
/// column is a surface at the same row.
pub fn background_palms<R: Rng>(terrain: &Layer, profile: &EmotionProfile, rng: &mut R) -> Layer {
    let (width, height) = (terrain.width(), terrain.height());
    let mut layer = Layer::new(LayerKind::BgPalms, width, height);
    if height < BG_TOP_ROW + 2 {
        return layer;
    }
    for x in (0..width).step_by(2) {
        let Some(y) = (BG_TOP_ROW..=height - 2)
            .rev()
            .find(|y| terrain.is_surface(x, *y))
        else {
            continue;
        };
        if rng.gen_bool(profile.bg_tree_chance) {
            let cluster = rng.gen_range(1..=2);
            for cx in x..(x + cluster).min(width) {
                if terrain.is_surface(cx, y) && layer.is_air(cx, y) {
                    layer.set(cx, y, Tile::BackgroundPalm);
                }
            }
        }
    }
    layer
}

/// Foreground palms: every surface at `fg_tree_chance`, then a second pass
/// over elevated platform tops at `PLATFORM_PALM_CHANCE`.
pub fn foreground_palms<R: Rng>(
    terrain: &Layer,
    ground_row: usize,
    profile: &EmotionProfile,
    rng: &mut R,
) -> Layer {
    let (width, height) = (terrain.width(), terrain.height());
    let mut layer = Layer::new(LayerKind::FgPalms, width, height);
    for y in 0..height - 1 {
        for x in 0..width {
            if terrain.is_surface(x, y) && rng.gen_bool(profile.fg_tree_chance) {
                layer.set(x, y, Tile::SmallPalm);
            }
        }
    }

    for y in PLATFORM_TOP_ROW..ground_row {
        for x in 0..width {
            if terrain.is_solid(x, y)
                && terrain.is_air(x, y - 1)
                && layer.is_air(x, y - 1)
                && rng.gen_bool(PLATFORM_PALM_CHANCE)
            {
                layer.set(x, y - 1, Tile::SmallPalm);
            }
        }
    }
    layer
}
