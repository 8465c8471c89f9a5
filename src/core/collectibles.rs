//! Collectible placement: pickups on surfaces, plus riskier challenge
//! pickups hanging between platforms.

use rand::Rng;

use super::profile::EmotionProfile;
use crate::schema::layer::{GridPos, Layer, LayerKind};
use crate::schema::tile::Tile;

/// Fixed chance of a challenge pickup on a qualifying cell.
pub const CHALLENGE_CHANCE: f64 = 0.08;
/// Rows scanned for challenge pickups.
pub const CHALLENGE_ROWS: std::ops::RangeInclusive<usize> = 2..=5;
/// Columns skipped at each side of the level by the challenge pass.
const CHALLENGE_EDGE: usize = 5;
/// Columns searched on each side by the between-platforms check.
pub const FLANK_WINDOW: usize = 6;

/// The coins layer plus where the challenge pass put its pickups. Both
/// passes write `Tile::Coin`, so the layer alone cannot tell them apart.
#[derive(Debug, Clone)]
pub struct CoinPlan {
    pub layer: Layer,
    pub challenge: Vec<GridPos>,
}

/// Place the coins layer.
///
/// Standard coins go on surface cells without a foreground palm at
/// `coin_chance`. Challenge coins go on open cells in `CHALLENGE_ROWS` that
/// pass [`is_between_platforms`].
pub fn place_coins<R: Rng>(
    terrain: &Layer,
    fg_palms: &Layer,
    profile: &EmotionProfile,
    rng: &mut R,
) -> CoinPlan {
    let (width, height) = (terrain.width(), terrain.height());
    let mut coins = Layer::new(LayerKind::Coins, width, height);
    let mut challenge = Vec::new();

    for y in 0..height - 1 {
        for x in 0..width {
            if terrain.is_surface(x, y)
                && fg_palms.is_air(x, y)
                && rng.gen_bool(profile.coin_chance)
            {
                coins.set(x, y, Tile::Coin);
            }
        }
    }

    if width > 2 * CHALLENGE_EDGE {
        for y in CHALLENGE_ROWS.filter(|y| y + 2 < height) {
            for x in CHALLENGE_EDGE..width - CHALLENGE_EDGE {
                if terrain.is_air(x, y)
                    && fg_palms.is_air(x, y)
                    && coins.is_air(x, y)
                    && is_between_platforms(terrain, x, y)
                    && rng.gen_bool(CHALLENGE_CHANCE)
                {
                    coins.set(x, y, Tile::Coin);
                    challenge.push(GridPos::new(x, y));
                }
            }
        }
    }
    CoinPlan {
        layer: coins,
        challenge,
    }
}

/// True iff solid terrain lies within `FLANK_WINDOW` columns on both the
/// left and the right of `x`, in either of the two rows below `y`.
pub fn is_between_platforms(terrain: &Layer, x: usize, y: usize) -> bool {
    let solid_below = |cx: usize| terrain.is_solid(cx, y + 1) || terrain.is_solid(cx, y + 2);
    let left = (x.saturating_sub(FLANK_WINDOW)..x).any(solid_below);
    let right = (x + 1..=x + FLANK_WINDOW)
        .take_while(|cx| *cx < terrain.width())
        .any(solid_below);
    left && right
}
