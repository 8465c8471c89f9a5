//! Floating platform planner: elevated platforms and lone blocks scattered
//! over the band of rows just above the ground.
//!
//! Best effort: a placement that fails its overlap or reachability check is
//! skipped without retry, so coverage gaps are expected.

use log::debug;
use rand::Rng;

use super::profile::EmotionProfile;
use crate::schema::layer::{GridPos, Layer};
use crate::schema::tile::Tile;

/// Number of candidate rows directly above the ground row.
pub const FLOAT_BAND: usize = 4;
/// Horizontal reach of the jumpable-distance check for single blocks.
pub const REACH_COLUMNS: usize = 5;

/// A horizontal platform placed at row `y`, columns `[x, x + len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: usize,
    pub y: usize,
    pub len: usize,
}

impl Placement {
    /// Footprint grown by one tile on every side, as `(x0, y0, x1, y1)`
    /// inclusive, unclamped on the far sides.
    pub fn margin_box(&self) -> (usize, usize, usize, usize) {
        (
            self.x.saturating_sub(1),
            self.y.saturating_sub(1),
            self.x + self.len,
            self.y + 1,
        )
    }

    /// Whether any tile of `other` lies inside this placement's margin box.
    pub fn crowds(&self, other: &Placement) -> bool {
        let (x0, y0, x1, y1) = self.margin_box();
        (y0..=y1).contains(&other.y) && other.x <= x1 && other.x + other.len > x0
    }
}

#[derive(Debug, Clone, Default)]
pub struct FloatingPlan {
    pub platforms: Vec<Placement>,
    pub single_blocks: Vec<GridPos>,
}

impl FloatingPlan {
    /// Every placement, single blocks as length-1 platforms.
    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        self.platforms.iter().copied().chain(
            self.single_blocks
                .iter()
                .map(|p| Placement { x: p.x, y: p.y, len: 1 }),
        )
    }

    pub fn tile_count(&self) -> usize {
        self.platforms.iter().map(|p| p.len).sum::<usize>() + self.single_blocks.len()
    }
}

/// Add floating platforms and single blocks to `terrain`.
///
/// Panics if `ground_row < FLOAT_BAND + 1`.
pub fn plan_floating<R: Rng>(
    terrain: &mut Layer,
    ground_row: usize,
    profile: &EmotionProfile,
    rng: &mut R,
) -> FloatingPlan {
    assert!(
        ground_row > FLOAT_BAND,
        "ground row {ground_row} leaves no room for floating platforms"
    );
    let width = terrain.width();
    let mut plan = FloatingPlan::default();

    for row in ground_row - FLOAT_BAND..ground_row {
        let mut x = rng.gen_range(8..=12);
        while x + 10 < width {
            if rng.gen_bool(profile.floating_platform_chance) {
                // higher rows get shorter platforms
                let len = if row + 3 <= ground_row {
                    rng.gen_range(2..=4)
                } else {
                    rng.gen_range(3..=6)
                };
                if x + len + 5 < width && can_place(terrain, x, row, len) {
                    place_floating(terrain, x, row, len);
                    plan.platforms.push(Placement { x, y: row, len });
                }
            }
            x += rng.gen_range(6..=12);
        }
    }

    let attempts = rng.gen_range(2..=4);
    for _ in 0..attempts {
        let x = rng.gen_range(10..=width - 10);
        let y = rng.gen_range(ground_row - FLOAT_BAND..=ground_row - 2);
        if can_place(terrain, x, y, 1) && has_reachable_solid(terrain, x, y) {
            terrain.set(x, y, Tile::SingleBlock);
            plan.single_blocks.push(GridPos::new(x, y));
        }
    }

    debug!(
        "floating: {} platforms, {} single blocks",
        plan.platforms.len(),
        plan.single_blocks.len()
    );
    plan
}

/// True if the footprint plus a one-tile margin holds only air.
pub fn can_place(terrain: &Layer, x: usize, y: usize, len: usize) -> bool {
    let x1 = (x + len + 1).min(terrain.width());
    let y1 = (y + 2).min(terrain.height());
    (y.saturating_sub(1)..y1).all(|cy| (x.saturating_sub(1)..x1).all(|cx| terrain.is_air(cx, cy)))
}

/// Jumpable-distance proxy: some solid tile within `REACH_COLUMNS` columns
/// on either side, from one row above to two rows below.
///
/// This is a window search, not a path check.
pub fn has_reachable_solid(terrain: &Layer, x: usize, y: usize) -> bool {
    let x1 = (x + REACH_COLUMNS).min(terrain.width());
    let y1 = (y + 3).min(terrain.height());
    (y.saturating_sub(1)..y1).any(|cy| {
        (x.saturating_sub(REACH_COLUMNS)..x1).any(|cx| terrain.is_solid(cx, cy))
    })
}

fn place_floating(terrain: &mut Layer, x: usize, y: usize, len: usize) {
    match len {
        0 => {}
        1 => terrain.set(x, y, Tile::SingleBlock),
        _ => {
            let last = x + len - 1;
            terrain.set(x, y, Tile::FloatingLeft);
            for cx in x + 1..last {
                terrain.set(cx, y, Tile::FloatingMid);
            }
            terrain.set(last, y, Tile::FloatingRight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::terrain::synthesize;
    use crate::schema::emotion::Emotion;
    use crate::schema::layer::LayerKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const W: usize = 60;
    const H: usize = 11;
    const G: usize = 8;

    fn build(emotion: Emotion, seed: u64) -> (Layer, FloatingPlan) {
        let profile = EmotionProfile::builtin(emotion);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut terrain = synthesize(W, H, G, &profile, &mut rng).layer;
        let plan = plan_floating(&mut terrain, G, &profile, &mut rng);
        (terrain, plan)
    }

    #[test]
    fn placements_never_crowd_each_other() {
        for emotion in Emotion::ALL {
            for seed in 0..50 {
                let (_, plan) = build(emotion, seed);
                let all: Vec<Placement> = plan.placements().collect();
                for (i, a) in all.iter().enumerate() {
                    for b in all.iter().skip(i + 1) {
                        assert!(!a.crowds(b), "{emotion} seed {seed}: {a:?} crowds {b:?}");
                        assert!(!b.crowds(a), "{emotion} seed {seed}: {b:?} crowds {a:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn platforms_stay_in_band_and_off_the_tail() {
        for seed in 0..50 {
            let (terrain, plan) = build(Emotion::Anger, seed);
            for p in plan.placements() {
                assert!(p.y >= G - FLOAT_BAND && p.y < G);
                assert!(p.x + p.len + 5 < W || p.len == 1);
                for x in p.x..p.x + p.len {
                    assert!(terrain.is_solid(x, p.y));
                }
            }
        }
    }

    #[test]
    fn platform_lengths_depend_on_row() {
        for seed in 0..50 {
            let (_, plan) = build(Emotion::Anger, seed);
            for p in &plan.platforms {
                if p.y + 3 <= G {
                    assert!((2..=4).contains(&p.len), "{p:?}");
                } else {
                    assert!((3..=6).contains(&p.len), "{p:?}");
                }
            }
        }
    }

    #[test]
    fn single_blocks_have_reachable_neighbours() {
        for seed in 0..80 {
            let (terrain, plan) = build(Emotion::Joy, seed);
            for b in &plan.single_blocks {
                assert_eq!(terrain.tile(b.x, b.y), Tile::SingleBlock);
                let mut probe = terrain.clone();
                probe.set(b.x, b.y, Tile::Air);
                assert!(has_reachable_solid(&probe, b.x, b.y));
            }
        }
    }

    #[test]
    fn fear_is_far_sparser_than_anger() {
        let total = |emotion| (0..100).map(|seed| build(emotion, seed).1.tile_count()).sum::<usize>();
        let fear = total(Emotion::Fear);
        let anger = total(Emotion::Anger);
        assert!(fear * 2 < anger, "fear {fear} vs anger {anger}");
    }

    #[test]
    fn can_place_respects_margin() {
        let mut layer = Layer::new(LayerKind::Terrain, 20, 10);
        layer.set(5, 5, Tile::GroundFill);
        assert!(!can_place(&layer, 6, 4, 3));
        assert!(!can_place(&layer, 2, 6, 3));
        assert!(can_place(&layer, 7, 5, 3));
        assert!(can_place(&layer, 5, 3, 1));
        assert!(can_place(&layer, 0, 0, 2));
    }

    #[test]
    fn crowding_is_margin_based() {
        let a = Placement { x: 10, y: 5, len: 3 };
        assert!(a.crowds(&Placement { x: 13, y: 5, len: 2 }));
        assert!(a.crowds(&Placement { x: 7, y: 6, len: 3 }));
        assert!(!a.crowds(&Placement { x: 14, y: 5, len: 2 }));
        assert!(!a.crowds(&Placement { x: 10, y: 7, len: 3 }));
    }
}
