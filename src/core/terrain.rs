//! Terrain synthesis: the ground layer, built by a greedy left-to-right
//! walk alternating platform runs and gaps.

use log::debug;
use rand::Rng;

use super::profile::EmotionProfile;
use crate::schema::layer::{Layer, LayerKind};
use crate::schema::tile::Tile;

/// The first run must start within this many columns.
pub const SPAWN_ZONE: usize = 5;
/// Minimum length of the first run, so the player has room to spawn.
pub const MIN_SPAWN_RUN: usize = 3;
/// Columns at the right edge that must stay solid ground.
pub const SAFE_TAIL: usize = 5;

/// A horizontal column span `[start, start + len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn contains(&self, x: usize) -> bool {
        (self.start..self.end()).contains(&x)
    }
}

/// The terrain layer together with the walk that produced it.
#[derive(Debug, Clone)]
pub struct TerrainPlan {
    pub layer: Layer,
    pub ground_row: usize,
    /// Platform runs in placement order. Adjacent runs near the right edge
    /// are recorded separately even though they touch.
    pub runs: Vec<Span>,
    pub gaps: Vec<Span>,
    /// Start column of the first run, reserved for the player spawn.
    pub spawn_anchor: usize,
    /// Tail columns forced solid after the walk.
    pub tail_fill: Vec<usize>,
}

/// Build the ground layer.
///
/// Run lengths are drawn from `profile.platform_length` and gap widths from
/// `profile.gap_size`, both clamped at the right edge. No gap is opened
/// inside the last `SAFE_TAIL` columns. Terminates because `x` strictly
/// increases every iteration.
///
/// Panics if `ground_row` is not above the bottom row or the width cannot
/// hold the spawn run plus the safe tail.
pub fn synthesize<R: Rng>(
    width: usize,
    height: usize,
    ground_row: usize,
    profile: &EmotionProfile,
    rng: &mut R,
) -> TerrainPlan {
    assert!(ground_row < height, "ground row {ground_row} outside height {height}");
    assert!(
        width > MIN_SPAWN_RUN + SAFE_TAIL,
        "width {width} too narrow for terrain"
    );

    let mut layer = Layer::new(LayerKind::Terrain, width, height);
    let mut runs = Vec::new();
    let mut gaps = Vec::new();
    let mut spawn_anchor = None;
    let (min_len, max_len) = profile.platform_length;
    let (min_gap, max_gap) = profile.gap_size;

    let mut x = 0;
    while x < width {
        let mut len = rng.gen_range(min_len..=max_len).min(width - x);
        if spawn_anchor.is_none() && x < SPAWN_ZONE {
            len = len.max(MIN_SPAWN_RUN).min(width - x);
            spawn_anchor = Some(x);
        }
        place_ground_run(&mut layer, x, ground_row, len);
        runs.push(Span { start: x, len });
        x += len;

        if x + SAFE_TAIL < width {
            let gap = rng
                .gen_range(min_gap..=max_gap)
                .min(width - x - SAFE_TAIL);
            if gap > 0 {
                gaps.push(Span { start: x, len: gap });
                x += gap;
            }
        }
    }

    let mut tail_fill = Vec::new();
    for col in width - SAFE_TAIL..width {
        if !layer.is_solid(col, ground_row) {
            place_ground_column(&mut layer, col, ground_row);
            tail_fill.push(col);
        }
    }

    debug!(
        "terrain: {} runs, {} gaps, {} tail columns filled",
        runs.len(),
        gaps.len(),
        tail_fill.len()
    );

    TerrainPlan {
        layer,
        ground_row,
        runs,
        gaps,
        // the walk starts at 0, so the first run always lands in the zone
        spawn_anchor: spawn_anchor.unwrap_or(0),
        tail_fill,
    }
}

/// Write a ground run of `len` columns with its surface at `top`, filled
/// down to the bottom row.
pub fn place_ground_run(layer: &mut Layer, start: usize, top: usize, len: usize) {
    let bottom = layer.height() - 1;
    match len {
        0 => {}
        1 => {
            layer.set(start, top, Tile::SingleBlock);
            for y in top + 1..=bottom {
                let fill = if y == bottom {
                    Tile::PillarBottom
                } else {
                    Tile::PillarMid
                };
                layer.set(start, y, fill);
            }
        }
        _ => {
            let last = start + len - 1;
            for x in start..=last {
                let (surface, fill) = if x == start {
                    (Tile::PlatformTopLeft, Tile::PlatformLeft)
                } else if x == last {
                    (Tile::PlatformTopRight, Tile::PlatformRight)
                } else {
                    (Tile::PlatformTopMid, Tile::GroundFill)
                };
                layer.set(x, top, surface);
                for y in top + 1..=bottom {
                    layer.set(x, y, fill);
                }
            }
        }
    }
}

/// A lone solid column, used to patch the safe tail.
fn place_ground_column(layer: &mut Layer, x: usize, top: usize) {
    layer.set(x, top, Tile::PlatformTopMid);
    for y in top + 1..layer.height() {
        layer.set(x, y, Tile::GroundFill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::emotion::Emotion;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const W: usize = 60;
    const H: usize = 11;
    const G: usize = 8;

    fn plan(emotion: Emotion, seed: u64) -> TerrainPlan {
        let mut rng = StdRng::seed_from_u64(seed);
        synthesize(W, H, G, &EmotionProfile::builtin(emotion), &mut rng)
    }

    #[test]
    fn same_seed_same_terrain() {
        for emotion in Emotion::ALL {
            assert_eq!(plan(emotion, 42).layer, plan(emotion, 42).layer);
        }
    }

    #[test]
    fn different_seeds_vary() {
        let first = plan(Emotion::Anger, 1).layer;
        let found_different = (2..50).any(|seed| plan(Emotion::Anger, seed).layer != first);
        assert!(found_different, "Expected terrain to vary with seed");
    }

    #[test]
    fn every_column_is_run_or_gap() {
        for emotion in Emotion::ALL {
            for seed in 0..40 {
                let p = plan(emotion, seed);
                for x in 0..W {
                    let in_run = p.runs.iter().any(|r| r.contains(x)) || p.tail_fill.contains(&x);
                    let in_gap = p.gaps.iter().any(|g| g.contains(x));
                    assert!(in_run ^ in_gap, "column {x} ambiguous ({emotion}, seed {seed})");
                    if in_run {
                        for y in G..H {
                            assert!(p.layer.is_solid(x, y), "hole at ({x}, {y})");
                        }
                    } else {
                        for y in G..H {
                            assert!(p.layer.is_air(x, y), "fill in gap at ({x}, {y})");
                        }
                    }
                    for y in 0..G {
                        assert!(p.layer.is_air(x, y));
                    }
                }
            }
        }
    }

    #[test]
    fn runs_and_gaps_respect_profile() {
        for emotion in [Emotion::Joy, Emotion::Fear, Emotion::Anger, Emotion::Neutral] {
            let profile = EmotionProfile::builtin(emotion);
            for seed in 0..60 {
                let p = plan(emotion, seed);
                let last = p.runs.len() - 1;
                for (i, run) in p.runs.iter().enumerate() {
                    if i == 0 {
                        assert!(run.len >= MIN_SPAWN_RUN);
                        assert!(run.len <= profile.platform_length.1.max(MIN_SPAWN_RUN));
                    } else if i == last || run.end() == W {
                        // clamped at the right edge
                        assert!(run.len >= 1 && run.len <= profile.platform_length.1);
                    } else {
                        assert!(
                            (profile.platform_length.0..=profile.platform_length.1).contains(&run.len),
                            "{emotion} run {run:?}"
                        );
                    }
                }
                for gap in &p.gaps {
                    assert!(gap.len >= 1 && gap.len <= profile.gap_size.1, "{emotion} gap {gap:?}");
                }
            }
        }
    }

    #[test]
    fn first_run_anchors_spawn() {
        for seed in 0..30 {
            let p = plan(Emotion::Fear, seed);
            assert!(p.spawn_anchor < SPAWN_ZONE);
            assert_eq!(p.runs[0].start, p.spawn_anchor);
            assert!(p.runs[0].len >= MIN_SPAWN_RUN);
        }
    }

    #[test]
    fn right_edge_is_solid() {
        for emotion in Emotion::ALL {
            for seed in 0..40 {
                let p = plan(emotion, seed);
                for x in W - SAFE_TAIL..W {
                    assert!(p.layer.is_solid(x, G), "{emotion} seed {seed} column {x}");
                }
                assert!(p.gaps.iter().all(|g| g.end() <= W - SAFE_TAIL));
            }
        }
    }

    #[test]
    fn run_tiles_by_length() {
        let mut layer = Layer::new(LayerKind::Terrain, 10, 4);
        place_ground_run(&mut layer, 0, 1, 1);
        place_ground_run(&mut layer, 2, 1, 2);
        place_ground_run(&mut layer, 5, 1, 4);

        assert_eq!(layer.tile(0, 1), Tile::SingleBlock);
        assert_eq!(layer.tile(0, 2), Tile::PillarMid);
        assert_eq!(layer.tile(0, 3), Tile::PillarBottom);

        assert_eq!(layer.tile(2, 1), Tile::PlatformTopLeft);
        assert_eq!(layer.tile(3, 1), Tile::PlatformTopRight);
        assert_eq!(layer.tile(2, 3), Tile::PlatformLeft);
        assert_eq!(layer.tile(3, 3), Tile::PlatformRight);

        assert_eq!(layer.tile(5, 1), Tile::PlatformTopLeft);
        assert_eq!(layer.tile(6, 1), Tile::PlatformTopMid);
        assert_eq!(layer.tile(7, 1), Tile::PlatformTopMid);
        assert_eq!(layer.tile(8, 1), Tile::PlatformTopRight);
        assert_eq!(layer.tile(6, 2), Tile::GroundFill);
        assert_eq!(layer.tile(8, 2), Tile::PlatformRight);
        assert!(layer.is_air(4, 1));
        assert!(layer.is_air(9, 3));
    }

    #[test]
    #[should_panic]
    fn degenerate_width_panics() {
        let mut rng = StdRng::seed_from_u64(0);
        synthesize(6, H, G, &EmotionProfile::builtin(Emotion::Joy), &mut rng);
    }
}
