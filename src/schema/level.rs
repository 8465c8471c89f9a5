//! A generated level: named layers sharing one shape, plus provenance.

use thiserror::Error;

use super::emotion::Emotion;
use super::layer::{GridPos, Layer, LayerKind};
use super::tile::Tile;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("layer {0} is missing")]
    MissingLayer(LayerKind),
    #[error("layer {kind} is {width}x{height}, expected {expected_width}x{expected_height}")]
    ShapeMismatch {
        kind: LayerKind,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },
    #[error("invalid markers: {0}")]
    InvalidMarkers(String),
}

/// An ordered collection of layers produced for one emotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelData {
    pub emotion: Emotion,
    /// Seed the level was generated from, when known.
    pub seed: Option<u64>,
    /// Row of the ground surface the level was generated against.
    pub ground_row: usize,
    layers: Vec<Layer>,
}

impl LevelData {
    /// Assemble a level from layers in any order. Every kind in
    /// `LayerKind::ALL` must be present exactly once with a common shape.
    pub fn from_layers(
        emotion: Emotion,
        seed: Option<u64>,
        ground_row: usize,
        mut layers: Vec<Layer>,
    ) -> Result<LevelData, LevelError> {
        let mut ordered = Vec::with_capacity(LayerKind::ALL.len());
        for kind in LayerKind::ALL {
            let idx = layers
                .iter()
                .position(|l| l.kind == kind)
                .ok_or(LevelError::MissingLayer(kind))?;
            ordered.push(layers.swap_remove(idx));
        }
        let (w, h) = (ordered[0].width(), ordered[0].height());
        for layer in &ordered {
            if layer.width() != w || layer.height() != h {
                return Err(LevelError::ShapeMismatch {
                    kind: layer.kind,
                    width: layer.width(),
                    height: layer.height(),
                    expected_width: w,
                    expected_height: h,
                });
            }
        }
        Ok(LevelData {
            emotion,
            seed,
            ground_row,
            layers: ordered,
        })
    }

    pub fn width(&self) -> usize {
        self.layers[0].width()
    }

    pub fn height(&self) -> usize {
        self.layers[0].height()
    }

    /// Layers in canonical order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, kind: LayerKind) -> &Layer {
        // from_layers stores layers in LayerKind::ALL order
        &self.layers[kind as usize]
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut Layer {
        &mut self.layers[kind as usize]
    }

    /// The authoritative solidity layer.
    pub fn terrain(&self) -> &Layer {
        self.layer(LayerKind::Terrain)
    }

    pub fn spawn(&self) -> Option<GridPos> {
        self.marker(Tile::PlayerSpawn)
    }

    pub fn goal(&self) -> Option<GridPos> {
        self.marker(Tile::Goal)
    }

    fn marker(&self, tile: Tile) -> Option<GridPos> {
        self.layer(LayerKind::Player)
            .positions_of(|t| *t == tile)
            .into_iter()
            .next()
    }

    /// One character per cell, one line per row. Markers draw over coins,
    /// coins over terrain, terrain over decoration.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                out.push(self.glyph(x, y));
            }
            out.push('\n');
        }
        out
    }

    fn glyph(&self, x: usize, y: usize) -> char {
        let draw_order = [
            LayerKind::Player,
            LayerKind::Coins,
            LayerKind::Terrain,
            LayerKind::FgPalms,
            LayerKind::Grass,
            LayerKind::BgPalms,
        ];
        for kind in draw_order {
            let c = match self.layer(kind).tile(x, y) {
                Tile::Air => continue,
                Tile::PlayerSpawn => 'S',
                Tile::Goal => 'G',
                Tile::Coin => '$',
                Tile::FloatingLeft | Tile::FloatingMid | Tile::FloatingRight => '=',
                Tile::SingleBlock => 'o',
                Tile::SmallPalm => 'T',
                Tile::Grass(_) => '"',
                Tile::BackgroundPalm => 't',
                _ => '#',
            };
            return c;
        }
        '.'
    }

    /// Check the marker invariants: exactly one spawn and one goal, the
    /// spawn on an air cell directly above a solid ground-row tile, and the
    /// goal not embedded in solid terrain.
    pub fn validate(&self) -> Result<(), LevelError> {
        let player = self.layer(LayerKind::Player);
        let spawns = player.positions_of(|t| *t == Tile::PlayerSpawn);
        let goals = player.count(|t| *t == Tile::Goal);
        if spawns.len() != 1 || goals != 1 {
            return Err(LevelError::InvalidMarkers(format!(
                "expected one spawn and one goal, found {} and {}",
                spawns.len(),
                goals
            )));
        }
        let spawn = spawns[0];
        let terrain = self.terrain();
        if spawn.y + 1 != self.ground_row
            || !terrain.is_air(spawn.x, spawn.y)
            || !terrain.is_solid(spawn.x, self.ground_row)
        {
            return Err(LevelError::InvalidMarkers(format!(
                "spawn at ({}, {}) is not standing on ground row {}",
                spawn.x, spawn.y, self.ground_row
            )));
        }
        if let Some(goal) = self.goal() {
            if terrain.is_solid(goal.x, goal.y) {
                return Err(LevelError::InvalidMarkers(format!(
                    "goal at ({}, {}) is inside solid terrain",
                    goal.x, goal.y
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_layers(w: usize, h: usize) -> Vec<Layer> {
        LayerKind::ALL.iter().map(|k| Layer::new(*k, w, h)).collect()
    }

    fn valid_level() -> LevelData {
        let mut level = LevelData::from_layers(Emotion::Joy, Some(7), 8, blank_layers(20, 11)).unwrap();
        for y in 8..11 {
            for x in 0..20 {
                level.layer_mut(LayerKind::Terrain).set(x, y, Tile::GroundFill);
            }
        }
        let player = level.layer_mut(LayerKind::Player);
        player.set(1, 7, Tile::PlayerSpawn);
        player.set(17, 5, Tile::Goal);
        level
    }

    #[test]
    fn layers_are_reordered_canonically() {
        let mut layers = blank_layers(20, 11);
        layers.reverse();
        let level = LevelData::from_layers(Emotion::Fear, None, 8, layers).unwrap();
        for (layer, kind) in level.layers().iter().zip(LayerKind::ALL) {
            assert_eq!(layer.kind, kind);
        }
        assert_eq!(level.layer(LayerKind::Grass).kind, LayerKind::Grass);
    }

    #[test]
    fn missing_layer_is_rejected() {
        let mut layers = blank_layers(20, 11);
        layers.retain(|l| l.kind != LayerKind::Coins);
        assert_eq!(
            LevelData::from_layers(Emotion::Joy, None, 8, layers),
            Err(LevelError::MissingLayer(LayerKind::Coins))
        );
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let mut layers = blank_layers(20, 11);
        layers[3] = Layer::new(layers[3].kind, 19, 11);
        assert!(matches!(
            LevelData::from_layers(Emotion::Joy, None, 8, layers),
            Err(LevelError::ShapeMismatch { width: 19, .. })
        ));
    }

    #[test]
    fn validate_accepts_well_formed_markers() {
        let level = valid_level();
        assert_eq!(level.spawn(), Some(GridPos::new(1, 7)));
        assert_eq!(level.goal(), Some(GridPos::new(17, 5)));
        assert!(level.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_spawn() {
        let mut level = valid_level();
        level.layer_mut(LayerKind::Player).set(2, 7, Tile::PlayerSpawn);
        assert!(level.validate().is_err());
    }

    #[test]
    fn ascii_draws_markers_over_terrain() {
        let level = valid_level();
        let art = level.to_ascii();
        let rows: Vec<&str> = art.lines().collect();
        assert_eq!(rows.len(), 11);
        assert_eq!(&rows[7][..3], ".S.");
        assert_eq!(rows[5].chars().nth(17), Some('G'));
        assert!(rows[8].chars().all(|c| c == '#'));
    }

    #[test]
    fn validate_rejects_floating_spawn() {
        let mut level = valid_level();
        level.layer_mut(LayerKind::Terrain).set(1, 8, Tile::Air);
        assert!(level.validate().is_err());
    }
}
