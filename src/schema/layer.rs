//! Fixed-size tile grids, one per named level layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::tile::Tile;

/// Default level width in tiles.
pub const DEFAULT_WIDTH: usize = 60;
/// Default level height in tiles.
pub const DEFAULT_HEIGHT: usize = 11;

/// The named layers of a level, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Terrain,
    Coins,
    Player,
    FgPalms,
    BgPalms,
    Grass,
    Crates,
    Enemies,
    Constraints,
}

impl LayerKind {
    pub const ALL: [LayerKind; 9] = [
        Self::Terrain,
        Self::Coins,
        Self::Player,
        Self::FgPalms,
        Self::BgPalms,
        Self::Grass,
        Self::Crates,
        Self::Enemies,
        Self::Constraints,
    ];

    /// The layer's name in persisted file names.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Terrain => "terrain",
            Self::Coins => "coins",
            Self::Player => "player",
            Self::FgPalms => "fg_palms",
            Self::BgPalms => "bg_palms",
            Self::Grass => "grass",
            Self::Crates => "crates",
            Self::Enemies => "enemies",
            Self::Constraints => "constraints",
        }
    }

    /// Crates, enemies and constraints are reserved and always empty.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Crates | Self::Enemies | Self::Constraints)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A cell coordinate: `x` is the column, `y` the row (row 0 is the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A width × height grid of tiles, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub kind: LayerKind,
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl Layer {
    /// An all-air layer.
    ///
    /// Panics on a zero dimension.
    pub fn new(kind: LayerKind, width: usize, height: usize) -> Layer {
        assert!(width > 0 && height > 0, "layer dimensions must be non-zero");
        Layer {
            kind,
            width,
            height,
            cells: vec![Tile::Air; width * height],
        }
    }

    /// Build a layer from rows, which must all be `width` long.
    pub fn from_rows(kind: LayerKind, rows: Vec<Vec<Tile>>) -> Layer {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        assert!(width > 0 && height > 0, "layer dimensions must be non-zero");
        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            assert_eq!(row.len(), width, "ragged rows in layer {kind}");
            cells.extend(row);
        }
        Layer {
            kind,
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Tile> {
        self.in_bounds(x, y).then(|| self.cells[y * self.width + x])
    }

    /// The tile at `(x, y)`, treating out-of-range cells as air.
    pub fn tile(&self, x: usize, y: usize) -> Tile {
        self.get(x, y).unwrap_or(Tile::Air)
    }

    /// Panics if `(x, y)` is out of range.
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        assert!(
            self.in_bounds(x, y),
            "({x}, {y}) outside {}x{} layer {}",
            self.width,
            self.height,
            self.kind
        );
        self.cells[y * self.width + x] = tile;
    }

    pub fn is_solid(&self, x: usize, y: usize) -> bool {
        self.tile(x, y).is_solid()
    }

    pub fn is_air(&self, x: usize, y: usize) -> bool {
        self.tile(x, y).is_air()
    }

    /// Air at `(x, y)` with a solid tile directly below.
    pub fn is_surface(&self, x: usize, y: usize) -> bool {
        y + 1 < self.height && self.is_air(x, y) && self.is_solid(x, y + 1)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks(self.width)
    }

    pub fn count(&self, pred: impl Fn(&Tile) -> bool) -> usize {
        self.cells.iter().filter(|t| pred(*t)).count()
    }

    /// Positions of every cell matching `pred`, in row-major order.
    pub fn positions_of(&self, pred: impl Fn(&Tile) -> bool) -> Vec<GridPos> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, t)| pred(*t))
            .map(|(i, _)| GridPos::new(i % self.width, i / self.width))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Tile::is_air)
    }
}
