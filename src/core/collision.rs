//! Axis-aligned player collision against the terrain layer, and pickups.
//!
//! World units are pixels; a tile is `tile_size` pixels square with
//! `(col * tile_size, row * tile_size)` as its top-left corner.

use crate::core::profile::PhysicsProfile;
use crate::schema::layer::{GridPos, Layer};
use crate::schema::tile::Tile;

pub const TILE_SIZE: f32 = 64.0;
/// How far below the grid the player may fall before dying.
pub const DEATH_MARGIN: f32 = 100.0;

/// An axis-aligned box with its top-left corner at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap; boxes that only touch do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Solidity queries over a terrain layer in world units.
#[derive(Debug, Clone, Copy)]
pub struct TerrainCollider<'a> {
    terrain: &'a Layer,
    tile_size: f32,
}

impl<'a> TerrainCollider<'a> {
    pub fn new(terrain: &'a Layer) -> Self {
        Self::with_tile_size(terrain, TILE_SIZE)
    }

    pub fn with_tile_size(terrain: &'a Layer, tile_size: f32) -> Self {
        TerrainCollider { terrain, tile_size }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Cells left, right and above the grid are walls; below it is open.
    pub fn solid_at(&self, col: isize, row: isize) -> bool {
        if col < 0 || col >= self.terrain.width() as isize || row < 0 {
            return true;
        }
        self.terrain.is_solid(col as usize, row as usize)
    }

    pub fn tile_box(&self, col: isize, row: isize) -> Aabb {
        let s = self.tile_size;
        Aabb::new(col as f32 * s, row as f32 * s, s, s)
    }

    /// Boxes of every solid cell `b` overlaps.
    pub fn solids_touching(&self, b: &Aabb) -> Vec<Aabb> {
        let s = self.tile_size;
        let (c0, c1) = ((b.left() / s).floor() as isize, (b.right() / s).ceil() as isize);
        let (r0, r1) = ((b.top() / s).floor() as isize, (b.bottom() / s).ceil() as isize);
        let mut out = Vec::new();
        for row in r0..r1 {
            for col in c0..c1 {
                if self.solid_at(col, row) {
                    let tile = self.tile_box(col, row);
                    if tile.intersects(b) {
                        out.push(tile);
                    }
                }
            }
        }
        out
    }

    /// Falling past this `y` kills the player.
    pub fn death_line(&self) -> f32 {
        self.terrain.height() as f32 * self.tile_size + DEATH_MARGIN
    }
}

/// Player intent for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    /// -1 left, 0 idle, 1 right.
    pub direction: i8,
    pub jump: bool,
}

/// The player's collision box and motion state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBody {
    pub bounds: Aabb,
    pub velocity_y: f32,
    pub on_ground: bool,
    pub on_ceiling: bool,
    pub on_left: bool,
    pub on_right: bool,
    pub dead: bool,
    spawn: (f32, f32),
}

impl PlayerBody {
    /// A one-tile body standing in the spawn cell.
    pub fn at_spawn(spawn: GridPos, tile_size: f32) -> PlayerBody {
        let (x, y) = (spawn.x as f32 * tile_size, spawn.y as f32 * tile_size);
        PlayerBody {
            bounds: Aabb::new(x, y, tile_size, tile_size),
            velocity_y: 0.0,
            on_ground: false,
            on_ceiling: false,
            on_left: false,
            on_right: false,
            dead: false,
            spawn: (x, y),
        }
    }

    /// Advance one frame: horizontal move and resolution, then gravity,
    /// vertical move and resolution, then the death check.
    pub fn step(&mut self, controls: Controls, physics: &PhysicsProfile, collider: &TerrainCollider) {
        if self.dead {
            return;
        }
        if controls.jump && self.on_ground {
            self.velocity_y = physics.jump_speed;
        }

        let dx = f32::from(controls.direction.signum()) * physics.run_speed;
        self.on_left = false;
        self.on_right = false;
        self.bounds.x += dx;
        for tile in collider.solids_touching(&self.bounds) {
            if !self.bounds.intersects(&tile) {
                continue;
            }
            if dx > 0.0 {
                self.bounds.x = tile.left() - self.bounds.w;
                self.on_right = true;
            } else if dx < 0.0 {
                self.bounds.x = tile.right();
                self.on_left = true;
            }
        }

        self.velocity_y = (self.velocity_y + physics.gravity).min(physics.max_fall_speed);
        self.on_ground = false;
        self.on_ceiling = false;
        self.bounds.y += self.velocity_y;
        for tile in collider.solids_touching(&self.bounds) {
            if !self.bounds.intersects(&tile) {
                continue;
            }
            if self.velocity_y > 0.0 {
                self.bounds.y = tile.top() - self.bounds.h;
                self.velocity_y = 0.0;
                self.on_ground = true;
            } else if self.velocity_y < 0.0 {
                self.bounds.y = tile.bottom();
                self.velocity_y = 0.0;
                self.on_ceiling = true;
            }
        }

        if self.bounds.y > collider.death_line() {
            self.dead = true;
            self.velocity_y = 0.0;
        }
    }

    pub fn respawn(&mut self) {
        let (w, h) = (self.bounds.w, self.bounds.h);
        *self = PlayerBody {
            bounds: Aabb::new(self.spawn.0, self.spawn.1, w, h),
            velocity_y: 0.0,
            on_ground: false,
            on_ceiling: false,
            on_left: false,
            on_right: false,
            dead: false,
            spawn: self.spawn,
        };
    }
}

/// Something the player touched in a marker layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pickup {
    Coin,
    Goal,
}

/// Collect every marker under `bounds`. Coins are removed from `layer`;
/// the goal stays.
pub fn collect_at(layer: &mut Layer, bounds: &Aabb, tile_size: f32) -> Vec<Pickup> {
    let mut found = Vec::new();
    for pos in layer.positions_of(|t| matches!(t, Tile::Coin | Tile::Goal)) {
        let cell = Aabb::new(pos.x as f32 * tile_size, pos.y as f32 * tile_size, tile_size, tile_size);
        if !cell.intersects(bounds) {
            continue;
        }
        match layer.tile(pos.x, pos.y) {
            Tile::Coin => {
                layer.set(pos.x, pos.y, Tile::Air);
                found.push(Pickup::Coin);
            }
            Tile::Goal => found.push(Pickup::Goal),
            _ => {}
        }
    }
    found
}
