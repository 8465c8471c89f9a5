//! Spawn and goal placement. Deterministic: reads only the terrain.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::schema::layer::{GridPos, Layer, LayerKind};
use crate::schema::tile::Tile;

/// Row the goal is anchored to before any support check.
pub const GOAL_ROW: usize = 5;
/// Distance of the goal column from the right edge.
pub const GOAL_INSET: usize = 3;

/// How the goal relates to the terrain under its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GoalPolicy {
    /// Drop the goal from its anchor onto the first solid tile below.
    #[default]
    Supported,
    /// Keep the anchor as is, supported or not.
    Fixed,
}

impl GoalPolicy {
    /// Parse a CLI-style name: "supported" or "fixed".
    pub fn from_name(name: &str) -> Option<GoalPolicy> {
        match name.trim().to_ascii_lowercase().as_str() {
            "supported" => Some(Self::Supported),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

/// Build the player layer with exactly one spawn and one goal.
///
/// The spawn sits one row above the first solid ground-row column, kept
/// off the outermost columns. Panics if the ground row has no solid
/// column away from the edges, which terrain synthesis never produces.
pub fn resolve(terrain: &Layer, ground_row: usize, policy: GoalPolicy) -> Layer {
    let (width, height) = (terrain.width(), terrain.height());
    assert!(ground_row >= 1 && ground_row < height, "ground row {ground_row} out of range");
    let mut player = Layer::new(LayerKind::Player, width, height);

    let Some(spawn_x) = spawn_column(terrain, ground_row) else {
        panic!("no solid ground column for the spawn on row {ground_row}");
    };
    let spawn = GridPos::new(spawn_x, ground_row - 1);
    player.set(spawn.x, spawn.y, Tile::PlayerSpawn);

    let goal = goal_position(terrain, policy);
    if goal == spawn {
        warn!("goal collides with spawn at ({}, {})", goal.x, goal.y);
    }
    player.set(goal.x, goal.y, Tile::Goal);
    player
}

/// First solid column of the ground row, clamped into `[1, width - 2]`.
/// When the clamped column is not solid the scan continues rightward.
pub fn spawn_column(terrain: &Layer, ground_row: usize) -> Option<usize> {
    let width = terrain.width();
    let first = (0..width).find(|x| terrain.is_solid(*x, ground_row))?;
    let clamped = first.clamp(1, width.saturating_sub(2).max(1));
    (clamped..width.saturating_sub(1)).find(|x| terrain.is_solid(*x, ground_row))
}

/// Where the goal goes under `policy`.
pub fn goal_position(terrain: &Layer, policy: GoalPolicy) -> GridPos {
    let x = terrain.width().saturating_sub(GOAL_INSET);
    let anchor = GridPos::new(x, GOAL_ROW.min(terrain.height() - 1));
    match policy {
        GoalPolicy::Fixed => {
            if terrain.is_solid(anchor.x, anchor.y) {
                warn!("fixed goal at ({}, {}) is inside terrain", anchor.x, anchor.y);
            } else if !terrain.is_surface(anchor.x, anchor.y) {
                warn!("fixed goal at ({}, {}) has nothing underneath", anchor.x, anchor.y);
            }
            anchor
        }
        GoalPolicy::Supported => supported_goal(terrain, anchor),
    }
}

fn supported_goal(terrain: &Layer, anchor: GridPos) -> GridPos {
    let x = anchor.x;
    if terrain.is_solid(x, anchor.y) {
        // climb out of the terrain to the first air cell
        if let Some(y) = (0..anchor.y).rev().find(|y| terrain.is_air(x, *y)) {
            return GridPos::new(x, y);
        }
    } else if let Some(y) = (anchor.y..terrain.height()).find(|y| terrain.is_surface(x, *y)) {
        return GridPos::new(x, y);
    }
    warn!("no support under goal column {x}, keeping ({}, {})", anchor.x, anchor.y);
    anchor
}
