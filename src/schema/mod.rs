//! Data model shared by the generator, the level store and collaborators.

pub mod emotion;
pub mod layer;
pub mod level;
pub mod tile;
