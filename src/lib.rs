//! Mood Level Engine: emotion-driven procedural platformer levels.
//!
//! Free text is read into one of four emotion categories, which selects a
//! parameter profile for a deterministic, seedable tile-grid generator.
//! Generated levels are persisted as one delimited text grid per layer.

pub mod core;
pub mod schema;
