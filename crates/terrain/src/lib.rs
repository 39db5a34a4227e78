//! Terrain heightfield editing - brush painting over adaptive-resolution tiles
//!
//! This crate provides the editing engine for a grid of terrain tiles:
//! - [`tiles`] - The tile grid contract and an in-memory implementation
//! - [`brush`] - Brush parameters and mip-mapped brush masks
//! - [`planner`] - Brush footprint to per-tile vertex ranges
//! - [`height_update`] - New heights for each edit mode
//! - [`commands`] - Undoable edits and the undo history
//! - [`seams`] - Crack-free borders between neighboring tiles
//! - [`pipeline`] - The editor tying the steps together

pub mod brush;
pub mod commands;
pub mod constants;
pub mod height_update;
pub mod pipeline;
pub mod planner;
pub mod seams;
pub mod tiles;
pub mod types;
pub mod validation;

pub use brush::*;
pub use commands::*;
pub use constants::*;
pub use height_update::*;
pub use pipeline::*;
pub use planner::*;
pub use seams::*;
pub use tiles::*;
pub use types::*;
pub use validation::*;
