//! Undoable terrain edits
//!
//! Every mutation of tile heights or resolutions goes through a [`Command`]
//! so it can be replayed and reverted. Commands take the grid as an explicit
//! argument on every replay; they never hold on to it.

mod history;
mod mesh;
mod resolution;
mod vertex_heights;

use thiserror::Error;

use crate::tiles::{GridError, TileGrid};
use crate::types::TileCoord;

pub use history::{UndoGroup, UndoHistory};
pub use mesh::UpdateTileMeshCommand;
pub use resolution::SetResolutionCommand;
pub use vertex_heights::SetVertexHeightsCommand;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),
}

impl CommandError {
    /// Tile the failure refers to, if it is a missing-tile failure
    pub fn missing_tile(&self) -> Option<TileCoord> {
        match self {
            CommandError::Grid(GridError::MissingTile(coord)) => Some(*coord),
            _ => None,
        }
    }
}

/// Identifier of an undo group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

/// An undoable edit against a tile grid
pub trait Command {
    /// Display name for history UIs
    fn name(&self) -> &str;

    /// Undo group this command was created for
    fn group(&self) -> GroupId;

    /// Whether later commands may be merged into the same undo step
    fn can_join(&self) -> bool;

    /// Apply (or re-apply) the edit
    fn redo(&mut self, grid: &mut dyn TileGrid) -> Result<(), CommandError>;

    /// Revert the edit
    fn undo(&mut self, grid: &mut dyn TileGrid) -> Result<(), CommandError>;
}
