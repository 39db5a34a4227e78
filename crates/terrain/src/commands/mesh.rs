use tracing::debug;

use super::{Command, CommandError, GroupId};
use crate::tiles::TileGrid;
use crate::types::TileCoord;

/// Forces a mesh rebuild for one tile
///
/// Undo does nothing: the mesh is derived from the heights, which the
/// surrounding commands in the group restore themselves.
#[derive(Debug, Clone)]
pub struct UpdateTileMeshCommand {
    name: String,
    group: GroupId,
    coord: TileCoord,
}

impl UpdateTileMeshCommand {
    pub fn new(name: impl Into<String>, group: GroupId, coord: TileCoord) -> Self {
        Self {
            name: name.into(),
            group,
            coord,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }
}

impl Command for UpdateTileMeshCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn group(&self) -> GroupId {
        self.group
    }

    fn can_join(&self) -> bool {
        true
    }

    fn redo(&mut self, grid: &mut dyn TileGrid) -> Result<(), CommandError> {
        debug!("UpdateTileMesh::redo: ({}, {})", self.coord.x, self.coord.y);
        grid.rebuild_mesh(self.coord, true)?;
        Ok(())
    }

    fn undo(&mut self, _grid: &mut dyn TileGrid) -> Result<(), CommandError> {
        Ok(())
    }
}
