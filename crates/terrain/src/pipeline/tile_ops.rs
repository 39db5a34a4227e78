//! Whole-tile operations for the editing pipeline

use tracing::{debug, warn};

use crate::brush::BrushSampler;
use crate::commands::{
    CommandError, GroupId, SetResolutionCommand, SetVertexHeightsCommand, UpdateTileMeshCommand,
};
use crate::height_update::{reset_edge_edits, suppress_tile_edit};
use crate::seams::EdgeZones;
use crate::tiles::{GridError, TileGrid};
use crate::types::{EditIntent, TileCoord};
use crate::validation::validate_resolution;

use super::TerrainEditor;

impl<G: TileGrid, B: BrushSampler> TerrainEditor<G, B> {
    /// Change the mesh resolution of one tile as its own undo step
    ///
    /// Neighbors are not resized; any neighbor left at a different
    /// resolution gets its facing border flattened. Returns false if the
    /// tile already had this resolution.
    pub fn set_resolution(&mut self, coord: TileCoord, resolution: u32) -> Result<bool, CommandError> {
        validate_resolution(resolution).map_err(GridError::from)?;
        let current = self.grid.resolution(coord).ok_or(GridError::MissingTile(coord))?;
        if current == resolution {
            return Ok(false);
        }

        let group = self.history.begin_group();
        let command =
            SetResolutionCommand::new("Set Resolution", group, &self.grid, coord, resolution, true)?;
        self.history.perform_command(&mut self.grid, Box::new(command), true)?;

        self.seams.mark(coord, EdgeZones::NONE, resolution);
        let fixes = self.seams.reconcile(&mut self.grid, &mut self.history);
        debug!(
            "set_resolution: ({}, {}) {} -> {}, {} seam fixes",
            coord.x, coord.y, current, resolution, fixes
        );
        Ok(true)
    }

    /// Zero the four border rows/columns of a tile
    ///
    /// Neighbors get the zeroed borders copied across. Returns the number of
    /// border writes applied.
    pub fn reset_edge_height(&mut self, coord: TileCoord) -> usize {
        let group = self.history.begin_group();
        let edits = reset_edge_edits(&self.grid, coord);
        let applied = self.apply_edits("Reset Edge Height", group, edits);
        self.seams.reconcile(&mut self.grid, &mut self.history);
        applied
    }

    /// Snap every height below `threshold` (in magnitude) to zero on all tiles
    ///
    /// Flat tiles and tiles with nothing to change are left alone. Returns
    /// the number of tiles changed.
    pub fn suppress_all_below_threshold(&mut self, threshold: f32) -> usize {
        let group = self.history.begin_group();
        let edits: Vec<EditIntent> = self
            .grid
            .tile_coords()
            .into_iter()
            .filter_map(|coord| suppress_tile_edit(&self.grid, coord, threshold))
            .filter(|edit| edit.write.values() != self.grid.heights(edit.coord))
            .collect();
        let applied = self.apply_edits("Suppress Below Threshold", group, edits);
        // Every tile went through the same rule, so borders that matched still match
        self.seams.clear();
        debug!("suppress_all_below_threshold: {} -> {} tiles", threshold, applied);
        applied
    }

    /// Force a mesh rebuild of one tile, joined to the current undo step
    pub fn refresh_mesh(&mut self, coord: TileCoord) -> Result<(), CommandError> {
        let group = self.history.begin_or_join_group(true);
        let command = UpdateTileMeshCommand::new("Refresh Mesh", group, coord);
        self.history.perform_command(&mut self.grid, Box::new(command), true)
    }

    /// Wrap edits in height commands, apply them and record them for seams
    fn apply_edits(&mut self, name: &str, group: GroupId, edits: Vec<EditIntent>) -> usize {
        let mut applied = 0;
        for EditIntent {
            coord,
            rect,
            resolution,
            write,
        } in edits
        {
            let result = SetVertexHeightsCommand::new(
                name, group, &self.grid, coord, rect, resolution, write, false, true,
            )
            .and_then(|command| self.history.perform_command(&mut self.grid, Box::new(command), true));
            match result {
                Ok(()) => {
                    self.seams.record(coord, &rect, resolution);
                    applied += 1;
                }
                Err(e) => warn!("{}: skipping tile ({}, {}): {}", name, coord.x, coord.y, e),
            }
        }
        applied
    }
}
