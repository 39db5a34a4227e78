use tracing::debug;

use super::{Command, CommandError, GroupId};
use crate::tiles::{GridError, TileGrid};
use crate::types::{HeightWrite, TileCoord, VertexRect};

/// Changes the mesh resolution of one tile
///
/// The tile's heights are resampled on redo. Undo puts back the exact
/// buffer that existed before, not a second resample.
#[derive(Debug, Clone)]
pub struct SetResolutionCommand {
    name: String,
    group: GroupId,
    coord: TileCoord,
    resolution: u32,
    before_resolution: u32,
    before_heights: Option<Vec<f32>>,
    update_mesh: bool,
    joinable: bool,
}

impl SetResolutionCommand {
    pub fn new<G: TileGrid + ?Sized>(
        name: impl Into<String>,
        group: GroupId,
        grid: &G,
        coord: TileCoord,
        resolution: u32,
        update_mesh: bool,
    ) -> Result<Self, CommandError> {
        let before_resolution = grid.resolution(coord).ok_or(GridError::MissingTile(coord))?;
        Ok(Self {
            name: name.into(),
            group,
            coord,
            resolution,
            before_resolution,
            before_heights: grid.heights(coord).map(<[f32]>::to_vec),
            update_mesh,
            joinable: false,
        })
    }

    /// Let later commands merge into this command's undo step
    ///
    /// Used for resizes issued on behalf of another edit, such as seam fixes
    /// during a stroke.
    pub fn joinable(mut self) -> Self {
        self.joinable = true;
        self
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }
}

impl Command for SetResolutionCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn group(&self) -> GroupId {
        self.group
    }

    fn can_join(&self) -> bool {
        self.joinable
    }

    fn redo(&mut self, grid: &mut dyn TileGrid) -> Result<(), CommandError> {
        debug!(
            "SetResolution::redo: ({}, {}) {} -> {}",
            self.coord.x, self.coord.y, self.before_resolution, self.resolution
        );
        grid.set_tile_resolution(self.coord, self.resolution)?;
        if self.update_mesh {
            grid.rebuild_mesh(self.coord, false)?;
        }
        Ok(())
    }

    fn undo(&mut self, grid: &mut dyn TileGrid) -> Result<(), CommandError> {
        debug!(
            "SetResolution::undo: ({}, {}) {} -> {}",
            self.coord.x, self.coord.y, self.resolution, self.before_resolution
        );
        let res = self.before_resolution;
        grid.set_tile_resolution(self.coord, res)?;
        let write = match &self.before_heights {
            Some(heights) => HeightWrite::Values(heights.clone()),
            None => HeightWrite::Clear,
        };
        grid.set_vertex_heights(self.coord, VertexRect::full(res), res, &write, false, self.update_mesh)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::HeightfieldGrid;
    use terrain_config::GridConfig;

    fn grid() -> HeightfieldGrid {
        let config = GridConfig {
            default_resolution: 4,
            ..GridConfig::new(1, 1, 8.0, 8.0)
        };
        HeightfieldGrid::new(config).unwrap()
    }

    #[test]
    fn test_round_trip_is_exact() {
        let mut grid = grid();
        let coord = TileCoord::new(0, 0);
        let values: Vec<f32> = (0..25).map(|v| (v as f32).sin() * 3.0).collect();
        grid.set_vertex_heights(coord, VertexRect::full(4), 4, &HeightWrite::Values(values.clone()), false, false)
            .unwrap();

        let mut cmd = SetResolutionCommand::new("Resolution", GroupId(0), &grid, coord, 2, true).unwrap();
        cmd.redo(&mut grid).unwrap();
        assert_eq!(grid.resolution(coord), Some(2));
        assert_eq!(grid.heights(coord).unwrap().len(), 9);
        assert!(grid.has_dirty_meshes());

        cmd.undo(&mut grid).unwrap();
        assert_eq!(grid.resolution(coord), Some(4));
        assert_eq!(grid.heights(coord).unwrap(), values.as_slice());
    }

    #[test]
    fn test_flat_tile_stays_flat() {
        let mut grid = grid();
        let coord = TileCoord::new(0, 0);
        let mut cmd = SetResolutionCommand::new("Resolution", GroupId(0), &grid, coord, 16, false).unwrap();
        cmd.redo(&mut grid).unwrap();
        assert_eq!(grid.resolution(coord), Some(16));
        assert!(grid.heights(coord).is_none());

        cmd.undo(&mut grid).unwrap();
        assert_eq!(grid.resolution(coord), Some(4));
        assert!(grid.heights(coord).is_none());
        assert!(!cmd.can_join());
    }

    #[test]
    fn test_joinable_resize() {
        let grid = grid();
        let coord = TileCoord::new(0, 0);
        let cmd = SetResolutionCommand::new("Resolution", GroupId(0), &grid, coord, 8, false).unwrap();
        assert!(cmd.joinable().can_join());
    }

    #[test]
    fn test_invalid_resolution_fails_redo() {
        let mut grid = grid();
        let coord = TileCoord::new(0, 0);
        let mut cmd = SetResolutionCommand::new("Resolution", GroupId(0), &grid, coord, 3, false).unwrap();
        assert!(cmd.redo(&mut grid).is_err());
        assert_eq!(grid.resolution(coord), Some(4));
    }

    #[test]
    fn test_missing_tile() {
        let grid = grid();
        let missing = TileCoord::new(1, 1);
        let err = SetResolutionCommand::new("Resolution", GroupId(0), &grid, missing, 8, false).unwrap_err();
        assert_eq!(err.missing_tile(), Some(missing));
    }
}
