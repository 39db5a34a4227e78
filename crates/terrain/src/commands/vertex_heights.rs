//! Height write command (one paint step on one tile)

use tracing::debug;

use super::{Command, CommandError, GroupId};
use crate::height_update::heights_at_resolution;
use crate::tiles::{GridError, TileGrid};
use crate::types::{HeightWrite, TileCoord, VertexRect};
use crate::validation::vertex_index;

/// Tile state needed to revert a height write exactly
#[derive(Debug, Clone, PartialEq)]
enum HeightSnapshot {
    /// The tile had no height buffer
    Flat,
    /// Heights inside the written rectangle (resolution unchanged)
    Region(Vec<f32>),
    /// The whole buffer (the write resizes or clears the tile)
    Full(Vec<f32>),
}

/// Writes heights into a rectangle of one tile
///
/// Both snapshots are taken at construction, before anything is written:
/// the "before" state from the grid, and the "after" state from the new
/// values with locked edge vertices already replaced by their current
/// heights. Redo is therefore a plain replay and never has to re-apply the
/// edge lock.
#[derive(Debug, Clone)]
pub struct SetVertexHeightsCommand {
    name: String,
    group: GroupId,
    coord: TileCoord,
    rect: VertexRect,
    resolution: u32,
    before_resolution: u32,
    before: HeightSnapshot,
    after: HeightWrite,
    update_mesh: bool,
}

impl SetVertexHeightsCommand {
    #[allow(clippy::too_many_arguments)]
    pub fn new<G: TileGrid + ?Sized>(
        name: impl Into<String>,
        group: GroupId,
        grid: &G,
        coord: TileCoord,
        rect: VertexRect,
        resolution: u32,
        write: HeightWrite,
        keep_edge_vertex_height: bool,
        update_mesh: bool,
    ) -> Result<Self, CommandError> {
        let before_resolution = grid.resolution(coord).ok_or(GridError::MissingTile(coord))?;
        let whole_tile = before_resolution != resolution || write == HeightWrite::Clear;

        let before = match grid.heights(coord) {
            None => HeightSnapshot::Flat,
            Some(heights) if whole_tile => HeightSnapshot::Full(heights.to_vec()),
            Some(_) => match grid.read_rect(coord, &rect) {
                Some(region) => HeightSnapshot::Region(region),
                None => HeightSnapshot::Flat,
            },
        };

        let after = if keep_edge_vertex_height {
            Self::lock_edges(grid, coord, &rect, resolution, write)
        } else {
            write
        };

        Ok(Self {
            name: name.into(),
            group,
            coord,
            rect,
            resolution,
            before_resolution,
            before,
            after,
            update_mesh,
        })
    }

    /// Replace boundary vertices of `write` with the tile's current heights
    fn lock_edges<G: TileGrid + ?Sized>(
        grid: &G,
        coord: TileCoord,
        rect: &VertexRect,
        resolution: u32,
        write: HeightWrite,
    ) -> HeightWrite {
        if write == HeightWrite::Clear {
            return write;
        }
        let fill = match &write {
            HeightWrite::Fill(value) => Some(*value),
            _ => None,
        };
        let current = heights_at_resolution(grid, coord, resolution);
        let r = resolution;

        let values = rect
            .iter()
            .enumerate()
            .map(|(i, (col, row))| {
                if col == 0 || row == 0 || col == r || row == r {
                    current
                        .as_deref()
                        .map_or(0.0, |h| h[vertex_index(r, col, row)])
                } else {
                    match (fill, write.values()) {
                        (Some(value), _) => value,
                        (None, Some(values)) => values.get(i).copied().unwrap_or(0.0),
                        (None, None) => 0.0,
                    }
                }
            })
            .collect();
        HeightWrite::Values(values)
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn rect(&self) -> VertexRect {
        self.rect
    }

    /// The write replayed by redo
    pub fn after(&self) -> &HeightWrite {
        &self.after
    }
}

impl Command for SetVertexHeightsCommand {
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
        debug!(
            "SetVertexHeights::redo: ({}, {}) rect={:?} res={}",
            self.coord.x, self.coord.y, self.rect, self.resolution
        );
        grid.set_vertex_heights(
            self.coord,
            self.rect,
            self.resolution,
            &self.after,
            false,
            self.update_mesh,
        )?;
        Ok(())
    }

    fn undo(&mut self, grid: &mut dyn TileGrid) -> Result<(), CommandError> {
        debug!(
            "SetVertexHeights::undo: ({}, {}) rect={:?}",
            self.coord.x, self.coord.y, self.rect
        );
        if !grid.tile_exists(self.coord) {
            return Err(GridError::MissingTile(self.coord).into());
        }
        let res = self.before_resolution;
        match &self.before {
            HeightSnapshot::Flat => {
                grid.set_vertex_heights(
                    self.coord,
                    VertexRect::full(res),
                    res,
                    &HeightWrite::Clear,
                    false,
                    self.update_mesh,
                )?;
            }
            HeightSnapshot::Region(values) => {
                grid.set_vertex_heights(
                    self.coord,
                    self.rect,
                    res,
                    &HeightWrite::Values(values.clone()),
                    false,
                    self.update_mesh,
                )?;
            }
            HeightSnapshot::Full(values) => {
                grid.set_tile_resolution(self.coord, res)?;
                grid.set_vertex_heights(
                    self.coord,
                    VertexRect::full(res),
                    res,
                    &HeightWrite::Values(values.clone()),
                    false,
                    self.update_mesh,
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::HeightfieldGrid;
    use terrain_config::GridConfig;

    const GROUP: GroupId = GroupId(1);

    fn grid(resolution: u32) -> HeightfieldGrid {
        let config = GridConfig {
            default_resolution: resolution,
            ..GridConfig::new(2, 1, 8.0, 8.0)
        };
        HeightfieldGrid::new(config).unwrap()
    }

    fn paint(
        grid: &HeightfieldGrid,
        coord: TileCoord,
        rect: VertexRect,
        resolution: u32,
        write: HeightWrite,
        keep_edges: bool,
    ) -> Result<SetVertexHeightsCommand, CommandError> {
        SetVertexHeightsCommand::new("Paint", GROUP, grid, coord, rect, resolution, write, keep_edges, false)
    }

    fn ramp(grid: &mut HeightfieldGrid, coord: TileCoord, resolution: u32) {
        let n = (resolution + 1) * (resolution + 1);
        let values = (0..n).map(|v| v as f32 * 0.37 - 3.0).collect();
        let rect = VertexRect::full(resolution);
        grid.set_vertex_heights(coord, rect, resolution, &HeightWrite::Values(values), false, false)
            .unwrap();
    }

    #[test]
    fn test_redo_then_undo_restores_bit_for_bit() {
        let mut grid = grid(4);
        let coord = TileCoord::new(0, 0);
        ramp(&mut grid, coord, 4);
        let original = grid.heights(coord).unwrap().to_vec();

        let rect = VertexRect::new(1, 1, 3, 2);
        let mut cmd = SetVertexHeightsCommand::new(
            "Paint",
            GROUP,
            &grid,
            coord,
            rect,
            4,
            HeightWrite::Values(vec![9.5; 6]),
            false,
            true,
        )
        .unwrap();
        cmd.redo(&mut grid).unwrap();
        assert_eq!(grid.height_at(coord, 2, 2), 9.5);

        cmd.undo(&mut grid).unwrap();
        let restored = grid.heights(coord).unwrap();
        assert_eq!(
            restored.iter().map(|h| h.to_bits()).collect::<Vec<_>>(),
            original.iter().map(|h| h.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_undo_returns_flat_tile_to_flat() {
        let mut grid = grid(4);
        let coord = TileCoord::new(1, 0);
        let mut cmd = paint(&grid, coord, VertexRect::point(2, 2), 4, HeightWrite::Fill(1.0), false).unwrap();
        cmd.redo(&mut grid).unwrap();
        assert!(grid.heights(coord).is_some());
        cmd.undo(&mut grid).unwrap();
        assert!(grid.heights(coord).is_none());
    }

    #[test]
    fn test_locked_edges_survive_replay() {
        let mut grid = grid(2);
        let coord = TileCoord::new(0, 0);
        ramp(&mut grid, coord, 2);
        let edge_before = grid.height_at(coord, 0, 1);

        let mut cmd = paint(&grid, coord, VertexRect::full(2), 2, HeightWrite::Fill(7.0), true).unwrap();
        cmd.redo(&mut grid).unwrap();
        assert_eq!(grid.height_at(coord, 1, 1), 7.0);
        assert_eq!(grid.height_at(coord, 0, 1), edge_before);

        // Replaying after an undo keeps the edge lock without re-applying it
        cmd.undo(&mut grid).unwrap();
        cmd.redo(&mut grid).unwrap();
        assert_eq!(grid.height_at(coord, 0, 1), edge_before);
        assert_eq!(grid.height_at(coord, 1, 1), 7.0);
        assert!(matches!(cmd.after(), HeightWrite::Values(_)));
    }

    #[test]
    fn test_resizing_write_restores_resolution() {
        let mut grid = grid(2);
        let coord = TileCoord::new(0, 0);
        ramp(&mut grid, coord, 2);
        let original = grid.heights(coord).unwrap().to_vec();

        let mut cmd = paint(&grid, coord, VertexRect::point(1, 1), 8, HeightWrite::Fill(1.0), false).unwrap();
        cmd.redo(&mut grid).unwrap();
        assert_eq!(grid.resolution(coord), Some(8));

        cmd.undo(&mut grid).unwrap();
        assert_eq!(grid.resolution(coord), Some(2));
        assert_eq!(grid.heights(coord).unwrap(), original.as_slice());
    }

    #[test]
    fn test_clear_is_reverted() {
        let mut grid = grid(2);
        let coord = TileCoord::new(0, 0);
        ramp(&mut grid, coord, 2);
        let original = grid.heights(coord).unwrap().to_vec();

        let mut cmd = paint(&grid, coord, VertexRect::full(2), 2, HeightWrite::Clear, false).unwrap();
        cmd.redo(&mut grid).unwrap();
        assert!(grid.heights(coord).is_none());
        cmd.undo(&mut grid).unwrap();
        assert_eq!(grid.heights(coord).unwrap(), original.as_slice());
    }

    #[test]
    fn test_missing_tile() {
        let mut grid = grid(2);
        let coord = TileCoord::new(0, 0);
        let missing = TileCoord::new(9, 9);
        let result = paint(&grid, missing, VertexRect::point(0, 0), 2, HeightWrite::Fill(1.0), false);
        assert_eq!(result.unwrap_err().missing_tile(), Some(missing));

        let mut cmd = paint(&grid, coord, VertexRect::point(1, 1), 2, HeightWrite::Fill(1.0), false).unwrap();
        grid.remove_tile(coord);
        assert_eq!(cmd.redo(&mut grid).unwrap_err().missing_tile(), Some(coord));
        assert_eq!(cmd.undo(&mut grid).unwrap_err().missing_tile(), Some(coord));
    }

    #[test]
    fn test_reports_joinable() {
        let grid = grid(2);
        let coord = TileCoord::new(0, 0);
        let cmd = paint(&grid, coord, VertexRect::point(1, 1), 2, HeightWrite::Fill(1.0), false).unwrap();
        assert!(cmd.can_join());
        assert_eq!(cmd.group(), GROUP);
        assert_eq!(cmd.name(), "Paint");
    }
}
