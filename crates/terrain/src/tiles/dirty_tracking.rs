//! Dirty mesh tracking for incremental mesh rebuilds

use tracing::debug;

use super::HeightfieldGrid;
use crate::types::TileCoord;

impl HeightfieldGrid {
    /// Mark a tile's mesh as needing a rebuild
    #[inline]
    pub fn mark_mesh_dirty(&mut self, coord: TileCoord) {
        if self.dirty_meshes.insert(coord) {
            debug!("mark_mesh_dirty: ({}, {}) (total {})", coord.x, coord.y, self.dirty_meshes.len());
        }
    }

    /// Get all tiles needing a mesh rebuild and clear the dirty set
    ///
    /// Coordinates are returned sorted so rebuild order is deterministic.
    pub fn take_dirty_meshes(&mut self) -> Vec<TileCoord> {
        let mut coords: Vec<TileCoord> = self.dirty_meshes.drain().collect();
        coords.sort_unstable();
        coords
    }

    /// Check if any tile meshes are dirty
    #[inline]
    pub fn has_dirty_meshes(&self) -> bool {
        !self.dirty_meshes.is_empty()
    }

    /// Get the number of dirty tile meshes
    #[inline]
    pub fn dirty_mesh_count(&self) -> usize {
        self.dirty_meshes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::TileGrid;
    use crate::types::{HeightWrite, VertexRect};
    use terrain_config::GridConfig;

    fn grid() -> HeightfieldGrid {
        let config = GridConfig {
            default_resolution: 4,
            ..GridConfig::new(2, 2, 4.0, 4.0)
        };
        HeightfieldGrid::new(config).unwrap()
    }

    #[test]
    fn test_take_dirty_meshes() {
        let mut grid = grid();
        assert!(!grid.has_dirty_meshes());

        grid.mark_mesh_dirty(TileCoord::new(1, 1));
        grid.mark_mesh_dirty(TileCoord::new(0, 1));
        grid.mark_mesh_dirty(TileCoord::new(1, 1));
        assert_eq!(grid.dirty_mesh_count(), 2);

        let dirty = grid.take_dirty_meshes();
        assert_eq!(dirty, vec![TileCoord::new(0, 1), TileCoord::new(1, 1)]);
        assert!(!grid.has_dirty_meshes());
    }

    #[test]
    fn test_update_mesh_flag() {
        let mut grid = grid();
        let coord = TileCoord::new(0, 0);
        grid.set_vertex_heights(coord, VertexRect::point(1, 1), 4, &HeightWrite::Fill(1.0), false, false)
            .unwrap();
        assert!(!grid.has_dirty_meshes());

        grid.set_vertex_heights(coord, VertexRect::point(1, 1), 4, &HeightWrite::Fill(2.0), false, true)
            .unwrap();
        assert_eq!(grid.take_dirty_meshes(), vec![coord]);
    }

    #[test]
    fn test_rebuild_mesh_of_flat_tile_needs_force() {
        let mut grid = grid();
        let coord = TileCoord::new(1, 0);
        grid.rebuild_mesh(coord, false).unwrap();
        assert!(!grid.has_dirty_meshes());
        grid.rebuild_mesh(coord, true).unwrap();
        assert!(grid.has_dirty_meshes());
    }

    #[test]
    fn test_resolution_change_marks_dirty() {
        let mut grid = grid();
        let coord = TileCoord::new(1, 0);
        grid.set_tile_resolution(coord, 4).unwrap();
        assert!(!grid.has_dirty_meshes());
        grid.set_tile_resolution(coord, 8).unwrap();
        assert_eq!(grid.take_dirty_meshes(), vec![coord]);
    }
}
