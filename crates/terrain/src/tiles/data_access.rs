//! Tile lookup and grid-wide queries

use super::{HeightfieldGrid, Tile};
use crate::types::TileCoord;

impl HeightfieldGrid {
    /// Get a tile by coordinate
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    /// All tile coordinates, sorted row by row
    pub fn coords(&self) -> Vec<TileCoord> {
        let mut coords: Vec<TileCoord> = self.tiles.keys().copied().collect();
        coords.sort_unstable_by_key(|c| (c.y, c.x));
        coords
    }

    /// Number of tiles present
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Insert or replace a tile
    ///
    /// Returns false if `coord` lies outside the grid bounds.
    pub fn insert_tile(&mut self, coord: TileCoord, tile: Tile) -> bool {
        if !self.in_bounds(coord) {
            return false;
        }
        self.tiles.insert(coord, tile);
        self.mark_mesh_dirty(coord);
        true
    }

    /// Remove a tile, returning it
    pub fn remove_tile(&mut self, coord: TileCoord) -> Option<Tile> {
        self.dirty_meshes.remove(&coord);
        self.tiles.remove(&coord)
    }
}
