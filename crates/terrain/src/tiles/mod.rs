//! Terrain tiles and the grid contract the editing engine runs against
//!
//! [`TileGrid`] is the narrow interface the planner, the commands and the
//! seam reconciler need from whatever owns the tiles. [`HeightfieldGrid`] is
//! the in-memory implementation: one [`Tile`] per grid cell, dirty-mesh
//! tracking for the renderer, and bilinear resampling on resolution change.

mod data_access;
mod dirty_tracking;
mod resample;

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use terrain_config::GridConfig;
use thiserror::Error;
use tracing::debug;

use crate::types::{HeightWrite, TileCoord, VertexRect, WorldRect};
use crate::validation::{ValidationError, buffer_len, validate_resolution, validate_write, vertex_index};

pub use resample::resample_heights;

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Tile ({}, {}) does not exist", .0.x, .0.y)]
    MissingTile(TileCoord),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Operations the editing engine needs from the tile owner
pub trait TileGrid {
    /// Resolution-independent world footprint of every tile
    fn tile_extent(&self) -> Vec2;

    /// Tile coordinate containing a world position (the tile may not exist)
    fn tile_at(&self, world: Vec2) -> TileCoord;

    fn tile_exists(&self, coord: TileCoord) -> bool;

    /// Every existing tile, row-major
    fn tile_coords(&self) -> Vec<TileCoord>;

    /// Inclusive range of coordinates a tile can occupy
    fn tile_bounds(&self) -> (TileCoord, TileCoord);

    /// Mesh resolution, or None if the tile does not exist
    fn resolution(&self, coord: TileCoord) -> Option<u32>;

    /// Height buffer, or None if the tile is missing or flat/unset
    fn heights(&self, coord: TileCoord) -> Option<&[f32]>;

    /// World-space rectangle covered by the tile
    fn world_rect_of(&self, coord: TileCoord) -> Option<WorldRect>;

    fn set_tile_resolution(&mut self, coord: TileCoord, resolution: u32) -> Result<(), GridError>;

    /// Write heights into `rect`, expressed at `resolution`
    ///
    /// A tile at a different resolution adopts `resolution` first. With
    /// `keep_edge_vertex_height` the tile's boundary vertices are left as
    /// they are.
    fn set_vertex_heights(
        &mut self,
        coord: TileCoord,
        rect: VertexRect,
        resolution: u32,
        write: &HeightWrite,
        keep_edge_vertex_height: bool,
        update_mesh: bool,
    ) -> Result<(), GridError>;

    fn rebuild_mesh(&mut self, coord: TileCoord, force_create: bool) -> Result<(), GridError>;

    /// Height of one vertex; flat/unset tiles read as zero
    fn height_at(&self, coord: TileCoord, col: u32, row: u32) -> f32 {
        match (self.heights(coord), self.resolution(coord)) {
            (Some(heights), Some(resolution)) if col <= resolution && row <= resolution => {
                heights[vertex_index(resolution, col, row)]
            }
            _ => 0.0,
        }
    }

    /// Copy of the heights inside `rect`, row-major
    ///
    /// Returns None if the tile is missing, flat/unset, or `rect` does not
    /// fit its resolution.
    fn read_rect(&self, coord: TileCoord, rect: &VertexRect) -> Option<Vec<f32>> {
        let resolution = self.resolution(coord)?;
        let heights = self.heights(coord)?;
        if !rect.fits(resolution) {
            return None;
        }
        Some(
            rect.iter()
                .map(|(col, row)| heights[vertex_index(resolution, col, row)])
                .collect(),
        )
    }
}

/// A single terrain tile
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    resolution: u32,
    heights: Option<Vec<f32>>,
}

impl Tile {
    /// Create a flat tile
    pub fn new(resolution: u32) -> Result<Self, ValidationError> {
        validate_resolution(resolution)?;
        Ok(Self {
            resolution,
            heights: None,
        })
    }

    /// Create a tile from raw parts without checking the buffer length
    ///
    /// A buffer whose length does not match `(resolution + 1)²` reads as flat.
    pub fn from_parts(resolution: u32, heights: Option<Vec<f32>>) -> Result<Self, ValidationError> {
        validate_resolution(resolution)?;
        Ok(Self {
            resolution,
            heights,
        })
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// The height buffer, if present and consistent with the resolution
    pub fn heights(&self) -> Option<&[f32]> {
        match &self.heights {
            Some(heights) if heights.len() == buffer_len(self.resolution) => Some(heights),
            _ => None,
        }
    }

    /// Whether the tile has a usable height buffer
    #[inline]
    pub fn has_heights(&self) -> bool {
        self.heights().is_some()
    }

    /// Raw height buffer as bytes for mesh upload
    pub fn heights_as_bytes(&self) -> &[u8] {
        self.heights().map(bytemuck::cast_slice).unwrap_or(&[])
    }

    pub(crate) fn set_resolution(&mut self, resolution: u32) {
        if resolution == self.resolution {
            return;
        }
        let resampled = self
            .heights()
            .map(|heights| resample_heights(heights, self.resolution, resolution));
        self.heights = resampled;
        self.resolution = resolution;
    }

    pub(crate) fn write(&mut self, rect: &VertexRect, write: &HeightWrite, keep_edges: bool) {
        let resolution = self.resolution;
        let fill = match write {
            HeightWrite::Clear => {
                self.heights = None;
                return;
            }
            HeightWrite::Fill(value) => Some(*value),
            HeightWrite::Values(_) => None,
        };

        if !self.has_heights() {
            self.heights = Some(vec![0.0; buffer_len(resolution)]);
        }
        let Some(heights) = self.heights.as_mut() else {
            return;
        };

        for (i, (col, row)) in rect.iter().enumerate() {
            let on_edge = col == 0 || row == 0 || col == resolution || row == resolution;
            if keep_edges && on_edge {
                continue;
            }
            let value = match (fill, write.values()) {
                (Some(value), _) => value,
                (None, Some(values)) => values[i],
                (None, None) => continue,
            };
            heights[vertex_index(resolution, col, row)] = value;
        }
    }
}

/// In-memory terrain tile grid
pub struct HeightfieldGrid {
    config: GridConfig,
    tiles: HashMap<TileCoord, Tile>,
    pub(crate) dirty_meshes: HashSet<TileCoord>,
}

impl HeightfieldGrid {
    /// Create a grid with every tile present, flat, at the default resolution
    pub fn new(config: GridConfig) -> Result<Self, ValidationError> {
        config
            .validate()
            .map_err(|e| ValidationError::InvalidGrid(e.to_string()))?;
        let mut tiles = HashMap::new();
        for y in 0..config.tiles_y as i32 {
            for x in 0..config.tiles_x as i32 {
                tiles.insert(TileCoord::new(x, y), Tile::new(config.default_resolution)?);
            }
        }
        Ok(Self {
            config,
            tiles,
            dirty_meshes: HashSet::new(),
        })
    }

    /// Grid configuration
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Whether `coord` lies inside the grid bounds
    #[inline]
    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.config.tiles_x
            && (coord.y as u32) < self.config.tiles_y
    }

    fn tile_mut(&mut self, coord: TileCoord) -> Result<&mut Tile, GridError> {
        self.tiles.get_mut(&coord).ok_or(GridError::MissingTile(coord))
    }
}

impl TileGrid for HeightfieldGrid {
    fn tile_extent(&self) -> Vec2 {
        Vec2::new(self.config.tile_width, self.config.tile_height)
    }

    fn tile_at(&self, world: Vec2) -> TileCoord {
        let local = (world - Vec2::from(self.config.origin)) / self.tile_extent();
        TileCoord::new(local.x.floor() as i32, local.y.floor() as i32)
    }

    fn tile_exists(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    fn tile_coords(&self) -> Vec<TileCoord> {
        self.coords()
    }

    fn tile_bounds(&self) -> (TileCoord, TileCoord) {
        let last = TileCoord::new(self.config.tiles_x as i32 - 1, self.config.tiles_y as i32 - 1);
        (TileCoord::new(0, 0), last)
    }

    fn resolution(&self, coord: TileCoord) -> Option<u32> {
        self.tiles.get(&coord).map(Tile::resolution)
    }

    fn heights(&self, coord: TileCoord) -> Option<&[f32]> {
        self.tiles.get(&coord).and_then(Tile::heights)
    }

    fn world_rect_of(&self, coord: TileCoord) -> Option<WorldRect> {
        if !self.tile_exists(coord) {
            return None;
        }
        let extent = self.tile_extent();
        let min = Vec2::from(self.config.origin) + Vec2::new(coord.x as f32, coord.y as f32) * extent;
        Some(WorldRect::new(min, min + extent))
    }

    fn set_tile_resolution(&mut self, coord: TileCoord, resolution: u32) -> Result<(), GridError> {
        validate_resolution(resolution)?;
        let tile = self.tile_mut(coord)?;
        if tile.resolution() == resolution {
            return Ok(());
        }
        debug!(
            "set_tile_resolution: ({}, {}) {} -> {}",
            coord.x,
            coord.y,
            tile.resolution(),
            resolution
        );
        tile.set_resolution(resolution);
        self.mark_mesh_dirty(coord);
        Ok(())
    }

    fn set_vertex_heights(
        &mut self,
        coord: TileCoord,
        rect: VertexRect,
        resolution: u32,
        write: &HeightWrite,
        keep_edge_vertex_height: bool,
        update_mesh: bool,
    ) -> Result<(), GridError> {
        validate_write(&rect, resolution, write)?;
        let tile = self.tile_mut(coord)?;
        let resized = tile.resolution() != resolution;
        tile.set_resolution(resolution);
        tile.write(&rect, write, keep_edge_vertex_height);

        if update_mesh || resized {
            self.mark_mesh_dirty(coord);
        }
        Ok(())
    }

    fn rebuild_mesh(&mut self, coord: TileCoord, force_create: bool) -> Result<(), GridError> {
        let tile = self.tiles.get(&coord).ok_or(GridError::MissingTile(coord))?;
        if tile.has_heights() || force_create {
            self.mark_mesh_dirty(coord);
        }
        Ok(())
    }
}
