//! Shared configuration for the terrain editor
//!
//! This crate provides the single source of truth for terrain grid geometry,
//! brush defaults and undo limits shared by the editing engine and whatever
//! host application embeds it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of tiles along X
pub const DEFAULT_TILES_X: u32 = 4;

/// Default number of tiles along Y
pub const DEFAULT_TILES_Y: u32 = 4;

/// Default world-space width and height of one tile
pub const DEFAULT_TILE_EXTENT: f32 = 64.0;

/// Default mesh resolution for newly created tiles
pub const DEFAULT_RESOLUTION: u32 = 32;

/// Largest mesh resolution a tile may use
pub const MAX_RESOLUTION: u32 = 256;

/// Default brush diameter in world units
pub const DEFAULT_BRUSH_SIZE: f32 = 16.0;

/// Default brush intensity
pub const DEFAULT_BRUSH_INTENSITY: f32 = 0.5;

/// Default threshold below which vertex heights are suppressed to zero
pub const DEFAULT_SUPPRESS_THRESHOLD: f32 = 0.01;

/// Default number of undo steps kept in history
pub const DEFAULT_MAX_UNDO_GROUPS: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Grid must contain at least one tile, got {tiles_x}x{tiles_y}")]
    EmptyGrid { tiles_x: u32, tiles_y: u32 },
    #[error("Tile extent must be positive, got {width}x{height}")]
    InvalidTileExtent { width: f32, height: f32 },
    #[error("Default resolution {0} is not a power of two in [1, {max}]", max = MAX_RESOLUTION)]
    InvalidResolution(u32),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Geometry of the terrain tile grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of tiles along X
    pub tiles_x: u32,
    /// Number of tiles along Y
    pub tiles_y: u32,
    /// World-space width of one tile (independent of resolution)
    pub tile_width: f32,
    /// World-space height of one tile (independent of resolution)
    pub tile_height: f32,
    /// World-space position of the grid's minimum corner
    pub origin: [f32; 2],
    /// Resolution assigned to tiles when the grid is created
    pub default_resolution: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tiles_x: DEFAULT_TILES_X,
            tiles_y: DEFAULT_TILES_Y,
            tile_width: DEFAULT_TILE_EXTENT,
            tile_height: DEFAULT_TILE_EXTENT,
            origin: [0.0, 0.0],
            default_resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl GridConfig {
    /// Create a grid config with the given tile counts and extents
    pub fn new(tiles_x: u32, tiles_y: u32, tile_width: f32, tile_height: f32) -> Self {
        Self {
            tiles_x,
            tiles_y,
            tile_width,
            tile_height,
            ..Default::default()
        }
    }

    /// Check the grid geometry for values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiles_x == 0 || self.tiles_y == 0 {
            return Err(ConfigError::EmptyGrid {
                tiles_x: self.tiles_x,
                tiles_y: self.tiles_y,
            });
        }
        if !(self.tile_width > 0.0 && self.tile_height > 0.0) {
            return Err(ConfigError::InvalidTileExtent {
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        let res = self.default_resolution;
        if !res.is_power_of_two() || res > MAX_RESOLUTION {
            return Err(ConfigError::InvalidResolution(res));
        }
        Ok(())
    }

    /// Total world-space width of the grid
    pub fn world_width(&self) -> f32 {
        self.tiles_x as f32 * self.tile_width
    }

    /// Total world-space height of the grid
    pub fn world_height(&self) -> f32 {
        self.tiles_y as f32 * self.tile_height
    }
}

/// Default brush settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Brush diameter in world units
    pub size: f32,
    /// Brush intensity multiplier
    pub intensity: f32,
    /// Target height for the set-height mode
    pub target_height: f32,
    /// Threshold for vertex suppression
    pub suppress_threshold: f32,
    /// Use bilinear instead of point sampling of the brush mask
    pub linear_sampling: bool,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BRUSH_SIZE,
            intensity: DEFAULT_BRUSH_INTENSITY,
            target_height: 0.0,
            suppress_threshold: DEFAULT_SUPPRESS_THRESHOLD,
            linear_sampling: true,
        }
    }
}

/// Undo history limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoConfig {
    /// Maximum number of undo groups retained (oldest are dropped)
    pub max_groups: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_groups: DEFAULT_MAX_UNDO_GROUPS,
        }
    }
}

/// Complete terrain editor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub grid: GridConfig,
    pub brush: BrushConfig,
    pub undo: UndoConfig,
}

impl TerrainConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TerrainConfig = serde_json::from_str(json)?;
        config.grid.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
