use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Integer coordinate of a tile within the terrain grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate of the tile `dx`, `dy` steps away
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axis-aligned world-space rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldRect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square of side `size` centered on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size * 0.5);
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Overlap of two rectangles, or None if they do not overlap
    pub fn intersect(&self, other: &WorldRect) -> Option<WorldRect> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.x > max.x || min.y > max.y {
            return None;
        }
        Some(WorldRect::new(min, max))
    }
}

/// Inclusive rectangle in a tile's local vertex-index space
///
/// Indices run from 0 to the tile resolution on both axes. Heights covered
/// by a rectangle are always laid out row-major, `minY` row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl VertexRect {
    pub const fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Rectangle covering every vertex of a tile at `resolution`
    pub const fn full(resolution: u32) -> Self {
        Self::new(0, 0, resolution, resolution)
    }

    /// Rectangle covering a single vertex
    pub const fn point(x: u32, y: u32) -> Self {
        Self::new(x, y, x, y)
    }

    /// Number of vertex columns covered
    #[inline]
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Number of vertex rows covered
    #[inline]
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Number of vertices covered
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Whether the rectangle lies inside a tile of the given resolution
    #[inline]
    pub fn fits(&self, resolution: u32) -> bool {
        self.min_x <= self.max_x
            && self.min_y <= self.max_y
            && self.max_x <= resolution
            && self.max_y <= resolution
    }

    /// Iterate (col, row) pairs in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.min_y..=self.max_y).flat_map(move |row| (self.min_x..=self.max_x).map(move |col| (col, row)))
    }
}

/// Brush edit modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum EditMode {
    /// Raise or lower heights by the brush sample
    #[default]
    ChangeHeight = 0,
    /// Move heights toward a target height without crossing it
    SetHeight = 1,
    /// Discard the whole height buffer of every touched tile
    ResetHeight = 2,
    /// Snap heights with magnitude below a threshold to zero
    SuppressVertex = 3,
    /// Blend heights toward the average under the brush
    Smooth = 4,
}

/// A height write against one tile rectangle
#[derive(Debug, Clone, PartialEq)]
pub enum HeightWrite {
    /// Explicit heights for every vertex of the rectangle, row-major
    Values(Vec<f32>),
    /// The same height for every vertex of the rectangle
    Fill(f32),
    /// Discard the tile's buffer (the tile becomes flat/unset)
    Clear,
}

impl HeightWrite {
    /// Explicit values, if this write carries any
    pub fn values(&self) -> Option<&[f32]> {
        match self {
            HeightWrite::Values(values) => Some(values),
            _ => None,
        }
    }
}

/// Planned edit against one tile: which vertices change and to what
#[derive(Debug, Clone, PartialEq)]
pub struct EditIntent {
    pub coord: TileCoord,
    pub rect: VertexRect,
    /// Resolution the rectangle is expressed in
    pub resolution: u32,
    pub write: HeightWrite,
}

impl EditIntent {
    /// Create an intent with no computed values yet
    pub fn new(coord: TileCoord, rect: VertexRect, resolution: u32) -> Self {
        Self {
            coord,
            rect,
            resolution,
            write: HeightWrite::Values(Vec::new()),
        }
    }
}
