//! Edge and corner zones of a tile

use std::ops::{BitOr, BitOrAssign};

use crate::types::VertexRect;

/// Set of the 8 border zones of a tile (4 edges, 4 corners)
///
/// Row 0 is the bottom edge and column 0 the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EdgeZones(u8);

impl EdgeZones {
    pub const NONE: Self = Self(0);
    pub const BOTTOM: Self = Self(1 << 0);
    pub const TOP: Self = Self(1 << 1);
    pub const LEFT: Self = Self(1 << 2);
    pub const RIGHT: Self = Self(1 << 3);
    pub const BOTTOM_LEFT: Self = Self(1 << 4);
    pub const BOTTOM_RIGHT: Self = Self(1 << 5);
    pub const TOP_LEFT: Self = Self(1 << 6);
    pub const TOP_RIGHT: Self = Self(1 << 7);

    /// Every single zone with the offset of the neighbor tile across it
    pub const NEIGHBORS: [(Self, i32, i32); 8] = [
        (Self::BOTTOM, 0, -1),
        (Self::TOP, 0, 1),
        (Self::LEFT, -1, 0),
        (Self::RIGHT, 1, 0),
        (Self::BOTTOM_LEFT, -1, -1),
        (Self::BOTTOM_RIGHT, 1, -1),
        (Self::TOP_LEFT, -1, 1),
        (Self::TOP_RIGHT, 1, 1),
    ];

    /// Zones a vertex rectangle touches at `resolution`
    pub fn classify(rect: &VertexRect, resolution: u32) -> Self {
        let left = rect.min_x == 0;
        let right = rect.max_x == resolution;
        let bottom = rect.min_y == 0;
        let top = rect.max_y == resolution;

        let mut zones = Self::NONE;
        for (touched, zone) in [
            (bottom, Self::BOTTOM),
            (top, Self::TOP),
            (left, Self::LEFT),
            (right, Self::RIGHT),
            (bottom && left, Self::BOTTOM_LEFT),
            (bottom && right, Self::BOTTOM_RIGHT),
            (top && left, Self::TOP_LEFT),
            (top && right, Self::TOP_RIGHT),
        ] {
            if touched {
                zones |= zone;
            }
        }
        zones
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether this is one of the four corner zones
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Self::BOTTOM_LEFT | Self::BOTTOM_RIGHT | Self::TOP_LEFT | Self::TOP_RIGHT
        )
    }

    /// The zone on the other side of the shared border (single zones only)
    pub fn opposite(self) -> Self {
        match self {
            Self::BOTTOM => Self::TOP,
            Self::TOP => Self::BOTTOM,
            Self::LEFT => Self::RIGHT,
            Self::RIGHT => Self::LEFT,
            Self::BOTTOM_LEFT => Self::TOP_RIGHT,
            Self::BOTTOM_RIGHT => Self::TOP_LEFT,
            Self::TOP_LEFT => Self::BOTTOM_RIGHT,
            Self::TOP_RIGHT => Self::BOTTOM_LEFT,
            _ => Self::NONE,
        }
    }

    /// Vertices of a single zone at `resolution`: a full row/column or one corner
    pub fn border_rect(self, resolution: u32) -> Option<VertexRect> {
        let r = resolution;
        let rect = match self {
            Self::BOTTOM => VertexRect::new(0, 0, r, 0),
            Self::TOP => VertexRect::new(0, r, r, r),
            Self::LEFT => VertexRect::new(0, 0, 0, r),
            Self::RIGHT => VertexRect::new(r, 0, r, r),
            Self::BOTTOM_LEFT => VertexRect::point(0, 0),
            Self::BOTTOM_RIGHT => VertexRect::point(r, 0),
            Self::TOP_LEFT => VertexRect::point(0, r),
            Self::TOP_RIGHT => VertexRect::point(r, r),
            _ => return None,
        };
        Some(rect)
    }
}

impl BitOr for EdgeZones {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EdgeZones {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
