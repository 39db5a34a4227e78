//! Brush footprint to per-tile vertex ranges
//!
//! The brush's world-space bounding square is split across every tile it
//! overlaps, and each overlap is converted into the inclusive range of
//! vertex indices it covers at the resolution used for the edit.

use glam::Vec2;
use tracing::debug;

use crate::brush::BrushParams;
use crate::tiles::TileGrid;
use crate::types::{EditIntent, TileCoord, VertexRect, WorldRect};

/// Tolerance for vertices lying exactly on the brush boundary
const INDEX_EPSILON: f32 = 1e-4;

/// Plan the per-tile edits for a brush step centered at `center`
///
/// Returns one intent per overlapped tile with an empty value list. Tiles
/// whose range collapses (for example a resolution-1 tile with locked
/// edges) are skipped.
pub fn plan_edits<G: TileGrid + ?Sized>(grid: &G, center: Vec2, params: &BrushParams) -> Vec<EditIntent> {
    let brush_rect = WorldRect::centered(center, params.size.max(0.0));
    let lock_edges = params.edges_locked();

    let candidates: Vec<TileCoord> = if params.paint_in_one_tile {
        vec![grid.tile_at(center)]
    } else {
        // Only tiles inside the grid bounds can exist
        let (first, last) = grid.tile_bounds();
        let min = grid.tile_at(brush_rect.min);
        let max = grid.tile_at(brush_rect.max);
        let (x0, x1) = (min.x.max(first.x), max.x.min(last.x));
        let (y0, y1) = (min.y.max(first.y), max.y.min(last.y));
        (y0..=y1)
            .flat_map(|y| (x0..=x1).map(move |x| TileCoord::new(x, y)))
            .collect()
    };

    let intents: Vec<EditIntent> = candidates
        .into_iter()
        .filter_map(|coord| {
            let resolution = params.resolution.or_else(|| grid.resolution(coord))?;
            let rect = plan_tile(grid, coord, &brush_rect, resolution, lock_edges)?;
            Some(EditIntent::new(coord, rect, resolution))
        })
        .collect();

    debug!(
        "plan_edits: center=({:.2}, {:.2}), size={:.2}, lock_edges={} -> {} tiles",
        center.x,
        center.y,
        params.size,
        lock_edges,
        intents.len()
    );
    intents
}

/// Vertex range of one tile covered by `brush_rect` at `resolution`
///
/// Returns None if the tile does not exist, does not overlap the brush, or
/// the clamped range is empty.
pub fn plan_tile<G: TileGrid + ?Sized>(
    grid: &G,
    coord: TileCoord,
    brush_rect: &WorldRect,
    resolution: u32,
    lock_edges: bool,
) -> Option<VertexRect> {
    if resolution == 0 {
        return None;
    }
    let tile_rect = grid.world_rect_of(coord)?;
    let overlap = tile_rect.intersect(brush_rect)?;
    let grid_size = grid.tile_extent() / resolution as f32;

    let local_min = (overlap.min - tile_rect.min) / grid_size;
    let local_max = (overlap.max - tile_rect.min) / grid_size;

    let (lo, hi) = if lock_edges {
        (1, resolution as i64 - 1)
    } else {
        (0, resolution as i64)
    };
    let min_x = ((local_min.x - INDEX_EPSILON).ceil() as i64).max(lo);
    let min_y = ((local_min.y - INDEX_EPSILON).ceil() as i64).max(lo);
    let max_x = ((local_max.x + INDEX_EPSILON).floor() as i64).min(hi);
    let max_y = ((local_max.y + INDEX_EPSILON).floor() as i64).min(hi);

    if min_x > max_x || min_y > max_y {
        return None;
    }
    Some(VertexRect::new(min_x as u32, min_y as u32, max_x as u32, max_y as u32))
}

/// World position of vertex (col, row) of a tile at `resolution`
pub fn vertex_world_position<G: TileGrid + ?Sized>(
    grid: &G,
    coord: TileCoord,
    resolution: u32,
    col: u32,
    row: u32,
) -> Option<Vec2> {
    let tile_rect = grid.world_rect_of(coord)?;
    let grid_size = grid.tile_extent() / resolution as f32;
    Some(tile_rect.min + Vec2::new(col as f32, row as f32) * grid_size)
}
