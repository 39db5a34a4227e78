//! New height values for planned edits
//!
//! Each edit mode is resolved once per step into a [`VertexRule`] (a pure
//! `(old, sample) -> new` function) or into one of the two tile-level
//! operations, reset and smooth, which do not work vertex by vertex.

use std::borrow::Cow;

use glam::Vec2;
use tracing::debug;

use crate::brush::{BrushParams, BrushSampler};
use crate::constants::{HEIGHT_CHANGE_SCALE, SMOOTH_BLEND_FACTOR};
use crate::planner::vertex_world_position;
use crate::tiles::{TileGrid, resample_heights};
use crate::types::{EditIntent, EditMode, HeightWrite, TileCoord, VertexRect, WorldRect};
use crate::validation::vertex_index;

/// Per-vertex update rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexRule {
    /// Add `sample * scale`
    Change { scale: f32 },
    /// Move toward `target` by `sample * scale` without crossing it
    Converge { target: f32, scale: f32 },
    /// Zero out heights with magnitude below `threshold`
    Suppress { threshold: f32 },
}

impl VertexRule {
    /// Rule for a per-vertex mode; None for reset and smooth
    pub fn for_mode(mode: EditMode, params: &BrushParams) -> Option<Self> {
        let magnitude = HEIGHT_CHANGE_SCALE * params.intensity;
        match mode {
            EditMode::ChangeHeight => Some(VertexRule::Change {
                scale: if params.lower { -magnitude } else { magnitude },
            }),
            EditMode::SetHeight => Some(VertexRule::Converge {
                target: params.target_height,
                scale: magnitude,
            }),
            EditMode::SuppressVertex => Some(VertexRule::Suppress {
                threshold: params.suppress_threshold,
            }),
            EditMode::ResetHeight | EditMode::Smooth => None,
        }
    }

    /// New height from the old one (None for a flat/unset tile) and the brush sample
    pub fn apply(&self, old: Option<f32>, sample: f32) -> f32 {
        match *self {
            VertexRule::Change { scale } => {
                let delta = sample * scale;
                old.map_or(delta, |h| h + delta)
            }
            VertexRule::Converge { target, scale } => {
                let delta = sample * scale;
                match old {
                    None => target.min(delta),
                    Some(h) if h > target => (h - delta).max(target),
                    Some(h) if h < target => (h + delta).min(target),
                    Some(h) => h,
                }
            }
            VertexRule::Suppress { threshold } => {
                let h = old.unwrap_or(0.0);
                if h.abs() < threshold { 0.0 } else { h }
            }
        }
    }

    /// Whether tiles without a height buffer are left alone
    fn skips_flat_tiles(&self) -> bool {
        matches!(self, VertexRule::Suppress { .. })
    }
}

/// Fill planned intents with new heights for `mode`
///
/// Intents that end up with nothing to write (suppress on a flat tile,
/// smooth outside the cursor tile's resolution) are dropped.
pub fn compute_edits<G, B>(
    grid: &G,
    brush: &B,
    center: Vec2,
    mode: EditMode,
    params: &BrushParams,
    intents: Vec<EditIntent>,
) -> Vec<EditIntent>
where
    G: TileGrid + ?Sized,
    B: BrushSampler + ?Sized,
{
    let brush_rect = WorldRect::centered(center, params.size);
    let edits: Vec<EditIntent> = match mode {
        EditMode::ResetHeight => intents
            .into_iter()
            .map(|intent| EditIntent {
                rect: VertexRect::full(intent.resolution),
                write: HeightWrite::Clear,
                ..intent
            })
            .collect(),
        EditMode::Smooth => smooth_edits(grid, brush, center, params, intents),
        _ => match VertexRule::for_mode(mode, params) {
            Some(rule) => intents
                .into_iter()
                .filter_map(|intent| apply_rule(grid, brush, &brush_rect, params, rule, intent))
                .collect(),
            None => Vec::new(),
        },
    };

    debug!("compute_edits: mode={:?} -> {} tile edits", mode, edits.len());
    edits
}

/// Heights of a tile as seen at `resolution`, resampled if the tile differs
pub(crate) fn heights_at_resolution<'g, G: TileGrid + ?Sized>(
    grid: &'g G,
    coord: TileCoord,
    resolution: u32,
) -> Option<Cow<'g, [f32]>> {
    let current = grid.resolution(coord)?;
    let heights = grid.heights(coord)?;
    if current == resolution {
        Some(Cow::Borrowed(heights))
    } else {
        Some(Cow::Owned(resample_heights(heights, current, resolution)))
    }
}

/// Brush sample for a vertex: its world position normalized over the brush square
fn sample_vertex<G, B>(
    grid: &G,
    brush: &B,
    brush_rect: &WorldRect,
    params: &BrushParams,
    mip: u32,
    intent: &EditIntent,
    col: u32,
    row: u32,
) -> f32
where
    G: TileGrid + ?Sized,
    B: BrushSampler + ?Sized,
{
    let Some(position) = vertex_world_position(grid, intent.coord, intent.resolution, col, row) else {
        return 0.0;
    };
    let size = brush_rect.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return 0.0;
    }
    let uv = ((position - brush_rect.min) / size).clamp(Vec2::ZERO, Vec2::ONE);
    brush.sample(params.linear, uv.x, uv.y, mip)
}

/// Mip level for the number of vertices the brush spans at `resolution`
fn mip_for<G, B>(grid: &G, brush: &B, params: &BrushParams, resolution: u32) -> u32
where
    G: TileGrid + ?Sized,
    B: BrushSampler + ?Sized,
{
    let grid_size = grid.tile_extent().x / resolution as f32;
    let footprint = if grid_size > 0.0 {
        (params.size / grid_size).ceil().max(1.0) as u32
    } else {
        1
    };
    brush.mip_level_for(params.linear, footprint)
}

fn apply_rule<G, B>(
    grid: &G,
    brush: &B,
    brush_rect: &WorldRect,
    params: &BrushParams,
    rule: VertexRule,
    intent: EditIntent,
) -> Option<EditIntent>
where
    G: TileGrid + ?Sized,
    B: BrushSampler + ?Sized,
{
    let existing = heights_at_resolution(grid, intent.coord, intent.resolution);
    if existing.is_none() && rule.skips_flat_tiles() {
        return None;
    }
    let mip = mip_for(grid, brush, params, intent.resolution);

    let values = intent
        .rect
        .iter()
        .map(|(col, row)| {
            let old = existing
                .as_deref()
                .map(|heights| heights[vertex_index(intent.resolution, col, row)]);
            let sample = sample_vertex(grid, brush, brush_rect, params, mip, &intent, col, row);
            rule.apply(old, sample)
        })
        .collect();

    Some(EditIntent {
        write: HeightWrite::Values(values),
        ..intent
    })
}

/// Two-pass smooth: average every covered vertex, then blend toward it
///
/// Only tiles at the cursor tile's resolution take part; mixing resolutions
/// would need resampling.
fn smooth_edits<G, B>(
    grid: &G,
    brush: &B,
    center: Vec2,
    params: &BrushParams,
    intents: Vec<EditIntent>,
) -> Vec<EditIntent>
where
    G: TileGrid + ?Sized,
    B: BrushSampler + ?Sized,
{
    let Some(reference) = grid.resolution(grid.tile_at(center)) else {
        debug!("smooth_edits: cursor is off the grid");
        return Vec::new();
    };
    let brush_rect = WorldRect::centered(center, params.size);
    let radius = params.size * 0.5;

    let intents: Vec<EditIntent> = intents
        .into_iter()
        .filter(|intent| intent.resolution == reference && grid.resolution(intent.coord) == Some(reference))
        .collect();

    let covered = |intent: &EditIntent, col: u32, row: u32| {
        vertex_world_position(grid, intent.coord, intent.resolution, col, row)
            .is_some_and(|p| p.distance(center) <= radius)
    };

    // Pass 1: single average over every covered vertex
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for intent in &intents {
        for (col, row) in intent.rect.iter() {
            if covered(intent, col, row) {
                sum += grid.height_at(intent.coord, col, row) as f64;
                count += 1;
            }
        }
    }
    if count == 0 {
        return Vec::new();
    }
    let average = (sum / count as f64) as f32;
    let mip = mip_for(grid, brush, params, reference);

    // Pass 2: blend covered vertices toward the average
    intents
        .into_iter()
        .map(|intent| {
            let values = intent
                .rect
                .iter()
                .map(|(col, row)| {
                    let old = grid.height_at(intent.coord, col, row);
                    if !covered(&intent, col, row) {
                        return old;
                    }
                    let sample = sample_vertex(grid, brush, &brush_rect, params, mip, &intent, col, row);
                    old + (average - old) * sample * params.intensity * SMOOTH_BLEND_FACTOR
                })
                .collect();
            EditIntent {
                write: HeightWrite::Values(values),
                ..intent
            }
        })
        .collect()
}

/// Four zero-fill writes covering the border rows and columns of a tile
pub fn reset_edge_edits<G: TileGrid + ?Sized>(grid: &G, coord: TileCoord) -> Vec<EditIntent> {
    let Some(r) = grid.resolution(coord) else {
        return Vec::new();
    };
    [
        VertexRect::new(0, 0, r, 0),
        VertexRect::new(0, r, r, r),
        VertexRect::new(0, 0, 0, r),
        VertexRect::new(r, 0, r, r),
    ]
    .into_iter()
    .map(|rect| EditIntent {
        coord,
        rect,
        resolution: r,
        write: HeightWrite::Fill(0.0),
    })
    .collect()
}

/// Whole-tile suppression edit, or None if the tile is flat/unset
pub fn suppress_tile_edit<G: TileGrid + ?Sized>(grid: &G, coord: TileCoord, threshold: f32) -> Option<EditIntent> {
    let resolution = grid.resolution(coord)?;
    let heights = grid.heights(coord)?;
    let rule = VertexRule::Suppress { threshold };
    let values = heights.iter().map(|&h| rule.apply(Some(h), 1.0)).collect();
    Some(EditIntent {
        coord,
        rect: VertexRect::full(resolution),
        resolution,
        write: HeightWrite::Values(values),
    })
}
