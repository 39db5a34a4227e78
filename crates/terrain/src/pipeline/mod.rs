//! Terrain editing pipeline
//!
//! This module connects the pieces of one interactive edit:
//! - Planning (brush footprint to per-tile vertex ranges)
//! - Height computation for the active edit mode
//! - Command application through the undo history
//! - Seam reconciliation around the edited tiles
//!
//! The steps always run in that order and every mutation of the grid goes
//! through a command.

mod stroke;
mod tile_ops;
mod undo;

use terrain_config::TerrainConfig;

use crate::brush::{BrushMask, BrushParams, BrushSampler};
use crate::commands::UndoHistory;
use crate::seams::SeamReconciler;
use crate::tiles::{HeightfieldGrid, TileGrid};
use crate::validation::ValidationError;

/// Interactive terrain editor over a tile grid
///
/// Input comes in via `begin_stroke`, `paint_stroke`, `end_stroke` for brush
/// work, and via the tile operations for discrete edits. Every operation
/// leaves the grid crack-free and undoable.
pub struct TerrainEditor<G: TileGrid, B: BrushSampler> {
    /// Tile owner
    pub(crate) grid: G,
    /// Brush alpha source
    pub(crate) brush: B,
    /// Configuration the editor was created with
    pub(crate) config: TerrainConfig,
    /// Undo groups of every applied command
    pub(crate) history: UndoHistory,
    /// Tiles edited in the batch being applied
    pub(crate) seams: SeamReconciler,
    /// Whether paint steps currently join one undo group
    pub(crate) stroke_active: bool,
}

impl<G: TileGrid, B: BrushSampler> TerrainEditor<G, B> {
    pub fn new(grid: G, brush: B, config: TerrainConfig) -> Self {
        Self {
            grid,
            brush,
            history: UndoHistory::new(&config.undo),
            config,
            seams: SeamReconciler::new(),
            stroke_active: false,
        }
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Mutable grid access for out-of-band changes (not recorded for undo)
    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    pub fn brush(&self) -> &B {
        &self.brush
    }

    pub fn set_brush(&mut self, brush: B) {
        self.brush = brush;
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    /// Brush parameters from the configured defaults
    pub fn default_brush_params(&self) -> BrushParams {
        BrushParams::from_config(&self.config.brush)
    }
}

impl TerrainEditor<HeightfieldGrid, BrushMask> {
    /// Editor over an in-memory grid with the default round brush
    pub fn with_heightfield(config: TerrainConfig) -> Result<Self, ValidationError> {
        let grid = HeightfieldGrid::new(config.grid.clone())?;
        Ok(Self::new(grid, BrushMask::default(), config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EditMode, HeightWrite, TileCoord, VertexRect};
    use glam::Vec2;
    use terrain_config::GridConfig;

    /// 2x1 grid of 8x8 tiles with a solid (all-ones) brush
    fn editor(resolution: u32) -> TerrainEditor<HeightfieldGrid, BrushMask> {
        let config = TerrainConfig {
            grid: GridConfig {
                default_resolution: resolution,
                ..GridConfig::new(2, 1, 8.0, 8.0)
            },
            ..Default::default()
        };
        let grid = HeightfieldGrid::new(config.grid.clone()).unwrap();
        TerrainEditor::new(grid, BrushMask::solid(), config)
    }

    fn params(size: f32, intensity: f32) -> BrushParams {
        BrushParams {
            size,
            intensity,
            linear: false,
            ..Default::default()
        }
    }

    fn column(editor: &TerrainEditor<HeightfieldGrid, BrushMask>, coord: TileCoord, col: u32) -> Vec<f32> {
        let r = editor.grid().resolution(coord).unwrap();
        (0..=r).map(|row| editor.grid().height_at(coord, col, row)).collect()
    }

    #[test]
    fn test_with_heightfield() {
        let editor = TerrainEditor::with_heightfield(TerrainConfig::default()).unwrap();
        assert_eq!(editor.grid().tile_count(), 16);
        assert!(!editor.history().can_undo());
        assert_eq!(editor.default_brush_params().size, editor.config().brush.size);
    }

    #[test]
    fn test_straddling_dab_matches_on_both_sides() {
        let mut editor = editor(4);
        // Footprint x in [6, 10]: both tiles are in the batch
        editor.paint_stroke(Vec2::new(8.0, 4.0), EditMode::ChangeHeight, &params(4.0, 0.5));
        let left = column(&editor, TileCoord::new(0, 0), 4);
        assert_eq!(left, vec![0.0, 5.0, 5.0, 5.0, 0.0]);
        assert_eq!(column(&editor, TileCoord::new(1, 0), 0), left);
    }

    #[test]
    fn test_raised_edge_is_copied_to_neighbor() {
        let mut editor = editor(4);
        let left = TileCoord::new(0, 0);
        let right = TileCoord::new(1, 0);

        // Footprint x in [6, 8) touches the right column of tile (0, 0) only
        let touched = editor.paint_stroke(Vec2::new(7.0, 4.0), EditMode::ChangeHeight, &params(1.9999, 0.5));
        assert_eq!(touched, 1);
        assert_eq!(editor.grid().height_at(left, 4, 2), 5.0);
        assert_eq!(column(&editor, right, 0), column(&editor, left, 4));
        assert_eq!(editor.grid().resolution(left), Some(4));
        assert_eq!(editor.grid().resolution(right), Some(4));

        // The copy is undone with the paint step
        assert!(editor.undo());
        assert!(editor.grid().heights(left).is_none());
        assert!(editor.grid().heights(right).is_none());
        assert!(editor.redo());
        assert_eq!(editor.grid().height_at(right, 0, 2), 5.0);
    }

    #[test]
    fn test_mismatched_neighbor_is_flattened() {
        let mut editor = editor(4);
        let left = TileCoord::new(0, 0);
        let right = TileCoord::new(1, 0);
        editor.grid_mut().set_tile_resolution(left, 8).unwrap();
        editor
            .grid_mut()
            .set_vertex_heights(right, VertexRect::full(4), 4, &HeightWrite::Fill(2.0), false, false)
            .unwrap();

        // Interior dab on the resolution-8 tile
        editor.paint_stroke(Vec2::new(3.0, 4.0), EditMode::ChangeHeight, &params(2.0, 0.1));
        assert_eq!(column(&editor, right, 0), vec![0.0; 5]);
        assert_eq!(column(&editor, right, 1), vec![2.0; 5]);
        assert_eq!(editor.grid().resolution(right), Some(4));
        assert_eq!(editor.grid().resolution(left), Some(8));
        assert_eq!(editor.grid().height_at(left, 8, 4), 0.0);
        assert_eq!(editor.grid().height_at(left, 3, 4), 1.0);
    }

    #[test]
    fn test_reset_height_is_idempotent() {
        let mut editor = editor(4);
        let coord = TileCoord::new(0, 0);
        editor.paint_stroke(Vec2::new(4.0, 4.0), EditMode::ChangeHeight, &params(4.0, 1.0));
        assert!(editor.grid().heights(coord).is_some());

        editor.paint_stroke(Vec2::new(4.0, 4.0), EditMode::ResetHeight, &params(2.0, 1.0));
        let once = editor.grid().tile(coord).cloned();
        editor.paint_stroke(Vec2::new(4.0, 4.0), EditMode::ResetHeight, &params(2.0, 1.0));
        assert!(editor.grid().heights(coord).is_none());
        assert_eq!(editor.grid().tile(coord).cloned(), once);
    }

    #[test]
    fn test_buffer_length_matches_resolution() {
        let mut editor = editor(4);
        let p = BrushParams {
            resolution: Some(16),
            ..params(6.0, 0.3)
        };
        editor.paint_stroke(Vec2::new(8.0, 4.0), EditMode::ChangeHeight, &p);
        for coord in editor.grid().coords() {
            let tile = editor.grid().tile(coord).unwrap();
            if let Some(heights) = tile.heights() {
                let side = tile.resolution() as usize + 1;
                assert_eq!(heights.len(), side * side);
            }
        }
        assert_eq!(editor.grid().resolution(TileCoord::new(0, 0)), Some(16));
    }
}
