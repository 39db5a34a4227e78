//! Brush strokes for the editing pipeline

use std::borrow::Cow;

use glam::Vec2;
use tracing::{debug, warn};

use crate::brush::{BrushParams, BrushSampler};
use crate::commands::SetVertexHeightsCommand;
use crate::height_update::compute_edits;
use crate::planner::plan_edits;
use crate::tiles::TileGrid;
use crate::types::{EditIntent, EditMode};

use super::TerrainEditor;

/// Display name of the undo step a mode produces
fn command_name(mode: EditMode) -> &'static str {
    match mode {
        EditMode::ChangeHeight => "Change Height",
        EditMode::SetHeight => "Set Height",
        EditMode::ResetHeight => "Reset Height",
        EditMode::SuppressVertex => "Suppress Vertices",
        EditMode::Smooth => "Smooth",
    }
}

impl<G: TileGrid, B: BrushSampler> TerrainEditor<G, B> {
    /// Begin a stroke (mouse down)
    ///
    /// Every paint step until `end_stroke` joins one undo group.
    pub fn begin_stroke(&mut self) {
        let group = self.history.begin_group();
        self.stroke_active = true;
        debug!("begin_stroke: group {:?}", group);
    }

    /// End the current stroke (mouse up)
    pub fn end_stroke(&mut self) {
        if !self.stroke_active {
            debug!("end_stroke: no active stroke, ignoring");
            return;
        }
        self.stroke_active = false;
        self.seams.clear();
    }

    /// Whether a stroke is in progress
    pub fn is_stroke_active(&self) -> bool {
        self.stroke_active
    }

    /// Apply one brush step centered at `world_pos`
    ///
    /// Outside a stroke the step is its own undo group. Returns the number of
    /// tiles edited (seam fixes on neighbors not included).
    pub fn paint_stroke(&mut self, world_pos: Vec2, mode: EditMode, params: &BrushParams) -> usize {
        let group = self.history.begin_or_join_group(self.stroke_active);

        // Smooth averages tiles at their own resolution only
        let plan_params = if mode == EditMode::Smooth && params.resolution.is_some() {
            Cow::Owned(BrushParams {
                resolution: None,
                ..params.clone()
            })
        } else {
            Cow::Borrowed(params)
        };
        let intents = plan_edits(&self.grid, world_pos, &plan_params);
        let edits = compute_edits(&self.grid, &self.brush, world_pos, mode, params, intents);

        let keep_edges = params.edges_locked();
        let mut applied = 0;
        for edit in edits {
            let EditIntent {
                coord,
                rect,
                resolution,
                write,
            } = edit;
            let command = match SetVertexHeightsCommand::new(
                command_name(mode),
                group,
                &self.grid,
                coord,
                rect,
                resolution,
                write,
                keep_edges,
                true,
            ) {
                Ok(command) => command,
                Err(e) => {
                    warn!("paint_stroke: skipping tile ({}, {}): {}", coord.x, coord.y, e);
                    continue;
                }
            };
            match self.history.perform_command(&mut self.grid, Box::new(command), true) {
                Ok(()) => {
                    self.seams.record(coord, &rect, resolution);
                    applied += 1;
                }
                Err(e) => warn!("paint_stroke: skipping tile ({}, {}): {}", coord.x, coord.y, e),
            }
        }

        let fixes = self.seams.reconcile(&mut self.grid, &mut self.history);
        debug!(
            "paint_stroke: ({:.2}, {:.2}) {:?} -> {} tiles, {} seam fixes",
            world_pos.x, world_pos.y, mode, applied, fixes
        );
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushMask;
    use crate::tiles::HeightfieldGrid;
    use crate::types::TileCoord;
    use terrain_config::{GridConfig, TerrainConfig};

    fn editor() -> TerrainEditor<HeightfieldGrid, BrushMask> {
        let config = TerrainConfig {
            grid: GridConfig {
                default_resolution: 4,
                ..GridConfig::new(2, 2, 8.0, 8.0)
            },
            ..Default::default()
        };
        let grid = HeightfieldGrid::new(config.grid.clone()).unwrap();
        TerrainEditor::new(grid, BrushMask::solid(), config)
    }

    fn params() -> BrushParams {
        BrushParams {
            size: 2.0,
            intensity: 0.1,
            linear: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_stroke_is_one_undo_step() {
        let mut editor = editor();
        let coord = TileCoord::new(0, 0);

        editor.begin_stroke();
        for x in [3.0, 4.0, 5.0] {
            editor.paint_stroke(Vec2::new(x, 4.0), EditMode::ChangeHeight, &params());
        }
        editor.end_stroke();
        assert_eq!(editor.history().undo_count(), 1);
        assert!(editor.grid().height_at(coord, 2, 2) > 0.0);

        assert!(editor.undo());
        assert!(editor.grid().heights(coord).is_none());
    }

    #[test]
    fn test_stroke_resizing_a_neighbor_is_one_undo_step() {
        let mut editor = editor();
        let left = TileCoord::new(0, 0);
        let right = TileCoord::new(1, 0);
        editor.grid_mut().set_tile_resolution(right, 2).unwrap();
        let p = BrushParams {
            size: 1.9999,
            ..params()
        };

        editor.begin_stroke();
        // Touches the right edge of the left tile, which forces a resize of its neighbor
        editor.paint_stroke(Vec2::new(7.0, 4.0), EditMode::ChangeHeight, &p);
        assert_eq!(editor.grid().resolution(right), Some(4));
        editor.paint_stroke(Vec2::new(3.0, 4.0), EditMode::ChangeHeight, &p);
        editor.paint_stroke(Vec2::new(4.0, 4.0), EditMode::ChangeHeight, &p);
        editor.end_stroke();
        assert_eq!(editor.history().undo_count(), 1);
        assert!(editor.grid().height_at(left, 4, 2) > 0.0);

        assert!(editor.undo());
        assert!(editor.grid().heights(left).is_none());
        assert_eq!(editor.grid().resolution(right), Some(2));
        assert!(editor.grid().heights(right).is_none());
    }

    #[test]
    fn test_steps_outside_a_stroke_are_separate() {
        let mut editor = editor();
        editor.paint_stroke(Vec2::new(3.0, 4.0), EditMode::ChangeHeight, &params());
        editor.paint_stroke(Vec2::new(4.0, 4.0), EditMode::ChangeHeight, &params());
        assert_eq!(editor.history().undo_count(), 2);
        assert!(!editor.is_stroke_active());
    }

    #[test]
    fn test_undo_round_trip_is_exact() {
        let mut editor = editor();
        let coord = TileCoord::new(0, 0);
        editor.paint_stroke(Vec2::new(4.0, 4.0), EditMode::ChangeHeight, &params());
        let before: Vec<u32> = editor.grid().heights(coord).unwrap().iter().map(|h| h.to_bits()).collect();

        let p = BrushParams {
            size: 3.0,
            intensity: 0.37,
            lower: true,
            ..params()
        };
        editor.paint_stroke(Vec2::new(4.5, 3.5), EditMode::ChangeHeight, &p);
        assert!(editor.undo());
        let after: Vec<u32> = editor.grid().heights(coord).unwrap().iter().map(|h| h.to_bits()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_paint_in_one_tile_keeps_edges() {
        let mut editor = editor();
        let p = BrushParams {
            size: 4.0,
            paint_in_one_tile: true,
            ..params()
        };
        assert_eq!(editor.paint_stroke(Vec2::new(7.0, 7.0), EditMode::ChangeHeight, &p), 1);
        let coord = TileCoord::new(0, 0);
        assert_eq!(editor.grid().height_at(coord, 4, 3), 0.0);
        assert_eq!(editor.grid().height_at(coord, 3, 4), 0.0);
        assert!(editor.grid().height_at(coord, 3, 3) > 0.0);
        assert!(editor.grid().heights(TileCoord::new(1, 1)).is_none());
    }

    #[test]
    fn test_set_height_converges() {
        let mut editor = editor();
        let coord = TileCoord::new(0, 0);
        let p = BrushParams {
            target_height: 1.5,
            intensity: 0.05,
            ..params()
        };
        let mut previous = 0.0;
        for _ in 0..10 {
            editor.paint_stroke(Vec2::new(4.0, 4.0), EditMode::SetHeight, &p);
            let h = editor.grid().height_at(coord, 2, 2);
            assert!(h >= previous && h <= 1.5);
            previous = h;
        }
        assert_eq!(previous, 1.5);
    }

    #[test]
    fn test_smooth_ignores_explicit_resolution() {
        let mut editor = editor();
        let coord = TileCoord::new(0, 0);
        editor.paint_stroke(Vec2::new(4.0, 4.0), EditMode::ChangeHeight, &params());
        let p = BrushParams {
            size: 4.0,
            resolution: Some(16),
            ..params()
        };
        editor.paint_stroke(Vec2::new(4.0, 4.0), EditMode::Smooth, &p);
        assert_eq!(editor.grid().resolution(coord), Some(4));
    }
}
