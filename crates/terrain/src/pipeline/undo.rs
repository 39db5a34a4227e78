//! Undo functionality for the editing pipeline

use tracing::debug;

use crate::brush::BrushSampler;
use crate::tiles::TileGrid;

use super::TerrainEditor;

impl<G: TileGrid, B: BrushSampler> TerrainEditor<G, B> {
    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo the last step
    ///
    /// Ends any active stroke. Returns true if an undo was performed.
    pub fn undo(&mut self) -> bool {
        if self.stroke_active {
            debug!("Undo during a stroke: ending stroke");
            self.end_stroke();
        }
        self.history.undo(&mut self.grid)
    }

    /// Redo the last undone step
    pub fn redo(&mut self) -> bool {
        if self.stroke_active {
            self.end_stroke();
        }
        self.history.redo(&mut self.grid)
    }
}
