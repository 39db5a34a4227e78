//! Crack-free borders between neighboring tiles
//!
//! Edits are recorded per tile as the set of border zones they touched.
//! Reconciling a batch looks one ring outward from every edited tile and,
//! for each neighbor that was not itself part of the batch:
//!
//! - touched edge: the neighbor takes the edited tile's resolution and a copy
//!   of its border row/column
//! - touched corner: the single corner vertex is copied
//! - untouched border with a resolution mismatch: the neighbor's facing
//!   border is flattened to zero at its own resolution
//!
//! Every fix is issued as a command through the undo history so it is
//! reverted together with the edit that caused it.

mod zones;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::commands::{Command, SetResolutionCommand, SetVertexHeightsCommand, UndoHistory};
use crate::tiles::TileGrid;
use crate::types::{HeightWrite, TileCoord, VertexRect};

pub use zones::EdgeZones;

/// Border zones touched on one tile during the current batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileModification {
    pub zones: EdgeZones,
    /// Resolution of the last edit recorded for the tile
    pub resolution: u32,
}

/// Per-batch record of edited tiles and the seam fixes they need
#[derive(Debug, Default)]
pub struct SeamReconciler {
    modified: HashMap<TileCoord, TileModification>,
}

impl SeamReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit of `rect` (expressed at `resolution`) on a tile
    pub fn record(&mut self, coord: TileCoord, rect: &VertexRect, resolution: u32) {
        self.mark(coord, EdgeZones::classify(rect, resolution), resolution);
    }

    /// Record a tile as edited with explicit zones
    ///
    /// `EdgeZones::NONE` still takes part in reconciliation: neighbors at a
    /// different resolution get their facing border flattened.
    pub fn mark(&mut self, coord: TileCoord, zones: EdgeZones, resolution: u32) {
        let entry = self.modified.entry(coord).or_insert(TileModification {
            zones: EdgeZones::NONE,
            resolution,
        });
        entry.zones |= zones;
        entry.resolution = resolution;
    }

    pub fn modification(&self, coord: TileCoord) -> Option<&TileModification> {
        self.modified.get(&coord)
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modified.len()
    }

    /// Drop all records without reconciling
    pub fn clear(&mut self) {
        self.modified.clear();
    }

    /// Fix the borders around every recorded tile, then clear the records
    ///
    /// Commands join the history's current group. Returns the number of
    /// commands that were applied.
    pub fn reconcile(&mut self, grid: &mut dyn TileGrid, history: &mut UndoHistory) -> usize {
        let mut edited: Vec<TileCoord> = self.modified.keys().copied().collect();
        edited.sort();

        let mut applied = 0;
        for &coord in &edited {
            let Some(zones) = self.modified.get(&coord).map(|m| m.zones) else {
                continue;
            };
            let Some(resolution) = grid.resolution(coord) else {
                warn!("reconcile: edited tile ({}, {}) no longer exists", coord.x, coord.y);
                continue;
            };

            for (zone, dx, dy) in EdgeZones::NEIGHBORS {
                let neighbor = coord.offset(dx, dy);
                if self.modified.contains_key(&neighbor) {
                    continue;
                }
                let Some(neighbor_resolution) = grid.resolution(neighbor) else {
                    continue;
                };

                let commands = if zones.contains(zone) {
                    let source = (coord, resolution, zone);
                    copy_border(grid, history, source, neighbor, neighbor_resolution)
                } else if neighbor_resolution != resolution {
                    flatten_border(grid, history, zone.opposite(), neighbor, neighbor_resolution)
                } else {
                    Vec::new()
                };

                for command in commands {
                    let name = command.name().to_owned();
                    match history.perform_command(grid, command, true) {
                        Ok(()) => applied += 1,
                        Err(e) => warn!(
                            "reconcile: '{}' on ({}, {}) skipped: {}",
                            name, neighbor.x, neighbor.y, e
                        ),
                    }
                }
            }
        }

        debug!("reconcile: {} edited tiles -> {} seam commands", edited.len(), applied);
        self.modified.clear();
        applied
    }
}

/// Commands that make `neighbor` match the edited tile across `zone`
///
/// Edges force the neighbor to the edited tile's resolution first; corners
/// copy one vertex at whatever resolution the neighbor has. Copies that
/// would change nothing are not issued.
fn copy_border(
    grid: &dyn TileGrid,
    history: &UndoHistory,
    (coord, resolution, zone): (TileCoord, u32, EdgeZones),
    neighbor: TileCoord,
    neighbor_resolution: u32,
) -> Vec<Box<dyn Command>> {
    let group = history.current_group_id();
    let mut commands: Vec<Box<dyn Command>> = Vec::new();

    let Some(source) = zone.border_rect(resolution) else {
        return commands;
    };
    let values = grid
        .read_rect(coord, &source)
        .unwrap_or_else(|| vec![0.0; source.vertex_count()]);

    let target_resolution = if zone.is_corner() {
        neighbor_resolution
    } else {
        resolution
    };
    let Some(target) = zone.opposite().border_rect(target_resolution) else {
        return commands;
    };

    if target_resolution != neighbor_resolution {
        debug!(
            "copy_border: ({}, {}) resolution {} -> {}",
            neighbor.x, neighbor.y, neighbor_resolution, target_resolution
        );
        let name = "Match seam resolution";
        match SetResolutionCommand::new(name, group, grid, neighbor, target_resolution, true) {
            Ok(command) => commands.push(Box::new(command.joinable())),
            Err(e) => {
                warn!("copy_border: {}", e);
                return commands;
            }
        }
    } else {
        let current = grid
            .read_rect(neighbor, &target)
            .unwrap_or_else(|| vec![0.0; target.vertex_count()]);
        if current == values {
            return commands;
        }
    }

    match SetVertexHeightsCommand::new(
        "Copy seam heights",
        group,
        grid,
        neighbor,
        target,
        target_resolution,
        HeightWrite::Values(values),
        false,
        true,
    ) {
        Ok(command) => commands.push(Box::new(command)),
        Err(e) => warn!("copy_border: {}", e),
    }
    commands
}

/// Zero the border of `neighbor` facing an edited tile, unless it already is
fn flatten_border(
    grid: &dyn TileGrid,
    history: &UndoHistory,
    facing: EdgeZones,
    neighbor: TileCoord,
    neighbor_resolution: u32,
) -> Vec<Box<dyn Command>> {
    let Some(rect) = facing.border_rect(neighbor_resolution) else {
        return Vec::new();
    };
    let Some(current) = grid.read_rect(neighbor, &rect) else {
        return Vec::new();
    };
    if current.iter().all(|&h| h == 0.0) {
        return Vec::new();
    }

    debug!(
        "flatten_border: ({}, {}) {:?} at resolution {}",
        neighbor.x, neighbor.y, facing, neighbor_resolution
    );
    match SetVertexHeightsCommand::new(
        "Flatten seam",
        history.current_group_id(),
        grid,
        neighbor,
        rect,
        neighbor_resolution,
        HeightWrite::Fill(0.0),
        false,
        true,
    ) {
        Ok(command) => vec![Box::new(command) as Box<dyn Command>],
        Err(e) => {
            warn!("flatten_border: {}", e);
            Vec::new()
        }
    }
}
