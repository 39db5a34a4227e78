//! Undo group coordinator
//!
//! Groups are the user-visible undo steps. A command joins the group whose
//! id it was created with; the caller decides whether a new step starts via
//! [`UndoHistory::begin_group`] or [`UndoHistory::begin_or_join_group`].

use std::collections::VecDeque;

use terrain_config::UndoConfig;
use tracing::{debug, info, warn};

use super::{Command, CommandError, GroupId};
use crate::tiles::TileGrid;

/// One user-visible undo step
pub struct UndoGroup {
    id: GroupId,
    commands: Vec<Box<dyn Command>>,
}

impl UndoGroup {
    fn new(id: GroupId) -> Self {
        Self {
            id,
            commands: Vec::new(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Display names of the commands, in execution order
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// Whether later commands may still be merged into this step
    pub fn is_joinable(&self) -> bool {
        self.commands.iter().all(|c| c.can_join())
    }

    /// Undo every command in reverse order, returning how many failed
    fn undo_all(&mut self, grid: &mut dyn TileGrid) -> usize {
        let mut failed = 0;
        for command in self.commands.iter_mut().rev() {
            if let Err(e) = command.undo(grid) {
                warn!("Undo of '{}' skipped: {}", command.name(), e);
                failed += 1;
            }
        }
        failed
    }

    /// Redo every command in order, returning how many failed
    fn redo_all(&mut self, grid: &mut dyn TileGrid) -> usize {
        let mut failed = 0;
        for command in self.commands.iter_mut() {
            if let Err(e) = command.redo(grid) {
                warn!("Redo of '{}' skipped: {}", command.name(), e);
                failed += 1;
            }
        }
        failed
    }
}

/// Bounded undo/redo history of command groups
pub struct UndoHistory {
    undo_stack: VecDeque<UndoGroup>,
    redo_stack: Vec<UndoGroup>,
    current: GroupId,
    next_id: u64,
    max_groups: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(&UndoConfig::default())
    }
}

impl UndoHistory {
    pub fn new(config: &UndoConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            current: GroupId(0),
            next_id: 1,
            max_groups: config.max_groups.max(1),
        }
    }

    /// Group new commands are expected to be created with
    pub fn current_group_id(&self) -> GroupId {
        self.current
    }

    /// Start a new undo step
    pub fn begin_group(&mut self) -> GroupId {
        self.current = GroupId(self.next_id);
        self.next_id += 1;
        debug!("begin_group: {:?}", self.current);
        self.current
    }

    /// Keep adding to the current step if `join` is set and it allows it
    ///
    /// The current step refuses joins once it holds a non-joinable command.
    pub fn begin_or_join_group(&mut self, join: bool) -> GroupId {
        if join {
            let joinable = match self.undo_stack.back() {
                Some(group) if group.id == self.current => group.is_joinable(),
                _ => true,
            };
            if joinable {
                return self.current;
            }
        }
        self.begin_group()
    }

    /// Record a command, running it first if `execute_immediately` is set
    ///
    /// A command whose first execution fails is not recorded. Recording a
    /// command discards everything that could be redone.
    pub fn perform_command(
        &mut self,
        grid: &mut dyn TileGrid,
        mut command: Box<dyn Command>,
        execute_immediately: bool,
    ) -> Result<(), CommandError> {
        if execute_immediately {
            command.redo(grid)?;
        }
        self.redo_stack.clear();

        let id = command.group();
        match self.undo_stack.back_mut() {
            Some(group) if group.id == id => group.commands.push(command),
            _ => {
                let mut group = UndoGroup::new(id);
                group.commands.push(command);
                self.undo_stack.push_back(group);
                while self.undo_stack.len() > self.max_groups {
                    self.undo_stack.pop_front();
                }
            }
        }
        Ok(())
    }

    /// Revert the most recent step
    ///
    /// Commands that fail (for example because their tile was removed) are
    /// logged and skipped. Returns false if there was nothing to undo.
    pub fn undo(&mut self, grid: &mut dyn TileGrid) -> bool {
        let Some(mut group) = self.undo_stack.pop_back() else {
            debug!("Undo: no groups available");
            return false;
        };
        let failed = group.undo_all(grid);
        info!(
            "Undid group {:?} ({} commands, {} skipped)",
            group.id,
            group.len(),
            failed
        );
        self.redo_stack.push(group);
        self.begin_group();
        true
    }

    /// Re-apply the most recently undone step
    pub fn redo(&mut self, grid: &mut dyn TileGrid) -> bool {
        let Some(mut group) = self.redo_stack.pop() else {
            debug!("Redo: no groups available");
            return false;
        };
        let failed = group.redo_all(grid);
        info!(
            "Redid group {:?} ({} commands, {} skipped)",
            group.id,
            group.len(),
            failed
        );
        self.undo_stack.push_back(group);
        self.begin_group();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recent step, if any
    pub fn last_group(&self) -> Option<&UndoGroup> {
        self.undo_stack.back()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
