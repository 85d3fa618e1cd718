//! Undo/redo over atomic blocks of [`Command`]s.
//!
//! A block groups every command belonging to one logical edit (a single
//! keystroke, or a whole paste) so it undoes in one step. The
//! `open_block`/`record`/`close_block` discipline mirrors a
//! `newBlock`/`record`/`closeBlock` calling convention; a caller that
//! violates it (nesting blocks, recording with none open) is buggy, not
//! the end user, so that's a `debug_assert!` rather than a recoverable
//! error.

use crate::command::Command;
use crate::cursor::Cursor;
use crate::error::CoreError;

const UNDO_LIMIT: usize = 64;

#[derive(Debug, Clone)]
pub struct HistoryUnit {
    pub commands: Vec<Command>,
    pub cursor_before: Cursor,
    pub cursor_after: Cursor,
}

#[derive(Debug)]
pub struct History {
    undos: Vec<HistoryUnit>,
    redos: Vec<HistoryUnit>,
    open: Option<HistoryUnit>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            undos: Vec::new(),
            redos: Vec::new(),
            open: None,
            limit: UNDO_LIMIT,
        }
    }

    pub fn is_block_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_block(&mut self, cursor_before: Cursor) {
        debug_assert!(
            self.open.is_none(),
            "history block opened while another is already open"
        );
        self.open = Some(HistoryUnit {
            commands: Vec::new(),
            cursor_before,
            cursor_after: cursor_before,
        });
    }

    pub fn record(&mut self, cmd: Command) {
        debug_assert!(self.open.is_some(), "record called with no open history block");
        if let Some(unit) = self.open.as_mut() {
            unit.commands.push(cmd);
        }
    }

    /// Closes the open block, pushing it onto the undo stack and clearing
    /// the redo stack. A block with no recorded commands is dropped
    /// silently rather than pushed (nothing happened, so there's nothing
    /// to undo).
    pub fn close_block(&mut self, cursor_after: Cursor) -> Result<(), CoreError> {
        let mut unit = self
            .open
            .take()
            .ok_or(CoreError::HistoryDiscipline("close_block called with no open block"))?;
        if unit.commands.is_empty() {
            return Ok(());
        }
        unit.cursor_after = cursor_after;
        self.redos.clear();
        self.undos.push(unit);
        if self.undos.len() > self.limit {
            self.undos.remove(0);
        }
        Ok(())
    }

    pub fn undo(&mut self) -> Option<HistoryUnit> {
        let unit = self.undos.pop()?;
        self.redos.push(unit.clone());
        Some(unit)
    }

    pub fn redo(&mut self) -> Option<HistoryUnit> {
        let unit = self.redos.pop()?;
        self.undos.push(unit.clone());
        Some(unit)
    }

    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Cursor;

    fn pos(row: usize, column: usize) -> Cursor {
        Cursor::new(row, column)
    }

    #[test]
    fn empty_block_is_dropped() {
        let mut h = History::new();
        h.open_block(pos(0, 0));
        h.close_block(pos(0, 0)).unwrap();
        assert!(!h.can_undo());
    }

    #[test]
    fn close_without_open_is_an_error() {
        let mut h = History::new();
        assert!(h.close_block(pos(0, 0)).is_err());
    }

    #[test]
    fn undo_then_redo_restores_stacks() {
        let mut h = History::new();
        h.open_block(pos(0, 0));
        h.record(Command::insert_char(0, 0, b'a'));
        h.close_block(pos(0, 1)).unwrap();
        assert!(h.can_undo());
        assert!(!h.can_redo());

        let unit = h.undo().unwrap();
        assert_eq!(unit.commands.len(), 1);
        assert!(!h.can_undo());
        assert!(h.can_redo());

        h.redo().unwrap();
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn new_edit_after_undo_clears_redo_stack() {
        let mut h = History::new();
        h.open_block(pos(0, 0));
        h.record(Command::insert_char(0, 0, b'a'));
        h.close_block(pos(0, 1)).unwrap();
        h.undo().unwrap();
        assert!(h.can_redo());

        h.open_block(pos(0, 0));
        h.record(Command::insert_char(0, 0, b'b'));
        h.close_block(pos(0, 1)).unwrap();
        assert!(!h.can_redo());
    }

    #[test]
    fn undo_stack_is_capped() {
        let mut h = History::new();
        for i in 0..(UNDO_LIMIT + 10) {
            h.open_block(pos(0, 0));
            h.record(Command::insert_char(0, 0, b'a' + (i % 26) as u8));
            h.close_block(pos(0, 1)).unwrap();
        }
        assert_eq!(h.undos.len(), UNDO_LIMIT);
    }

    #[test]
    #[should_panic]
    fn recording_without_an_open_block_panics_in_debug() {
        let mut h = History::new();
        h.record(Command::insert_char(0, 0, b'a'));
    }

    /// Scenario 1 from the spec's end-to-end tests: type "hello" (one
    /// block), Enter (one block), type "world" (one block), then undo
    /// twice and redo twice, checking buffer content and cursor at each
    /// step.
    #[test]
    fn type_enter_type_undo_redo_sequence() {
        use crate::line_tree::LineTree;
        use crate::text_manipulator::TextManipulator;

        let mut tree = LineTree::from_lines(vec![Vec::new()], 512);
        let mut h = History::new();

        h.open_block(pos(0, 0));
        for (col, byte) in b"hello".iter().enumerate() {
            let cmd = TextManipulator::execute(&mut tree, Command::insert_char(0, col, *byte)).unwrap();
            h.record(cmd);
        }
        h.close_block(pos(0, 5)).unwrap();

        h.open_block(pos(0, 5));
        let cmd = TextManipulator::execute(&mut tree, Command::insert_char(0, 5, b'\n')).unwrap();
        h.record(cmd);
        h.close_block(pos(1, 0)).unwrap();

        h.open_block(pos(1, 0));
        for (col, byte) in b"world".iter().enumerate() {
            let cmd = TextManipulator::execute(&mut tree, Command::insert_char(1, col, *byte)).unwrap();
            h.record(cmd);
        }
        h.close_block(pos(1, 5)).unwrap();

        assert_eq!(tree.to_bytes(), b"hello\nworld");

        let unit = h.undo().unwrap();
        for cmd in unit.commands.iter().rev() {
            TextManipulator::revert(&mut tree, cmd).unwrap();
        }
        assert_eq!(tree.to_bytes(), b"hello\n");
        assert_eq!(unit.cursor_before, pos(1, 0));

        let unit = h.undo().unwrap();
        for cmd in unit.commands.iter().rev() {
            TextManipulator::revert(&mut tree, cmd).unwrap();
        }
        assert_eq!(tree.to_bytes(), b"hello");
        assert_eq!(unit.cursor_before, pos(0, 5));

        let unit = h.redo().unwrap();
        for cmd in &unit.commands {
            TextManipulator::execute(&mut tree, cmd.clone()).unwrap();
        }
        assert_eq!(tree.to_bytes(), b"hello\n");

        let unit = h.redo().unwrap();
        for cmd in &unit.commands {
            TextManipulator::execute(&mut tree, cmd.clone()).unwrap();
        }
        assert_eq!(tree.to_bytes(), b"hello\nworld");
    }
}
