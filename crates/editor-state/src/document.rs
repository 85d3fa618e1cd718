//! `TextView`: one open buffer plus everything needed to edit, scroll,
//! and render it — the component the input layer drives via
//! [`crate::Action`] and [`TextView::dispatch`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use editor_core::{
    command::Command, cursor::Position, history::History, keyword::keyword_file_for_extension,
    line_tree::LineTree, next_word_jump_location, prev_word_jump_location,
    text_manipulator::TextManipulator, Cursor,
};
use editor_core::error::CoreError;
use io::{FileWatcher, MmapFile};
use renderer::line_render::{draw_line, LineRenderInput};
use tracing::{debug, warn};

use crate::action::Action;
use crate::config::Config;

const DEFAULT_UNIT_BREAK_THRESHOLD: usize = 512;

/// One open buffer: its text, cursor/selection, undo history, viewport,
/// file identity, and syntax keyword set.
pub struct TextView {
    tree: LineTree,
    cursor: Cursor,
    selecting: bool,
    history: History,
    v_scroll: usize,
    h_scroll: usize,
    width: usize,
    height: usize,
    path: Option<PathBuf>,
    dirty: bool,
    keywords: HashSet<String>,
    watcher: FileWatcher,
    tab_size: usize,
    last_home_col: Option<usize>,
}

impl TextView {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            tree: LineTree::from_lines(vec![Vec::new()], DEFAULT_UNIT_BREAK_THRESHOLD),
            cursor: Cursor::new(0, 0),
            selecting: false,
            history: History::new(),
            v_scroll: 0,
            h_scroll: 0,
            width: 80,
            height: 24,
            path: None,
            dirty: false,
            keywords: HashSet::new(),
            watcher: FileWatcher::new(),
            tab_size: config.tab_size,
            last_home_col: None,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.tree.line_count()
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.adjust_scroll();
    }

    // ---- cursor geometry -------------------------------------------------

    fn line_len(&self, row: usize) -> usize {
        self.tree.line_len(row).unwrap_or(0)
    }

    fn clamp_cursor(&mut self) {
        let last_row = self.line_count().saturating_sub(1);
        self.cursor.head.row = self.cursor.head.row.min(last_row);
        self.cursor.head.column = self.cursor.head.column.min(self.line_len(self.cursor.head.row));
        if !self.selecting {
            self.cursor.anchor = self.cursor.head;
        } else {
            self.cursor.anchor.row = self.cursor.anchor.row.min(last_row);
            self.cursor.anchor.column = self.cursor.anchor.column.min(self.line_len(self.cursor.anchor.row));
        }
    }

    fn adjust_scroll(&mut self) {
        let row = self.cursor.head.row;
        if row < self.v_scroll {
            self.v_scroll = row;
        } else if self.height > 0 && row >= self.v_scroll + self.height {
            self.v_scroll = row + 1 - self.height;
        }
        let col = self.cursor.head.column;
        if col < self.h_scroll {
            self.h_scroll = col;
        } else if self.width > 0 && col >= self.h_scroll + self.width {
            self.h_scroll = col + 1 - self.width;
        }
    }

    fn move_head_to(&mut self, pos: Position, update_preferred: bool) {
        if self.selecting {
            self.cursor.set_head(pos);
        } else {
            self.cursor = Cursor::new(pos.row, pos.column);
        }
        if update_preferred {
            self.cursor.preferred_column = Some(pos.column);
        }
        self.last_home_col = None;
        self.clamp_cursor();
        self.adjust_scroll();
    }

    pub fn cursor_left(&mut self) {
        let pos = self.cursor.head;
        let target = if pos.column > 0 {
            Position::new(pos.row, pos.column - 1)
        } else if pos.row > 0 {
            Position::new(pos.row - 1, self.line_len(pos.row - 1))
        } else {
            pos
        };
        self.move_head_to(target, true);
    }

    pub fn cursor_right(&mut self) {
        let pos = self.cursor.head;
        let len = self.line_len(pos.row);
        let target = if pos.column < len {
            Position::new(pos.row, pos.column + 1)
        } else if pos.row + 1 < self.line_count() {
            Position::new(pos.row + 1, 0)
        } else {
            pos
        };
        self.move_head_to(target, true);
    }

    fn vertical_move(&mut self, new_row: usize) {
        let preferred = self.cursor.preferred_column.unwrap_or(self.cursor.head.column);
        let target_col = preferred.min(self.line_len(new_row));
        let pos = Position::new(new_row, target_col);
        if self.selecting {
            self.cursor.set_head(pos);
            self.cursor.preferred_column = Some(preferred);
        } else {
            self.cursor = Cursor::new(pos.row, pos.column);
            self.cursor.preferred_column = Some(preferred);
        }
        self.last_home_col = None;
        self.clamp_cursor();
        self.adjust_scroll();
    }

    pub fn cursor_up(&mut self) {
        let row = self.cursor.head.row;
        self.vertical_move(row.saturating_sub(1));
    }

    pub fn cursor_down(&mut self) {
        let row = self.cursor.head.row;
        self.vertical_move((row + 1).min(self.line_count().saturating_sub(1)));
    }

    pub fn page_up(&mut self) {
        let row = self.cursor.head.row;
        self.vertical_move(row.saturating_sub(self.height.max(1)));
    }

    pub fn page_down(&mut self) {
        let row = self.cursor.head.row;
        self.vertical_move((row + self.height.max(1)).min(self.line_count().saturating_sub(1)));
    }

    pub fn scroll_up(&mut self) {
        self.v_scroll = self.v_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let last_row = self.line_count().saturating_sub(1);
        self.v_scroll = (self.v_scroll + 1).min(last_row);
    }

    /// First press: column 0. A second *consecutive* press (no other
    /// cursor motion in between) toggles to the first non-whitespace
    /// column instead.
    pub fn cursor_home(&mut self) {
        let row = self.cursor.head.row;
        let line = self.tree.nth_line(row).unwrap_or_default();
        let first_non_blank = line.iter().position(|&b| b != b' ' && b != b'\t').unwrap_or(line.len());
        let target_col = if self.last_home_col == Some(0) { first_non_blank } else { 0 };
        self.move_head_to(Position::new(row, target_col), true);
        self.last_home_col = Some(target_col);
    }

    pub fn cursor_end(&mut self) {
        let row = self.cursor.head.row;
        let len = self.line_len(row);
        self.move_head_to(Position::new(row, len), true);
    }

    pub fn word_jump_left(&mut self) {
        let pos = self.cursor.head;
        let line = self.tree.nth_line(pos.row).unwrap_or_default();
        let col = prev_word_jump_location(&line, pos.column);
        self.move_head_to(Position::new(pos.row, col), true);
    }

    pub fn word_jump_right(&mut self) {
        let pos = self.cursor.head;
        let line = self.tree.nth_line(pos.row).unwrap_or_default();
        let col = next_word_jump_location(&line, pos.column);
        self.move_head_to(Position::new(pos.row, col), true);
    }

    // ---- selection --------------------------------------------------------

    pub fn selection_toggle(&mut self) {
        if self.selecting {
            self.selecting = false;
            self.cursor.clear_selection();
        } else {
            self.selecting = true;
        }
    }

    fn selection_range(&self) -> Option<(Position, Position)> {
        if self.cursor.no_selection() {
            None
        } else {
            Some(self.cursor.range())
        }
    }

    fn selected_text(&self) -> Option<Vec<u8>> {
        let (start, end) = self.selection_range()?;
        if start.row == end.row {
            let line = self.tree.nth_line(start.row).unwrap_or_default();
            return Some(line[start.column..end.column].to_vec());
        }
        let mut out = Vec::new();
        let first = self.tree.nth_line(start.row).unwrap_or_default();
        out.extend_from_slice(&first[start.column..]);
        for row in (start.row + 1)..end.row {
            out.push(b'\n');
            out.extend_from_slice(&self.tree.nth_line(row).unwrap_or_default());
        }
        out.push(b'\n');
        let last = self.tree.nth_line(end.row).unwrap_or_default();
        out.extend_from_slice(&last[..end.column]);
        Some(out)
    }

    #[must_use]
    pub fn copy(&self) -> Option<Vec<u8>> {
        self.selected_text()
    }

    /// Deletes the selected range (or the selection marker range
    /// `[start, end)`), decomposed into the six primitive `Command`s so
    /// it round-trips through undo. Returns the removed text.
    fn delete_range(&mut self, start: Position, end: Position) -> Result<Vec<u8>, CoreError> {
        if start == end {
            return Ok(Vec::new());
        }
        if start.row == end.row {
            let len = end.column - start.column;
            let cmd = TextManipulator::execute(&mut self.tree, Command::remove_slice(start.row, start.column, len))?;
            let removed = match &cmd {
                Command::RemoveSlice { removed, .. } => removed.clone().unwrap_or_default(),
                _ => unreachable!(),
            };
            self.history.record(cmd);
            return Ok(removed);
        }

        let mut pieces = Vec::new();

        let tail_len = self.line_len(start.row) - start.column;
        let cmd = TextManipulator::execute(&mut self.tree, Command::remove_slice(start.row, start.column, tail_len))?;
        if let Command::RemoveSlice { removed, .. } = &cmd {
            pieces.push(removed.clone().unwrap_or_default());
        }
        self.history.record(cmd);

        for _ in 0..(end.row - start.row - 1) {
            let cmd = TextManipulator::execute(&mut self.tree, Command::delete_line(start.row + 1))?;
            if let Command::DeleteLine { removed, .. } = &cmd {
                pieces.push(removed.clone().unwrap_or_default());
            }
            self.history.record(cmd);
        }

        let cmd = TextManipulator::execute(&mut self.tree, Command::remove_slice(start.row + 1, 0, end.column))?;
        if let Command::RemoveSlice { removed, .. } = &cmd {
            pieces.push(removed.clone().unwrap_or_default());
        }
        self.history.record(cmd);

        let cmd = TextManipulator::execute(&mut self.tree, Command::merge_line(start.row))?;
        self.history.record(cmd);

        Ok(pieces.join(&b'\n'))
    }

    pub fn cut(&mut self) -> Result<Option<Vec<u8>>, CoreError> {
        let Some((start, end)) = self.selection_range() else { return Ok(None) };
        let before = self.cursor;
        self.history.open_block(before);
        let removed = self.delete_range(start, end)?;
        self.selecting = false;
        self.cursor = Cursor::new(start.row, start.column);
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(Some(removed))
    }

    /// Inserts `text` at the cursor one byte at a time via `InsertChar`,
    /// relying on the line tree's own handling of embedded `\n` bytes to
    /// perform line splits — so multi-line paste needs no special case.
    pub fn paste(&mut self, text: &[u8]) -> Result<(), CoreError> {
        let before = self.cursor;
        self.history.open_block(before);
        if let Some((start, end)) = self.selection_range() {
            self.delete_range(start, end)?;
            self.cursor = Cursor::new(start.row, start.column);
        }
        let mut row = self.cursor.head.row;
        let mut col = self.cursor.head.column;
        for &byte in text {
            let cmd = TextManipulator::execute(&mut self.tree, Command::insert_char(row, col, byte))?;
            self.history.record(cmd);
            if byte == b'\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        self.selecting = false;
        self.cursor = Cursor::new(row, col);
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    // ---- character-level editing -------------------------------------------

    pub fn insert_char(&mut self, byte: u8) -> Result<(), CoreError> {
        let before = self.cursor;
        self.history.open_block(before);
        if let Some((start, end)) = self.selection_range() {
            self.delete_range(start, end)?;
            self.cursor = Cursor::new(start.row, start.column);
        }
        let pos = self.cursor.head;
        let cmd = TextManipulator::execute(&mut self.tree, Command::insert_char(pos.row, pos.column, byte))?;
        self.history.record(cmd);
        let (row, col) = if byte == b'\n' { (pos.row + 1, 0) } else { (pos.row, pos.column + 1) };
        self.selecting = false;
        self.cursor = Cursor::new(row, col);
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    pub fn enter(&mut self) -> Result<(), CoreError> {
        self.insert_char(b'\n')
    }

    pub fn tab(&mut self) -> Result<(), CoreError> {
        let before = self.cursor;
        self.history.open_block(before);
        let pos = self.cursor.head;
        let mut col = pos.column;
        for _ in 0..self.tab_size {
            let cmd = TextManipulator::execute(&mut self.tree, Command::insert_char(pos.row, col, b' '))?;
            self.history.record(cmd);
            col += 1;
        }
        self.cursor = Cursor::new(pos.row, col);
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    pub fn backspace(&mut self) -> Result<(), CoreError> {
        let before = self.cursor;
        self.history.open_block(before);
        if let Some((start, end)) = self.selection_range() {
            self.delete_range(start, end)?;
            self.cursor = Cursor::new(start.row, start.column);
            self.clamp_cursor();
            self.adjust_scroll();
            self.history.close_block(self.cursor)?;
            self.dirty = true;
            return Ok(());
        }
        let pos = self.cursor.head;
        if pos.column == 0 && pos.row == 0 {
            self.history.close_block(before)?;
            return Ok(());
        }
        let (row, col) = if pos.column > 0 {
            let cmd = TextManipulator::execute(&mut self.tree, Command::remove_char(pos.row, pos.column - 1))?;
            self.history.record(cmd);
            (pos.row, pos.column - 1)
        } else {
            let prev_len = self.line_len(pos.row - 1);
            let cmd = TextManipulator::execute(&mut self.tree, Command::merge_line(pos.row - 1))?;
            self.history.record(cmd);
            (pos.row - 1, prev_len)
        };
        self.cursor = Cursor::new(row, col);
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    /// Deletes from the cursor back to the previous word boundary, via
    /// the same `delete_range` decomposition `backspace`'s selection path
    /// uses, so it undoes as one block regardless of how many bytes it
    /// spans.
    pub fn word_backspace(&mut self) -> Result<(), CoreError> {
        let before = self.cursor;
        self.history.open_block(before);
        if let Some((start, end)) = self.selection_range() {
            self.delete_range(start, end)?;
            self.cursor = Cursor::new(start.row, start.column);
            self.clamp_cursor();
            self.adjust_scroll();
            self.history.close_block(self.cursor)?;
            self.dirty = true;
            return Ok(());
        }
        let pos = self.cursor.head;
        let line = self.tree.nth_line(pos.row).unwrap_or_default();
        let target_col = prev_word_jump_location(&line, pos.column);
        let target = if target_col == pos.column && pos.column == 0 && pos.row > 0 {
            Position::new(pos.row - 1, self.line_len(pos.row - 1))
        } else {
            Position::new(pos.row, target_col)
        };
        if target == pos {
            self.history.close_block(before)?;
            return Ok(());
        }
        self.delete_range(target, pos)?;
        self.cursor = Cursor::new(target.row, target.column);
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_forward(&mut self) -> Result<(), CoreError> {
        let before = self.cursor;
        self.history.open_block(before);
        if let Some((start, end)) = self.selection_range() {
            self.delete_range(start, end)?;
            self.cursor = Cursor::new(start.row, start.column);
            self.clamp_cursor();
            self.adjust_scroll();
            self.history.close_block(self.cursor)?;
            self.dirty = true;
            return Ok(());
        }
        let pos = self.cursor.head;
        let len = self.line_len(pos.row);
        if pos.column < len {
            let cmd = TextManipulator::execute(&mut self.tree, Command::remove_char(pos.row, pos.column))?;
            self.history.record(cmd);
        } else if pos.row + 1 < self.line_count() {
            let cmd = TextManipulator::execute(&mut self.tree, Command::merge_line(pos.row))?;
            self.history.record(cmd);
        } else {
            self.history.close_block(before)?;
            return Ok(());
        }
        self.clamp_cursor();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_line(&mut self) -> Result<(), CoreError> {
        let before = self.cursor;
        self.history.open_block(before);
        let row = self.cursor.head.row;
        let cmd = TextManipulator::execute(&mut self.tree, Command::delete_line(row))?;
        self.history.record(cmd);
        self.cursor = Cursor::new(row, 0);
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    fn selected_row_range(&self) -> (usize, usize) {
        match self.selection_range() {
            Some((start, end)) => (start.row, end.row),
            None => (self.cursor.head.row, self.cursor.head.row),
        }
    }

    pub fn indent_right(&mut self) -> Result<(), CoreError> {
        let before = self.cursor;
        self.history.open_block(before);
        let (first, last) = self.selected_row_range();
        for row in first..=last {
            for _ in 0..self.tab_size {
                let cmd = TextManipulator::execute(&mut self.tree, Command::insert_char(row, 0, b' '))?;
                self.history.record(cmd);
            }
        }
        self.cursor.head.column += self.tab_size;
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    pub fn indent_left(&mut self) -> Result<(), CoreError> {
        let before = self.cursor;
        self.history.open_block(before);
        let (first, last) = self.selected_row_range();
        let mut removed_from_cursor_row = 0;
        for row in first..=last {
            let mut n = 0;
            while n < self.tab_size {
                let line = self.tree.nth_line(row).unwrap_or_default();
                if line.first() != Some(&b' ') {
                    break;
                }
                let cmd = TextManipulator::execute(&mut self.tree, Command::remove_char(row, 0))?;
                self.history.record(cmd);
                n += 1;
            }
            if row == self.cursor.head.row {
                removed_from_cursor_row = n;
            }
        }
        self.cursor.head.column = self.cursor.head.column.saturating_sub(removed_from_cursor_row);
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    /// Swaps the content of `row` and `row - 1` (`Up`) or `row + 1`
    /// (`Down`), rebuilt byte-by-byte through `RemoveSlice`/`InsertChar`
    /// since no primitive `Command` reorders two whole lines directly.
    fn swap_lines(&mut self, row_a: usize, row_b: usize) -> Result<(), CoreError> {
        let a = self.tree.nth_line(row_a).ok_or(CoreError::OutOfRange)?;
        let b = self.tree.nth_line(row_b).ok_or(CoreError::OutOfRange)?;

        if !a.is_empty() {
            let cmd = TextManipulator::execute(&mut self.tree, Command::remove_slice(row_a, 0, a.len()))?;
            self.history.record(cmd);
        }
        if !b.is_empty() {
            let cmd = TextManipulator::execute(&mut self.tree, Command::remove_slice(row_b, 0, b.len()))?;
            self.history.record(cmd);
        }
        for (i, &byte) in b.iter().enumerate() {
            let cmd = TextManipulator::execute(&mut self.tree, Command::insert_char(row_a, i, byte))?;
            self.history.record(cmd);
        }
        for (i, &byte) in a.iter().enumerate() {
            let cmd = TextManipulator::execute(&mut self.tree, Command::insert_char(row_b, i, byte))?;
            self.history.record(cmd);
        }
        Ok(())
    }

    pub fn line_move_up(&mut self) -> Result<(), CoreError> {
        let row = self.cursor.head.row;
        if row == 0 {
            return Ok(());
        }
        let before = self.cursor;
        self.history.open_block(before);
        self.swap_lines(row, row - 1)?;
        self.cursor.head.row = row - 1;
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    pub fn line_move_down(&mut self) -> Result<(), CoreError> {
        let row = self.cursor.head.row;
        if row + 1 >= self.line_count() {
            return Ok(());
        }
        let before = self.cursor;
        self.history.open_block(before);
        self.swap_lines(row, row + 1)?;
        self.cursor.head.row = row + 1;
        self.clamp_cursor();
        self.adjust_scroll();
        self.history.close_block(self.cursor)?;
        self.dirty = true;
        Ok(())
    }

    // ---- undo/redo --------------------------------------------------------

    pub fn undo(&mut self) -> Result<(), CoreError> {
        let Some(unit) = self.history.undo() else { return Ok(()) };
        for cmd in unit.commands.iter().rev() {
            TextManipulator::revert(&mut self.tree, cmd)?;
        }
        self.cursor = unit.cursor_before;
        self.selecting = false;
        self.clamp_cursor();
        self.adjust_scroll();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), CoreError> {
        let Some(unit) = self.history.redo() else { return Ok(()) };
        for cmd in &unit.commands {
            TextManipulator::execute(&mut self.tree, cmd.clone())?;
        }
        self.cursor = unit.cursor_after;
        self.selecting = false;
        self.clamp_cursor();
        self.adjust_scroll();
        Ok(())
    }

    // ---- search -------------------------------------------------------------

    /// Scans forward from `start` (inclusive), wrapping around the
    /// buffer once, and returns the first match of `pattern`.
    fn find_from(&self, pattern: &[u8], start: Position) -> Option<Position> {
        let total_rows = self.line_count();
        if pattern.is_empty() || total_rows == 0 {
            return None;
        }
        let mut row = start.row;
        let mut col_from = start.column;
        for _ in 0..=total_rows {
            let line = self.tree.nth_line(row).unwrap_or_default();
            if col_from <= line.len() {
                if let Some(offset) = find_bytes(&line[col_from..], pattern) {
                    return Some(Position::new(row, col_from + offset));
                }
            }
            row = (row + 1) % total_rows;
            col_from = 0;
        }
        None
    }

    pub fn jump_next_match(&mut self, pattern: &[u8]) {
        let start = self.cursor.head;
        let search_from = Position::new(start.row, start.column + 1);
        if let Some(pos) = self.find_from(pattern, search_from) {
            self.move_head_to(pos, true);
        }
    }

    pub fn jump_prev_match(&mut self, pattern: &[u8]) {
        // Literal backward scan: walk rows backward from the cursor,
        // finding the rightmost match strictly before the cursor column.
        let total_rows = self.line_count();
        if pattern.is_empty() || total_rows == 0 {
            return;
        }
        let start = self.cursor.head;
        let mut row = start.row;
        for step in 0..=total_rows {
            let line = self.tree.nth_line(row).unwrap_or_default();
            let upper = if step == 0 { start.column } else { line.len() + 1 };
            if let Some(offset) = rfind_bytes(&line, pattern, upper) {
                self.move_head_to(Position::new(row, offset), true);
                return;
            }
            row = if row == 0 { total_rows - 1 } else { row - 1 };
        }
    }

    // ---- file I/O -----------------------------------------------------------

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        let mmap = MmapFile::open(path)?;
        let mut lines: Vec<Vec<u8>> = mmap.as_slice().split(|&b| b == b'\n').map(<[u8]>::to_vec).collect();
        if lines.len() > 1 && lines.last().map(Vec::is_empty).unwrap_or(false) {
            lines.pop();
        }
        if lines.is_empty() {
            lines.push(Vec::new());
        }
        self.tree = LineTree::from_lines(lines, DEFAULT_UNIT_BREAK_THRESHOLD);
        self.history = History::new();
        self.cursor = Cursor::new(0, 0);
        self.selecting = false;
        self.v_scroll = 0;
        self.h_scroll = 0;
        self.dirty = false;
        self.path = Some(path.to_path_buf());

        if let Err(err) = self.watcher.watch(path) {
            warn!(%err, path = %path.display(), "could not register file watch; external-change detection disabled");
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            self.reload_keywords_for_extension(ext);
        }
        Ok(())
    }

    /// Looks up the language for `ext` and (re)loads its keyword list from
    /// `./config/keywords/<language>` — a fixed, CWD-relative path, the
    /// same convention `original_source/text_view.h` uses, independent of
    /// where the file being edited actually lives.
    fn reload_keywords_for_extension(&mut self, ext: &str) {
        self.keywords.clear();
        let Some(language) = keyword_file_for_extension(ext) else { return };
        self.reload_keywords(Path::new("config/keywords"), language);
    }

    /// Reads `base_dir/<language>`, one keyword per line. Missing file is
    /// logged and silently leaves the keyword set empty — matching the
    /// original's log-and-continue behavior, not a hard error.
    pub fn reload_keywords(&mut self, base_dir: &Path, language: &str) {
        let path = base_dir.join(language);
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                self.keywords = contents.lines().map(str::to_string).filter(|l| !l.is_empty()).collect();
                debug!(path = %path.display(), count = self.keywords.len(), "loaded keyword list");
            }
            Err(err) => {
                warn!(%err, path = %path.display(), "no keyword file for this language; syntax highlighting disabled");
            }
        }
    }

    /// Atomically writes the buffer to `path`: a temp file in the same
    /// parent directory, `sync_all`, then `persist` over the target.
    fn write_atomically(&self, path: &Path) -> Result<(), CoreError> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::Builder::new().prefix(".tmp-save-").tempfile_in(parent)?;
        {
            use std::io::Write;
            for line in self.tree.iter() {
                tmp.write_all(line)?;
                tmp.write_all(b"\n")?;
            }
            tmp.as_file().sync_all()?;
        }
        tmp.persist(path).map_err(|e| CoreError::Io(e.error))?;
        Ok(())
    }

    pub fn save_file(&mut self) -> Result<(), CoreError> {
        let path = self.path.clone().ok_or(CoreError::InvariantViolation("save_file with no path set"))?;
        self.write_atomically(&path)?;
        self.dirty = false;
        // ignore_next_cycle fingerprints the file's mtime right after our
        // own write lands; has_changed compares against that fingerprint
        // whenever the watch event eventually arrives, so nothing here
        // needs to block waiting for it.
        if let Err(err) = self.watcher.ignore_next_cycle() {
            warn!(%err, "failed to suppress self-induced watch event");
        }
        Ok(())
    }

    pub fn save_file_as(&mut self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        self.path = Some(path.as_ref().to_path_buf());
        self.save_file()
    }

    /// Returns `true` if the underlying file changed outside this
    /// process since it was last checked (or loaded/saved).
    pub fn file_changed_externally(&mut self) -> bool {
        self.watcher.has_changed().unwrap_or(false)
    }

    // ---- rendering ------------------------------------------------------------

    /// Writes the decorated, viewport-clipped visible representation of
    /// buffer row `v_scroll + view_line_idx` into `out`.
    pub fn draw_line_into(&self, out: &mut Vec<u8>, view_line_idx: usize, search_term: Option<&[u8]>) {
        let row = self.v_scroll + view_line_idx;
        let Some(line) = self.tree.nth_line(row) else {
            out.extend_from_slice(b"~");
            return;
        };
        let selection = self.selection_range().and_then(|(start, end)| {
            if row < start.row || row > end.row {
                return None;
            }
            let from = if row == start.row { start.column } else { 0 };
            let to = if row == end.row { end.column } else { line.len() };
            Some((from, to))
        });
        let input = LineRenderInput {
            line: &line,
            keywords: &self.keywords,
            selection,
            search_term,
            h_scroll: self.h_scroll,
            cols: self.width,
        };
        draw_line(out, &input);
    }

    // ---- external-interface dispatch ---------------------------------------

    pub fn dispatch(&mut self, action: Action) -> Result<(), CoreError> {
        match action {
            Action::Quit => {}
            Action::SaveFile => self.save_file()?,
            Action::SaveFileAs => return Err(CoreError::InvariantViolation("SaveFileAs requires a path argument")),
            Action::OpenFile => return Err(CoreError::InvariantViolation("OpenFile requires a path argument")),
            Action::DeleteLine => self.delete_line()?,
            Action::Undo => self.undo()?,
            Action::Redo => self.redo()?,
            Action::Copy => {
                let _ = self.copy();
            }
            Action::Paste => {}
            Action::Cut => {
                self.cut()?;
            }
            Action::SelectionToggle => self.selection_toggle(),
            Action::JumpNextSearchHit => {}
            Action::JumpPrevSearchHit => {}
            Action::Backspace => self.backspace()?,
            Action::WordBackspace => self.word_backspace()?,
            Action::DeleteForward => self.delete_forward()?,
            Action::Enter => self.enter()?,
            Action::Tab => self.tab()?,
            Action::CursorDown => self.cursor_down(),
            Action::CursorUp => self.cursor_up(),
            Action::CursorLeft => self.cursor_left(),
            Action::CursorRight => self.cursor_right(),
            Action::CursorHome => self.cursor_home(),
            Action::CursorEnd => self.cursor_end(),
            Action::ScrollUp => self.scroll_up(),
            Action::ScrollDown => self.scroll_down(),
            Action::CursorWordJumpLeft => self.word_jump_left(),
            Action::CursorWordJumpRight => self.word_jump_right(),
            Action::CursorPageUp => self.page_up(),
            Action::CursorPageDown => self.page_down(),
            Action::LineIndentLeft => self.indent_left()?,
            Action::LineIndentRight => self.indent_right()?,
            Action::LineMoveBackward => self.line_move_up()?,
            Action::LineMoveForward => self.line_move_down()?,
            Action::MultiPurposeCommand | Action::NewTextView | Action::ChangeActiveView(_) => {}
            Action::InsertChar(byte) => self.insert_char(byte)?,
        }
        Ok(())
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind_bytes(haystack: &[u8], needle: &[u8], before: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let limit = before.min(haystack.len().saturating_sub(needle.len()) + 1);
    (0..limit).rev().find(|&i| &haystack[i..i + needle.len()] == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(view: &mut TextView, s: &str) {
        for &byte in s.as_bytes() {
            view.dispatch(Action::InsertChar(byte)).unwrap();
        }
    }

    fn lines_of(view: &TextView) -> Vec<Vec<u8>> {
        (0..view.line_count()).map(|row| view.tree.nth_line(row).unwrap()).collect()
    }

    #[test]
    fn typing_advances_cursor_and_marks_dirty() {
        let mut view = TextView::new(&Config::default());
        type_str(&mut view, "hi");
        assert_eq!(view.cursor().head, Position::new(0, 2));
        assert_eq!(lines_of(&view), vec![b"hi".to_vec()]);
        assert!(view.is_dirty());
    }

    #[test]
    fn enter_splits_the_line_at_the_cursor() {
        let mut view = TextView::new(&Config::default());
        type_str(&mut view, "hello");
        view.dispatch(Action::Enter).unwrap();
        type_str(&mut view, "world");
        assert_eq!(lines_of(&view), vec![b"hello".to_vec(), b"world".to_vec()]);
        assert_eq!(view.cursor().head, Position::new(1, 5));
    }

    #[test]
    fn undo_redo_through_dispatch_restores_content_and_cursor() {
        let mut view = TextView::new(&Config::default());
        type_str(&mut view, "ab");
        view.dispatch(Action::Enter).unwrap();
        type_str(&mut view, "c");

        view.dispatch(Action::Undo).unwrap();
        assert_eq!(lines_of(&view), vec![b"ab".to_vec(), Vec::new()]);

        view.dispatch(Action::Undo).unwrap();
        assert_eq!(lines_of(&view), vec![b"ab".to_vec()]);
        assert_eq!(view.cursor().head, Position::new(0, 2));

        view.dispatch(Action::Redo).unwrap();
        view.dispatch(Action::Redo).unwrap();
        assert_eq!(lines_of(&view), vec![b"ab".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn backspace_at_buffer_start_is_a_no_op() {
        let mut view = TextView::new(&Config::default());
        view.dispatch(Action::Backspace).unwrap();
        assert_eq!(lines_of(&view), vec![Vec::new()]);
        assert!(!view.is_dirty());
    }

    #[test]
    fn selection_copy_cut_and_paste_round_trip() {
        let mut view = TextView::new(&Config::default());
        type_str(&mut view, "hello world");
        view.cursor = Cursor::new_selection(Position::new(0, 0), Position::new(0, 5));

        let copied = view.copy().unwrap();
        assert_eq!(copied, b"hello");

        let cut = view.cut().unwrap().unwrap();
        assert_eq!(cut, b"hello");
        assert_eq!(lines_of(&view), vec![b" world".to_vec()]);

        view.cursor = Cursor::new(0, 0);
        view.paste(b"hello").unwrap();
        assert_eq!(lines_of(&view), vec![b"hello world".to_vec()]);
    }

    #[test]
    fn word_backspace_removes_back_to_previous_word_jump_target() {
        // Consistent with `word_jump_left`'s own landing spot (see
        // `word_jump::prev_word_jump_location`): it lands one byte before
        // the previous word's last character, not after it, so the
        // deleted range runs from there through the cursor.
        let mut view = TextView::new(&Config::default());
        type_str(&mut view, "hello world");
        view.dispatch(Action::WordBackspace).unwrap();
        assert_eq!(lines_of(&view), vec![b"hell".to_vec()]);

        view.dispatch(Action::Undo).unwrap();
        assert_eq!(lines_of(&view), vec![b"hello world".to_vec()]);
    }

    #[test]
    fn word_backspace_at_column_zero_merges_into_previous_line() {
        let mut view = TextView::new(&Config::default());
        view.tree = LineTree::from_lines(vec![b"abc".to_vec(), b"def".to_vec()], 512);
        view.cursor = Cursor::new(1, 0);
        view.dispatch(Action::WordBackspace).unwrap();
        assert_eq!(lines_of(&view), vec![b"abcdef".to_vec()]);
        assert_eq!(view.cursor().head, Position::new(0, 3));
    }

    #[test]
    fn word_backspace_at_buffer_start_is_a_no_op() {
        let mut view = TextView::new(&Config::default());
        view.dispatch(Action::WordBackspace).unwrap();
        assert_eq!(lines_of(&view), vec![Vec::new()]);
        assert!(!view.is_dirty());
    }

    #[test]
    fn multi_line_paste_splits_on_embedded_newlines() {
        let mut view = TextView::new(&Config::default());
        view.paste(b"one\ntwo\nthree").unwrap();
        assert_eq!(lines_of(&view), vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    }

    #[test]
    fn line_move_down_then_up_round_trips() {
        let mut view = TextView::new(&Config::default());
        view.tree = LineTree::from_lines(vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()], 512);
        view.cursor = Cursor::new(0, 0);

        view.dispatch(Action::LineMoveForward).unwrap();
        assert_eq!(lines_of(&view), vec![b"b".to_vec(), b"a".to_vec(), b"c".to_vec()]);
        assert_eq!(view.cursor().head.row, 1);

        view.dispatch(Action::LineMoveBackward).unwrap();
        assert_eq!(lines_of(&view), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn save_then_load_round_trips_content_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");

        let mut writer = TextView::new(&Config::default());
        type_str(&mut writer, "hello");
        writer.dispatch(Action::Enter).unwrap();
        type_str(&mut writer, "world");
        writer.path = Some(path.clone());
        writer.save_file().unwrap();

        let mut reader = TextView::new(&Config::default());
        reader.load_file(&path).unwrap();
        assert_eq!(lines_of(&reader), vec![b"hello".to_vec(), b"world".to_vec()]);
        assert!(!reader.is_dirty());
    }

    #[test]
    fn load_file_on_an_empty_file_yields_a_single_empty_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let mut view = TextView::new(&Config::default());
        view.load_file(&path).unwrap();
        assert_eq!(lines_of(&view), vec![Vec::<u8>::new()]);
        assert!(!view.is_dirty());
    }

    #[test]
    fn own_save_does_not_register_as_an_external_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "initial").unwrap();

        let mut view = TextView::new(&Config::default());
        view.load_file(&path).unwrap();
        type_str(&mut view, "!");
        view.save_file().unwrap();

        assert!(!view.file_changed_externally());
    }
}
