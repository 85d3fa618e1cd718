/// Represents a specific location in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: usize,
    /// The byte offset or character index within the line.
    pub column: usize,
}

impl Position {
    #[must_use]
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Represents a cursor and its associated selection range.
/// Uses the "Anchor and Head" directional selection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// The fixed starting point of a selection.
    pub anchor: Position,
    /// The active, moving end of a selection (where the blinking caret is).
    pub head: Position,
    /// The preferred visual column. Used to maintain horizontal position
    /// when moving vertically across shorter lines.
    pub preferred_column: Option<usize>,
}

impl Cursor {
    #[must_use]
    pub fn new(row: usize, column: usize) -> Self {
        let pos = Position::new(row, column);

        Self {
            anchor: pos,
            head: pos,
            preferred_column: Some(column),
        }
    }

    /// Creates a selection from an anchor to a head.
    #[must_use]
    pub fn new_selection(anchor: Position, head: Position) -> Self {
        Self {
            anchor,
            head,
            preferred_column: Some(head.column),
        }
    }

    /// Returns true if this is just a cursor (no text selected).
    #[inline]
    #[must_use]
    pub fn no_selection(&self) -> bool {
        self.anchor == self.head
    }

    /// Returns the normalized tuple (start, end) regardless of selection direction.
    #[inline]
    #[must_use]
    pub fn range(&self) -> (Position, Position) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    /// Moves the head to a new position, updating the selection.
    pub fn set_head(&mut self, pos: Position) {
        self.head = pos;
        self.preferred_column = Some(pos.column);
    }

    /// Moves both anchor and head to the same position (clears selection).
    pub fn clear_selection(&mut self) {
        self.anchor = self.head;
    }
}
