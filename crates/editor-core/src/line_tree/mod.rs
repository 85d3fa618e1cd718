//! The balanced binary line tree.
//!
//! Every node is either an [`Node::Internal`] node (owned left/right
//! subtrees plus an aggregate `line_count`) or a [`Node::Leaf`], a cheap
//! `Copy` index into the tree's [`arena::LeafArena`]. Leaves store their
//! lines directly and a pair of neighbor [`arena::LeafId`]s forming a
//! doubly linked list over leaves in in-order. See `arena` for why
//! sibling links are arena indices rather than raw pointers.
//!
//! `line_start` is never stored: every traversal starts at the root with
//! an absolute offset of zero and derives each child's offset as it
//! descends (`left`'s offset is the parent's; `right`'s is the parent's
//! plus the left subtree's line count). Nothing needs to look a
//! `line_start` up without going through the root, so there is nothing to
//! cache and nothing that can go stale.

mod arena;
mod iter;

pub use arena::LeafId;
pub use iter::{LineIter, LineIterRev};

use arena::{LeafArena, LeafData};

use crate::error::CoreError;

#[derive(Debug)]
enum Node {
    Leaf(LeafId),
    Internal(Box<Internal>),
}

#[derive(Debug)]
struct Internal {
    left: Node,
    right: Node,
    line_count: usize,
}

#[derive(Debug)]
pub struct LineTree {
    root: Node,
    arena: LeafArena,
    unit_break_threshold: usize,
}

fn count(node: &Node, arena: &LeafArena) -> usize {
    match node {
        Node::Leaf(id) => arena.get(*id).lines.len(),
        Node::Internal(inner) => inner.line_count,
    }
}

fn height(node: &Node, arena: &LeafArena) -> usize {
    match node {
        Node::Leaf(_) => 0,
        Node::Internal(inner) => 1 + height(&inner.left, arena).max(height(&inner.right, arena)),
    }
}

/// Splits an already-detached leaf's lines at `rel` into two fresh leaves,
/// wired into the sibling chain where the old leaf used to sit.
fn split_leaf_at(old: LeafData, rel: usize, arena: &mut LeafArena) -> Internal {
    let mut left_lines = old.lines;
    let right_lines = left_lines.split_off(rel);
    let left_count = left_lines.len();
    let right_count = right_lines.len();

    let left_id = arena.insert(LeafData {
        lines: left_lines,
        prev: old.prev,
        next: None,
    });
    let right_id = arena.insert(LeafData {
        lines: right_lines,
        prev: None,
        next: old.next,
    });
    arena.get_mut(left_id).next = Some(right_id);
    arena.get_mut(right_id).prev = Some(left_id);
    if let Some(p) = old.prev {
        arena.get_mut(p).next = Some(left_id);
    }
    if let Some(n) = old.next {
        arena.get_mut(n).prev = Some(right_id);
    }

    Internal {
        left: Node::Leaf(left_id),
        right: Node::Leaf(right_id),
        line_count: left_count + right_count,
    }
}

fn rotate_left(node: &mut Node, arena: &LeafArena) {
    let mut old = match std::mem::replace(node, Node::Leaf(LeafId::MAX)) {
        Node::Internal(inner) => *inner,
        other => {
            *node = other;
            return;
        }
    };
    let mut right = match std::mem::replace(&mut old.right, Node::Leaf(LeafId::MAX)) {
        Node::Internal(inner) => *inner,
        other => {
            old.right = other;
            *node = Node::Internal(Box::new(old));
            return;
        }
    };
    old.right = std::mem::replace(&mut right.left, Node::Leaf(LeafId::MAX));
    old.line_count = count(&old.left, arena) + count(&old.right, arena);
    right.left = Node::Internal(Box::new(old));
    right.line_count = count(&right.left, arena) + count(&right.right, arena);
    *node = Node::Internal(Box::new(right));
}

fn rotate_right(node: &mut Node, arena: &LeafArena) {
    let mut old = match std::mem::replace(node, Node::Leaf(LeafId::MAX)) {
        Node::Internal(inner) => *inner,
        other => {
            *node = other;
            return;
        }
    };
    let mut left = match std::mem::replace(&mut old.left, Node::Leaf(LeafId::MAX)) {
        Node::Internal(inner) => *inner,
        other => {
            old.left = other;
            *node = Node::Internal(Box::new(old));
            return;
        }
    };
    old.left = std::mem::replace(&mut left.right, Node::Leaf(LeafId::MAX));
    old.line_count = count(&old.left, arena) + count(&old.right, arena);
    left.right = Node::Internal(Box::new(old));
    left.line_count = count(&left.left, arena) + count(&left.right, arena);
    *node = Node::Internal(Box::new(left));
}

fn rebalance_node(node: &mut Node, arena: &LeafArena) {
    let (lh, rh) = match node {
        Node::Internal(inner) => (height(&inner.left, arena), height(&inner.right, arena)),
        Node::Leaf(_) => return,
    };
    if lh > rh + 1 {
        rotate_right(node, arena);
    } else if rh > lh + 1 {
        rotate_left(node, arena);
    }
}

fn maybe_collapse(node: &mut Node, arena: &mut LeafArena) {
    let (left_empty, right_empty) = match node {
        Node::Internal(inner) => (
            matches!(&inner.left, Node::Leaf(id) if arena.get(*id).lines.is_empty()),
            matches!(&inner.right, Node::Leaf(id) if arena.get(*id).lines.is_empty()),
        ),
        Node::Leaf(_) => return,
    };
    if left_empty && !right_empty {
        collapse(node, true, arena);
    } else if right_empty && !left_empty {
        collapse(node, false, arena);
    } else if let Node::Internal(inner) = node {
        inner.line_count = count(&inner.left, arena) + count(&inner.right, arena);
    }
}

/// Removes the empty leaf on the named side and replaces the whole
/// intermediate node with the surviving subtree, rewiring the removed
/// leaf's former neighbors to each other.
fn collapse(node: &mut Node, empty_is_left: bool, arena: &mut LeafArena) {
    let surviving = {
        let inner = match node {
            Node::Internal(inner) => inner,
            Node::Leaf(_) => unreachable!("collapse called on a leaf"),
        };
        let (empty_child, surviving_child) = if empty_is_left {
            (&inner.left, &mut inner.right)
        } else {
            (&inner.right, &mut inner.left)
        };
        let empty_id = match empty_child {
            Node::Leaf(id) => *id,
            Node::Internal(_) => unreachable!("merge-up target must be a leaf"),
        };
        let removed = arena.remove(empty_id);
        if let Some(p) = removed.prev {
            arena.get_mut(p).next = removed.next;
        }
        if let Some(n) = removed.next {
            arena.get_mut(n).prev = removed.prev;
        }
        std::mem::replace(surviving_child, Node::Leaf(LeafId::MAX))
    };
    *node = surviving;
}

fn nth_line_rec(node: &Node, abs_start: usize, row: usize, arena: &LeafArena) -> Option<Vec<u8>> {
    match node {
        Node::Leaf(id) => {
            let leaf = arena.get(*id);
            let rel = row.checked_sub(abs_start)?;
            leaf.lines.get(rel).cloned()
        }
        Node::Internal(inner) => {
            let left_count = count(&inner.left, arena);
            if row < abs_start + left_count {
                nth_line_rec(&inner.left, abs_start, row, arena)
            } else {
                nth_line_rec(&inner.right, abs_start + left_count, row, arena)
            }
        }
    }
}

fn split_rec(node: &mut Node, abs_start: usize, line_idx: usize, arena: &mut LeafArena) -> bool {
    match node {
        Node::Leaf(id) => {
            let len = arena.get(*id).lines.len();
            let leaf_end = abs_start + len;
            if line_idx <= abs_start || line_idx >= leaf_end {
                return false;
            }
            let rel = line_idx - abs_start;
            let old = arena.remove(*id);
            *node = Node::Internal(Box::new(split_leaf_at(old, rel, arena)));
            true
        }
        Node::Internal(inner) => {
            let left_count = count(&inner.left, arena);
            let left_end = abs_start + left_count;
            if line_idx < left_end {
                split_rec(&mut inner.left, abs_start, line_idx, arena)
            } else {
                split_rec(&mut inner.right, left_end, line_idx, arena)
            }
        }
    }
}

fn insert_rec(
    node: &mut Node,
    abs_start: usize,
    row: usize,
    col: usize,
    snippet: &[u8],
    arena: &mut LeafArena,
    threshold: usize,
) -> Result<(), CoreError> {
    match node {
        Node::Leaf(id) => {
            if arena.get(*id).lines.is_empty() {
                if row != abs_start || col != 0 {
                    return Err(CoreError::OutOfRange);
                }
                arena.get_mut(*id).lines.push(Vec::new());
            }

            let len = arena.get(*id).lines.len();
            if row < abs_start || row >= abs_start + len {
                return Err(CoreError::OutOfRange);
            }
            let rel = row - abs_start;
            let line_len = arena.get(*id).lines[rel].len();
            if col > line_len {
                return Err(CoreError::OutOfRange);
            }

            let mut widened = arena.get(*id).lines[rel].clone();
            widened.splice(col..col, snippet.iter().copied());

            let mut produced: Vec<Vec<u8>> = Vec::new();
            let mut start = 0;
            for pos in memchr::memchr_iter(b'\n', &widened) {
                produced.push(widened[start..pos].to_vec());
                start = pos + 1;
            }
            produced.push(widened[start..].to_vec());

            arena.get_mut(*id).lines.splice(rel..=rel, produced);

            let new_len = arena.get(*id).lines.len();
            if new_len > threshold {
                let old = arena.remove(*id);
                let mid = old.lines.len() / 2;
                *node = Node::Internal(Box::new(split_leaf_at(old, mid, arena)));
            }
            Ok(())
        }
        Node::Internal(inner) => {
            let left_count = count(&inner.left, arena);
            let left_end = abs_start + left_count;
            if row < left_end {
                insert_rec(&mut inner.left, abs_start, row, col, snippet, arena, threshold)?;
            } else {
                insert_rec(&mut inner.right, left_end, row, col, snippet, arena, threshold)?;
            }
            inner.line_count = count(&inner.left, arena) + count(&inner.right, arena);
            rebalance_node(node, arena);
            Ok(())
        }
    }
}

fn remove_char_rec(
    node: &mut Node,
    abs_start: usize,
    row: usize,
    col: usize,
    arena: &mut LeafArena,
) -> Result<u8, CoreError> {
    match node {
        Node::Leaf(id) => {
            let len = arena.get(*id).lines.len();
            if row < abs_start || row >= abs_start + len {
                return Err(CoreError::OutOfRange);
            }
            let rel = row - abs_start;
            let line = &mut arena.get_mut(*id).lines[rel];
            if col >= line.len() {
                return Err(CoreError::OutOfRange);
            }
            Ok(line.remove(col))
        }
        Node::Internal(inner) => {
            let left_count = count(&inner.left, arena);
            let left_end = abs_start + left_count;
            if row < left_end {
                remove_char_rec(&mut inner.left, abs_start, row, col, arena)
            } else {
                remove_char_rec(&mut inner.right, left_end, row, col, arena)
            }
        }
    }
}

fn remove_slice_rec(
    node: &mut Node,
    abs_start: usize,
    row: usize,
    col: usize,
    len: usize,
    arena: &mut LeafArena,
) -> Result<Vec<u8>, CoreError> {
    match node {
        Node::Leaf(id) => {
            let leaf_len = arena.get(*id).lines.len();
            if row < abs_start || row >= abs_start + leaf_len {
                return Err(CoreError::OutOfRange);
            }
            let rel = row - abs_start;
            let line = &mut arena.get_mut(*id).lines[rel];
            let end = col.checked_add(len).ok_or(CoreError::OutOfRange)?;
            if end > line.len() {
                return Err(CoreError::OutOfRange);
            }
            Ok(line.drain(col..end).collect())
        }
        Node::Internal(inner) => {
            let left_count = count(&inner.left, arena);
            let left_end = abs_start + left_count;
            if row < left_end {
                remove_slice_rec(&mut inner.left, abs_start, row, col, len, arena)
            } else {
                remove_slice_rec(&mut inner.right, left_end, row, col, len, arena)
            }
        }
    }
}

fn replace_rec(
    node: &mut Node,
    abs_start: usize,
    start_row: usize,
    end_row: usize,
    new_lines: &[Vec<u8>],
    arena: &mut LeafArena,
    threshold: usize,
) -> Option<Vec<Vec<u8>>> {
    match node {
        Node::Leaf(id) => {
            let leaf_len = arena.get(*id).lines.len();
            let leaf_end = abs_start + leaf_len;
            if start_row < abs_start || end_row > leaf_end {
                return None;
            }
            let rel_start = start_row - abs_start;
            let rel_end = end_row - abs_start;
            let removed: Vec<Vec<u8>> = arena
                .get_mut(*id)
                .lines
                .splice(rel_start..rel_end, new_lines.iter().cloned())
                .collect();

            let new_len = arena.get(*id).lines.len();
            if new_len > threshold {
                let old = arena.remove(*id);
                let mid = old.lines.len() / 2;
                *node = Node::Internal(Box::new(split_leaf_at(old, mid, arena)));
            }
            Some(removed)
        }
        Node::Internal(inner) => {
            let left_count = count(&inner.left, arena);
            let left_end = abs_start + left_count;
            let removed = if end_row <= left_end {
                replace_rec(&mut inner.left, abs_start, start_row, end_row, new_lines, arena, threshold)?
            } else if start_row >= left_end {
                replace_rec(&mut inner.right, left_end, start_row, end_row, new_lines, arena, threshold)?
            } else {
                return None;
            };
            maybe_collapse(node, arena);
            if let Node::Internal(inner) = node {
                inner.line_count = count(&inner.left, arena) + count(&inner.right, arena);
            }
            rebalance_node(node, arena);
            Some(removed)
        }
    }
}

impl LineTree {
    /// Builds an empty tree (zero lines) splitting leaves past `unit_break_threshold` lines.
    pub fn new(unit_break_threshold: usize) -> Self {
        Self::from_lines(Vec::new(), unit_break_threshold)
    }

    /// Bulk-builds a tree from already-split lines, chunked into
    /// `unit_break_threshold`-sized leaves and assembled bottom-up.
    /// Used by file load and by [`LineTree::balance`]'s full rebuild path.
    pub fn from_lines(lines: Vec<Vec<u8>>, unit_break_threshold: usize) -> Self {
        let mut tree = Self {
            root: Node::Leaf(LeafId::MAX),
            arena: LeafArena::default(),
            unit_break_threshold: unit_break_threshold.max(1),
        };
        tree.rebuild_from_lines(lines);
        tree
    }

    fn rebuild_from_lines(&mut self, lines: Vec<Vec<u8>>) {
        self.arena.clear();
        if lines.is_empty() {
            let id = self.arena.insert(LeafData::new(Vec::new()));
            self.root = Node::Leaf(id);
            return;
        }

        let mut leaf_ids: Vec<LeafId> = Vec::new();
        for chunk in lines.chunks(self.unit_break_threshold) {
            let id = self.arena.insert(LeafData::new(chunk.to_vec()));
            leaf_ids.push(id);
        }
        for (i, &id) in leaf_ids.iter().enumerate() {
            let prev = if i == 0 { None } else { Some(leaf_ids[i - 1]) };
            let next = leaf_ids.get(i + 1).copied();
            let data = self.arena.get_mut(id);
            data.prev = prev;
            data.next = next;
        }

        let mut level: Vec<Node> = leaf_ids.into_iter().map(Node::Leaf).collect();
        while level.len() > 1 {
            let mut next_level = Vec::with_capacity(level.len().div_ceil(2));
            let mut it = level.into_iter();
            while let Some(left) = it.next() {
                if let Some(right) = it.next() {
                    let line_count = count(&left, &self.arena) + count(&right, &self.arena);
                    next_level.push(Node::Internal(Box::new(Internal { left, right, line_count })));
                } else {
                    next_level.push(left);
                }
            }
            level = next_level;
        }
        self.root = level.into_iter().next().expect("non-empty level");
    }

    pub fn line_count(&self) -> usize {
        count(&self.root, &self.arena)
    }

    pub fn unit_break_threshold(&self) -> usize {
        self.unit_break_threshold
    }

    pub fn nth_line(&self, row: usize) -> Option<Vec<u8>> {
        nth_line_rec(&self.root, 0, row, &self.arena)
    }

    pub fn line_len(&self, row: usize) -> Option<usize> {
        self.nth_line(row).map(|l| l.len())
    }

    /// Splits the leaf containing `line_idx` at that exact line boundary.
    /// No-op (`Ok(false)`) if `line_idx` lands outside the tree or on a
    /// leaf boundary already.
    pub fn split(&mut self, line_idx: usize) -> bool {
        split_rec(&mut self.root, 0, line_idx, &mut self.arena)
    }

    pub fn insert(&mut self, row: usize, col: usize, snippet: &[u8]) -> Result<(), CoreError> {
        insert_rec(&mut self.root, 0, row, col, snippet, &mut self.arena, self.unit_break_threshold)
    }

    pub fn remove_char(&mut self, row: usize, col: usize) -> Result<u8, CoreError> {
        remove_char_rec(&mut self.root, 0, row, col, &mut self.arena)
    }

    pub fn remove_slice(&mut self, row: usize, col: usize, len: usize) -> Result<Vec<u8>, CoreError> {
        remove_slice_rec(&mut self.root, 0, row, col, len, &mut self.arena)
    }

    pub fn replace_lines(
        &mut self,
        start_row: usize,
        end_row: usize,
        new_lines: Vec<Vec<u8>>,
    ) -> Result<Vec<Vec<u8>>, CoreError> {
        if start_row > end_row || end_row > self.line_count() {
            return Err(CoreError::OutOfRange);
        }
        if let Some(removed) =
            replace_rec(&mut self.root, 0, start_row, end_row, &new_lines, &mut self.arena, self.unit_break_threshold)
        {
            return Ok(removed);
        }

        // Range spans more than one leaf: fall back to a full flatten + rebuild.
        let mut all: Vec<Vec<u8>> = self.iter().map(|l| l.to_vec()).collect();
        let removed: Vec<Vec<u8>> = all.splice(start_row..end_row, new_lines).collect();
        self.rebuild_from_lines(all);
        Ok(removed)
    }

    pub fn insert_line(&mut self, row: usize, content: Vec<u8>) -> Result<(), CoreError> {
        self.replace_lines(row, row, vec![content])?;
        Ok(())
    }

    pub fn delete_line(&mut self, row: usize) -> Result<Vec<u8>, CoreError> {
        let end = row.checked_add(1).ok_or(CoreError::OutOfRange)?;
        let mut removed = self.replace_lines(row, end, Vec::new())?;
        Ok(removed.pop().unwrap_or_default())
    }

    /// Merges line `row + 1` into line `row`. Returns the column at which
    /// the merge happened (the pre-merge length of line `row`), which is
    /// the memory a `MergeLine` command needs to invert itself.
    pub fn merge_line(&mut self, row: usize) -> Result<usize, CoreError> {
        let top = self.nth_line(row).ok_or(CoreError::OutOfRange)?;
        let bottom = self.nth_line(row + 1).ok_or(CoreError::OutOfRange)?;
        let split_point = top.len();
        let mut merged = top;
        merged.extend_from_slice(&bottom);
        self.replace_lines(row, row + 2, vec![merged])?;
        Ok(split_point)
    }

    /// Divides line `row` into two at `col`. Equivalent to inserting a
    /// single newline byte, which is exactly what pressing Enter does.
    pub fn split_line(&mut self, row: usize, col: usize) -> Result<(), CoreError> {
        self.insert(row, col, b"\n")
    }

    /// Removes one byte at `col - 1` (if `col > 0`) or merges the line
    /// into its predecessor (if `col == 0` and `row > 0`). Returns the
    /// cursor position after the removal.
    pub fn backspace(&mut self, row: usize, col: usize) -> Result<(usize, usize), CoreError> {
        if col > 0 {
            self.remove_char(row, col - 1)?;
            Ok((row, col - 1))
        } else if row > 0 {
            let join_col = self.merge_line(row - 1)?;
            Ok((row - 1, join_col))
        } else {
            Err(CoreError::OutOfRange)
        }
    }

    /// Removes the inclusive byte range `start..=end`, which may span
    /// lines, returning the removed text joined by `\n`.
    pub fn remove_range(&mut self, start: (usize, usize), end: (usize, usize)) -> Result<Vec<u8>, CoreError> {
        if start > end {
            return Err(CoreError::OutOfRange);
        }
        let (r1, c1) = start;
        let (r2, c2) = end;
        if r1 == r2 {
            return self.remove_slice(r1, c1, c2 - c1 + 1);
        }

        let first = self.nth_line(r1).ok_or(CoreError::OutOfRange)?;
        let last = self.nth_line(r2).ok_or(CoreError::OutOfRange)?;
        if c1 > first.len() || c2 >= last.len() {
            return Err(CoreError::OutOfRange);
        }

        let mut removed_text = first[c1..].to_vec();
        for mid in (r1 + 1)..r2 {
            removed_text.push(b'\n');
            removed_text.extend_from_slice(&self.nth_line(mid).ok_or(CoreError::OutOfRange)?);
        }
        removed_text.push(b'\n');
        removed_text.extend_from_slice(&last[..=c2]);

        let mut merged = first[..c1].to_vec();
        merged.extend_from_slice(&last[c2 + 1..]);
        self.replace_lines(r1, r2 + 1, vec![merged])?;
        Ok(removed_text)
    }

    pub fn clear(&mut self) {
        self.rebuild_from_lines(Vec::new());
    }

    /// Rebalances the whole tree by rotation. A property test asserts
    /// this is idempotent and content-preserving.
    pub fn balance(&mut self) {
        fn go(node: &mut Node, arena: &LeafArena) {
            if let Node::Internal(inner) = node {
                go(&mut inner.left, arena);
                go(&mut inner.right, arena);
                inner.line_count = count(&inner.left, arena) + count(&inner.right, arena);
            }
            rebalance_node(node, arena);
        }
        go(&mut self.root, &self.arena);
    }

    fn leftmost_leaf_id(&self) -> LeafId {
        fn go(node: &Node) -> LeafId {
            match node {
                Node::Leaf(id) => *id,
                Node::Internal(inner) => go(&inner.left),
            }
        }
        go(&self.root)
    }

    fn rightmost_leaf_id(&self) -> LeafId {
        fn go(node: &Node) -> LeafId {
            match node {
                Node::Leaf(id) => *id,
                Node::Internal(inner) => go(&inner.right),
            }
        }
        go(&self.root)
    }

    pub fn iter(&self) -> LineIter<'_> {
        let leaf = self.leftmost_leaf_id();
        iter::new_forward(self, leaf)
    }

    pub fn iter_rev(&self) -> LineIterRev<'_> {
        let leaf = self.rightmost_leaf_id();
        iter::new_reverse(self, leaf)
    }

    pub(crate) fn leaf_len(&self, id: LeafId) -> usize {
        self.arena.get(id).lines.len()
    }

    pub(crate) fn leaf_line(&self, id: LeafId, idx: usize) -> &[u8] {
        &self.arena.get(id).lines[idx]
    }

    pub(crate) fn leaf_prev(&self, id: LeafId) -> Option<LeafId> {
        self.arena.get(id).prev
    }

    pub(crate) fn leaf_next(&self, id: LeafId) -> Option<LeafId> {
        self.arena.get(id).next
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, line) in self.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(line);
        }
        out
    }

    /// Validates every invariant from the data model: aggregate line
    /// counts, the per-leaf threshold, and sibling-chain symmetry.
    pub fn integrity_check(&self) -> Result<(), CoreError> {
        fn go(node: &Node, arena: &LeafArena, threshold: usize) -> Result<usize, CoreError> {
            match node {
                Node::Leaf(id) => {
                    let leaf = arena.get(*id);
                    if leaf.lines.len() > threshold {
                        return Err(CoreError::InvariantViolation("leaf exceeds unit_break_threshold"));
                    }
                    Ok(leaf.lines.len())
                }
                Node::Internal(inner) => {
                    let left_n = go(&inner.left, arena, threshold)?;
                    let right_n = go(&inner.right, arena, threshold)?;
                    if inner.line_count != left_n + right_n {
                        return Err(CoreError::InvariantViolation("line_count aggregate mismatch"));
                    }
                    Ok(left_n + right_n)
                }
            }
        }
        go(&self.root, &self.arena, self.unit_break_threshold)?;

        let mut forward = 0usize;
        let mut cur = Some(self.leftmost_leaf_id());
        while let Some(id) = cur {
            forward += 1;
            cur = self.arena.get(id).next;
        }
        let mut backward = 0usize;
        let mut cur = Some(self.rightmost_leaf_id());
        while let Some(id) = cur {
            backward += 1;
            cur = self.arena.get(id).prev;
        }
        if forward != backward {
            return Err(CoreError::InvariantViolation("sibling chain length mismatch"));
        }
        Ok(())
    }
}

impl std::fmt::Display for LineTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(words: &[&str]) -> Vec<Vec<u8>> {
        words.iter().map(|w| w.as_bytes().to_vec()).collect()
    }

    #[test]
    fn empty_tree_has_zero_lines() {
        let t = LineTree::new(8);
        assert_eq!(t.line_count(), 0);
        assert!(t.integrity_check().is_ok());
    }

    #[test]
    fn insert_into_empty_buffer() {
        let mut t = LineTree::new(8);
        t.insert(0, 0, b"hello").unwrap();
        assert_eq!(t.line_count(), 1);
        assert_eq!(t.nth_line(0).unwrap(), b"hello");
    }

    #[test]
    fn insert_with_embedded_newline_splits_line() {
        let mut t = LineTree::new(8);
        t.insert(0, 0, b"hello").unwrap();
        t.insert(0, 5, b"\nworld").unwrap();
        assert_eq!(t.line_count(), 2);
        assert_eq!(t.nth_line(0).unwrap(), b"hello");
        assert_eq!(t.nth_line(1).unwrap(), b"world");
    }

    #[test]
    fn leaf_splits_past_threshold() {
        let mut t = LineTree::from_lines(lines(&["a", "b", "c"]), 2);
        assert!(t.integrity_check().is_ok());
        t.insert_line(3, b"d".to_vec()).unwrap();
        assert!(t.integrity_check().is_ok());
        assert_eq!(t.line_count(), 4);
    }

    #[test]
    fn explicit_split_at_boundary_is_noop() {
        let mut t = LineTree::from_lines(lines(&["a", "b", "c"]), 8);
        assert!(!t.split(0));
        assert!(!t.split(3));
        assert!(t.split(1));
        assert_eq!(t.nth_line(0).unwrap(), b"a");
        assert_eq!(t.nth_line(1).unwrap(), b"b");
    }

    #[test]
    fn backspace_merges_across_leaves_until_one_leaf_remains() {
        // Scenario 2 from the spec's end-to-end tests.
        let mut t = LineTree::from_lines(lines(&["aa", "bb", "cc", "dd"]), 8);
        t.split(2);
        t.split(1);
        t.split(3);
        assert!(t.integrity_check().is_ok());

        t.backspace(2, 0).unwrap();
        t.backspace(2, 0).unwrap();
        t.backspace(1, 0).unwrap();

        assert_eq!(t.line_count(), 1);
        assert_eq!(t.nth_line(0).unwrap(), b"aabbccdd");
        assert!(t.integrity_check().is_ok());
    }

    #[test]
    fn remove_range_across_lines() {
        // Scenario 3 from the spec's end-to-end tests.
        let mut t = LineTree::from_lines(lines(&["hello", "world of anger", "bye"]), 8);
        let removed = t.remove_range((1, 1), (1, 5)).unwrap();
        assert_eq!(removed, b"orld ");
        assert_eq!(t.nth_line(1).unwrap(), b"wof anger");
        assert_eq!(t.nth_line(0).unwrap(), b"hello");
        assert_eq!(t.nth_line(2).unwrap(), b"bye");
    }

    #[test]
    fn remove_range_spanning_lines_merges_and_deletes() {
        let mut t = LineTree::from_lines(lines(&["abc", "def", "ghi"]), 8);
        let removed = t.remove_range((0, 1), (2, 1)).unwrap();
        assert_eq!(removed, b"bc\ndef\ngh");
        assert_eq!(t.line_count(), 1);
        assert_eq!(t.nth_line(0).unwrap(), b"ai");
    }

    #[test]
    fn delete_line_removes_whole_row() {
        let mut t = LineTree::from_lines(lines(&["a", "b", "c"]), 8);
        let removed = t.delete_line(1).unwrap();
        assert_eq!(removed, b"b");
        assert_eq!(t.line_count(), 2);
        assert_eq!(t.nth_line(1).unwrap(), b"c");
    }

    #[test]
    fn iteration_forward_and_reverse_are_mirrors() {
        let t = LineTree::from_lines(lines(&["a", "b", "c", "d"]), 2);
        let fwd: Vec<Vec<u8>> = t.iter().map(|l| l.to_vec()).collect();
        let mut rev: Vec<Vec<u8>> = t.iter_rev().map(|l| l.to_vec()).collect();
        rev.reverse();
        assert_eq!(fwd, rev);
        assert_eq!(fwd, lines(&["a", "b", "c", "d"]));
    }

    #[test]
    fn balance_is_idempotent_and_preserves_content() {
        let mut t = LineTree::from_lines((0..200).map(|i| i.to_string().into_bytes()).collect(), 4);
        t.balance();
        let before = t.to_bytes();
        t.balance();
        let after = t.to_bytes();
        assert_eq!(before, after);
        assert!(t.integrity_check().is_ok());
    }

    #[test]
    fn large_document_load() {
        let n = 1_000_000usize;
        let lines: Vec<Vec<u8>> = (0..n).map(|i| format!("line {i}").into_bytes()).collect();
        let t = LineTree::from_lines(lines, 512);
        assert_eq!(t.line_count(), n);
        assert_eq!(t.nth_line(500_000).unwrap(), b"line 500000");
    }

    #[test]
    fn revert_of_insert_restores_prior_state() {
        let mut t = LineTree::from_lines(lines(&["hello"]), 8);
        let before = t.to_bytes();
        t.insert(0, 5, b" world").unwrap();
        t.remove_slice(0, 5, 6).unwrap();
        assert_eq!(t.to_bytes(), before);
    }
}
