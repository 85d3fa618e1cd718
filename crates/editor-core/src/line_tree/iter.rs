//! Forward and reverse whole-line iteration over the leaf sibling chain.
//!
//! Neither iterator touches the tree structure; both just walk
//! `prev`/`next` links starting from the leftmost or rightmost leaf,
//! skipping leaves that happen to be empty (which can occur transiently
//! mid-edit but never after `integrity_check` passes on a non-collapsed
//! subtree).

use super::{LeafId, LineTree};

pub struct LineIter<'a> {
    tree: &'a LineTree,
    leaf: Option<LeafId>,
    idx: usize,
}

pub(super) fn new_forward(tree: &LineTree, start: LeafId) -> LineIter<'_> {
    LineIter {
        tree,
        leaf: Some(start),
        idx: 0,
    }
}

impl<'a> Iterator for LineIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.leaf?;
            let len = self.tree.leaf_len(id);
            if self.idx < len {
                let line = self.tree.leaf_line(id, self.idx);
                self.idx += 1;
                return Some(line);
            }
            self.leaf = self.tree.leaf_next(id);
            self.idx = 0;
        }
    }
}

pub struct LineIterRev<'a> {
    tree: &'a LineTree,
    leaf: Option<LeafId>,
    idx: usize,
}

pub(super) fn new_reverse(tree: &LineTree, start: LeafId) -> LineIterRev<'_> {
    let idx = tree.leaf_len(start);
    LineIterRev {
        tree,
        leaf: Some(start),
        idx,
    }
}

impl<'a> Iterator for LineIterRev<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.leaf?;
            if self.idx == 0 {
                self.leaf = self.tree.leaf_prev(id);
                self.idx = match self.leaf {
                    Some(prev) => self.tree.leaf_len(prev),
                    None => 0,
                };
                continue;
            }
            self.idx -= 1;
            return Some(self.tree.leaf_line(id, self.idx));
        }
    }
}
