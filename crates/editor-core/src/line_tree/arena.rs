//! Stable-index arena for leaf payloads.
//!
//! The ownership tree (see [`super::Node`]) never stores a leaf's bytes
//! directly; it stores a [`LeafId`], a cheap `Copy` token into this arena.
//! Rotations change which `Node` owns which subtree but never change which
//! leaf is adjacent to which in in-order traversal, so sibling links keyed
//! by `LeafId` survive rotation without being touched. Only operations that
//! change leaf adjacency (split, merge-up) rewire `prev`/`next`.

pub type LeafId = usize;

#[derive(Debug, Clone)]
pub struct LeafData {
    pub lines: Vec<Vec<u8>>,
    pub prev: Option<LeafId>,
    pub next: Option<LeafId>,
}

impl LeafData {
    pub fn new(lines: Vec<Vec<u8>>) -> Self {
        Self {
            lines,
            prev: None,
            next: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct LeafArena {
    slots: Vec<Option<LeafData>>,
    free: Vec<LeafId>,
}

impl LeafArena {
    pub fn insert(&mut self, data: LeafData) -> LeafId {
        if let Some(id) = self.free.pop() {
            self.slots[id] = Some(data);
            id
        } else {
            self.slots.push(Some(data));
            self.slots.len() - 1
        }
    }

    pub fn remove(&mut self, id: LeafId) -> LeafData {
        let data = self.slots[id].take().expect("double free of leaf id");
        self.free.push(id);
        data
    }

    pub fn get(&self, id: LeafId) -> &LeafData {
        self.slots[id].as_ref().expect("dangling leaf id")
    }

    pub fn get_mut(&mut self, id: LeafId) -> &mut LeafData {
        self.slots[id].as_mut().expect("dangling leaf id")
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
