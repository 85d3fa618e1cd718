//! Configuration the core accepts but never interprets beyond `tab_size`.
//!
//! `KeyMap` is an opaque, caller-supplied table from raw key chords to
//! [`crate::Action`]s; the input layer (out of scope) owns decoding
//! keystrokes through it. The core only stores and hands it back.

use std::collections::HashMap;

use crate::action::Action;

pub type KeyChord = String;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap(pub HashMap<KeyChord, Action>);

impl KeyMap {
    #[must_use]
    pub fn get(&self, chord: &str) -> Option<Action> {
        self.0.get(chord).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tab_size: usize,
    pub keymap: KeyMap,
}

impl Default for Config {
    fn default() -> Self {
        Self { tab_size: 2, keymap: KeyMap::default() }
    }
}
