//! Wires the buffer primitives in `editor-core` to an open file: cursor
//! geometry, selection, search, undo/redo dispatch, and the atomic
//! save/load/watch cycle. `renderer` turns the result into decorated
//! bytes; this crate owns deciding *what* to render.
//!
//! `TextView` is the single entry point: an input layer (out of scope)
//! decodes keystrokes into [`Action`]s and calls `TextView::dispatch`.

pub mod action;
pub mod config;
pub mod document;

pub use action::Action;
pub use config::{Config, KeyChord, KeyMap};
pub use document::TextView;
