//! Buffer-level primitives for the editor: the line storage tree, the
//! reversible command vocabulary that mutates it, undo/redo history, cursor
//! and selection state, and the per-line syntax tokenizer.
//!
//! Nothing in this crate knows about a terminal, a file on disk, or a
//! keymap — see `editor-state` for the component that wires these
//! primitives to an open document, and `io`/`renderer` for the I/O and
//! presentation layers.

pub mod command;
pub mod cursor;
pub mod error;
pub mod history;
pub mod keyword;
pub mod line_tree;
pub mod text_manipulator;
pub mod tokenizer;
pub mod word_jump;

pub use command::Command;
pub use cursor::{Cursor, Position};
pub use error::CoreError;
pub use history::{History, HistoryUnit};
pub use keyword::keyword_file_for_extension;
pub use line_tree::LineTree;
pub use text_manipulator::TextManipulator;
pub use tokenizer::{tokenize, Category, Marker};
pub use word_jump::{next_word_jump_location, prev_word_jump_location};
