//! Terminal presentation layer: visible-width arithmetic over
//! ANSI-decorated byte strings, and the line-rendering composition that
//! layers syntax, selection, and search highlighting on top of it.
//!
//! This crate draws nothing to an actual terminal — it has no
//! dependency on a terminal backend. It produces the decorated bytes a
//! caller (the binary, out of scope here) writes to stdout.

pub mod line_render;
pub mod style;
pub mod visible_width;

pub use line_render::{draw_line, LineRenderInput};
pub use visible_width::{visible_char_count, visible_str_right_cut, visible_str_slice};
