//! Composes one visible terminal line: syntax tokens, selection
//! highlighting, and search-term highlighting layered over the raw line
//! bytes, then clipped to the viewport's `[h_scroll, h_scroll + cols)`
//! visible-column window.
//!
//! This is the renderer's read path for `TextView::draw_line` — it owns
//! no state of its own; the caller (editor-state) supplies the line,
//! its tokenizer markers, and the viewport/selection/search context.

use editor_core::{tokenize, Category, Marker};
use std::collections::HashSet;

use crate::style::{category_escape, HIGHLIGHT_OFF, HIGHLIGHT_ON};
use crate::visible_width::{visible_char_count, visible_str_slice};

/// Everything needed to render one line's visible, decorated bytes.
pub struct LineRenderInput<'a> {
    pub line: &'a [u8],
    pub keywords: &'a HashSet<String>,
    /// Byte column range `[start, end)` of this line's portion of the
    /// active selection, if any.
    pub selection: Option<(usize, usize)>,
    pub search_term: Option<&'a [u8]>,
    pub h_scroll: usize,
    pub cols: usize,
}

fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<(usize, usize)> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    let mut hits = Vec::new();
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if &haystack[i..i + needle.len()] == needle {
            hits.push((i, i + needle.len()));
            i += needle.len();
        } else {
            i += 1;
        }
    }
    hits
}

fn category_at(markers: &[Marker], pos: usize) -> Category {
    markers
        .iter()
        .rev()
        .find(|m| m.pos <= pos)
        .map(|m| m.category)
        .unwrap_or(Category::Reset)
}

fn highlighted_at(pos: usize, selection: Option<(usize, usize)>, hits: &[(usize, usize)]) -> bool {
    if let Some((s, e)) = selection {
        if pos >= s && pos < e {
            return true;
        }
    }
    hits.iter().any(|&(s, e)| pos >= s && pos < e)
}

/// Builds the fully decorated (but not yet viewport-clipped) byte string
/// for one line: syntax coloring plus selection/search reverse video.
fn decorate(input: &LineRenderInput) -> Vec<u8> {
    let markers = tokenize(input.line, input.keywords);
    let hits = input
        .search_term
        .map(|term| find_all(input.line, term))
        .unwrap_or_default();

    let mut out = Vec::with_capacity(input.line.len() + 16);
    let mut active_category: Option<Category> = None;
    let mut highlighted = false;

    for (pos, &byte) in input.line.iter().enumerate() {
        let want_highlight = highlighted_at(pos, input.selection, &hits);
        let want_category = category_at(&markers, pos);

        if want_highlight != highlighted {
            if want_highlight {
                out.extend_from_slice(HIGHLIGHT_ON.as_bytes());
            } else {
                out.extend_from_slice(HIGHLIGHT_OFF.as_bytes());
                out.extend_from_slice(category_escape(want_category).as_bytes());
                active_category = Some(want_category);
            }
            highlighted = want_highlight;
        }

        if !highlighted && active_category != Some(want_category) {
            out.extend_from_slice(category_escape(want_category).as_bytes());
            active_category = Some(want_category);
        }

        out.push(byte);
    }

    if highlighted {
        out.extend_from_slice(HIGHLIGHT_OFF.as_bytes());
    }
    out.extend_from_slice(category_escape(Category::Reset).as_bytes());
    out
}

/// Writes the already-decorated, viewport-clipped visible representation
/// of `input.line` into `out`. Writes nothing if `h_scroll` is at or past
/// the line's visible width.
pub fn draw_line(out: &mut Vec<u8>, input: &LineRenderInput) {
    let decorated = decorate(input);
    let total = visible_char_count(&decorated);
    if input.h_scroll >= total {
        return;
    }
    let count = input.cols.min(total - input.h_scroll);
    if count == 0 {
        return;
    }
    let (start, end) = visible_str_slice(&decorated, input.h_scroll, count);
    out.extend_from_slice(&decorated[start..=end]);
}
