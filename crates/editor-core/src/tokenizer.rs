//! Stateless per-line lexer producing ordered color-change markers.
//!
//! Recognized in priority order: double-quoted strings, single-quoted
//! strings, decimal integer runs, identifier words (promoted to
//! `Category::Keyword` when present in the caller's keyword set), and
//! parenthesis/brace punctuation. Anything else falls back to plain text
//! and emits no marker of its own — the preceding reset (or start-of-line)
//! stays in effect until the next recognized token.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Keyword,
    Identifier,
    Number,
    String,
    Punctuation,
    Reset,
}

/// "From this byte onward, the active category is `category`."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub pos: usize,
    pub category: Category,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Tokenizes `line`, promoting identifier runs present in `keywords` to
/// `Category::Keyword`. Always ends with a trailing `Category::Reset`
/// marker at `line.len()`.
pub fn tokenize(line: &[u8], keywords: &HashSet<String>) -> Vec<Marker> {
    let mut markers = Vec::new();
    let mut i = 0;
    let len = line.len();

    while i < len {
        let b = line[i];
        match b {
            b'"' => {
                let start = i;
                i += 1;
                while i < len && line[i] != b'"' {
                    i += 1;
                }
                if i < len {
                    i += 1; // consume closing quote
                }
                markers.push(Marker { pos: start, category: Category::String });
                markers.push(Marker { pos: i, category: Category::Reset });
            }
            b'\'' => {
                let start = i;
                i += 1;
                while i < len && line[i] != b'\'' {
                    i += 1;
                }
                if i < len {
                    i += 1;
                }
                markers.push(Marker { pos: start, category: Category::String });
                markers.push(Marker { pos: i, category: Category::Reset });
            }
            b'0'..=b'9' => {
                let start = i;
                while i < len && line[i].is_ascii_digit() {
                    i += 1;
                }
                markers.push(Marker { pos: start, category: Category::Number });
                markers.push(Marker { pos: i, category: Category::Reset });
            }
            _ if is_ident_start(b) => {
                let start = i;
                while i < len && is_ident_continue(line[i]) {
                    i += 1;
                }
                let word = &line[start..i];
                // A digit run directly abutting this word (e.g. the `for`
                // in `123for`) means the word doesn't actually start at a
                // separator; the digits and letters read as one glued-
                // together token, so it can't be a standalone keyword.
                let starts_at_boundary = start == 0 || !is_ident_continue(line[start - 1]);
                let category = if starts_at_boundary
                    && std::str::from_utf8(word).map(|w| keywords.contains(w)).unwrap_or(false)
                {
                    Category::Keyword
                } else {
                    Category::Identifier
                };
                markers.push(Marker { pos: start, category });
                markers.push(Marker { pos: i, category: Category::Reset });
            }
            b'(' | b')' | b'{' | b'}' => {
                markers.push(Marker { pos: i, category: Category::Punctuation });
                i += 1;
                markers.push(Marker { pos: i, category: Category::Reset });
            }
            _ => i += 1,
        }
    }

    if markers.last().map(|m| m.pos != len || m.category != Category::Reset).unwrap_or(true) {
        markers.push(Marker { pos: len, category: Category::Reset });
    }
    markers
}
