//! Maps [`editor_core::Category`] tokenizer markers to the SGR escape
//! sequence that begins that category's styling.

use editor_core::Category;

/// SGR sequence a marker's category switches the terminal to.
#[must_use]
pub fn category_escape(category: Category) -> &'static str {
    match category {
        Category::Keyword => "\x1b[1;36m",
        Category::Identifier => "\x1b[0m",
        Category::Number => "\x1b[33m",
        Category::String => "\x1b[32m",
        Category::Punctuation => "\x1b[35m",
        Category::Reset => "\x1b[0m",
    }
}

/// Selection/search-hit highlight: reverse video.
pub const HIGHLIGHT_ON: &str = "\x1b[7m";
pub const HIGHLIGHT_OFF: &str = "\x1b[27m";
