//! Maps a file extension to the keyword-list language name used to load
//! `config/keywords/<language>`. Pure lookup table; no I/O, no state.
//!
//! Grounded in `original_source/config.h`'s `fileTypeAssociationMap`.

/// Returns the keyword-file language name for a file extension (without
/// the leading dot, e.g. `"cpp"`), or `None` if the extension has no
/// associated language.
#[must_use]
pub fn keyword_file_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "c" | "h" | "cpp" | "hpp" | "c++" => Some("c++"),
        "rb" => Some("ruby"),
        "hs" => Some("haskell"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_family_extensions_map_to_cpp() {
        for ext in ["c", "h", "cpp", "hpp", "c++"] {
            assert_eq!(keyword_file_for_extension(ext), Some("c++"));
        }
    }

    #[test]
    fn ruby_and_haskell_map_to_themselves() {
        assert_eq!(keyword_file_for_extension("rb"), Some("ruby"));
        assert_eq!(keyword_file_for_extension("hs"), Some("haskell"));
    }

    #[test]
    fn unknown_extension_has_no_language() {
        assert_eq!(keyword_file_for_extension("rs"), None);
        assert_eq!(keyword_file_for_extension(""), None);
    }
}
