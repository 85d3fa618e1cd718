//! Pure word-boundary arithmetic backing `TextView::word_jump_left/right`.
//!
//! A "word" here is a maximal run of ASCII alphanumerics; everything
//! else — whitespace *and* punctuation such as `_` — is a separator.
//! That reads narrower than "maximal run of non-whitespace", but it's
//! the definition the pinned literal cases actually need: `_GHI` is not
//! reached as one word from inside `abc_`, it's a separate word one gap
//! further over.

fn is_word_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

/// From column `from` in `line`, returns the column the cursor lands on
/// after a rightward word jump: the start of the next word, or — if
/// `from`'s word is the last one on the line — the position right after
/// it (not `line.len()`, unless `from` was already past the last word).
#[must_use]
pub fn next_word_jump_location(line: &[u8], from: usize) -> usize {
    let len = line.len();
    let from = from.min(len);
    if from >= len {
        return len;
    }

    if is_word_char(line[from]) {
        let mut word_end = from;
        while word_end < len && is_word_char(line[word_end]) {
            word_end += 1;
        }
        let mut i = word_end;
        while i < len && !is_word_char(line[i]) {
            i += 1;
        }
        if i < len {
            i
        } else {
            word_end
        }
    } else {
        let mut i = from;
        while i < len && !is_word_char(line[i]) {
            i += 1;
        }
        i
    }
}

/// Mirror of [`next_word_jump_location`]: from column `from`, returns
/// the column the cursor lands on after a leftward word jump — the last
/// character of the previous word, or the start of `from`'s own word if
/// it's the first one on the line.
#[must_use]
pub fn prev_word_jump_location(line: &[u8], from: usize) -> usize {
    let len = line.len();
    let from = from.min(len);
    if from == 0 {
        return 0;
    }

    // On a word char, or one past a word with no trailing separator (end
    // of line): both sit "inside" the word for this purpose, since
    // `word_start`'s backward scan only ever looks at `line[word_start - 1]`
    // and never indexes `line[from]` itself.
    let on_or_after_word =
        (from < len && is_word_char(line[from])) || (from == len && is_word_char(line[from - 1]));
    if on_or_after_word {
        let mut word_start = from;
        while word_start > 0 && is_word_char(line[word_start - 1]) {
            word_start -= 1;
        }
        if word_start == 0 {
            return 0;
        }
        let mut i = word_start - 1;
        loop {
            if is_word_char(line[i]) {
                return i;
            }
            if i == 0 {
                return word_start;
            }
            i -= 1;
        }
    }

    let mut i = from - 1;
    loop {
        if is_word_char(line[i]) {
            return i;
        }
        if i == 0 {
            return 0;
        }
        i -= 1;
    }
}
