//! Case folding that keeps char offsets stable.

/// Lowercase `text` one char at a time.
///
/// Chars whose lowercase form expands to several chars keep only the first,
/// so the n-th char of the result always corresponds to the n-th char of the
/// input.
pub(crate) fn fold(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Char offset of the byte offset `byte` in `text`.
pub(crate) fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
