//! Character-Offset String Utilities
//!
//! Selections arrive from the host as character offsets, while Rust strings
//! are sliced by byte. These helpers convert between the two and provide the
//! small run-counting primitives the chunk operations are built from.
//!
//! # Problem
//! Characters like `ø`, `æ`, `å`, `中`, `🎉` are multi-byte in UTF-8.
//! A host that reports "selection starts at character 5" must never cause a
//! slice in the middle of one of them.
//!
//! # Example
//! ```ignore
//! use crate::string_utils::split_at_chars;
//!
//! let (before, selection, after) = split_at_chars("Hei på deg", 4, 6);
//! assert_eq!(selection, "på");
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Index Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Number of characters (Unicode scalar values) in `s`.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Convert a character index to a byte index.
///
/// Returns the string length if `char_index` is beyond the string.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Clamp and order a pair of character offsets against `s`.
///
/// Both bounds are clamped to `[0, char_len(s)]`; a reversed pair is swapped.
pub fn clamp_char_range(s: &str, start: usize, end: usize) -> (usize, usize) {
    let len = char_len(s);
    let (start, end) = (start.min(len), end.min(len));
    if start > end {
        (end, start)
    } else {
        (start, end)
    }
}

/// Split `s` into `(before, middle, after)` at two character offsets.
///
/// Offsets are clamped with [`clamp_char_range`], so this never panics.
pub fn split_at_chars(s: &str, start: usize, end: usize) -> (&str, &str, &str) {
    let (start, end) = clamp_char_range(s, start, end);
    let start_byte = char_index_to_byte_index(s, start);
    let end_byte = char_index_to_byte_index(s, end);
    (&s[..start_byte], &s[start_byte..end_byte], &s[end_byte..])
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Endings
// ─────────────────────────────────────────────────────────────────────────────

/// Move a character offset that falls between `\r` and `\n` past the pair.
pub fn step_out_of_crlf(s: &str, char_index: usize) -> usize {
    let byte = char_index_to_byte_index(s, char_index);
    if s[..byte].ends_with('\r') && s[byte..].starts_with('\n') {
        char_index + 1
    } else {
        char_index
    }
}

/// Normalize `\r\n` and lone `\r` line endings into `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Runs
// ─────────────────────────────────────────────────────────────────────────────

/// Count how many times `ch` repeats at the start of `s`.
pub fn leading_run(s: &str, ch: char) -> usize {
    s.chars().take_while(|&c| c == ch).count()
}

/// Count how many times `ch` repeats at the end of `s`.
pub fn trailing_run(s: &str, ch: char) -> usize {
    s.chars().rev().take_while(|&c| c == ch).count()
}

/// Remove up to `count` trailing occurrences of `ch` from `s`.
pub fn pop_trailing(s: &mut String, ch: char, count: usize) {
    for _ in 0..count {
        if s.ends_with(ch) {
            s.pop();
        } else {
            break;
        }
    }
}

/// Remove up to `count` leading occurrences of `ch` from `s`.
pub fn drain_leading(s: &mut String, ch: char, count: usize) {
    let n = leading_run(s, ch).min(count);
    // `ch` repeated `n` times is `n * len_utf8` bytes long
    s.drain(..n * ch.len_utf8());
}

/// Byte length of the leading whitespace of `s`.
pub fn leading_whitespace_len(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

/// Byte length of the trailing whitespace of `s`.
pub fn trailing_whitespace_len(s: &str) -> usize {
    s.len() - s.trim_end().len()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
