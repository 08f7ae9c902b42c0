//! Text Chunk
//!
//! A [`TextChunk`] is a buffer split around the user's selection:
//!
//! ```text
//! before + start_tag + selection + end_tag + after
//! ```
//!
//! The tags hold markup that a rule has lifted off the selection boundary
//! (`**`, `## `, a list marker, ...). Reassembling the five strings always
//! yields the buffer; the primitives below only add or drop whitespace.

use crate::markdown::patterns::{self, TagPattern};
use crate::string_utils::{
    char_len, clamp_char_range, leading_run, leading_whitespace_len, normalize_line_endings,
    pop_trailing, split_at_chars, step_out_of_crlf, trailing_run, trailing_whitespace_len,
};

// ─────────────────────────────────────────────────────────────────────────────
// TextChunk
// ─────────────────────────────────────────────────────────────────────────────

/// A buffer decomposed around a selection.
///
/// Created fresh for every command from a selection snapshot, mutated in place
/// by exactly one rule, and discarded after [`TextChunk::to_text`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextChunk {
    /// Text strictly preceding the selection
    pub before: String,
    /// The selected text (may be empty)
    pub selection: String,
    /// Text strictly following the selection
    pub after: String,
    /// Markup between `before` and `selection`
    pub start_tag: String,
    /// Markup between `selection` and `after`
    pub end_tag: String,
    /// Viewport scroll position, passed through untouched
    pub scroll_top: f32,
}

impl TextChunk {
    /// Split `text` at the character offsets `start..end`.
    ///
    /// Offsets are clamped to the text and a reversed pair is swapped; line
    /// endings are normalized to `\n`. An offset between `\r` and `\n` is
    /// moved past the line break.
    pub fn new(text: &str, start: usize, end: usize) -> Self {
        let (start, end) = clamp_char_range(text, start, end);
        let (start, end) = (step_out_of_crlf(text, start), step_out_of_crlf(text, end));
        let (before, selection, after) = split_at_chars(text, start, end);
        Self {
            before: normalize_line_endings(before),
            selection: normalize_line_endings(selection),
            after: normalize_line_endings(after),
            ..Self::default()
        }
    }

    /// Attach the viewport scroll position.
    pub fn with_scroll_top(mut self, scroll_top: f32) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    /// Reassemble the buffer.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(
            self.before.len()
                + self.start_tag.len()
                + self.selection.len()
                + self.end_tag.len()
                + self.after.len(),
        );
        text.push_str(&self.before);
        text.push_str(&self.start_tag);
        text.push_str(&self.selection);
        text.push_str(&self.end_tag);
        text.push_str(&self.after);
        text
    }

    /// Character offsets of `selection` inside [`TextChunk::to_text`].
    pub fn selection_range(&self) -> (usize, usize) {
        let start = char_len(&self.before) + char_len(&self.start_tag);
        (start, start + char_len(&self.selection))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Primitives
    // ─────────────────────────────────────────────────────────────────────────

    /// Surround the selection with blank lines.
    ///
    /// Newlines at the edges of the selection move outward first, so the
    /// selection never begins or ends with one. Then a non-empty `before` is
    /// made to end with at least `lines_before + 1` newlines (one line break
    /// plus `lines_before` blank lines), and a non-empty `after` to start with
    /// at least `lines_after + 1`. With `find_extra` the existing run is
    /// replaced, so the count becomes exact.
    pub fn add_blank_lines(
        &mut self,
        lines_before: usize,
        lines_after: usize,
        find_extra: bool,
    ) -> &mut Self {
        let leading = leading_run(&self.selection, '\n');
        self.selection.drain(..leading);
        self.start_tag.push_str(&"\n".repeat(leading));

        let trailing = trailing_run(&self.selection, '\n');
        pop_trailing(&mut self.selection, '\n', trailing);
        self.end_tag.insert_str(0, &"\n".repeat(trailing));

        let leading = leading_run(&self.start_tag, '\n');
        self.start_tag.drain(..leading);
        self.before.push_str(&"\n".repeat(leading));

        let trailing = trailing_run(&self.end_tag, '\n');
        pop_trailing(&mut self.end_tag, '\n', trailing);
        self.after.insert_str(0, &"\n".repeat(trailing));

        if !self.before.is_empty() {
            let wanted = lines_before + 1;
            let present = trailing_run(&self.before, '\n');
            if find_extra {
                pop_trailing(&mut self.before, '\n', present);
                self.before.push_str(&"\n".repeat(wanted));
            } else if present < wanted {
                self.before.push_str(&"\n".repeat(wanted - present));
            }
        }

        if !self.after.is_empty() {
            let wanted = lines_after + 1;
            let present = leading_run(&self.after, '\n');
            if find_extra {
                self.after.drain(..present);
                self.after.insert_str(0, &"\n".repeat(wanted));
            } else if present < wanted {
                self.after.insert_str(0, &"\n".repeat(wanted - present));
            }
        }

        self
    }

    /// Lift markup off the selection boundary into the tags.
    ///
    /// `start` is matched at the end of `before` and at the start of
    /// `selection`; `end` at the end of `selection` and the start of `after`.
    /// Matched text keeps its document order inside the tag.
    pub fn set_tags(&mut self, start: Option<&TagPattern>, end: Option<&TagPattern>) -> &mut Self {
        if let Some(pattern) = start {
            let from_before =
                patterns::take_first(&mut self.before, pattern.trailing()).unwrap_or_default();
            let from_selection =
                patterns::take_first(&mut self.selection, pattern.leading()).unwrap_or_default();
            self.start_tag = format!("{}{}{}", from_before, self.start_tag, from_selection);
        }

        if let Some(pattern) = end {
            let from_selection =
                patterns::take_first(&mut self.selection, pattern.trailing()).unwrap_or_default();
            let from_after =
                patterns::take_first(&mut self.after, pattern.leading()).unwrap_or_default();
            self.end_tag = format!("{}{}{}", from_selection, self.end_tag, from_after);
        }

        self
    }

    /// Trim whitespace from both ends of the selection.
    ///
    /// Unless `discard` is set the whitespace is handed to the neighbours, so
    /// the buffer content is unchanged.
    pub fn trim_whitespace(&mut self, discard: bool) -> &mut Self {
        let leading = leading_whitespace_len(&self.selection);
        let head: String = self.selection.drain(..leading).collect();
        let trailing = trailing_whitespace_len(&self.selection);
        let tail = self.selection.split_off(self.selection.len() - trailing);

        if !discard {
            self.before.push_str(&head);
            self.after.insert_str(0, &tail);
        }

        self
    }

    /// Join soft-wrapped lines of the selection into paragraphs.
    ///
    /// A line break becomes a space unless it ends an empty line, precedes a
    /// blank line, or precedes a line that opens a block construct.
    pub fn unwrap(&mut self) -> &mut Self {
        self.selection = unwrap_lines(&self.selection);
        self
    }

    /// Re-flow the selection into lines of at most `line_length` characters.
    ///
    /// Lines that open a block construct are kept as they are. A single word
    /// longer than the limit gets a line of its own.
    pub fn wrap(&mut self, line_length: usize) -> &mut Self {
        self.unwrap();
        let width = line_length.max(1);
        let wrapped: Vec<String> = self
            .selection
            .split('\n')
            .map(|line| {
                if patterns::block_marker_prefix().is_match(line) {
                    line.to_string()
                } else {
                    fill_line(line, width)
                }
            })
            .collect();
        self.selection = wrapped.join("\n").trim_end().to_string();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn unwrap_lines(text: &str) -> String {
    let mut joined = String::with_capacity(text.len());
    let mut previous: Option<char> = None;

    for (index, ch) in text.char_indices() {
        let soft_break = ch == '\n'
            && previous.is_some_and(|p| p != '\n')
            && {
                let rest = &text[index + 1..];
                !rest.starts_with('\n') && !patterns::block_marker_prefix().is_match(rest)
            };

        joined.push(if soft_break { ' ' } else { ch });
        previous = Some(ch);
    }

    joined
}

/// Whether a line starting with `word` would open a block construct.
fn opens_block(word: &str) -> bool {
    patterns::block_marker_prefix().is_match(word)
}

/// Greedily fill one paragraph line.
///
/// Words are separated by single spaces. A continuation line never starts
/// with a word that would turn it into a block construct; the preceding word
/// is carried down with it instead.
fn fill_line(line: &str, width: usize) -> String {
    let body = line.trim_start_matches(' ');
    let indent = &line[..line.len() - body.len()];
    let words: Vec<&str> = body.split(' ').filter(|w| !w.is_empty()).collect();
    if words.is_empty() {
        return String::new();
    }

    let mut rows: Vec<Vec<&str>> = Vec::new();
    let mut row: Vec<&str> = Vec::new();
    let mut row_len = char_len(indent);

    for word in words {
        let word_len = char_len(word);
        if row.is_empty() || row_len + 1 + word_len <= width {
            if !row.is_empty() {
                row_len += 1;
            }
            row.push(word);
            row_len += word_len;
            continue;
        }

        let mut carried = vec![word];
        while row.len() > 1 && opens_block(carried[0]) {
            if let Some(last) = row.pop() {
                carried.insert(0, last);
            }
        }

        if opens_block(carried[0]) {
            // nothing left to carry; keep the word on this line
            row.extend(carried);
            row_len = row_width(&row) + char_len(indent) * usize::from(rows.is_empty());
            continue;
        }

        rows.push(std::mem::take(&mut row));
        row_len = row_width(&carried);
        row = carried;
    }
    rows.push(row);

    let mut filled = String::with_capacity(line.len() + rows.len());
    filled.push_str(indent);
    for (index, row) in rows.iter().enumerate() {
        if index > 0 {
            filled.push('\n');
        }
        filled.push_str(&row.join(" "));
    }
    filled
}

fn row_width(words: &[&str]) -> usize {
    words.iter().map(|w| char_len(w)).sum::<usize>() + words.len().saturating_sub(1)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, start: usize, end: usize) -> TextChunk {
        TextChunk::new(text, start, end)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_new_splits_at_char_offsets() {
        let c = chunk("Hei på deg", 4, 6);
        assert_eq!(c.before, "Hei ");
        assert_eq!(c.selection, "på");
        assert_eq!(c.after, " deg");
        assert!(c.start_tag.is_empty() && c.end_tag.is_empty());
    }

    #[test]
    fn test_new_clamps_and_swaps() {
        let c = chunk("abc", 9, 1);
        assert_eq!((c.before.as_str(), c.selection.as_str()), ("a", "bc"));
        assert_eq!(c.after, "");
    }

    #[test]
    fn test_new_normalizes_line_endings() {
        let c = chunk("a\r\nb\rc", 0, 6);
        assert_eq!(c.selection, "a\nb\nc");
    }

    #[test]
    fn test_new_moves_offsets_out_of_crlf() {
        let c = chunk("a\r\nb", 2, 2);
        assert_eq!((c.before.as_str(), c.after.as_str()), ("a\n", "b"));
        assert_eq!(c.to_text(), "a\nb");

        let c = chunk("x\r\ny\r\nz", 0, 5);
        assert_eq!(c.selection, "x\ny\n");
        assert_eq!(c.after, "z");
    }

    #[test]
    fn test_selection_range_counts_start_tag() {
        let mut c = chunk("one two", 4, 7);
        c.start_tag = "**".into();
        c.end_tag = "**".into();
        assert_eq!(c.to_text(), "one **two**");
        assert_eq!(c.selection_range(), (6, 9));
    }

    #[test]
    fn test_scroll_top_passes_through() {
        let c = chunk("x", 0, 1).with_scroll_top(42.5);
        assert_eq!(c.scroll_top, 42.5);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // add_blank_lines tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_add_blank_lines_pads_both_sides() {
        let mut c = chunk("para\nheading\nnext", 5, 12);
        c.add_blank_lines(1, 1, false);
        assert_eq!(c.to_text(), "para\n\nheading\n\nnext");
        assert_eq!(c.selection, "heading");
    }

    #[test]
    fn test_add_blank_lines_moves_selection_newlines_out() {
        let mut c = chunk("a\n\nb\n\nc", 1, 6);
        c.add_blank_lines(0, 0, false);
        assert_eq!(c.selection, "b");
        assert!(c.before.ends_with("\n\n"));
        assert!(c.after.starts_with("\n\n"));
        assert_eq!(c.to_text(), "a\n\nb\n\nc");
    }

    #[test]
    fn test_add_blank_lines_keeps_extra_without_find_extra() {
        let mut c = chunk("a\n\n\n\nb", 4, 4);
        c.add_blank_lines(1, 0, false);
        assert_eq!(c.before, "a\n\n\n");
    }

    #[test]
    fn test_add_blank_lines_find_extra_is_exact() {
        let mut c = chunk("a\n\n\n\nb", 4, 4);
        c.add_blank_lines(0, 0, true);
        assert_eq!(c.before, "a\n");
        assert_eq!(c.after, "\nb");
    }

    #[test]
    fn test_add_blank_lines_leaves_empty_sides() {
        let mut c = chunk("only", 0, 4);
        c.add_blank_lines(2, 2, true);
        assert_eq!(c.to_text(), "only");
    }

    #[test]
    fn test_add_blank_lines_counts_moved_newlines() {
        let mut c = chunk("\nonly\n", 0, 6);
        c.add_blank_lines(2, 2, true);
        assert_eq!(c.selection, "only");
        assert_eq!(c.before, "\n\n\n");
        assert_eq!(c.after, "\n\n\n");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // set_tags tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_set_tags_from_neighbours() {
        let stars = TagPattern::new(r"\*+").unwrap();
        let mut c = chunk("a **b** c", 4, 5);
        c.set_tags(Some(&stars), Some(&stars));
        assert_eq!(c.before, "a ");
        assert_eq!(c.start_tag, "**");
        assert_eq!(c.end_tag, "**");
        assert_eq!(c.after, " c");
        assert_eq!(c.to_text(), "a **b** c");
    }

    #[test]
    fn test_set_tags_from_selection() {
        let hashes = TagPattern::new(r"#+[ ]*").unwrap();
        let mut c = chunk("## Title", 0, 8);
        c.set_tags(Some(&hashes), None);
        assert_eq!(c.start_tag, "## ");
        assert_eq!(c.selection, "Title");
    }

    #[test]
    fn test_set_tags_keeps_document_order() {
        let ticks = TagPattern::new("`").unwrap();
        let mut c = chunk("x``y``z", 2, 5);
        c.set_tags(Some(&ticks), Some(&ticks));
        assert_eq!(c.start_tag, "``");
        assert_eq!(c.end_tag, "``");
        assert_eq!(c.to_text(), "x``y``z");
    }

    #[test]
    fn test_set_tags_none_is_noop() {
        let mut c = chunk("abc", 1, 2);
        c.set_tags(None, None);
        assert_eq!(c, chunk("abc", 1, 2));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // trim_whitespace tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_trim_whitespace_preserves_content() {
        let mut c = chunk("a  word \nb", 1, 9);
        c.trim_whitespace(false);
        assert_eq!(c.selection, "word");
        assert_eq!(c.to_text(), "a  word \nb");
    }

    #[test]
    fn test_trim_whitespace_discard() {
        let mut c = chunk("a  word \nb", 1, 9);
        c.trim_whitespace(true);
        assert_eq!(c.to_text(), "awordb");
    }

    #[test]
    fn test_trim_whitespace_all_blank() {
        let mut c = chunk("x   y", 1, 4);
        c.trim_whitespace(false);
        assert_eq!(c.selection, "");
        assert_eq!(c.to_text(), "x   y");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // unwrap tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_unwrap_joins_soft_breaks() {
        let mut c = chunk("one\ntwo\nthree", 0, 13);
        c.unwrap();
        assert_eq!(c.selection, "one two three");
    }

    #[test]
    fn test_unwrap_keeps_paragraphs_and_blocks() {
        let text = "one\n\ntwo\n- item\n> quote\n    code";
        let mut c = chunk(text, 0, text.len());
        c.unwrap();
        assert_eq!(c.selection, text);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // wrap tests
    // ─────────────────────────────────────────────────────────────────────────

    const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog and keeps \
running until the sun goes down behind the hills";

    #[test]
    fn test_wrap_respects_line_length() {
        for width in [1, 5, 10, 17, 40] {
            let mut c = chunk(PARAGRAPH, 0, PARAGRAPH.len());
            c.wrap(width);
            for line in c.selection.lines() {
                let single_word = !line.contains(' ');
                assert!(
                    char_len(line) <= width || single_word,
                    "width {width}: {line:?}"
                );
            }
        }
    }

    #[test]
    fn test_wrap_is_fixed_point() {
        for width in [3, 8, 12, 20, 40, 200] {
            let mut c = chunk(PARAGRAPH, 0, PARAGRAPH.len());
            c.wrap(width);
            let once = c.selection.clone();
            c.wrap(width);
            assert_eq!(c.selection, once, "width {width}");
        }
    }

    #[test]
    fn test_wrap_keeps_words_intact() {
        let mut c = chunk(PARAGRAPH, 0, PARAGRAPH.len());
        c.wrap(10);
        let words: Vec<&str> = c.selection.split_whitespace().collect();
        let expected: Vec<&str> = PARAGRAPH.split_whitespace().collect();
        assert_eq!(words, expected);
    }

    #[test]
    fn test_wrap_greedy_layout() {
        let mut c = chunk("aaa bbb ccc ddd", 0, 15);
        c.wrap(7);
        assert_eq!(c.selection, "aaa bbb\nccc ddd");
    }

    #[test]
    fn test_wrap_protects_block_lines() {
        let text = "- a list item that is far longer than the limit";
        let mut c = chunk(text, 0, text.len());
        c.wrap(10);
        assert_eq!(c.selection, text);
    }

    #[test]
    fn test_wrap_avoids_starting_line_with_marker() {
        let text = "pay 5 - 3 dollars";
        let mut c = chunk(text, 0, text.len());
        c.wrap(6);
        for line in c.selection.lines().skip(1) {
            assert!(!patterns::block_marker_prefix().is_match(line), "{line:?}");
        }
        let once = c.selection.clone();
        c.wrap(6);
        assert_eq!(c.selection, once);
    }

    #[test]
    fn test_wrap_trims_trailing_whitespace() {
        let mut c = chunk("word   \n\n", 0, 9);
        c.wrap(40);
        assert_eq!(c.selection, "word");
    }

    #[test]
    fn test_primitives_total_on_empty_input() {
        let mut c = TextChunk::new("", 0, 0);
        c.add_blank_lines(1, 1, true)
            .trim_whitespace(false)
            .unwrap()
            .wrap(0)
            .set_tags(Some(patterns::atx_open_tag()), Some(patterns::atx_close_tag()));
        assert_eq!(c.to_text(), "");
        assert_eq!(c.selection_range(), (0, 0));
    }
}
