//! Markdown Patterns
//!
//! Compiled-once regular expressions shared by the chunk primitives and the
//! formatting rules, plus the splice helpers that apply them to a `String`.
//!
//! Every match result is consumed through explicit captures; nothing here
//! keeps "last match" state between calls.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Compilation
// ─────────────────────────────────────────────────────────────────────────────

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("built-in markdown pattern should compile"))
}

macro_rules! pattern {
    ($(#[$meta:meta])* $name:ident, $re:expr) => {
        $(#[$meta])*
        pub fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            cached(&RE, $re)
        }
    };
}

macro_rules! tag_pattern {
    ($(#[$meta:meta])* $name:ident, $re:expr) => {
        $(#[$meta])*
        pub fn $name() -> &'static TagPattern {
            static TAG: OnceLock<TagPattern> = OnceLock::new();
            TAG.get_or_init(|| TagPattern::new($re).expect("built-in tag pattern should compile"))
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Tag Patterns
// ─────────────────────────────────────────────────────────────────────────────

/// A markup pattern that can be matched at either edge of a chunk segment.
///
/// `TextChunk::set_tags` needs the same pattern anchored to the end of one
/// segment and to the start of the next, so both anchored forms are compiled
/// up front.
#[derive(Debug, Clone)]
pub struct TagPattern {
    source: String,
    leading: Regex,
    trailing: Regex,
}

impl TagPattern {
    /// Compile `pattern` into its start-anchored and end-anchored forms.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            source: pattern.to_string(),
            leading: Regex::new(&format!("^(?:{})", pattern))?,
            trailing: Regex::new(&format!("(?:{})$", pattern))?,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matches only at the start of the haystack.
    pub fn leading(&self) -> &Regex {
        &self.leading
    }

    /// Matches only at the end of the haystack.
    pub fn trailing(&self) -> &Regex {
        &self.trailing
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Splice Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Remove the first match of `re` from `text` and return it.
///
/// Returns `None` when nothing matched or the match was empty.
pub fn take_first(text: &mut String, re: &Regex) -> Option<String> {
    let range = re.find(text)?.range();
    if range.is_empty() {
        return None;
    }
    let taken = text[range.clone()].to_string();
    text.replace_range(range, "");
    Some(taken)
}

/// Replace the first match of `re` in `text` with the closure's output.
///
/// Returns whether a match was found.
pub fn replace_first<F>(text: &mut String, re: &Regex, replace: F) -> bool
where
    F: FnOnce(&Captures) -> String,
{
    let (range, replacement) = {
        let Some(caps) = re.captures(text) else {
            return false;
        };
        let Some(whole) = caps.get(0) else {
            return false;
        };
        (whole.range(), replace(&caps))
    };
    text.replace_range(range, &replacement);
    true
}

/// Text of capture group `index`, or `""` when it did not participate.
pub fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map(|m| m.as_str()).unwrap_or("")
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Structure
// ─────────────────────────────────────────────────────────────────────────────

pattern!(
    /// A line that opens a block construct and must never be re-flowed:
    /// indented code, quote, bullet, ordered marker, heading, rule or
    /// setext characters, or a reference definition.
    block_marker_prefix,
    r"^(?:\s{4,}|\s*>|\s*-\s+|\s*[0-9]+\.|=|\+|-|_|\*|#|\s*\[[^\]\n]+\]:)"
);

pattern!(
    /// Two consecutive line breaks with text on both sides.
    loose_separator,
    r"[^\n]\n\n[^\n]"
);

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

tag_pattern!(
    /// A list marker at the boundary between `before` and `selection`.
    list_marker_tag,
    r"(?:\n|^)*[ ]{0,3}(?:[*+-]|[0-9]+[.])\s+"
);

pattern!(
    /// The contiguous block of list items that ends `before`.
    previous_list_items,
    r"(?:\n|^)[ ]{0,3}(?:[*+-]|[0-9]+[.])[ \t]+.*(?:\n.+|\n{2,}(?:[*+-].*|[0-9]+[.])[ \t]+.*|\n{2,}[ \t]+\S.*)*\n*$"
);

pattern!(
    /// The contiguous block of list items that starts `after`.
    next_list_items,
    r"^\n*[ ]{0,3}(?:[*+-]|[0-9]+[.])[ \t]+.*(?:\n.+|\n{2,}(?:[*+-].*|[0-9]+[.])[ \t]+.*|\n{2,}[ \t]+\S.*)*\n*"
);

pattern!(
    /// A list marker at the start of any line inside a list block.
    item_marker_line,
    r"(?m)^[ ]{0,3}(?:[*+-]|[0-9]+[.])[ \t]"
);

pattern!(
    /// Captures the bullet character of the first item in a block.
    leading_bullet,
    r"^\s*([*+-])"
);

pattern!(
    /// An ordered marker anywhere in a tag.
    ordered_marker,
    r"[0-9]+[.]"
);

// ─────────────────────────────────────────────────────────────────────────────
// Headings
// ─────────────────────────────────────────────────────────────────────────────

tag_pattern!(atx_open_tag, r"#+[ ]*");

tag_pattern!(atx_close_tag, r"[ ]+#+");

tag_pattern!(
    /// A setext underline on the line following the selection.
    setext_underline_tag,
    r"\n?(?:=+|-+)[ \t]*(?m:$)"
);

// ─────────────────────────────────────────────────────────────────────────────
// Blockquotes
// ─────────────────────────────────────────────────────────────────────────────

pattern!(quote_marker_tail, r">[ \t]*$");

pattern!(blank_quote_selection, r"^(?:\s|>)+$");

pattern!(
    /// The quoted block (with its blank lines) that ends `before`.
    quoted_block_tail,
    r"(?:(?:\n|^)(?:\n[ \t]*)*>(?:.+\n)*.*)+(?:\n[ \t]*)*$"
);

pattern!(
    /// The quoted block (with its blank lines) that starts `after`.
    quoted_block_head,
    r"^(?:(?:\n|^)(?:\n[ \t]*)*>(?:.+\n)*.*)+(?:\n[ \t]*)*"
);

pattern!(blank_lines_at_tag_end, r"\n((?:>|\s)*)\n$");

pattern!(blank_lines_at_tag_start, r"^\n((?:>|\s)*)\n");

pattern!(blank_quote_line, r"(?m)^[ ]{0,3}>?[ \t]*$");

pattern!(quote_line_start, r"^[ ]{0,3}>");

pattern!(quote_prefix, r"(?m)^[ ]{0,3}> ?");

pattern!(starts_with_quote, r"^\n?[ ]{0,3}>");

pattern!(ends_with_quote_line, r"(?:\n|^)[ ]{0,3}>.*$");

pattern!(leading_quote_mark, r"^> *");

// ─────────────────────────────────────────────────────────────────────────────
// Code
// ─────────────────────────────────────────────────────────────────────────────

pattern!(four_spaces_tail, r"[ ]{4}$");

pattern!(indented_line_before, r"(?:^|\n)(?:\t|[ ]{4,}).*\n$");

pattern!(indented_line_after, r"^\n(?:\t|[ ]{4,})");

pattern!(unindented_line, r"(?m)^[ ]{0,3}\S");

pattern!(four_space_prefix, r"(?m)^[ ]{4}");

tag_pattern!(backtick_tag, r"`");

// ─────────────────────────────────────────────────────────────────────────────
// Links
// ─────────────────────────────────────────────────────────────────────────────

tag_pattern!(link_open_tag, r"\s*!?\[");

tag_pattern!(link_close_tag, r"\][ ]?(?:\n[ ]*)?(?:\[.*?\])?");

pattern!(link_open_bracket, r"!?\[");

pattern!(
    /// A reference definition line: id, url, and an optional title that may
    /// sit on the following line. Group 3 holds blank lines that separate a
    /// would-be title from the url.
    reference_definition,
    r#"(?m)^[ ]{0,3}\[([0-9]+)\]:[ \t]*\n?[ \t]*<?(\S+?)>?[ \t]*\n?[ \t]*(?:(\n*)(["(].+?[")])[ \t]*)?(?:\n+|$)"#
);

pattern!(
    /// A reference-style link or image: `[text][id]`, nested brackets allowed.
    reference_link,
    r"(\[(?:\[[^\]]*\]|[^\[\]])*\][ ]?(?:\n[ ]*)?\[)([0-9]+)(\])"
);

pattern!(
    /// A url typed into the prompt with an optional title.
    prompt_answer,
    r#"^\s*<?(\S+?)>?(?:\s+["'(](.+?)["')])?\s*$"#
);

// ─────────────────────────────────────────────────────────────────────────────
// Auto-indent
// ─────────────────────────────────────────────────────────────────────────────

pattern!(empty_list_item_tail, r"(?:\n|^)[ ]{0,3}(?:[*+-]|[0-9]+[.])[ \t]*\n$");

pattern!(empty_quote_tail, r"(?:\n|^)[ ]{0,3}>[ \t]*\n$");

pattern!(blank_indent_tail, r"(?:\n|^)[ \t]+\n$");

pattern!(bullet_item_tail, r"(?:\n|^)[ ]{0,3}[*+-][ \t]+.*\n$");

pattern!(numbered_item_tail, r"(?:\n|^)[ ]{0,3}[0-9]+[.][ \t]+.*\n$");

pattern!(quote_line_tail, r"(?:\n|^)[ ]{0,3}>[ \t]+.*\n$");

pattern!(code_line_tail, r"(?:\n|^)(?:\t|[ ]{4,}).*\n$");

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtin_patterns_compile() {
        let _ = block_marker_prefix();
        let _ = previous_list_items();
        let _ = next_list_items();
        let _ = quoted_block_tail();
        let _ = quoted_block_head();
        let _ = reference_definition();
        let _ = reference_link();
        let _ = prompt_answer();
        let _ = list_marker_tag();
        let _ = setext_underline_tag();
        let _ = link_close_tag();
    }

    #[test]
    fn test_tag_pattern_anchors() {
        let tag = TagPattern::new(r"\*+").unwrap();
        assert!(tag.leading().is_match("**bold"));
        assert!(!tag.leading().is_match("bold**"));
        assert!(tag.trailing().is_match("bold**"));
        assert_eq!(tag.as_str(), r"\*+");
    }

    #[test]
    fn test_tag_pattern_rejects_invalid_regex() {
        assert!(TagPattern::new("(unclosed").is_err());
    }

    #[test]
    fn test_take_first() {
        let mut text = String::from("abc## ");
        let taken = take_first(&mut text, atx_open_tag().trailing());
        assert_eq!(taken.as_deref(), Some("## "));
        assert_eq!(text, "abc");
        assert_eq!(take_first(&mut text, atx_open_tag().trailing()), None);
    }

    #[test]
    fn test_replace_first_uses_captures() {
        let mut text = String::from("see [a][12] and [b][3]");
        let found = replace_first(&mut text, reference_link(), |caps| {
            format!("{}7{}", group(caps, 1), group(caps, 3))
        });
        assert!(found);
        assert_eq!(text, "see [a][7] and [b][3]");
    }

    #[test]
    fn test_block_marker_prefix() {
        for line in ["    code", "> quote", "- item", "12. item", "# h", "===", "  [1]: x"] {
            assert!(block_marker_prefix().is_match(line), "{line:?}");
        }
        for line in ["plain", "word - dash", "1 apple"] {
            assert!(!block_marker_prefix().is_match(line), "{line:?}");
        }
    }

    #[test]
    fn test_previous_list_items_spans_block() {
        let before = "para\n\n- a\n- b\n";
        let m = previous_list_items().find(before).unwrap();
        assert_eq!(m.as_str(), "\n- a\n- b\n");
    }

    #[test]
    fn test_next_list_items_stops_at_paragraph_gap() {
        let after = "\n1. a\n2. b\n\nplain";
        let m = next_list_items().find(after).unwrap();
        assert_eq!(m.as_str(), "\n1. a\n2. b\n\n");
    }

    #[test]
    fn test_quoted_block_tail() {
        let before = "intro\n\n> one\n> two\n";
        let m = quoted_block_tail().find(before).unwrap();
        assert_eq!(m.as_str(), "\n\n> one\n> two\n");
    }

    #[test]
    fn test_reference_definition_with_title() {
        let caps = reference_definition()
            .captures("  [4]: http://example.com \"Example\"\n")
            .unwrap();
        assert_eq!(group(&caps, 1), "4");
        assert_eq!(group(&caps, 2), "http://example.com");
        assert_eq!(group(&caps, 4), "\"Example\"");
    }

    #[test]
    fn test_setext_underline_tag() {
        assert!(setext_underline_tag().leading().is_match("\n====="));
        assert!(setext_underline_tag().leading().is_match("\n---\nmore"));
        assert!(!setext_underline_tag().leading().is_match("\n- item"));
    }
}
