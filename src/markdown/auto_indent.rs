//! Auto-indent on Enter
//!
//! Runs after a line break has been inserted at the caret, so `before` ends
//! with `\n`. An empty list item, quote line or indented line ends its block;
//! a non-empty one is continued on the new line by re-running the matching
//! formatting rule with placeholder text suppressed.

use log::debug;

use crate::markdown::chunk::TextChunk;
use crate::markdown::formatting::{
    apply_format, continue_code_block, FormatContext, MarkdownFormatCommand, NoPrompt,
};
use crate::markdown::patterns;

/// What auto-indent did to the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIndent {
    /// An empty construct line was replaced by a paragraph break
    EndedBlock,
    /// The construct was continued with the given command
    Continued(MarkdownFormatCommand),
    /// The previous line opens nothing; the chunk is untouched
    Unchanged,
}

impl AutoIndent {
    /// Whether the chunk was modified.
    pub fn changed(&self) -> bool {
        !matches!(self, AutoIndent::Unchanged)
    }
}

/// Continue or close the construct on the line before the caret.
pub fn auto_indent(chunk: &mut TextChunk, ctx: &FormatContext) -> AutoIndent {
    let enders = [
        patterns::empty_list_item_tail(),
        patterns::empty_quote_tail(),
        patterns::blank_indent_tail(),
    ];
    for pattern in enders {
        if patterns::replace_first(&mut chunk.before, pattern, |_| "\n\n".to_string()) {
            debug!("Auto-indent ended a block");
            return AutoIndent::EndedBlock;
        }
    }

    let ctx = ctx.without_default_text();
    let command = if patterns::bullet_item_tail().is_match(&chunk.before) {
        MarkdownFormatCommand::UnorderedList
    } else if patterns::numbered_item_tail().is_match(&chunk.before) {
        MarkdownFormatCommand::OrderedList
    } else if patterns::quote_line_tail().is_match(&chunk.before) {
        MarkdownFormatCommand::Blockquote
    } else if patterns::code_line_tail().is_match(&chunk.before) {
        continue_code_block(chunk, &ctx);
        debug!("Auto-indent continued a code block");
        return AutoIndent::Continued(MarkdownFormatCommand::Code);
    } else {
        return AutoIndent::Unchanged;
    };

    apply_format(chunk, command, &ctx, &mut NoPrompt);
    debug!("Auto-indent continued '{}'", command);
    AutoIndent::Continued(command)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;

    /// Simulate Enter at the end of `text`.
    fn enter(text: &str) -> (String, (usize, usize), AutoIndent) {
        let typed = format!("{}\n", text);
        let len = typed.chars().count();
        let mut chunk = TextChunk::new(&typed, len, len);
        let locale = Locale::english();
        let outcome = auto_indent(&mut chunk, &FormatContext::new(&locale));
        (chunk.to_text(), chunk.selection_range(), outcome)
    }

    #[test]
    fn test_continues_bullet_list() {
        let (text, selection, outcome) = enter("- milk");
        assert_eq!(text, "- milk\n- ");
        assert_eq!(selection, (9, 9));
        assert_eq!(outcome, AutoIndent::Continued(MarkdownFormatCommand::UnorderedList));
    }

    #[test]
    fn test_continues_numbered_list() {
        let (text, selection, _) = enter("1. one\n2. two");
        assert_eq!(text, "1. one\n2. two\n3. ");
        assert_eq!(selection, (17, 17));
    }

    #[test]
    fn test_empty_item_ends_list() {
        let (text, _, outcome) = enter("- a\n- ");
        assert_eq!(text, "- a\n\n");
        assert_eq!(outcome, AutoIndent::EndedBlock);
    }

    #[test]
    fn test_continues_quote() {
        let (text, selection, outcome) = enter("> said");
        assert_eq!(text, "> said\n> ");
        assert_eq!(selection, (9, 9));
        assert_eq!(outcome, AutoIndent::Continued(MarkdownFormatCommand::Blockquote));
    }

    #[test]
    fn test_empty_quote_ends_block() {
        let (text, _, outcome) = enter("> said\n>");
        assert_eq!(text, "> said\n\n");
        assert_eq!(outcome, AutoIndent::EndedBlock);
    }

    #[test]
    fn test_continues_code_block() {
        let (text, selection, outcome) = enter("    let x = 1;");
        assert_eq!(text, "    let x = 1;\n    ");
        assert_eq!(selection, (19, 19));
        assert_eq!(outcome, AutoIndent::Continued(MarkdownFormatCommand::Code));
    }

    #[test]
    fn test_blank_indented_line_ends_code() {
        let (text, _, outcome) = enter("    code\n    ");
        assert_eq!(text, "    code\n\n");
        assert_eq!(outcome, AutoIndent::EndedBlock);
    }

    #[test]
    fn test_plain_line_unchanged() {
        let (text, _, outcome) = enter("just text");
        assert_eq!(text, "just text\n");
        assert!(!outcome.changed());
    }
}
