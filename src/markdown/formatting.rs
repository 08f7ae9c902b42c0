//! Markdown Formatting Operations
//!
//! One rule per Markdown construct. Every rule works on a [`TextChunk`] and
//! only through its primitives and the shared patterns; there is no document
//! tree. Rules toggle: invoking one on text that already carries its markup
//! removes the markup (headings cycle through levels instead).
//!
//! # Supported Formatting Commands
//! - **Inline**: Strong, Emphasis, Code (backticks)
//! - **Links**: Links, Images (reference style, renumbered on every change)
//! - **Blocks**: Headings, Lists, Blockquote, Code (indented), Horizontal Rule
//!
//! # Usage
//! ```ignore
//! use crate::config::Locale;
//! use crate::markdown::formatting::{apply_raw_format, FormatContext, MarkdownFormatCommand, NoPrompt};
//!
//! let locale = Locale::english();
//! let ctx = FormatContext::new(&locale);
//! let result = apply_raw_format("a **b**", (4, 5), MarkdownFormatCommand::Strong, &ctx, &mut NoPrompt);
//! assert_eq!(result.text, "a b");
//! assert_eq!(result.selection, (2, 3));
//! ```

use log::debug;
use std::fmt;
use std::str::FromStr;

use crate::config::{CommandText, HeadingStyle, Locale, Settings};
use crate::error::{Error, Result};
use crate::markdown::chunk::TextChunk;
use crate::markdown::links::{self, LinkReferenceDefinition};
use crate::markdown::patterns::{self, group};
use crate::string_utils::{char_len, drain_leading, leading_run, pop_trailing, trailing_run};

// ─────────────────────────────────────────────────────────────────────────────
// Format Command Enum
// ─────────────────────────────────────────────────────────────────────────────

/// Markdown formatting commands that can be applied to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkdownFormatCommand {
    /// Strong emphasis (`**text**`)
    Strong,
    /// Emphasis (`*text*`)
    Em,
    /// Reference link (`[text][n]`)
    Link,
    /// Reference image (`![alt][n]`)
    Image,
    /// Blockquote (`> text`)
    Blockquote,
    /// Inline code span or indented code block
    Code,
    /// Numbered list
    OrderedList,
    /// Bulleted list
    UnorderedList,
    /// Cycle the heading level (none → 2 → 1 → none)
    Heading,
    /// Set an ATX heading of a fixed level 1-6
    HeadingLevel(u8),
    /// Horizontal rule (`----------`)
    HorizontalRule,
}

impl MarkdownFormatCommand {
    /// The default toolbar, in order.
    pub fn toolbar() -> &'static [MarkdownFormatCommand] {
        &[
            Self::Strong,
            Self::Em,
            Self::Link,
            Self::Blockquote,
            Self::Code,
            Self::Image,
            Self::OrderedList,
            Self::UnorderedList,
            Self::Heading,
            Self::HorizontalRule,
        ]
    }

    /// Identifier used in settings and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Em => "em",
            Self::Link => "a",
            Self::Image => "img",
            Self::Blockquote => "blockquote",
            Self::Code => "code",
            Self::OrderedList => "ol",
            Self::UnorderedList => "ul",
            Self::Heading => "h",
            Self::HeadingLevel(1) => "h1",
            Self::HeadingLevel(2) => "h2",
            Self::HeadingLevel(3) => "h3",
            Self::HeadingLevel(4) => "h4",
            Self::HeadingLevel(5) => "h5",
            Self::HeadingLevel(_) => "h6",
            Self::HorizontalRule => "hr",
        }
    }

    /// Letter pressed together with Ctrl (or Cmd) to run this command.
    pub fn shortcut(&self) -> char {
        match self {
            Self::Strong => 'b',
            Self::Em => 'i',
            Self::Link => 'l',
            Self::Image => 'g',
            Self::Blockquote => 'q',
            Self::Code => 'k',
            Self::OrderedList => 'o',
            Self::UnorderedList => 'u',
            Self::Heading => 'h',
            Self::HeadingLevel(level) => char::from(b'0' + (*level).clamp(1, 6)),
            Self::HorizontalRule => 'r',
        }
    }

    /// Get the keyboard shortcut label for this command.
    pub fn shortcut_label(&self) -> String {
        format!("Ctrl+{}", self.shortcut().to_ascii_uppercase())
    }

    /// Find the command bound to a shortcut letter.
    pub fn from_shortcut(key: char) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        match key {
            '1'..='6' => Some(Self::HeadingLevel(key as u8 - b'0')),
            _ => Self::toolbar().iter().copied().find(|c| c.shortcut() == key),
        }
    }

    fn text<'a>(&self, locale: &'a Locale) -> &'a CommandText {
        let commands = &locale.commands;
        match self {
            Self::Strong => &commands.strong,
            Self::Em => &commands.em,
            Self::Link => &commands.a,
            Self::Image => &commands.img,
            Self::Blockquote => &commands.blockquote,
            Self::Code => &commands.code,
            Self::OrderedList => &commands.ol,
            Self::UnorderedList => &commands.ul,
            Self::Heading | Self::HeadingLevel(_) => &commands.h,
            Self::HorizontalRule => &commands.hr,
        }
    }

    /// Localized toolbar label.
    pub fn label(&self, locale: &Locale) -> String {
        match self {
            Self::HeadingLevel(level) => format!("{} {}", self.text(locale).label, level),
            _ => self.text(locale).label.clone(),
        }
    }

    /// Localized tooltip text.
    pub fn title(&self, locale: &Locale) -> String {
        match self {
            Self::HeadingLevel(level) => format!(
                "{} {} ({})",
                self.text(locale).label,
                level,
                self.shortcut_label()
            ),
            _ => self.text(locale).title.clone(),
        }
    }
}

impl fmt::Display for MarkdownFormatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for MarkdownFormatCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let command = match s {
            "strong" => Self::Strong,
            "em" => Self::Em,
            "a" => Self::Link,
            "img" => Self::Image,
            "blockquote" => Self::Blockquote,
            "code" => Self::Code,
            "ol" => Self::OrderedList,
            "ul" => Self::UnorderedList,
            "h" => Self::Heading,
            "h1" => Self::HeadingLevel(1),
            "h2" => Self::HeadingLevel(2),
            "h3" => Self::HeadingLevel(3),
            "h4" => Self::HeadingLevel(4),
            "h5" => Self::HeadingLevel(5),
            "h6" => Self::HeadingLevel(6),
            "hr" => Self::HorizontalRule,
            other => return Err(Error::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a rule needs besides the chunk itself.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    /// Re-flow width for lists, quotes and setext underlines
    pub line_length: usize,
    /// Heading syntax written by [`MarkdownFormatCommand::Heading`]
    pub heading_style: HeadingStyle,
    /// Placeholder texts
    pub locale: &'a Locale,
    /// Leave an empty selection empty instead of inserting placeholder text
    pub prevent_default_text: bool,
}

impl<'a> FormatContext<'a> {
    /// Context with default settings.
    pub fn new(locale: &'a Locale) -> Self {
        Self {
            line_length: Settings::DEFAULT_LINE_LENGTH,
            heading_style: HeadingStyle::default(),
            locale,
            prevent_default_text: false,
        }
    }

    /// The same context with placeholder text suppressed.
    pub fn without_default_text(self) -> Self {
        Self {
            prevent_default_text: true,
            ..self
        }
    }

    fn placeholder(&self, text: &str) -> String {
        if self.prevent_default_text {
            String::new()
        } else {
            text.to_string()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Url Prompt
// ─────────────────────────────────────────────────────────────────────────────

/// What a url is being requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Link,
    Image,
}

impl LinkKind {
    /// Dialog heading for the prompt.
    pub fn dialog_title<'a>(&self, locale: &'a Locale) -> &'a str {
        match self {
            LinkKind::Link => &locale.insert_link,
            LinkKind::Image => &locale.insert_image,
        }
    }

    /// Label of the url field.
    pub fn field_label<'a>(&self, locale: &'a Locale) -> &'a str {
        match self {
            LinkKind::Link => &locale.link_url,
            LinkKind::Image => &locale.image_url,
        }
    }
}

/// Asks the user for a link or image url.
///
/// Returning `None` (or a blank answer) cancels the command and leaves the
/// buffer untouched. Any `FnMut(LinkKind) -> Option<String>` is a prompt.
pub trait UrlPrompt {
    fn request_url(&mut self, kind: LinkKind) -> Option<String>;
}

impl<F> UrlPrompt for F
where
    F: FnMut(LinkKind) -> Option<String>,
{
    fn request_url(&mut self, kind: LinkKind) -> Option<String> {
        self(kind)
    }
}

/// A prompt that always cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl UrlPrompt for NoPrompt {
    fn request_url(&mut self, _kind: LinkKind) -> Option<String> {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Format Result
// ─────────────────────────────────────────────────────────────────────────────

/// How a rule left the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatStatus {
    /// Markup was added (or rewritten)
    Applied,
    /// Existing markup was removed
    ToggledOff,
    /// The url prompt was cancelled; the chunk must be discarded
    Cancelled,
}

/// Result of applying a formatting command to a whole buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatResult {
    /// The new text after formatting
    pub text: String,
    /// New selection range (start, end) in character indices
    pub selection: (usize, usize),
    /// What the rule did
    pub status: FormatStatus,
}

impl FormatResult {
    /// Reassemble a chunk.
    pub fn from_chunk(chunk: &TextChunk, status: FormatStatus) -> Self {
        Self {
            text: chunk.to_text(),
            selection: chunk.selection_range(),
            status,
        }
    }

    /// Whether the buffer should be replaced with this result.
    pub fn is_applied(&self) -> bool {
        self.status != FormatStatus::Cancelled
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Run one command on a chunk.
pub fn apply_format(
    chunk: &mut TextChunk,
    command: MarkdownFormatCommand,
    ctx: &FormatContext,
    prompt: &mut dyn UrlPrompt,
) -> FormatStatus {
    let status = match command {
        MarkdownFormatCommand::Strong => strong_em(chunk, 2, &ctx.placeholder(&ctx.locale.strong_text)),
        MarkdownFormatCommand::Em => strong_em(chunk, 1, &ctx.placeholder(&ctx.locale.em_text)),
        MarkdownFormatCommand::Link => link_or_image(chunk, ctx, LinkKind::Link, prompt),
        MarkdownFormatCommand::Image => link_or_image(chunk, ctx, LinkKind::Image, prompt),
        MarkdownFormatCommand::Blockquote => blockquote(chunk, ctx),
        MarkdownFormatCommand::Code => code(chunk, ctx),
        MarkdownFormatCommand::OrderedList => list(chunk, ctx, true),
        MarkdownFormatCommand::UnorderedList => list(chunk, ctx, false),
        MarkdownFormatCommand::Heading => heading(chunk, ctx, None),
        MarkdownFormatCommand::HeadingLevel(level) => heading(chunk, ctx, Some(level.clamp(1, 6))),
        MarkdownFormatCommand::HorizontalRule => horizontal_rule(chunk),
    };
    debug!("Formatting command '{}' finished: {:?}", command, status);
    status
}

/// Apply a formatting command to a whole buffer.
///
/// # Arguments
/// * `text` - The full text content
/// * `selection` - Selection range (start, end) in character indices
/// * `command` - The formatting command to apply
///
/// # Returns
/// A `FormatResult` with the new text and selection. A cancelled command
/// returns the input unchanged.
pub fn apply_raw_format(
    text: &str,
    selection: (usize, usize),
    command: MarkdownFormatCommand,
    ctx: &FormatContext,
    prompt: &mut dyn UrlPrompt,
) -> FormatResult {
    let mut chunk = TextChunk::new(text, selection.0, selection.1);
    match apply_format(&mut chunk, command, ctx, prompt) {
        FormatStatus::Cancelled => FormatResult {
            text: text.to_string(),
            selection,
            status: FormatStatus::Cancelled,
        },
        status => FormatResult::from_chunk(&chunk, status),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Strong / Emphasis
// ─────────────────────────────────────────────────────────────────────────────

fn strong_em(chunk: &mut TextChunk, stars: usize, placeholder: &str) -> FormatStatus {
    chunk.trim_whitespace(false);
    chunk.selection = collapse_blank_lines(&chunk.selection);

    let stars_before = trailing_run(&chunk.before, '*');
    let stars_after = leading_run(&chunk.after, '*');
    let present = stars_before.min(stars_after);

    // `*` never strips an existing `**` pair
    if present >= stars && !(present == 2 && stars == 1) {
        pop_trailing(&mut chunk.before, '*', stars);
        drain_leading(&mut chunk.after, '*', stars);
        return FormatStatus::ToggledOff;
    }

    if chunk.selection.is_empty() && stars_after > 0 {
        // Caret sits just inside closing markers: step over them
        drain_leading(&mut chunk.after, '*', stars_after);
        let space = chunk
            .before
            .chars()
            .next_back()
            .filter(|c| c.is_whitespace());
        if let Some(space) = space {
            chunk.before.pop();
            chunk.before.push_str(&"*".repeat(stars_after));
            chunk.before.push(space);
        } else {
            chunk.before.push_str(&"*".repeat(stars_after));
        }
        return FormatStatus::Applied;
    }

    if chunk.selection.is_empty() {
        chunk.selection = placeholder.to_string();
    }

    let markup = if stars <= 1 { "*" } else { "**" };
    chunk.before.push_str(markup);
    chunk.after.insert_str(0, markup);
    FormatStatus::Applied
}

/// Collapse runs of newlines into a single newline.
fn collapse_blank_lines(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\n' && collapsed.ends_with('\n') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed
}

// ─────────────────────────────────────────────────────────────────────────────
// Links and Images
// ─────────────────────────────────────────────────────────────────────────────

fn link_or_image(
    chunk: &mut TextChunk,
    ctx: &FormatContext,
    kind: LinkKind,
    prompt: &mut dyn UrlPrompt,
) -> FormatStatus {
    chunk.trim_whitespace(false);
    chunk.set_tags(Some(patterns::link_open_tag()), Some(patterns::link_close_tag()));

    if char_len(&chunk.end_tag) > 1 {
        // Already a reference link: unlink and drop the orphaned definition
        patterns::take_first(&mut chunk.start_tag, patterns::link_open_bracket());
        chunk.end_tag.clear();
        links::add(chunk, None);
        return FormatStatus::ToggledOff;
    }

    if chunk.selection.contains("\n\n") {
        links::add(chunk, None);
        return FormatStatus::Applied;
    }

    let answer = prompt.request_url(kind);
    let Some(definition) = answer
        .as_deref()
        .and_then(LinkReferenceDefinition::from_prompt_answer)
    else {
        debug!("Url prompt cancelled");
        return FormatStatus::Cancelled;
    };

    // Brackets found around the selection are replaced; whitespace stays
    let spacing_len = chunk.start_tag.len() - chunk.start_tag.trim_start().len();
    let spacing = chunk.start_tag[..spacing_len].to_string();
    chunk.before.push_str(&spacing);
    chunk.start_tag.clear();
    chunk.end_tag.clear();

    let number = links::add(chunk, Some(definition));
    chunk.start_tag = match kind {
        LinkKind::Link => "[".to_string(),
        LinkKind::Image => "![".to_string(),
    };
    chunk.end_tag = format!("][{}]", number);

    if chunk.selection.is_empty() {
        chunk.selection = match kind {
            LinkKind::Link => ctx.locale.link_text.clone(),
            LinkKind::Image => ctx.locale.image_alt.clone(),
        };
    }
    FormatStatus::Applied
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

/// Hands out item markers while a list block is rewritten.
struct ItemNumbering {
    ordered: bool,
    bullet: char,
    next: usize,
}

impl ItemNumbering {
    fn new(ordered: bool) -> Self {
        Self {
            ordered,
            bullet: '-',
            next: 1,
        }
    }

    fn next_prefix(&mut self) -> String {
        if self.ordered {
            let prefix = format!("{}. ", self.next);
            self.next += 1;
            prefix
        } else {
            format!("{} ", self.bullet)
        }
    }

    /// Re-mark every item of a list block.
    fn prefix_items(&mut self, items: &str) -> String {
        patterns::item_marker_line()
            .replace_all(items, |_: &regex::Captures| self.next_prefix())
            .into_owned()
    }
}

fn list(chunk: &mut TextChunk, ctx: &FormatContext, ordered: bool) -> FormatStatus {
    let mut numbering = ItemNumbering::new(ordered);

    chunk.set_tags(Some(patterns::list_marker_tag()), None);

    // A marker that doesn't start its line is just text
    if !chunk.before.is_empty() && !chunk.before.ends_with('\n') && !chunk.start_tag.starts_with('\n')
    {
        let tag = std::mem::take(&mut chunk.start_tag);
        chunk.before.push_str(&tag);
    }

    if !chunk.start_tag.is_empty() {
        let has_digits = patterns::ordered_marker().is_match(&chunk.start_tag);

        chunk.start_tag.clear();
        chunk.selection = chunk.selection.replace("\n    ", "\n");
        chunk.unwrap();
        chunk.add_blank_lines(1, 1, false);

        if has_digits {
            patterns::replace_first(&mut chunk.after, patterns::next_list_items(), |caps| {
                numbering.prefix_items(group(caps, 0))
            });
        }

        if has_digits == ordered {
            return FormatStatus::ToggledOff;
        }
    }

    let mut lines_before = 1;
    patterns::replace_first(&mut chunk.before, patterns::previous_list_items(), |caps| {
        let items = group(caps, 0);
        if let Some(bullet) = patterns::leading_bullet()
            .captures(items)
            .and_then(|b| group(&b, 1).chars().next())
        {
            numbering.bullet = bullet;
        }
        lines_before = usize::from(patterns::loose_separator().is_match(items));
        numbering.prefix_items(items)
    });

    if chunk.selection.is_empty() {
        chunk.selection = if ctx.prevent_default_text {
            " ".to_string()
        } else {
            ctx.locale.list_item.clone()
        };
    }

    let prefix = numbering.next_prefix();

    let mut lines_after = 1;
    patterns::replace_first(&mut chunk.after, patterns::next_list_items(), |caps| {
        let items = group(caps, 0);
        lines_after = usize::from(patterns::loose_separator().is_match(items));
        numbering.prefix_items(items)
    });

    chunk.trim_whitespace(true);
    chunk.add_blank_lines(lines_before, lines_after, true);

    let indent = " ".repeat(char_len(&prefix));
    chunk.start_tag = prefix;
    chunk.wrap(ctx.line_length.saturating_sub(indent.len()));
    chunk.selection = chunk.selection.replace('\n', &format!("\n{}", indent));

    FormatStatus::Applied
}

// ─────────────────────────────────────────────────────────────────────────────
// Blockquote
// ─────────────────────────────────────────────────────────────────────────────

fn blockquote(chunk: &mut TextChunk, ctx: &FormatContext) -> FormatStatus {
    if chunk.selection.contains(|c: char| c != '\n') {
        let leading = leading_run(&chunk.selection, '\n');
        chunk.selection.drain(..leading);
        chunk.before.push_str(&"\n".repeat(leading));

        let trailing = trailing_run(&chunk.selection, '\n');
        pop_trailing(&mut chunk.selection, '\n', trailing);
        chunk.after.insert_str(0, &"\n".repeat(trailing));
    }

    if let Some(marker) = patterns::take_first(&mut chunk.before, patterns::quote_marker_tail()) {
        chunk.selection.insert_str(0, &marker);
    }

    if patterns::blank_quote_selection().is_match(&chunk.selection) {
        chunk.selection.clear();
    }
    if chunk.selection.is_empty() {
        chunk.selection = ctx.placeholder(&ctx.locale.blockquote);
    }

    if !chunk.before.is_empty() && !chunk.before.ends_with('\n') {
        chunk.before.push('\n');
    }
    if !chunk.after.is_empty() && !chunk.after.starts_with('\n') {
        chunk.after.insert(0, '\n');
    }

    // Neighbouring quoted blocks become the tags, so the new quote joins them
    if let Some(block) = patterns::take_first(&mut chunk.before, patterns::quoted_block_tail()) {
        chunk.start_tag = block;
    }
    if let Some(block) = patterns::take_first(&mut chunk.after, patterns::quoted_block_head()) {
        chunk.end_tag = block;
    }

    let quoting = chunk
        .selection
        .split('\n')
        .any(|line| !patterns::quote_line_start().is_match(line));

    if quoting {
        chunk.wrap(ctx.line_length.saturating_sub(2));
        chunk.selection = prefix_lines(&chunk.selection, "> ");
        replace_blanks_in_tags(chunk, true);
        chunk.add_blank_lines(1, 1, false);
    } else {
        chunk.selection = patterns::quote_prefix()
            .replace_all(&chunk.selection, "")
            .into_owned();
        chunk.unwrap();
        replace_blanks_in_tags(chunk, false);

        if !patterns::starts_with_quote().is_match(&chunk.selection) && !chunk.start_tag.is_empty() {
            let newlines = trailing_run(&chunk.start_tag, '\n').min(2);
            pop_trailing(&mut chunk.start_tag, '\n', newlines);
            chunk.start_tag.push_str("\n\n");
        }

        if !patterns::ends_with_quote_line().is_match(&chunk.selection) && !chunk.end_tag.is_empty() {
            drain_leading(&mut chunk.end_tag, '\n', 2);
            chunk.end_tag.insert_str(0, "\n\n");
        }
    }

    if !chunk.selection.contains('\n') {
        if let Some(marker) = patterns::take_first(&mut chunk.selection, patterns::leading_quote_mark()) {
            chunk.start_tag.push_str(&marker);
        }
    }

    if quoting {
        FormatStatus::Applied
    } else {
        FormatStatus::ToggledOff
    }
}

/// Quote (`"> "`) or clear the blank lines where a tag meets the selection.
fn replace_blanks_in_tags(chunk: &mut TextChunk, use_bracket: bool) {
    let replacement = if use_bracket { "> " } else { "" };
    let rewrite = |caps: &regex::Captures| {
        let blanks = patterns::blank_quote_line().replace_all(group(caps, 1), replacement);
        format!("\n{}\n", blanks)
    };

    if !chunk.start_tag.is_empty() {
        patterns::replace_first(&mut chunk.start_tag, patterns::blank_lines_at_tag_end(), rewrite);
    }
    if !chunk.end_tag.is_empty() {
        patterns::replace_first(&mut chunk.end_tag, patterns::blank_lines_at_tag_start(), rewrite);
    }
}

/// Put `prefix` in front of every line, empty ones included.
fn prefix_lines(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Code
// ─────────────────────────────────────────────────────────────────────────────

fn code(chunk: &mut TextChunk, ctx: &FormatContext) -> FormatStatus {
    if uses_code_span(chunk) {
        code_span(chunk, ctx)
    } else {
        code_block(chunk, ctx)
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with('\t') || line.starts_with("    ")
}

/// Whether the selection gets backticks rather than an indented block.
fn uses_code_span(chunk: &TextChunk) -> bool {
    if chunk.selection.contains('\n') {
        return false;
    }

    let before = chunk.before.strip_suffix('`').unwrap_or(&chunk.before);
    let after = chunk.after.strip_prefix('`').unwrap_or(&chunk.after);
    let adjoins_before = before.chars().next_back().is_some_and(|c| !c.is_whitespace());
    let adjoins_after = after.chars().next().is_some_and(|c| !c.is_whitespace());
    if adjoins_before || adjoins_after {
        return false;
    }

    let line_start = chunk.before.rfind('\n').map_or(0, |i| i + 1);
    let line_end = chunk.after.find('\n').unwrap_or(chunk.after.len());
    let caret_line = format!(
        "{}{}{}",
        &chunk.before[line_start..],
        chunk.selection,
        &chunk.after[..line_end]
    );
    if caret_line.trim().is_empty() || is_indented(&caret_line) {
        return false;
    }

    let previous_line = chunk.before[..line_start]
        .strip_suffix('\n')
        .and_then(|text| text.rsplit('\n').next());
    let next_line = chunk.after[line_end..]
        .strip_prefix('\n')
        .and_then(|text| text.split('\n').next());

    !previous_line.is_some_and(is_indented) && !next_line.is_some_and(is_indented)
}

fn code_span(chunk: &mut TextChunk, ctx: &FormatContext) -> FormatStatus {
    chunk.trim_whitespace(false);
    chunk.set_tags(Some(patterns::backtick_tag()), Some(patterns::backtick_tag()));

    match (chunk.start_tag.is_empty(), chunk.end_tag.is_empty()) {
        (true, true) => {
            chunk.start_tag = "`".to_string();
            chunk.end_tag = "`".to_string();
            if chunk.selection.is_empty() {
                chunk.selection = ctx.placeholder(&ctx.locale.enter_code_here);
            }
            FormatStatus::Applied
        }
        (true, false) => {
            // Lone closing tick: reopen the span from the selection start
            let tick = std::mem::take(&mut chunk.end_tag);
            chunk.before.push_str(&tick);
            FormatStatus::Applied
        }
        _ => {
            chunk.start_tag.clear();
            chunk.end_tag.clear();
            FormatStatus::ToggledOff
        }
    }
}

fn code_block(chunk: &mut TextChunk, ctx: &FormatContext) -> FormatStatus {
    if let Some(spaces) = patterns::take_first(&mut chunk.before, patterns::four_spaces_tail()) {
        chunk.selection.insert_str(0, &spaces);
    }

    let continues_block = patterns::indented_line_before().is_match(&chunk.before)
        || patterns::indented_line_after().is_match(&chunk.after);
    chunk.add_blank_lines(usize::from(!continues_block), 1, false);

    if chunk.selection.is_empty() {
        chunk.start_tag = "    ".to_string();
        chunk.selection = ctx.placeholder(&ctx.locale.enter_code_here);
        FormatStatus::Applied
    } else if patterns::unindented_line().is_match(&chunk.selection) {
        chunk.selection = prefix_lines(&chunk.selection, "    ");
        FormatStatus::Applied
    } else {
        chunk.selection = patterns::four_space_prefix()
            .replace_all(&chunk.selection, "")
            .into_owned();
        FormatStatus::ToggledOff
    }
}

/// Continue an indented code block onto the caret line.
pub(crate) fn continue_code_block(chunk: &mut TextChunk, ctx: &FormatContext) -> FormatStatus {
    code_block(chunk, ctx)
}

// ─────────────────────────────────────────────────────────────────────────────
// Headings
// ─────────────────────────────────────────────────────────────────────────────

fn heading(chunk: &mut TextChunk, ctx: &FormatContext, explicit: Option<u8>) -> FormatStatus {
    chunk.selection = chunk
        .selection
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if chunk.selection.is_empty() {
        chunk.selection = ctx.locale.heading.clone();
        let level = explicit.map_or(2, usize::from);
        write_atx(chunk, level);
        return FormatStatus::Applied;
    }

    let level = existing_heading_level(chunk);
    chunk.add_blank_lines(1, 1, false);

    let new_level = match explicit.map(usize::from) {
        Some(wanted) if wanted == level => 0,
        Some(wanted) => wanted,
        None if level == 0 => 2,
        None => level - 1,
    };

    if new_level == 0 {
        return FormatStatus::ToggledOff;
    }

    match (explicit, ctx.heading_style) {
        (None, HeadingStyle::Setext) => {
            let underline = if new_level == 1 { "=" } else { "-" };
            let width = char_len(&chunk.selection).min(ctx.line_length);
            chunk.end_tag = format!("\n{}", underline.repeat(width));
        }
        _ => write_atx(chunk, new_level),
    }
    FormatStatus::Applied
}

fn write_atx(chunk: &mut TextChunk, level: usize) {
    let hashes = "#".repeat(level);
    chunk.start_tag = format!("{} ", hashes);
    chunk.end_tag = format!(" {}", hashes);
}

/// Strip existing heading markup around the selection and return its level.
fn existing_heading_level(chunk: &mut TextChunk) -> usize {
    let mut level = 0;

    // Hashes only count at the start or end of the selection's line
    let line_head = &chunk.before[chunk.before.rfind('\n').map_or(0, |i| i + 1)..];
    if line_head.chars().all(|c| c == '#' || c == ' ') {
        chunk.set_tags(Some(patterns::atx_open_tag()), None);
        level = chunk.start_tag.chars().filter(|&c| c == '#').count().min(6);
    }
    let line_tail = &chunk.after[..chunk.after.find('\n').unwrap_or(chunk.after.len())];
    if line_tail.chars().all(|c| c == '#' || c == ' ') {
        chunk.set_tags(None, Some(patterns::atx_close_tag()));
    }
    chunk.start_tag.clear();
    chunk.end_tag.clear();

    if chunk.after.starts_with('\n') {
        if let Some(underline) =
            patterns::take_first(&mut chunk.after, patterns::setext_underline_tag().leading())
        {
            level = if underline.contains('=') { 1 } else { 2 };
        }
    }

    level
}

// ─────────────────────────────────────────────────────────────────────────────
// Horizontal Rule
// ─────────────────────────────────────────────────────────────────────────────

fn horizontal_rule(chunk: &mut TextChunk) -> FormatStatus {
    chunk.start_tag = "----------\n".to_string();
    chunk.selection.clear();
    chunk.add_blank_lines(2, 1, true);
    FormatStatus::Applied
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
