//! Command execution against an editor
//!
//! [`CommandRunner`] is what a host wires its toolbar and key handler to.
//! Every invocation is atomic: capture the editor state, transform a fresh
//! [`TextChunk`], and apply the result once. A cancelled url prompt applies
//! nothing.

use log::debug;

use crate::config::{HeadingStyle, Locale, Settings};
use crate::editor::state::{EditorState, SelectionAdapter};
use crate::markdown::{
    apply_format, auto_indent, FormatContext, FormatStatus, MarkdownFormatCommand, UrlPrompt,
};

/// Text inserted by the Tab key.
const TAB_INDENT: &str = "    ";

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes and Keys
// ─────────────────────────────────────────────────────────────────────────────

/// What a command did to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A new state was applied
    Applied,
    /// The url prompt was cancelled; the editor was not touched
    Cancelled,
    /// Nothing to do; the editor was not touched
    Unchanged,
}

/// Keys the runner reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
    /// Cmd on macOS
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyPress {
    /// A key without modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            shift: false,
            alt: false,
        }
    }

    /// A key with Ctrl held.
    pub fn ctrl(key: Key) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    fn has_modifier(&self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CommandRunner
// ─────────────────────────────────────────────────────────────────────────────

/// Runs formatting commands with one configuration.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    locale: Locale,
    line_length: usize,
    heading_style: HeadingStyle,
    commands: Vec<MarkdownFormatCommand>,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl CommandRunner {
    /// Create a runner for the given settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            locale: settings.locale(),
            line_length: settings.line_length.max(Settings::MIN_LINE_LENGTH),
            heading_style: settings.heading_style,
            commands: settings.enabled_commands(),
        }
    }

    /// The string table in use.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Enabled commands, in toolbar order.
    pub fn commands(&self) -> &[MarkdownFormatCommand] {
        &self.commands
    }

    /// Whether a command is enabled.
    ///
    /// Fixed heading levels belong to the heading command.
    pub fn is_enabled(&self, command: MarkdownFormatCommand) -> bool {
        match command {
            MarkdownFormatCommand::HeadingLevel(_) => {
                self.commands.contains(&MarkdownFormatCommand::Heading)
            }
            _ => self.commands.contains(&command),
        }
    }

    fn context(&self) -> FormatContext<'_> {
        FormatContext {
            line_length: self.line_length,
            heading_style: self.heading_style,
            locale: &self.locale,
            prevent_default_text: false,
        }
    }

    /// Run one command against the editor.
    ///
    /// The command runs whether or not it is enabled; only shortcuts are
    /// filtered by the enabled set.
    pub fn run(
        &self,
        adapter: &mut dyn SelectionAdapter,
        command: MarkdownFormatCommand,
        prompt: &mut dyn UrlPrompt,
    ) -> CommandOutcome {
        let mut chunk = adapter.capture_state().to_chunk();
        match apply_format(&mut chunk, command, &self.context(), prompt) {
            FormatStatus::Cancelled => {
                debug!("Command '{}' cancelled, editor left untouched", command);
                CommandOutcome::Cancelled
            }
            _ => {
                adapter.apply_state(EditorState::from_chunk(&chunk));
                CommandOutcome::Applied
            }
        }
    }

    /// Continue or close the construct before the caret.
    ///
    /// Expects the line break to be in the text already. [`Self::handle_key`]
    /// inserts it and auto-indents in one capture/apply pair.
    pub fn auto_indent(&self, adapter: &mut dyn SelectionAdapter) -> CommandOutcome {
        let mut chunk = adapter.capture_state().to_chunk();
        if auto_indent(&mut chunk, &self.context()).changed() {
            adapter.apply_state(EditorState::from_chunk(&chunk));
            CommandOutcome::Applied
        } else {
            CommandOutcome::Unchanged
        }
    }

    /// Handle a key press.
    ///
    /// - Ctrl/Cmd + an enabled command's shortcut runs that command
    /// - Enter inserts a line break, then auto-indents
    /// - Tab inserts four spaces in place of the selection
    pub fn handle_key(
        &self,
        adapter: &mut dyn SelectionAdapter,
        press: KeyPress,
        prompt: &mut dyn UrlPrompt,
    ) -> CommandOutcome {
        match press.key {
            Key::Char(c) if press.ctrl || press.meta => {
                match MarkdownFormatCommand::from_shortcut(c).filter(|cmd| self.is_enabled(*cmd)) {
                    Some(command) => {
                        debug!("Shortcut {} runs '{}'", command.shortcut_label(), command);
                        self.run(adapter, command, prompt)
                    }
                    None => CommandOutcome::Unchanged,
                }
            }
            Key::Enter if !press.has_modifier() => {
                let mut chunk = adapter.capture_state().to_chunk();
                chunk.before.push('\n');
                chunk.selection.clear();
                let indent = auto_indent(&mut chunk, &self.context());
                debug!("Enter auto-indent: {:?}", indent);
                adapter.apply_state(EditorState::from_chunk(&chunk));
                CommandOutcome::Applied
            }
            Key::Tab if !press.has_modifier() => {
                let state = adapter.capture_state().replace_selection(TAB_INDENT);
                adapter.apply_state(state);
                CommandOutcome::Applied
            }
            _ => CommandOutcome::Unchanged,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
