//! Command-line argument parsing for mdtoggle
//!
//! Supports:
//! - Running one formatting command on a buffer read from a file or stdin
//! - Simulating the Enter and Tab keys (auto-indent)
//! - Overriding line length, language and heading style per invocation
//! - JSON output with the resulting selection
//! - Saving the effective settings as the user config

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

use mdtoggle::config::{load_config, load_config_from, HeadingStyle, Language, Settings};
use mdtoggle::editor::EditorState;
use mdtoggle::markdown::MarkdownFormatCommand;
use mdtoggle::string_utils::char_len;
use mdtoggle::Result;

/// What to do to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    /// A formatting command by identifier
    Format(MarkdownFormatCommand),
    /// Press Enter at the selection
    Enter,
    /// Press Tab at the selection
    Tab,
}

impl FromStr for CliCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "enter" => Ok(CliCommand::Enter),
            "tab" => Ok(CliCommand::Tab),
            other => other
                .parse()
                .map(CliCommand::Format)
                .map_err(|e: mdtoggle::Error| e.to_string()),
        }
    }
}

/// Toggle Markdown formatting on a text selection
#[derive(Parser, Debug)]
#[command(
    name = "mdtoggle",
    version,
    about = "Toggle Markdown formatting on a text selection"
)]
pub struct CliArgs {
    /// Command: strong, em, a, img, blockquote, code, ol, ul, h, h1-h6, hr, enter or tab
    #[arg(value_name = "COMMAND")]
    pub command: CliCommand,

    /// Read the buffer from this file instead of stdin
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Selection start (character offset, default: end of buffer)
    #[arg(long, value_name = "N")]
    pub start: Option<usize>,

    /// Selection end (character offset, default: the start)
    #[arg(long, value_name = "N")]
    pub end: Option<usize>,

    /// Answer to the link/image url prompt; without it the prompt is cancelled
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Re-flow width for lists and quotes
    #[arg(long, value_name = "N")]
    pub line_length: Option<usize>,

    /// Placeholder language (en or ru)
    #[arg(long, value_name = "LANG")]
    pub lang: Option<Language>,

    /// Heading syntax (atx or setext)
    #[arg(long, value_name = "STYLE")]
    pub heading_style: Option<HeadingStyle>,

    /// Settings file to use instead of the user config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the text and selection as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the result back to the input file
    #[arg(short = 'w', long, requires = "file")]
    pub write: bool,

    /// Store the effective settings (with overrides) as the user config
    #[arg(long)]
    pub save_settings: bool,
}

impl CliArgs {
    /// Settings from the config file with command-line overrides applied.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => load_config_from(path)?,
            None => load_config(),
        };
        if let Some(line_length) = self.line_length {
            settings.line_length = line_length;
        }
        if let Some(lang) = self.lang {
            settings.language = lang;
        }
        if let Some(style) = self.heading_style {
            settings.heading_style = style;
        }
        settings.sanitize();
        Ok(settings)
    }

    /// Selection bounds for `text`.
    pub fn selection(&self, text: &str) -> (usize, usize) {
        let start = self.start.unwrap_or_else(|| char_len(text));
        let end = self.end.unwrap_or(start);
        (start, end)
    }
}

/// JSON shape printed by `--json`
#[derive(Debug, Serialize)]
pub struct CliOutput<'a> {
    pub text: &'a str,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl<'a> From<&'a EditorState> for CliOutput<'a> {
    fn from(state: &'a EditorState) -> Self {
        let (selection_start, selection_end) = state.selection();
        Self {
            text: &state.text,
            selection_start,
            selection_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("mdtoggle").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_format_command() {
        let args = parse(&["strong", "--start", "2", "--end", "5", "--json"]);
        assert_eq!(args.command, CliCommand::Format(MarkdownFormatCommand::Strong));
        assert_eq!(args.selection("whatever"), (2, 5));
        assert!(args.json);
    }

    #[test]
    fn test_parse_key_commands() {
        assert_eq!(parse(&["enter"]).command, CliCommand::Enter);
        assert_eq!(parse(&["tab"]).command, CliCommand::Tab);
        assert_eq!(
            parse(&["h2"]).command,
            CliCommand::Format(MarkdownFormatCommand::HeadingLevel(2))
        );
    }

    #[test]
    fn test_unknown_command_rejected() {
        let result = CliArgs::try_parse_from(["mdtoggle", "underline"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_write_requires_file() {
        assert!(CliArgs::try_parse_from(["mdtoggle", "em", "--write"]).is_err());
        assert!(CliArgs::try_parse_from(["mdtoggle", "em", "--write", "--file", "a.md"]).is_ok());
    }

    #[test]
    fn test_save_settings_flag() {
        assert!(!parse(&["em"]).save_settings);
        assert!(parse(&["em", "--save-settings", "--line-length", "72"]).save_settings);
    }

    #[test]
    fn test_default_selection_is_end_caret() {
        let args = parse(&["ul"]);
        assert_eq!(args.selection("Grüße"), (5, 5));
        let args = parse(&["ul", "--start", "1"]);
        assert_eq!(args.selection("Grüße"), (1, 1));
    }

    #[test]
    fn test_overrides_applied_and_sanitized() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(&config, r#"{"line_length": 60}"#).unwrap();
        let config_arg = config.to_string_lossy().to_string();

        let args = parse(&["h", "--config", &config_arg, "--lang", "ru", "--heading-style", "setext"]);
        let settings = args.settings().unwrap();
        assert_eq!(settings.line_length, 60);
        assert_eq!(settings.language, Language::Ru);
        assert_eq!(settings.heading_style, HeadingStyle::Setext);

        let args = parse(&["h", "--config", &config_arg, "--line-length", "0"]);
        assert_eq!(args.settings().unwrap().line_length, Settings::MIN_LINE_LENGTH);
    }

    #[test]
    fn test_json_output_shape() {
        let state = EditorState::new("**a**", 2, 3);
        let json = serde_json::to_string(&CliOutput::from(&state)).unwrap();
        assert_eq!(json, r#"{"text":"**a**","selection_start":2,"selection_end":3}"#);
    }
}
