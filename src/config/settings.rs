//! User settings for mdtoggle
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use log::warn;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::locale::{Language, Locale};
use crate::markdown::MarkdownFormatCommand;

// ─────────────────────────────────────────────────────────────────────────────
// Heading Style
// ─────────────────────────────────────────────────────────────────────────────

/// How the heading command writes a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    /// `## Heading ##`
    #[default]
    Atx,
    /// `Heading` underlined with `---` or `===`
    Setext,
}

impl FromStr for HeadingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atx" => Ok(HeadingStyle::Atx),
            "setext" => Ok(HeadingStyle::Setext),
            other => Err(format!("unknown heading style '{}' (expected atx or setext)", other)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Width used when re-flowing list items, quotes and setext underlines
    pub line_length: usize,

    /// Enabled commands, in toolbar order
    pub commands: Vec<String>,

    /// Built-in string table to use
    pub language: Language,

    /// Heading syntax written by the heading command
    pub heading_style: HeadingStyle,

    /// A custom string table that replaces the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale_overrides: Option<Locale>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            line_length: Self::DEFAULT_LINE_LENGTH,
            commands: Self::default_commands(),
            language: Language::default(),
            heading_style: HeadingStyle::default(),
            locale_overrides: None,
        }
    }
}

impl Settings {
    /// Default re-flow width.
    pub const DEFAULT_LINE_LENGTH: usize = 40;
    /// Minimum allowed line length.
    pub const MIN_LINE_LENGTH: usize = 1;
    /// Maximum allowed line length.
    pub const MAX_LINE_LENGTH: usize = 1000;

    /// The full command set, in toolbar order.
    pub fn default_commands() -> Vec<String> {
        MarkdownFormatCommand::toolbar()
            .iter()
            .map(|command| command.id().to_string())
            .collect()
    }

    /// The string table commands should use.
    pub fn locale(&self) -> Locale {
        match &self.locale_overrides {
            Some(locale) => locale.clone(),
            None => self.language.locale(),
        }
    }

    /// Parsed enabled commands, in order.
    pub fn enabled_commands(&self) -> Vec<MarkdownFormatCommand> {
        self.commands
            .iter()
            .filter_map(|id| id.parse().ok())
            .collect()
    }

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.line_length = self
            .line_length
            .clamp(Self::MIN_LINE_LENGTH, Self::MAX_LINE_LENGTH);

        // Drop unknown and repeated command identifiers
        let mut seen = Vec::with_capacity(self.commands.len());
        self.commands.retain(|id| {
            if MarkdownFormatCommand::from_str(id).is_err() {
                warn!("Ignoring unknown command '{}' in settings", id);
                return false;
            }
            if seen.contains(id) {
                warn!("Ignoring repeated command '{}' in settings", id);
                return false;
            }
            seen.push(id.clone());
            true
        });
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
