//! Locale string tables
//!
//! The formatting engine never reads a global translation table; the active
//! [`Locale`] is resolved from [`crate::config::Settings`] and handed to each
//! command through its context.
//!
//! Two tables are built in (English and Russian). A custom table can be
//! supplied as JSON; any field it leaves out falls back to English.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Language
// ─────────────────────────────────────────────────────────────────────────────

/// Built-in interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    /// The built-in string table for this language.
    pub fn locale(&self) -> Locale {
        match self {
            Language::En => Locale::english(),
            Language::Ru => Locale::russian(),
        }
    }

    /// Short identifier used in settings and on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    /// Get all available languages.
    pub fn all() -> &'static [Language] {
        &[Language::En, Language::Ru]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Language::all()
            .iter()
            .copied()
            .find(|lang| lang.code() == wanted)
            .ok_or_else(|| {
                let codes: Vec<&str> = Language::all().iter().map(Language::code).collect();
                format!("unknown language '{}' (expected {})", wanted, codes.join(" or "))
            })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command Texts
// ─────────────────────────────────────────────────────────────────────────────

/// Toolbar label and tooltip of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CommandText {
    /// Short button label
    pub label: String,
    /// Tooltip, including the shortcut
    pub title: String,
}

impl CommandText {
    fn new(label: &str, title: &str) -> Self {
        Self {
            label: label.to_string(),
            title: title.to_string(),
        }
    }
}

/// Labels and tooltips for every built-in command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandTexts {
    pub strong: CommandText,
    pub em: CommandText,
    pub a: CommandText,
    pub blockquote: CommandText,
    pub code: CommandText,
    pub img: CommandText,
    pub ol: CommandText,
    pub ul: CommandText,
    pub h: CommandText,
    pub hr: CommandText,
}

impl Default for CommandTexts {
    fn default() -> Self {
        Locale::english().commands
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Locale
// ─────────────────────────────────────────────────────────────────────────────

/// A complete interface string table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    // ─────────────────────────────────────────────────────────────────────────
    // Placeholder text inserted for an empty selection
    // ─────────────────────────────────────────────────────────────────────────
    pub strong_text: String,
    pub em_text: String,
    pub link_text: String,
    pub image_alt: String,
    pub list_item: String,
    pub heading: String,
    pub blockquote: String,
    pub enter_code_here: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Url prompt
    // ─────────────────────────────────────────────────────────────────────────
    pub insert_link: String,
    pub link_url: String,
    pub insert_image: String,
    pub image_url: String,
    /// Hint shown under the url field
    pub url_hint: String,
    pub submit: String,
    pub cancel: String,

    /// Toolbar labels and tooltips
    pub commands: CommandTexts,
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}

impl Locale {
    /// The English table.
    pub fn english() -> Self {
        Self {
            strong_text: "strong text".into(),
            em_text: "emphasized text".into(),
            link_text: "link text".into(),
            image_alt: "image alt".into(),
            list_item: "List item".into(),
            heading: "Heading".into(),
            blockquote: "Blockquote".into(),
            enter_code_here: "enter code here".into(),

            insert_link: "Insert link".into(),
            link_url: "Link URL".into(),
            insert_image: "Insert image".into(),
            image_url: "Image URL".into(),
            url_hint: "To add a tool-tip, place it in quotes after the URL \
                       (e.g., http://google.com \"Google\")"
                .into(),
            submit: "Submit".into(),
            cancel: "Cancel".into(),

            commands: CommandTexts {
                strong: CommandText::new("Bold", "Strong <strong> Ctrl+B"),
                em: CommandText::new("Italic", "Emphasis <em> Ctrl+I"),
                a: CommandText::new("Link", "Hyperlink <a> Ctrl+L"),
                blockquote: CommandText::new("Blockquote", "Blockquote <blockquote> Ctrl+Q"),
                code: CommandText::new("Code", "Code Sample <pre><code> Ctrl+K"),
                img: CommandText::new("Image", "Image <img> Ctrl+G"),
                ol: CommandText::new("Numbered List", "Numbered List <ol> Ctrl+O"),
                ul: CommandText::new("Bulleted List", "Bulleted List <ul> Ctrl+U"),
                h: CommandText::new("Heading", "Heading <h1>/<h2> Ctrl+H"),
                hr: CommandText::new("Horizontal Rule", "Horizontal Rule <hr> Ctrl+R"),
            },
        }
    }

    /// The Russian table.
    pub fn russian() -> Self {
        Self {
            strong_text: "жирный текст".into(),
            em_text: "курсив".into(),
            link_text: "название ссылки".into(),
            image_alt: "описание картинки".into(),
            list_item: "текст".into(),
            heading: "Заголовок".into(),
            blockquote: "текст цитаты".into(),
            enter_code_here: "вставьте код здесь".into(),

            insert_link: "Вставить ссылку".into(),
            link_url: "Ссылка".into(),
            insert_image: "Вставить картинку".into(),
            image_url: "Адрес картинки".into(),
            url_hint: "(например, http://google.com)".into(),
            submit: "Ок".into(),
            cancel: "Отмена".into(),

            commands: CommandTexts {
                strong: CommandText::new("Жирный", "Жирный <strong> Ctrl+B"),
                em: CommandText::new("Курсив", "Курсив <em> Ctrl+I"),
                a: CommandText::new("Ссылка", "Вставить ссылку <a> Ctrl+L"),
                blockquote: CommandText::new("Цитата", "Цитировать <blockquote> Ctrl+Q"),
                code: CommandText::new("Код", "Вставить пример кода <pre><code> Ctrl+K"),
                img: CommandText::new("Картинка", "Вставить картинку <img> Ctrl+G"),
                ol: CommandText::new("Нумерованный список", "Нумерованный список <ol> Ctrl+O"),
                ul: CommandText::new("Маркированный список", "Маркированный список <ul> Ctrl+U"),
                h: CommandText::new("Заголовок", "Вставить заголовок <h1>/<h2> Ctrl+H"),
                hr: CommandText::new("Горизонтальная черта", "Горизонтальная черта <hr> Ctrl+R"),
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
