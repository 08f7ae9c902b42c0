//! mdtoggle - toggle Markdown formatting on a text selection
//!
//! A toolbar-style formatting engine for plain-text Markdown editors. Each
//! command (strong, emphasis, link, image, blockquote, code, lists, heading,
//! horizontal rule) adds its markup around the selection, or removes it when
//! it is already there. Reference links are renumbered on every change.
//!
//! The engine is independent of any widget toolkit: hosts implement
//! [`editor::SelectionAdapter`] and drive an [`editor::CommandRunner`].
//!
//! ```ignore
//! use mdtoggle::config::Settings;
//! use mdtoggle::editor::{CommandRunner, TextBuffer};
//! use mdtoggle::markdown::{MarkdownFormatCommand, NoPrompt};
//!
//! let runner = CommandRunner::new(&Settings::default());
//! let mut buffer = TextBuffer::new("make this bold").with_selection(10, 14);
//! runner.run(&mut buffer, MarkdownFormatCommand::Strong, &mut NoPrompt);
//! assert_eq!(buffer.text(), "make this **bold**");
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod string_utils;

pub use error::{Error, Result};
