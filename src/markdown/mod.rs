//! Markdown toggle formatting module
//!
//! This module implements the toolbar and keyboard commands that add or
//! remove Markdown markup around a selection. It works on plain text only;
//! there is no parser or document tree.
//!
//! # Layers
//! - [`patterns`]: compiled-once regular expressions and splice helpers
//! - [`chunk`]: the buffer split around the selection, with its primitives
//! - [`links`]: reference definition stripping and renumbering
//! - [`formatting`]: one toggle rule per construct
//! - [`auto_indent`]: list, quote and code continuation on Enter
//!
//! # Example
//! ```ignore
//! use crate::config::Locale;
//! use crate::markdown::{apply_raw_format, FormatContext, MarkdownFormatCommand, NoPrompt};
//!
//! let locale = Locale::english();
//! let ctx = FormatContext::new(&locale);
//! let result = apply_raw_format("Heading", (0, 7), MarkdownFormatCommand::Heading, &ctx, &mut NoPrompt);
//! assert_eq!(result.text, "## Heading ##");
//! ```

pub mod auto_indent;
pub mod chunk;
pub mod formatting;
pub mod links;
pub mod patterns;

pub use auto_indent::{auto_indent, AutoIndent};
pub use chunk::TextChunk;
pub use formatting::{
    apply_format, apply_raw_format, FormatContext, FormatResult, FormatStatus, LinkKind,
    MarkdownFormatCommand, NoPrompt, UrlPrompt,
};
pub use links::LinkReferenceDefinition;
