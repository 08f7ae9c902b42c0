//! Editor module for mdtoggle
//!
//! This module connects the formatting engine to a host text widget through
//! the [`SelectionAdapter`] contract, and runs commands and key presses
//! against it.

mod commands;
mod state;

pub use commands::{CommandOutcome, CommandRunner, Key, KeyPress};
pub use state::{EditorState, SelectionAdapter, TextBuffer};
