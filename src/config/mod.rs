//! Configuration module for mdtoggle
//!
//! This module handles user preferences, the locale string tables, and
//! persistent storage of settings to platform-specific directories.

mod locale;
mod persistence;
mod settings;

pub use locale::*;
pub use persistence::*;
pub use settings::*;
