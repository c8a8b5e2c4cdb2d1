//! Command-line interface components
//!
//! This module contains CLI-specific code for the Manga Binder application,
//! including argument parsing, command handlers, and progress display.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{BindArgs, CheckArgs, Cli, Commands, DiscoverArgs, GlobalArgs};
pub use commands::{handle_bind, handle_check, handle_discover};
pub use progress::spawn_progress_bar;
