//! Command-line argument parsing for Manga Binder
//!
//! This module defines the CLI structure using clap derive macros, mapping
//! the external operations: manifest existence check, discovery, and the
//! download-and-bind run.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Manga Binder - bind discovered manga chapters into an e-reader PDF
#[derive(Parser, Debug)]
#[command(
    name = "manga_binder",
    version,
    about = "Download discovered manga chapters and bind them into a PDF",
    long_about = "Turns a previously discovered manifest of remote page images into a single \
paginated PDF sized for an e-reader screen, downloading pages concurrently while keeping the \
output page order deterministic."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress the progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether a title has a saved manifest
    Check(CheckArgs),

    /// Discover a title's chapters and save its manifest
    Discover(DiscoverArgs),

    /// Download a chapter range and bind it into a PDF
    Bind(BindArgs),
}

/// Arguments for the check command
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Title as it appears on the source site
    pub title: String,
}

/// Arguments for the discover command
#[derive(Args, Debug, Clone)]
pub struct DiscoverArgs {
    /// Title as it appears on the source site
    pub title: String,

    /// URL of the title's chapter listing
    pub url: String,
}

/// Arguments for the bind command
#[derive(Args, Debug, Clone)]
pub struct BindArgs {
    /// Title with a saved manifest
    pub title: String,

    /// First chapter to include (inclusive)
    #[arg(short, long)]
    pub start: u32,

    /// Last chapter to include (inclusive)
    #[arg(short, long)]
    pub end: u32,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log level derived from the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.global.very_verbose {
            "debug"
        } else if self.global.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_args_parse() {
        let cli = Cli::parse_from([
            "manga_binder",
            "bind",
            "One Punch Man",
            "--start",
            "3",
            "--end",
            "7",
        ]);
        match cli.command {
            Commands::Bind(args) => {
                assert_eq!(args.title, "One Punch Man");
                assert_eq!(args.start, 3);
                assert_eq!(args.end, 7);
            }
            other => panic!("expected bind command, got {other:?}"),
        }
    }

    #[test]
    fn test_log_level_from_flags() {
        let cli = Cli::parse_from(["manga_binder", "check", "Berserk"]);
        assert_eq!(cli.log_level(), "warn");

        let cli = Cli::parse_from(["manga_binder", "-v", "check", "Berserk"]);
        assert_eq!(cli.log_level(), "info");

        let cli = Cli::parse_from(["manga_binder", "--very-verbose", "check", "Berserk"]);
        assert_eq!(cli.log_level(), "debug");
    }
}
