//! Manga Binder CLI application
//!
//! Command-line interface for discovering manga chapter manifests and
//! binding chapter ranges into e-reader sized PDFs. Features concurrent
//! page downloads, progress tracking, and per-page failure isolation.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use manga_binder::cli::{handle_bind, handle_check, handle_discover, Cli, Commands};
use manga_binder::config::AppConfig;
use manga_binder::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(&cli);

    info!("Manga Binder v{} starting", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(cli.global.config.as_deref())?;

    match cli.command {
        Commands::Check(args) => {
            info!("Executing check command");
            handle_check(args, &config).await
        }
        Commands::Discover(args) => {
            info!("Executing discover command");
            handle_discover(args, &config).await
        }
        Commands::Bind(args) => {
            info!("Executing bind command");
            handle_bind(args, &config, !cli.global.quiet).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("manga_binder={}", log_level).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
