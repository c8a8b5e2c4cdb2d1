//! Command handlers
//!
//! Thin request/response plumbing over the pipeline: each handler wires the
//! configured directories into the core components, runs them, and prints a
//! user-facing summary. All real behavior lives in [`crate::app`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::app::{
    ChapterRange, DiscoveryClient, DocumentAssembler, DownloadCoordinator, HttpPageFetcher,
    ManifestStore, ProgressTracker, RunWorkspace,
};
use crate::cli::args::{BindArgs, CheckArgs, DiscoverArgs};
use crate::cli::progress::spawn_progress_bar;
use crate::config::AppConfig;
use crate::errors::Result;

/// Report whether a title has a saved manifest
pub async fn handle_check(args: CheckArgs, config: &AppConfig) -> Result<()> {
    let store = ManifestStore::new(config.storage.manifest_dir());
    if store.exists(&args.title).await {
        println!("Manifest for '{}' is saved locally.", args.title);
    } else {
        println!("No saved manifest for '{}'.", args.title);
    }
    Ok(())
}

/// Run discovery for a title and save the resulting manifest
pub async fn handle_discover(args: DiscoverArgs, config: &AppConfig) -> Result<()> {
    let store = ManifestStore::new(config.storage.manifest_dir());
    let client = DiscoveryClient::new(&config.discovery)?;

    let manifest = client.discover(&args.title, &args.url).await?;
    store.save(&manifest).await?;

    println!(
        "Discovered {} chapters for '{}'.",
        manifest.chapters.len(),
        args.title
    );
    Ok(())
}

/// Download a chapter range and bind it into a PDF
///
/// The transient asset directory is removed after assembly whether the run
/// succeeded or not.
pub async fn handle_bind(args: BindArgs, config: &AppConfig, show_progress: bool) -> Result<()> {
    // range problems are rejected before any work is dispatched
    let range = ChapterRange::new(args.start, args.end)?;

    let store = ManifestStore::new(config.storage.manifest_dir());
    let manifest = store.load(&args.title).await?;

    let workspace = RunWorkspace::new(&config.storage.assets_dir(), &args.title);
    workspace.prepare().await?;

    let tracker = Arc::new(ProgressTracker::new());
    let fetcher = Arc::new(HttpPageFetcher::new()?);
    let coordinator = DownloadCoordinator::new(fetcher, Arc::clone(&tracker));

    let display = show_progress.then(|| spawn_progress_bar(tracker.subscribe()));

    let assets = coordinator.download(&manifest, range, &workspace).await;
    if let Some(handle) = display {
        let _ = handle.await;
    }

    let assembler = DocumentAssembler::new(config.storage.output_dir());
    let outcome = assembler.assemble(&assets, &manifest.title, range);

    // cleanup runs unconditionally; a failure to delete must not mask the
    // assembly outcome
    if let Err(e) = workspace.cleanup().await {
        warn!("failed to remove asset directory: {e}");
    }

    let document = outcome?;
    info!(title = %manifest.title, "run complete");
    println!(
        "Bound {} pages of '{}' into {}",
        assets.len(),
        manifest.title,
        document.display()
    );
    Ok(())
}
