//! Core pipeline for Manga Binder
//!
//! Manifest → download coordinator (bounded parallel fetches) → ordered
//! assets → sequential PDF assembly → workspace cleanup. Discovery sits at
//! the boundary and only produces manifests.

pub mod assembler;
pub mod coordinator;
pub mod discovery;
pub mod fetcher;
pub mod manifest;
pub mod normalizer;
pub mod progress;
pub mod workspace;

// Re-export main public API
pub use assembler::DocumentAssembler;
pub use coordinator::{DownloadCoordinator, OrderedAsset};
pub use discovery::DiscoveryClient;
pub use fetcher::{FetchOutcome, FetchResult, HttpPageFetcher, PageJob, PageSource};
pub use manifest::{title_slug, Chapter, ChapterRange, Manifest, ManifestStore};
pub use normalizer::fit_to_device;
pub use progress::{ProgressSnapshot, ProgressTracker, ProgressUpdate};
pub use workspace::RunWorkspace;
