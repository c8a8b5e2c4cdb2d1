//! Application constants for Manga Binder
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "Manga-Binder/0.1.0 (Personal Archival Tool)";

    /// Fixed per-request timeout for page image fetches
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

    /// Timeout for extraction service requests, which involve a remote
    /// reasoning step and are much slower than a plain image fetch
    pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(120);
}

/// Worker and concurrency configuration
pub mod workers {
    /// Fixed number of concurrent page fetches. Bounds load on the source
    /// host and caps memory held by in-flight responses.
    pub const WORKER_COUNT: usize = 5;

    /// Channel buffer size for fetch result collection
    pub const RESULT_CHANNEL_CAPACITY: usize = 32;
}

/// Target canvas for image normalization (portrait e-reader screen)
pub mod canvas {
    /// Device screen width in pixels
    pub const WIDTH: u32 = 600;

    /// Device screen height in pixels
    pub const HEIGHT: u32 = 800;
}

/// Output document geometry
pub mod page {
    /// US Letter page width in points
    pub const WIDTH_PT: f64 = 612.0;

    /// US Letter page height in points
    pub const HEIGHT_PT: f64 = 792.0;

    /// Images are embedded at 72 dpi so one source pixel maps to one point
    pub const RENDER_DPI: f64 = 72.0;
}

/// File naming conventions
pub mod files {
    /// Suffix for per-title manifest files
    pub const MANIFEST_SUFFIX: &str = "_data.json";

    /// Extension for downloaded page assets
    pub const ASSET_EXTENSION: &str = "jpg";

    /// Extension for the assembled output document
    pub const DOCUMENT_EXTENSION: &str = "pdf";
}

/// Progress reporting
pub mod progress {
    use super::Duration;

    /// Redraw cadence for the terminal progress bar
    pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
}

// Re-export commonly used constants for convenience
pub use http::{FETCH_TIMEOUT, USER_AGENT};
pub use workers::WORKER_COUNT;
