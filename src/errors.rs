//! Error types for Manga Binder
//!
//! This module defines the error taxonomy for the whole pipeline. Run-level
//! failures (discovery, missing manifest, bad configuration) are represented
//! here and surfaced to the caller; per-page failures during fetching or
//! assembly are recovered locally and never escalate to these types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the external structured-extraction collaborator
///
/// Discovery failures are fatal for the run that requested them and are
/// surfaced to the caller verbatim.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// HTTP request to the extraction service failed
    #[error("extraction service request failed")]
    Http(#[from] reqwest::Error),

    /// The extraction service returned a shape we cannot use
    #[error("extraction service returned an unusable shape: {detail}")]
    UnexpectedShape { detail: String },

    /// The extraction service found no chapters at the source
    #[error("no chapters discovered at {source_url}")]
    NoChapters { source_url: String },
}

/// Manifest persistence and validation errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Requested title has no saved manifest
    #[error("no saved manifest for '{title}'. Run 'discover' first")]
    Missing { title: String },

    /// JSON parsing error in a saved manifest
    #[error("manifest JSON parsing failed")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error reading or writing a manifest
    #[error("manifest I/O error")]
    Io(#[from] std::io::Error),

    /// Two chapters share the same number
    #[error("duplicate chapter number {number} in manifest")]
    DuplicateChapter { number: u32 },

    /// Chapter numbers must be positive
    #[error("chapter number must be positive")]
    ChapterNumberZero,
}

/// Document assembly errors
///
/// Individual pages that fail to decode are skipped, not reported through
/// this type; only failures that prevent producing the document at all
/// appear here.
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// I/O error while creating the output document
    #[error("output document I/O error")]
    Io(#[from] std::io::Error),

    /// The PDF writer rejected the document
    #[error("failed to write PDF: {reason}")]
    PdfWrite { reason: String },
}

/// Configuration errors, rejected before any work is dispatched
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Chapter range with end before start
    #[error("invalid chapter range: start {start} is greater than end {end}")]
    InvalidRange { start: u32, end: u32 },

    /// Extraction service endpoint is not a valid URL
    #[error("invalid extraction endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },

    /// HTTP client construction failed
    #[error("failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Discovery error
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Manifest error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Assembly error
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Discovery(_) => "discovery",
            AppError::Manifest(_) => "manifest",
            AppError::Assembly(_) => "assembly",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Discovery result type alias
pub type DiscoveryResult<T> = std::result::Result<T, DiscoveryError>;

/// Manifest result type alias
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

/// Assembly result type alias
pub type AssemblyResult<T> = std::result::Result<T, AssemblyError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = AppError::from(ManifestError::Missing {
            title: "One Piece".to_string(),
        });
        assert_eq!(err.category(), "manifest");

        let err = AppError::from(ConfigError::InvalidRange { start: 9, end: 3 });
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_messages_carry_context() {
        let err = ManifestError::Missing {
            title: "Berserk".to_string(),
        };
        assert!(err.to_string().contains("Berserk"));

        let err = ConfigError::InvalidRange { start: 9, end: 3 };
        let text = err.to_string();
        assert!(text.contains('9') && text.contains('3'));
    }
}
