//! Transient per-run asset workspace
//!
//! Each download run writes its page images into one directory derived from
//! the title. Every worker touches only its own (chapter, page)-named file,
//! so concurrent writers never contend on a path. The directory is removed
//! after assembly, success or failure, so transient disk usage never
//! accumulates across runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::app::manifest::title_slug;
use crate::constants::files;

/// Handle to one run's asset directory
#[derive(Debug, Clone)]
pub struct RunWorkspace {
    dir: PathBuf,
}

impl RunWorkspace {
    /// Workspace for a title under the given assets root
    pub fn new(assets_root: &Path, title: &str) -> Self {
        Self {
            dir: assets_root.join(title_slug(title)),
        }
    }

    /// Create the directory tree for this run
    pub async fn prepare(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Deterministic asset path for a (chapter, page) pair
    pub fn page_path(&self, chapter: u32, page: u32) -> PathBuf {
        self.dir.join(format!(
            "chapter_{chapter}_page_{page}.{}",
            files::ASSET_EXTENSION
        ))
    }

    /// Remove the run directory and everything in it
    ///
    /// A missing directory is a no-op, not an error; cleanup is expected to
    /// run unconditionally after assembly.
    pub async fn cleanup(&self) -> std::io::Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {
                debug!("removed asset directory {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Root of this run's asset directory
    pub fn root(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_page_path_is_deterministic() {
        let workspace = RunWorkspace::new(Path::new("/assets"), "One Punch Man");
        let path = workspace.page_path(12, 3);
        assert_eq!(
            path,
            Path::new("/assets/One-Punch-Man/chapter_12_page_3.jpg")
        );
        assert_eq!(path, workspace.page_path(12, 3));
    }

    #[tokio::test]
    async fn test_cleanup_removes_tree() {
        let temp = TempDir::new().unwrap();
        let workspace = RunWorkspace::new(temp.path(), "Cleanup Test");

        workspace.prepare().await.unwrap();
        tokio::fs::write(workspace.page_path(1, 1), b"bytes")
            .await
            .unwrap();
        assert!(workspace.root().exists());

        workspace.cleanup().await.unwrap();
        assert!(!workspace.root().exists());
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let workspace = RunWorkspace::new(temp.path(), "Never Prepared");

        // directory was never created; cleanup must still succeed
        workspace.cleanup().await.unwrap();
        workspace.cleanup().await.unwrap();
    }
}
