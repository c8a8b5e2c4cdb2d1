//! Manifest model and persistence
//!
//! A manifest records everything discovery learned about a title: its
//! chapters and, per chapter, the source URL of every page image. Manifests
//! are pure data; the only behavior here is validation and the JSON store.
//!
//! The on-disk format keeps page indices as `page-N` object keys
//! (`{"pages": {"page-1": "https://..."}}`), so saved manifests stay
//! readable next to the raw discovery output. In memory the indices are
//! numeric and ordered numerically: page 10 sorts after page 2.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::files;
use crate::errors::{ConfigError, ConfigResult, ManifestError, ManifestResult};

/// A title's discovered chapters and their page URL mappings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Title as it appears on the source site
    #[serde(rename = "manga-title")]
    pub title: String,
    /// Discovered chapters; order on disk is not significant
    pub chapters: Vec<Chapter>,
}

/// One chapter: a positive number and a 1-based page index → URL mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter number, unique within a manifest
    #[serde(rename = "chapter")]
    pub number: u32,
    /// Page index to source URL; indices need not be contiguous
    #[serde(with = "page_keys")]
    pub pages: BTreeMap<u32, String>,
}

impl Manifest {
    /// Create an empty manifest for a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            chapters: Vec::new(),
        }
    }

    /// Validate manifest invariants
    ///
    /// Chapter numbers must be positive and unique. A manifest with zero
    /// chapters is valid and yields an empty document downstream.
    pub fn validate(&self) -> ManifestResult<()> {
        let mut seen = std::collections::HashSet::new();
        for chapter in &self.chapters {
            if chapter.number == 0 {
                return Err(ManifestError::ChapterNumberZero);
            }
            if !seen.insert(chapter.number) {
                return Err(ManifestError::DuplicateChapter {
                    number: chapter.number,
                });
            }
        }
        Ok(())
    }

    /// Iterate chapters whose number falls inside the inclusive range
    pub fn chapters_in(&self, range: ChapterRange) -> impl Iterator<Item = &Chapter> {
        self.chapters
            .iter()
            .filter(move |chapter| range.contains(chapter.number))
    }

    /// Total page count across the chapters selected by the range
    pub fn page_count_in(&self, range: ChapterRange) -> usize {
        self.chapters_in(range)
            .map(|chapter| chapter.pages.len())
            .sum()
    }
}

/// Inclusive chapter range selecting which chapters participate in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterRange {
    start: u32,
    end: u32,
}

impl ChapterRange {
    /// Create a range, rejecting `end < start` before any work is dispatched
    pub fn new(start: u32, end: u32) -> ConfigResult<Self> {
        if start > end {
            return Err(ConfigError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First chapter number selected
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last chapter number selected
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Whether a chapter number falls inside the range
    pub fn contains(&self, number: u32) -> bool {
        self.start <= number && number <= self.end
    }
}

impl std::fmt::Display for ChapterRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Turn a title into its filesystem form, spaces replaced by hyphens
pub fn title_slug(title: &str) -> String {
    title.replace(' ', "-")
}

/// JSON store holding one pretty-printed manifest file per title
#[derive(Debug, Clone)]
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    /// Create a store rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the manifest file for a title
    pub fn manifest_path(&self, title: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", title_slug(title), files::MANIFEST_SUFFIX))
    }

    /// Whether a manifest is saved locally for the title
    pub async fn exists(&self, title: &str) -> bool {
        tokio::fs::try_exists(self.manifest_path(title))
            .await
            .unwrap_or(false)
    }

    /// Load and validate the manifest for a title
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Missing`] when no manifest file exists for
    /// the title, and parse/validation errors otherwise.
    pub async fn load(&self, title: &str) -> ManifestResult<Manifest> {
        let path = self.manifest_path(title);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ManifestError::Missing {
                    title: title.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let manifest: Manifest = serde_json::from_str(&raw)?;
        manifest.validate()?;
        debug!(
            title = %manifest.title,
            chapters = manifest.chapters.len(),
            "loaded manifest from {}",
            path.display()
        );
        Ok(manifest)
    }

    /// Validate and save a manifest, overwriting any previous file
    pub async fn save(&self, manifest: &Manifest) -> ManifestResult<PathBuf> {
        manifest.validate()?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.manifest_path(&manifest.title);
        let json = serde_json::to_string_pretty(manifest)?;
        tokio::fs::write(&path, json).await?;
        info!(title = %manifest.title, "saved manifest to {}", path.display());
        Ok(path)
    }

    /// Root directory of the store
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Serde codec for the `page-N` object-key page format
mod page_keys {
    use std::collections::BTreeMap;

    use serde::de::Error as DeError;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(pages: &BTreeMap<u32, String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(pages.len()))?;
        for (index, url) in pages {
            map.serialize_entry(&format!("page-{index}"), url)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<u32, String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, url)| {
                let index = key
                    .strip_prefix("page-")
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| D::Error::custom(format!("invalid page key: {key}")))?;
                Ok((index, url))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn chapter(number: u32, pages: &[(u32, &str)]) -> Chapter {
        Chapter {
            number,
            pages: pages
                .iter()
                .map(|(index, url)| (*index, url.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_page_keys_round_trip() {
        let original = chapter(
            3,
            &[
                (1, "https://img.example/a.jpg"),
                (2, "https://img.example/b.jpg"),
                (10, "https://img.example/c.jpg"),
            ],
        );

        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"page-1\""));
        assert!(json.contains("\"page-10\""));

        let parsed: Chapter = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_pages_order_numerically() {
        // page-10 must sort after page-2, never lexically
        let json = r#"{
            "chapter": 1,
            "pages": {
                "page-10": "https://img.example/j.jpg",
                "page-2": "https://img.example/b.jpg"
            }
        }"#;
        let parsed: Chapter = serde_json::from_str(json).unwrap();
        let indices: Vec<u32> = parsed.pages.keys().copied().collect();
        assert_eq!(indices, vec![2, 10]);
    }

    #[test]
    fn test_bad_page_key_rejected() {
        let json = r#"{"chapter": 1, "pages": {"cover": "https://img.example/x.jpg"}}"#;
        assert!(serde_json::from_str::<Chapter>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates_and_zero() {
        let mut manifest = Manifest::new("Test Title");
        manifest.chapters.push(chapter(1, &[]));
        manifest.chapters.push(chapter(1, &[]));
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::DuplicateChapter { number: 1 })
        ));

        let mut manifest = Manifest::new("Test Title");
        manifest.chapters.push(chapter(0, &[]));
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::ChapterNumberZero)
        ));

        // zero chapters is valid
        assert!(Manifest::new("Empty").validate().is_ok());
    }

    #[test]
    fn test_range_selection() {
        let mut manifest = Manifest::new("Test Title");
        manifest.chapters.push(chapter(1, &[(1, "u"), (2, "u")]));
        manifest.chapters.push(chapter(2, &[(1, "u")]));
        manifest.chapters.push(chapter(5, &[(1, "u")]));

        let range = ChapterRange::new(1, 2).unwrap();
        assert_eq!(manifest.chapters_in(range).count(), 2);
        assert_eq!(manifest.page_count_in(range), 3);

        // single-chapter range
        let single = ChapterRange::new(2, 2).unwrap();
        assert_eq!(manifest.chapters_in(single).count(), 1);

        // wholly outside the manifest
        let outside = ChapterRange::new(10, 20).unwrap();
        assert_eq!(manifest.page_count_in(outside), 0);
    }

    #[test]
    fn test_invalid_range_rejected() {
        assert!(matches!(
            ChapterRange::new(5, 2),
            Err(ConfigError::InvalidRange { start: 5, end: 2 })
        ));
    }

    #[test]
    fn test_title_slug() {
        assert_eq!(title_slug("One Punch Man"), "One-Punch-Man");
        assert_eq!(title_slug("Berserk"), "Berserk");
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(temp.path());

        let mut manifest = Manifest::new("Store Test");
        manifest
            .chapters
            .push(chapter(1, &[(1, "https://img.example/1.jpg")]));

        assert!(!store.exists("Store Test").await);
        store.save(&manifest).await.unwrap();
        assert!(store.exists("Store Test").await);

        let loaded = store.load("Store Test").await.unwrap();
        assert_eq!(loaded, manifest);

        // file name follows the hyphenated convention
        assert!(store.manifest_path("Store Test").ends_with("Store-Test_data.json"));
    }

    #[tokio::test]
    async fn test_load_missing_title() {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(temp.path());

        assert!(matches!(
            store.load("Unknown").await,
            Err(ManifestError::Missing { .. })
        ));
    }
}
