//! Boundary client for the structured-extraction collaborator
//!
//! Discovery is delegated to an external service that accepts a
//! natural-language instruction plus a source locator and returns
//! structured records. Its internal reasoning is none of our business;
//! this client only shapes requests, validates response shapes, and builds
//! a manifest. Any shape mismatch is fatal for the run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::app::manifest::{Chapter, Manifest};
use crate::config::DiscoveryConfig;
use crate::constants::http;
use crate::errors::{ConfigError, ConfigResult, DiscoveryError, DiscoveryResult};

/// Request body sent to the extraction service
#[derive(Debug, Serialize)]
struct ExtractionRequest<'a> {
    title: &'a str,
    source: &'a str,
    instruction: String,
}

/// Chapter entry as the extraction service reports it
#[derive(Debug, Deserialize)]
struct ChapterEntry {
    chapter_number: Option<u32>,
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChapterListResponse {
    chapters: Vec<ChapterEntry>,
}

#[derive(Debug, Deserialize)]
struct PageListResponse {
    images: Vec<String>,
}

/// Client for the extraction service
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl DiscoveryClient {
    /// Build a client against the configured endpoint
    pub fn new(config: &DiscoveryConfig) -> ConfigResult<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            value: config.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .user_agent(http::USER_AGENT)
            .timeout(http::DISCOVERY_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    /// Discover a title's chapters and page links, returning a manifest
    ///
    /// Two extraction passes, as the upstream service expects: one over the
    /// title page for the chapter list, then one per chapter for its page
    /// images. Page indices are assigned 1..n in reading order.
    pub async fn discover(&self, title: &str, source: &str) -> DiscoveryResult<Manifest> {
        info!(title, source, "discovering chapters");
        let entries = self.chapter_list(title, source).await?;

        let mut manifest = Manifest::new(title);
        for entry in entries {
            // entries missing a number or link are unusable; skip them the
            // way the upstream records arrive
            let (Some(number), Some(link)) = (entry.chapter_number, entry.link) else {
                continue;
            };

            let images = self.page_links(&link).await?;
            let pages: BTreeMap<u32, String> = images
                .into_iter()
                .enumerate()
                .map(|(i, url)| (i as u32 + 1, url))
                .collect();

            debug!(chapter = number, pages = pages.len(), "discovered chapter");
            manifest.chapters.push(Chapter { number, pages });
        }

        if manifest.chapters.is_empty() {
            return Err(DiscoveryError::NoChapters {
                source_url: source.to_string(),
            });
        }

        manifest
            .validate()
            .map_err(|e| DiscoveryError::UnexpectedShape {
                detail: e.to_string(),
            })?;
        Ok(manifest)
    }

    async fn chapter_list(&self, title: &str, source: &str) -> DiscoveryResult<Vec<ChapterEntry>> {
        let request = ExtractionRequest {
            title,
            source,
            instruction: format!(
                "Find the chapters of the manga titled \"{title}\" listed at the source URL. \
                 The naming usually follows: {title} + Chapter + number. \
                 Return JSON with the link of each chapter and its chapter_number."
            ),
        };
        let response: ChapterListResponse = self.extract(&request).await?;
        Ok(response.chapters)
    }

    async fn page_links(&self, chapter_link: &str) -> DiscoveryResult<Vec<String>> {
        let request = ExtractionRequest {
            title: "",
            source: chapter_link,
            instruction: "Find all page images of the chapter at the source URL, in reading \
                          order. Return JSON with the link of each image."
                .to_string(),
        };
        let response: PageListResponse = self.extract(&request).await?;
        Ok(response.images)
    }

    async fn extract<T: serde::de::DeserializeOwned>(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> DiscoveryResult<T> {
        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?.error_for_status()?;
        response
            .json::<T>()
            .await
            .map_err(|e| DiscoveryError::UnexpectedShape {
                detail: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_endpoint() {
        let config = DiscoveryConfig {
            endpoint: "not a url".to_string(),
            api_key: None,
        };
        assert!(matches!(
            DiscoveryClient::new(&config),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_chapter_entries_tolerate_partial_records() {
        let json = r#"{"chapters": [
            {"chapter_number": 1, "link": "https://site.example/ch-1"},
            {"chapter_number": null, "link": "https://site.example/extra"},
            {"chapter_number": 2}
        ]}"#;
        let parsed: ChapterListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.chapters.len(), 3);

        let usable: Vec<_> = parsed
            .chapters
            .into_iter()
            .filter(|entry| entry.chapter_number.is_some() && entry.link.is_some())
            .collect();
        assert_eq!(usable.len(), 1);
    }

    #[test]
    fn test_shape_mismatch_is_detected() {
        let json = r#"{"items": []}"#;
        assert!(serde_json::from_str::<ChapterListResponse>(json).is_err());
    }
}
