//! Download orchestration
//!
//! The coordinator turns a manifest plus a chapter range into an ordered
//! list of local page assets. It fans the (chapter, page) jobs out across a
//! fixed pool of worker tasks pulling from a shared queue, collects results
//! out of completion order over a channel, and canonicalizes the ordering
//! afterwards.
//!
//! Two guarantees matter here:
//!
//! - **Bounded concurrency**: at most [`workers::WORKER_COUNT`] fetches are
//!   in flight at any moment. All eligible jobs are enqueued up front with
//!   no further prioritization.
//! - **Deterministic output order**: fetch completion order is unspecified
//!   and must never leak into the result. Successful fetches are sorted by
//!   `(chapter, page)` — integer comparison on both — before they are
//!   returned.
//!
//! Failures are isolated per page: a failed fetch still counts toward the
//! progress total but is excluded from the returned assets, and never
//! aborts the run. There is no mid-run cancellation; once dispatched, all
//! in-flight fetches are awaited to completion.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use crate::app::fetcher::{FetchOutcome, PageJob, PageSource};
use crate::app::manifest::{ChapterRange, Manifest};
use crate::app::progress::ProgressTracker;
use crate::app::workspace::RunWorkspace;
use crate::constants::workers;

/// A successfully fetched page, ready for assembly
///
/// Owned by the run that produced it; the workspace cleanup deletes the
/// backing file at run end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedAsset {
    /// Chapter number the page belongs to
    pub chapter: u32,
    /// Page index within the chapter
    pub page: u32,
    /// Local path of the downloaded image
    pub path: PathBuf,
}

/// Coordinates the bounded-concurrency fetch of a chapter range
pub struct DownloadCoordinator<S: PageSource> {
    source: Arc<S>,
    progress: Arc<ProgressTracker>,
}

impl<S: PageSource> DownloadCoordinator<S> {
    /// Create a coordinator over a page source and a run-scoped progress handle
    pub fn new(source: Arc<S>, progress: Arc<ProgressTracker>) -> Self {
        Self { source, progress }
    }

    /// Download every page of the chapters selected by `range`
    ///
    /// Returns the successful fetches sorted ascending by
    /// `(chapter, page)`. An empty selection yields an empty result with a
    /// progress total of zero. Partial failure still returns whatever
    /// succeeded; success is never all-or-nothing at the page level.
    pub async fn download(
        &self,
        manifest: &Manifest,
        range: ChapterRange,
        workspace: &RunWorkspace,
    ) -> Vec<OrderedAsset> {
        let jobs: Vec<PageJob> = manifest
            .chapters_in(range)
            .flat_map(|chapter| {
                chapter.pages.iter().map(move |(&page, url)| PageJob {
                    chapter: chapter.number,
                    page,
                    url: url.clone(),
                })
            })
            .collect();

        // the total is fixed before any fetch begins
        let total = jobs.len();
        self.progress.begin(total as u64);

        if jobs.is_empty() {
            info!(
                title = %manifest.title,
                range = %range,
                "no pages selected, nothing to download"
            );
            self.progress.finish();
            return Vec::new();
        }

        info!(
            title = %manifest.title,
            range = %range,
            pages = total,
            workers = workers::WORKER_COUNT,
            "starting download"
        );

        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let (result_tx, mut result_rx) = mpsc::channel(workers::RESULT_CHANNEL_CAPACITY);

        let handles: Vec<_> = (0..workers::WORKER_COUNT)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let source = Arc::clone(&self.source);
                let workspace = workspace.clone();
                let result_tx = result_tx.clone();

                tokio::spawn(async move {
                    loop {
                        let job = { queue.lock().await.pop_front() };
                        let Some(job) = job else { break };

                        let dest = workspace.page_path(job.chapter, job.page);
                        let result = source.fetch_page(job, dest).await;
                        if result_tx.send(result).await.is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        drop(result_tx);

        let mut assets = Vec::with_capacity(total);
        while let Some(result) = result_rx.recv().await {
            // failures count toward completion so the percentage reaches
            // 100 even on a lossy run
            self.progress.page_completed();
            match result.outcome {
                FetchOutcome::Success(path) => assets.push(OrderedAsset {
                    chapter: result.chapter,
                    page: result.page,
                    path,
                }),
                FetchOutcome::Failure(reason) => {
                    warn!(
                        chapter = result.chapter,
                        page = result.page,
                        %reason,
                        "page excluded from output"
                    );
                }
            }
        }

        for join_result in join_all(handles).await {
            if let Err(e) = join_result {
                warn!("fetch worker panicked: {e}");
            }
        }

        // completion order is unspecified; canonicalize before returning
        assets.sort_unstable_by_key(|asset| (asset.chapter, asset.page));

        self.progress.finish();
        info!(
            title = %manifest.title,
            downloaded = assets.len(),
            attempted = total,
            "download finished"
        );
        assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::fetcher::FetchResult;
    use crate::app::manifest::Chapter;
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Source that records the peak number of concurrent fetches
    struct ConcurrencyProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ConcurrencyProbe {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl PageSource for ConcurrencyProbe {
        fn fetch_page(
            &self,
            job: PageJob,
            dest: PathBuf,
        ) -> impl Future<Output = FetchResult> + Send {
            let entered = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(entered, Ordering::SeqCst);
            async move {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                FetchResult::success(job.chapter, job.page, dest)
            }
        }
    }

    fn manifest_with_pages(chapters: &[(u32, u32)]) -> Manifest {
        let mut manifest = Manifest::new("Pool Test");
        for &(number, pages) in chapters {
            let pages: BTreeMap<u32, String> = (1..=pages)
                .map(|page| (page, format!("https://img.example/{number}/{page}.jpg")))
                .collect();
            manifest.chapters.push(Chapter { number, pages });
        }
        manifest
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_pool_size() {
        let temp = TempDir::new().unwrap();
        let workspace = RunWorkspace::new(temp.path(), "Pool Test");
        let manifest = manifest_with_pages(&[(1, 20)]);

        let probe = Arc::new(ConcurrencyProbe::new());
        let tracker = Arc::new(ProgressTracker::new());
        let coordinator = DownloadCoordinator::new(Arc::clone(&probe), tracker);

        let range = ChapterRange::new(1, 1).unwrap();
        let assets = coordinator.download(&manifest, range, &workspace).await;

        assert_eq!(assets.len(), 20);
        assert!(probe.peak.load(Ordering::SeqCst) <= workers::WORKER_COUNT);
    }

    #[tokio::test]
    async fn test_empty_selection_reports_zero_total() {
        let temp = TempDir::new().unwrap();
        let workspace = RunWorkspace::new(temp.path(), "Pool Test");
        let manifest = manifest_with_pages(&[(1, 3)]);

        let tracker = Arc::new(ProgressTracker::new());
        let coordinator =
            DownloadCoordinator::new(Arc::new(ConcurrencyProbe::new()), Arc::clone(&tracker));

        let range = ChapterRange::new(7, 9).unwrap();
        let assets = coordinator.download(&manifest, range, &workspace).await;

        assert!(assets.is_empty());
        assert_eq!(tracker.snapshot().total, 0);
    }
}
