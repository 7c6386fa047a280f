use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use clipscout_common::{CandidateRecord, ClipScoutError};

use crate::traits::SourceFetcher;

/// Runs every configured source concurrently and merges what comes back.
/// One source failing never cancels or fails its siblings.
pub struct FetchOrchestrator {
    sources: Vec<Arc<dyn SourceFetcher>>,
}

/// Merged records plus one `SourceFetch` error per source that failed.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<CandidateRecord>,
    pub failures: Vec<ClipScoutError>,
}

impl FetchOrchestrator {
    pub fn new(sources: Vec<Arc<dyn SourceFetcher>>) -> Self {
        Self { sources }
    }

    /// Concatenation of every successful source's records, in no particular
    /// cross-source order. Empty when all sources fail.
    pub async fn fetch_all(
        &self,
        topic: &str,
        per_source_limit: u32,
        recency_window_days: u32,
        min_views: u64,
    ) -> Vec<CandidateRecord> {
        self.fetch(topic, per_source_limit, recency_window_days, min_views)
            .await
            .records
    }

    /// As `fetch_all`, keeping the failures. Each source runs on its own
    /// task, so an error or a panic stays inside that source.
    pub async fn fetch(
        &self,
        topic: &str,
        per_source_limit: u32,
        recency_window_days: u32,
        min_views: u64,
    ) -> FetchOutcome {
        let tasks = self.sources.iter().map(|source| {
            let platform = source.platform();
            let source = Arc::clone(source);
            let topic = topic.to_string();
            let handle = tokio::spawn(async move {
                source
                    .search_videos(&topic, per_source_limit, recency_window_days, min_views)
                    .await
            });
            async move { (platform, handle.await) }
        });
        let results = join_all(tasks).await;

        let mut outcome = FetchOutcome::default();
        for (platform, joined) in results {
            let message = match joined {
                Ok(Ok(records)) => {
                    info!(%platform, count = records.len(), "Source returned candidates");
                    outcome.records.extend(records);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(e) if e.is_panic() => "source task panicked".to_string(),
                Err(e) => e.to_string(),
            };
            let error = ClipScoutError::SourceFetch {
                platform: platform.to_string(),
                message,
            };
            warn!(%platform, error = %error, "Source fetch failed, continuing without it");
            outcome.failures.push(error);
        }

        info!(
            topic,
            sources = self.sources.len(),
            failed = outcome.failures.len(),
            total = outcome.records.len(),
            "Fetch complete"
        );
        outcome
    }
}
