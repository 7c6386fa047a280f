// Trait seams for the discovery pipeline.
//
// SourceFetcher: one content platform, topic in, candidate records out.
// GenerativeModel: prompt in, untrusted text out.
// Clock: wall-clock reads for cache expiry.
//
// Each has a production implementation here or in `sources`, and a mock in
// `testing` so the pipeline runs without network or real time.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ai_client::{Claude, Gemini};
use clipscout_common::{CandidateRecord, Platform};

// ---------------------------------------------------------------------------
// SourceFetcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    fn platform(&self) -> Platform;

    /// Search one platform for videos on `topic` published within the last
    /// `recency_window_days`. `min_views` is a hint; sources that can filter
    /// server-side or while paging use it, others ignore it.
    async fn search_videos(
        &self,
        topic: &str,
        max_results: u32,
        recency_window_days: u32,
        min_views: u64,
    ) -> Result<Vec<CandidateRecord>>;
}

// ---------------------------------------------------------------------------
// GenerativeModel
// ---------------------------------------------------------------------------

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl GenerativeModel for Gemini {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}

#[async_trait]
impl GenerativeModel for Claude {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
