// Test mocks for the discovery pipeline.
//
// One or two mocks per trait boundary:
// - MockSource / FailingSource / PanickingSource (SourceFetcher): canned records, an error, a panic
// - ScriptedModel / FailingModel (GenerativeModel): queued responses or a hard error
// - FixedClock (Clock): settable time for cache expiry
//
// Plus builders for Candidate / Scored / Ranked records.

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use clipscout_common::{CandidateRecord, Platform, RankedRecord, ScoredRecord};

use crate::traits::{Clock, GenerativeModel, SourceFetcher};

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

/// 2025-03-01 12:00 UTC, the default "now" for tests.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A YouTube candidate with 500k views, ten days old.
pub fn candidate(video_id: &str) -> CandidateRecord {
    candidate_on(Platform::YouTube, video_id, 500_000, 10)
}

pub fn candidate_on(
    platform: Platform,
    video_id: &str,
    view_count: u64,
    age_days: u32,
) -> CandidateRecord {
    CandidateRecord {
        platform,
        video_id: video_id.to_string(),
        title: format!("Video {video_id}"),
        description: format!("Description for {video_id}"),
        url: format!("https://example.com/{}/{video_id}", platform.as_str()),
        thumbnail_url: String::new(),
        view_count,
        like_count: view_count / 20,
        comment_count: view_count / 500,
        author: format!("creator_{video_id}"),
        author_url: format!("https://example.com/{}/creator_{video_id}", platform.as_str()),
        published_at: test_now() - Duration::days(i64::from(age_days)),
        age_days,
        tags: BTreeSet::new(),
        duration: String::new(),
        language: None,
        audio_language: None,
    }
}

pub fn scored(video_id: &str, relevance_score: u8) -> ScoredRecord {
    ScoredRecord {
        relevance_score: Some(relevance_score),
        relevance_reason: Some(format!("reason {video_id}")),
        hook_text: Some(format!("hook {video_id}")),
        ..ScoredRecord::unscored(candidate(video_id))
    }
}

/// A fully populated ranked record.
pub fn ranked(video_id: &str, final_rank: u32) -> RankedRecord {
    RankedRecord {
        scored: scored(video_id, 90),
        final_rank,
        final_score: Some(f64::from(100 - final_rank.min(100))),
        recommendation_reason: Some(format!("recommended {video_id}")),
        replicability_score: Some(7),
        key_takeaway: Some(format!("takeaway {video_id}")),
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Returns its canned records (capped at `max_results`) on every call.
pub struct MockSource {
    platform: Platform,
    records: Vec<CandidateRecord>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            records: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_records(mut self, records: Vec<CandidateRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for MockSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn search_videos(
        &self,
        _topic: &str,
        max_results: u32,
        _recency_window_days: u32,
        _min_views: u64,
    ) -> Result<Vec<CandidateRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}

/// Always errors.
pub struct FailingSource {
    platform: Platform,
}

impl FailingSource {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl SourceFetcher for FailingSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn search_videos(&self, _: &str, _: u32, _: u32, _: u64) -> Result<Vec<CandidateRecord>> {
        bail!("FailingSource: {} is unavailable", self.platform)
    }
}

/// Panics inside `search_videos`.
pub struct PanickingSource {
    platform: Platform,
}

impl PanickingSource {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl SourceFetcher for PanickingSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn search_videos(&self, _: &str, _: u32, _: u32, _: u64) -> Result<Vec<CandidateRecord>> {
        panic!("PanickingSource: {} blew up", self.platform)
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// Replies with queued responses in order, then errors once the queue is empty.
/// Builder pattern: `.respond()`.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, response: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(response.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.responses.lock().unwrap().pop_front() {
            Some(response) => Ok(response),
            None => bail!("ScriptedModel: no response queued"),
        }
    }
}

/// Always errors.
pub struct FailingModel;

#[async_trait]
impl GenerativeModel for FailingModel {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        bail!("FailingModel: quota exceeded")
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(test_now())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
