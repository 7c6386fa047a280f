use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Platforms ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[serde(rename = "youtube")]
    YouTube,
    Instagram,
    #[serde(rename = "tiktok")]
    TikTok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::YouTube => write!(f, "YouTube"),
            Platform::Instagram => write!(f, "Instagram"),
            Platform::TikTok => write!(f, "TikTok"),
        }
    }
}

// --- Candidate ---

/// One piece of short-form content from one platform, normalized by a source
/// fetcher. Identity is `(platform, video_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub platform: Platform,
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail_url: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub author: String,
    pub author_url: String,
    pub published_at: DateTime<Utc>,
    pub age_days: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Platform-native duration string (ISO 8601 for YouTube, seconds elsewhere).
    #[serde(default)]
    pub duration: String,
    /// Declared metadata language, when the platform reports one.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub audio_language: Option<String>,
}

impl CandidateRecord {
    /// Whole days between `published_at` and `now`, floored at zero.
    pub fn age_in_days(published_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
        let days = (now - published_at).num_days();
        u32::try_from(days.max(0)).unwrap_or(u32::MAX)
    }

    /// Language hints that are present, lowercased.
    pub fn language_hints(&self) -> Vec<String> {
        [self.language.as_deref(), self.audio_language.as_deref()]
            .into_iter()
            .flatten()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

// --- Scored ---

/// A candidate after the relevance stage. Score fields are empty when the
/// view-count fallback produced the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub candidate: CandidateRecord,
    #[serde(default)]
    pub relevance_score: Option<u8>,
    #[serde(default)]
    pub relevance_reason: Option<String>,
    #[serde(default)]
    pub hook_text: Option<String>,
}

impl ScoredRecord {
    pub fn unscored(candidate: CandidateRecord) -> Self {
        Self {
            candidate,
            relevance_score: None,
            relevance_reason: None,
            hook_text: None,
        }
    }
}

// --- Ranked ---

/// A scored record placed in a final result set. `final_rank` is 1-based and
/// dense within one result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecord {
    #[serde(flatten)]
    pub scored: ScoredRecord,
    pub final_rank: u32,
    #[serde(default)]
    pub final_score: Option<f64>,
    #[serde(default)]
    pub recommendation_reason: Option<String>,
    #[serde(default)]
    pub replicability_score: Option<u8>,
    #[serde(default)]
    pub key_takeaway: Option<String>,
}

impl RankedRecord {
    /// Wrap a scored record with only a rank attached.
    pub fn positioned(scored: ScoredRecord, final_rank: u32) -> Self {
        Self {
            scored,
            final_rank,
            final_score: None,
            recommendation_reason: None,
            replicability_score: None,
            key_takeaway: None,
        }
    }

    pub fn candidate(&self) -> &CandidateRecord {
        &self.scored.candidate
    }
}

/// Turn an ordered sequence of scored records into a ranked set with dense
/// ranks in sequence order.
pub fn positioned_in_order(records: impl IntoIterator<Item = ScoredRecord>) -> Vec<RankedRecord> {
    records
        .into_iter()
        .zip(1u32..)
        .map(|(scored, rank)| RankedRecord::positioned(scored, rank))
        .collect()
}

/// `1520033` → `"1,520,033"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
