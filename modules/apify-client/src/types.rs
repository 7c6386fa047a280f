use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Instagram hashtag scraper types ---

/// Input for the apify/instagram-hashtag-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct InstagramHashtagInput {
    pub hashtags: Vec<String>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
    /// "reels" restricts results to video posts.
    #[serde(rename = "resultsType")]
    pub results_type: String,
}

/// A single Instagram post from the hashtag scraper dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct InstagramPost {
    pub id: Option<String>,
    pub caption: Option<String>,
    #[serde(rename = "ownerUsername")]
    pub owner_username: Option<String>,
    #[serde(rename = "ownerFullName")]
    pub owner_full_name: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "shortCode")]
    pub short_code: Option<String>,
    #[serde(rename = "displayUrl")]
    pub display_url: Option<String>,
    #[serde(rename = "likesCount")]
    pub likes_count: Option<i64>,
    #[serde(rename = "commentsCount")]
    pub comments_count: Option<i64>,
    #[serde(rename = "videoViewCount")]
    pub video_view_count: Option<i64>,
    #[serde(rename = "videoPlayCount")]
    pub video_play_count: Option<i64>,
    #[serde(rename = "videoDuration")]
    pub video_duration: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    /// "Video", "Image", or "Sidecar".
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub hashtags: Option<Vec<String>>,
}

impl InstagramPost {
    pub fn is_video(&self) -> bool {
        self.post_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("video"))
            || self.video_view_count.is_some()
            || self.video_play_count.is_some()
    }

    /// Best available view figure; play counts include replays so views win.
    pub fn views(&self) -> Option<u64> {
        self.video_view_count
            .or(self.video_play_count)
            .map(|v| v.max(0) as u64)
    }
}

// --- TikTok search scraper types ---

/// Input for clockworks/tiktok-scraper keyword/hashtag search.
#[derive(Debug, Clone, Serialize)]
pub struct TikTokSearchInput {
    #[serde(rename = "searchQueries")]
    pub search_queries: Vec<String>,
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
    #[serde(rename = "shouldDownloadVideos")]
    pub should_download_videos: bool,
}

/// A single TikTok post from the Apify dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct TikTokPost {
    pub id: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "textLanguage")]
    pub text_language: Option<String>,
    #[serde(rename = "webVideoUrl")]
    pub web_video_url: Option<String>,
    #[serde(rename = "createTimeISO")]
    pub create_time_iso: Option<String>,
    #[serde(rename = "authorMeta")]
    pub author_meta: Option<TikTokAuthor>,
    #[serde(rename = "videoMeta")]
    pub video_meta: Option<TikTokVideoMeta>,
    #[serde(rename = "diggCount")]
    pub digg_count: Option<i64>,
    #[serde(rename = "shareCount")]
    pub share_count: Option<i64>,
    #[serde(rename = "playCount")]
    pub play_count: Option<i64>,
    #[serde(rename = "commentCount")]
    pub comment_count: Option<i64>,
    pub hashtags: Option<Vec<TikTokHashtag>>,
}

impl TikTokPost {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.create_time_iso
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Author metadata from a TikTok post.
#[derive(Debug, Clone, Deserialize)]
pub struct TikTokAuthor {
    pub name: Option<String>,
    #[serde(rename = "nickName")]
    pub nick_name: Option<String>,
    #[serde(rename = "profileUrl")]
    pub profile_url: Option<String>,
}

/// Video metadata from a TikTok post.
#[derive(Debug, Clone, Deserialize)]
pub struct TikTokVideoMeta {
    /// Seconds.
    pub duration: Option<f64>,
    #[serde(rename = "coverUrl")]
    pub cover_url: Option<String>,
}

/// A hashtag reference in a TikTok post.
#[derive(Debug, Clone, Deserialize)]
pub struct TikTokHashtag {
    pub name: Option<String>,
}

// --- Run plumbing ---

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}
