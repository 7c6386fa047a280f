use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use clipscout_common::{CandidateRecord, Platform};
use youtube_client::{Video, VideoSearch, YouTubeClient};

use crate::traits::SourceFetcher;

pub struct YouTubeSource {
    client: YouTubeClient,
    region_code: Option<String>,
    relevance_language: Option<String>,
}

impl YouTubeSource {
    pub fn new(
        client: YouTubeClient,
        region_code: impl Into<String>,
        relevance_language: impl Into<String>,
    ) -> Self {
        Self {
            client,
            region_code: Some(region_code.into()).filter(|s| !s.is_empty()),
            relevance_language: Some(relevance_language.into()).filter(|s| !s.is_empty()),
        }
    }
}

#[async_trait]
impl SourceFetcher for YouTubeSource {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    async fn search_videos(
        &self,
        topic: &str,
        max_results: u32,
        recency_window_days: u32,
        _min_views: u64,
    ) -> Result<Vec<CandidateRecord>> {
        let now = Utc::now();
        let search = VideoSearch {
            query: topic.to_string(),
            max_results,
            published_after: now - Duration::days(i64::from(recency_window_days)),
            region_code: self.region_code.clone(),
            relevance_language: self.relevance_language.clone(),
        };

        let videos = self.client.search_videos(&search).await?;
        let records: Vec<CandidateRecord> =
            videos.into_iter().map(|v| to_candidate(v, now)).collect();

        info!(topic, count = records.len(), "youtube: candidates fetched");
        Ok(records)
    }
}

fn to_candidate(video: Video, now: DateTime<Utc>) -> CandidateRecord {
    let snippet = video.snippet;
    let channel_url = snippet
        .channel_id
        .as_deref()
        .map(|id| format!("https://www.youtube.com/channel/{id}"))
        .unwrap_or_default();

    CandidateRecord {
        platform: Platform::YouTube,
        url: format!("https://www.youtube.com/watch?v={}", video.id),
        video_id: video.id,
        title: snippet.title,
        description: snippet.description,
        thumbnail_url: snippet.thumbnails.best_url().unwrap_or_default().to_string(),
        view_count: video.statistics.views(),
        like_count: video.statistics.likes(),
        comment_count: video.statistics.comments(),
        author: snippet.channel_title.unwrap_or_else(|| "Unknown".to_string()),
        author_url: channel_url,
        age_days: CandidateRecord::age_in_days(snippet.published_at, now),
        published_at: snippet.published_at,
        tags: snippet.tags.into_iter().collect(),
        duration: video
            .content_details
            .and_then(|c| c.duration)
            .unwrap_or_default(),
        language: snippet.default_language,
        audio_language: snippet.default_audio_language,
    }
}
