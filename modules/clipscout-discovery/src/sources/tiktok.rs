use anyhow::Result;
use apify_client::{ApifyClient, TikTokPost};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use clipscout_common::{CandidateRecord, Platform};

use crate::traits::SourceFetcher;

pub struct TikTokSource {
    client: ApifyClient,
}

impl TikTokSource {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceFetcher for TikTokSource {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    async fn search_videos(
        &self,
        topic: &str,
        max_results: u32,
        recency_window_days: u32,
        min_views: u64,
    ) -> Result<Vec<CandidateRecord>> {
        let raw = self.client.search_tiktok(topic, max_results).await?;

        let now = Utc::now();
        let cutoff = now - Duration::days(i64::from(recency_window_days));
        let records: Vec<CandidateRecord> = raw
            .into_iter()
            .filter_map(|p| to_candidate(p, now))
            .filter(|c| c.published_at >= cutoff && c.view_count >= min_views)
            .take(max_results as usize)
            .collect();

        info!(topic, count = records.len(), "tiktok: candidates fetched");
        Ok(records)
    }
}

fn to_candidate(post: TikTokPost, now: DateTime<Utc>) -> Option<CandidateRecord> {
    let published_at = post.created_at()?;
    let id = post.id?;
    let author = post.author_meta.unwrap_or(apify_client::TikTokAuthor {
        name: None,
        nick_name: None,
        profile_url: None,
    });
    let handle = author.name.unwrap_or_default();
    let text = post.text.unwrap_or_default();
    let (duration, cover) = match post.video_meta {
        Some(meta) => (
            meta.duration.map(|d| format!("{}", d.round() as u64)),
            meta.cover_url,
        ),
        None => (None, None),
    };

    let title = if text.trim().is_empty() {
        format!("Video by @{handle}")
    } else {
        ai_client::util::truncate_chars(text.trim(), 100).to_string()
    };

    Some(CandidateRecord {
        platform: Platform::TikTok,
        url: post
            .web_video_url
            .unwrap_or_else(|| format!("https://www.tiktok.com/@{handle}/video/{id}")),
        video_id: id,
        title,
        description: text,
        thumbnail_url: cover.unwrap_or_default(),
        view_count: post.play_count.unwrap_or(0).max(0) as u64,
        like_count: post.digg_count.unwrap_or(0).max(0) as u64,
        comment_count: post.comment_count.unwrap_or(0).max(0) as u64,
        author_url: author
            .profile_url
            .unwrap_or_else(|| format!("https://www.tiktok.com/@{handle}")),
        author: handle,
        published_at,
        age_days: CandidateRecord::age_in_days(published_at, now),
        tags: post
            .hashtags
            .unwrap_or_default()
            .into_iter()
            .filter_map(|h| h.name.map(|n| n.to_lowercase()))
            .filter(|n| !n.is_empty())
            .collect(),
        duration: duration.unwrap_or_default(),
        language: post.text_language,
        audio_language: None,
    })
}
