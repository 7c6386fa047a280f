use anyhow::Result;
use apify_client::{ApifyClient, InstagramPost};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use clipscout_common::{CandidateRecord, Platform};

use crate::traits::SourceFetcher;

/// Hashtag pages mix images with reels, so ask for more than we keep.
const OVERFETCH_FACTOR: u32 = 3;

pub struct InstagramSource {
    client: ApifyClient,
}

impl InstagramSource {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

/// `"AI Coding #tips"` → `"aicodingtips"`.
pub(crate) fn topic_hashtag(topic: &str) -> String {
    topic
        .chars()
        .filter(|c| *c != '#' && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

#[async_trait]
impl SourceFetcher for InstagramSource {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn search_videos(
        &self,
        topic: &str,
        max_results: u32,
        recency_window_days: u32,
        min_views: u64,
    ) -> Result<Vec<CandidateRecord>> {
        let hashtag = topic_hashtag(topic);
        let raw = self
            .client
            .search_instagram_hashtag(&hashtag, max_results.saturating_mul(OVERFETCH_FACTOR))
            .await?;

        let now = Utc::now();
        let cutoff = now - Duration::days(i64::from(recency_window_days));
        let records = select_reels(raw, cutoff, min_views, max_results as usize, now);

        info!(hashtag, count = records.len(), "instagram: candidates fetched");
        Ok(records)
    }
}

fn select_reels(
    posts: Vec<InstagramPost>,
    cutoff: DateTime<Utc>,
    min_views: u64,
    max_results: usize,
    now: DateTime<Utc>,
) -> Vec<CandidateRecord> {
    posts
        .into_iter()
        .filter(InstagramPost::is_video)
        .filter(|p| p.timestamp.is_some_and(|ts| ts >= cutoff))
        .filter(|p| match p.views() {
            Some(views) => views >= min_views,
            None => true,
        })
        .filter_map(|p| {
            let candidate = to_candidate(p, now);
            if candidate.is_none() {
                debug!("instagram: skipping post without shortcode or owner");
            }
            candidate
        })
        .take(max_results)
        .collect()
}

fn to_candidate(post: InstagramPost, now: DateTime<Utc>) -> Option<CandidateRecord> {
    let short_code = post.short_code.clone()?;
    let owner = post.owner_username.clone()?;
    let published_at = post.timestamp?;
    let views = post.views().unwrap_or(0);
    let caption = post.caption.unwrap_or_default();

    let title = if caption.trim().is_empty() {
        format!("Video by {owner}")
    } else {
        ai_client::util::truncate_chars(caption.trim(), 100).to_string()
    };

    Some(CandidateRecord {
        platform: Platform::Instagram,
        url: post
            .url
            .unwrap_or_else(|| format!("https://www.instagram.com/p/{short_code}/")),
        video_id: short_code,
        title,
        description: caption,
        thumbnail_url: post.display_url.unwrap_or_default(),
        view_count: views,
        like_count: post.likes_count.unwrap_or(0).max(0) as u64,
        comment_count: post.comments_count.unwrap_or(0).max(0) as u64,
        author_url: format!("https://www.instagram.com/{owner}/"),
        author: owner,
        published_at,
        age_days: CandidateRecord::age_in_days(published_at, now),
        tags: post
            .hashtags
            .unwrap_or_default()
            .into_iter()
            .map(|h| h.to_lowercase())
            .collect(),
        duration: post
            .video_duration
            .map(|d| format!("{}", d.round() as u64))
            .unwrap_or_default(),
        language: None,
        audio_language: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(json: serde_json::Value) -> InstagramPost {
        serde_json::from_value(json).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap()
    }

    #[test]
    fn hashtag_strips_spaces_and_hash() {
        assert_eq!(topic_hashtag("AI Coding #tips"), "aicodingtips");
    }

    #[test]
    fn select_reels_applies_type_recency_and_views() {
        let cutoff = now() - Duration::days(60);
        let posts = vec![
            post(serde_json::json!({
                "type": "Video", "shortCode": "keep", "ownerUsername": "a",
                "videoViewCount": 300000, "timestamp": "2025-03-20T00:00:00Z",
                "caption": "Morning routine"
            })),
            post(serde_json::json!({
                "type": "Image", "shortCode": "image", "ownerUsername": "b",
                "timestamp": "2025-03-20T00:00:00Z"
            })),
            post(serde_json::json!({
                "type": "Video", "shortCode": "old", "ownerUsername": "c",
                "videoViewCount": 900000, "timestamp": "2024-11-01T00:00:00Z"
            })),
            post(serde_json::json!({
                "type": "Video", "shortCode": "low", "ownerUsername": "d",
                "videoViewCount": 20, "timestamp": "2025-03-20T00:00:00Z"
            })),
            post(serde_json::json!({
                "type": "Video", "shortCode": "unknown-views", "ownerUsername": "e",
                "timestamp": "2025-03-25T00:00:00Z"
            })),
        ];

        let records = select_reels(posts, cutoff, 100_000, 10, now());
        let ids: Vec<&str> = records.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["keep", "unknown-views"]);
        assert_eq!(records[0].age_days, 11);
        assert_eq!(records[1].title, "Video by e");
    }

    #[test]
    fn select_reels_caps_at_max_results() {
        let cutoff = now() - Duration::days(60);
        let posts = (0..5)
            .map(|i| {
                post(serde_json::json!({
                    "type": "Video", "shortCode": format!("p{i}"), "ownerUsername": "a",
                    "videoViewCount": 500000, "timestamp": "2025-03-20T00:00:00Z"
                }))
            })
            .collect();

        assert_eq!(select_reels(posts, cutoff, 0, 3, now()).len(), 3);
    }
}
