use chrono::{DateTime, Utc};
use serde::Deserialize;

// --- search.list ---

/// Parameters for a `search.list` call restricted to videos.
#[derive(Debug, Clone)]
pub struct VideoSearch {
    pub query: String,
    /// 1..=50; the API rejects anything larger.
    pub max_results: u32,
    pub published_after: DateTime<Utc>,
    pub region_code: Option<String>,
    pub relevance_language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<String>,
}

// --- videos.list ---

/// Items are kept raw so one malformed video does not fail the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

/// A single video resource with `snippet`, `statistics`, and `contentDetails` parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
    #[serde(default)]
    pub content_details: Option<ContentDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub default_language: Option<String>,
    #[serde(default)]
    pub default_audio_language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub high: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub default: Option<Thumbnail>,
}

impl Thumbnails {
    pub fn best_url(&self) -> Option<&str> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Counts arrive as decimal strings; hidden counts are simply absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

impl VideoStatistics {
    pub fn views(&self) -> u64 {
        parse_count(self.view_count.as_deref())
    }

    pub fn likes(&self) -> u64 {
        parse_count(self.like_count.as_deref())
    }

    pub fn comments(&self) -> u64 {
        parse_count(self.comment_count.as_deref())
    }
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentDetails {
    /// ISO 8601 duration, e.g. `PT1M3S`.
    pub duration: Option<String>,
}

/// Error body returned by Google APIs.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_parses_string_statistics() {
        let video: Video = serde_json::from_str(
            r#"{
                "id": "dQw4w9WgXcQ",
                "snippet": {
                    "publishedAt": "2025-01-20T15:00:00Z",
                    "channelId": "UC123",
                    "title": "Home workout, no equipment",
                    "description": "20 minutes",
                    "thumbnails": {"high": {"url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"}},
                    "channelTitle": "FitNow",
                    "tags": ["fitness", "home workout"],
                    "defaultAudioLanguage": "en-US"
                },
                "statistics": {"viewCount": "1520033", "likeCount": "40211"},
                "contentDetails": {"duration": "PT58S"}
            }"#,
        )
        .unwrap();

        assert_eq!(video.statistics.views(), 1_520_033);
        assert_eq!(video.statistics.likes(), 40_211);
        assert_eq!(video.statistics.comments(), 0);
        assert_eq!(
            video.snippet.thumbnails.best_url(),
            Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
        assert_eq!(video.snippet.default_audio_language.as_deref(), Some("en-US"));
    }

    #[test]
    fn search_results_without_video_id_parse() {
        let resp: SearchListResponse = serde_json::from_str(
            r#"{"items": [{"id": {"kind": "youtube#channel"}}, {"id": {"kind": "youtube#video", "videoId": "abc"}}]}"#,
        )
        .unwrap();
        let ids: Vec<_> = resp.items.iter().filter_map(|i| i.id.video_id.clone()).collect();
        assert_eq!(ids, vec!["abc".to_string()]);
    }
}
