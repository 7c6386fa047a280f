pub mod error;
pub mod types;

pub use error::{Result, YouTubeError};
pub use types::{
    ContentDetails, SearchListResponse, Thumbnails, Video, VideoListResponse, VideoSearch,
    VideoSnippet, VideoStatistics,
};

use std::time::Duration;

use serde::de::DeserializeOwned;
use types::ErrorEnvelope;

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `search.list` and `videos.list` both cap a page at 50 items.
pub const MAX_PAGE_SIZE: u32 = 50;

pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client")
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http_client(REQUEST_TIMEOUT),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(YouTubeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Video IDs matching a query, most viewed first.
    pub async fn search_video_ids(&self, search: &VideoSearch) -> Result<Vec<String>> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("q", search.query.clone()),
            ("type", "video".to_string()),
            ("order", "viewCount".to_string()),
            ("maxResults", search.max_results.clamp(1, MAX_PAGE_SIZE).to_string()),
            (
                "publishedAfter",
                search
                    .published_after
                    .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            ),
        ];
        if let Some(ref region) = search.region_code {
            params.push(("regionCode", region.clone()));
        }
        if let Some(ref lang) = search.relevance_language {
            params.push(("relevanceLanguage", lang.clone()));
        }

        let resp: SearchListResponse = self.get("search", &params).await?;
        Ok(resp
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    /// Full video resources for up to 50 IDs. Items that fail to parse are
    /// skipped with a warning.
    pub async fn list_videos(&self, ids: &[String]) -> Result<Vec<Video>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("id", ids.join(",")),
            ("maxResults", MAX_PAGE_SIZE.to_string()),
        ];

        let resp: VideoListResponse = self.get("videos", &params).await?;
        let videos = resp
            .items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Video>(item) {
                Ok(video) => Some(video),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unparseable YouTube video");
                    None
                }
            })
            .collect();
        Ok(videos)
    }

    /// Search then hydrate: the two-call flow needed to get view counts.
    pub async fn search_videos(&self, search: &VideoSearch) -> Result<Vec<Video>> {
        tracing::info!(query = %search.query, max_results = search.max_results, "Searching YouTube");

        let ids = self.search_video_ids(search).await?;
        if ids.is_empty() {
            tracing::info!(query = %search.query, "YouTube search returned no videos");
            return Ok(Vec::new());
        }

        let videos = self.list_videos(&ids).await?;
        tracing::info!(count = videos.len(), "Fetched YouTube video details");
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stalled_server_hits_the_request_timeout() {
        // Accepts the connection and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = YouTubeClient::new("key".to_string())
            .with_base_url(format!("http://{addr}"))
            .with_timeout(Duration::from_millis(200));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            client.list_videos(&["abc".to_string()]),
        )
        .await
        .expect("request should time out on its own");

        assert!(matches!(result, Err(YouTubeError::Network(_))));
    }
}
