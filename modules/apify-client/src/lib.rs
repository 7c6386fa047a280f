pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    InstagramHashtagInput, InstagramPost, RunData, TikTokAuthor, TikTokHashtag, TikTokPost,
    TikTokSearchInput, TikTokVideoMeta,
};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Per-request timeout. Longer than the 60 s `waitForFinish` long-poll.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Each poll waits up to 60 s, so this bounds a run at roughly ten minutes.
const MAX_POLL_ATTEMPTS: u32 = 10;

/// apify/instagram-hashtag-scraper.
const INSTAGRAM_HASHTAG_SCRAPER: &str = "apify~instagram-hashtag-scraper";

/// clockworks/tiktok-scraper.
const TIKTOK_SCRAPER: &str = "clockworks~tiktok-scraper";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
    max_poll_attempts: u32,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            token,
            base_url: BASE_URL.to_string(),
            max_poll_attempts: MAX_POLL_ATTEMPTS,
        }
    }

    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize>(&self, actor: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    /// Gives up with `PollLimit` once `max_poll_attempts` polls have not seen
    /// a terminal status.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        for attempt in 1..=self.max_poll_attempts {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base_url, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApifyError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed {
                        run_id: api_resp.data.id,
                        status: api_resp.data.status,
                    });
                }
                _ => {
                    tracing::debug!(run_id, attempt, status = %api_resp.data.status, "Run still in progress");
                }
            }
        }

        Err(ApifyError::PollLimit {
            run_id: run_id.to_string(),
            attempts: self.max_poll_attempts,
        })
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json&clean=true", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Start, poll, and collect one actor run.
    async fn run_to_completion<I, T>(&self, actor: &str, input: &I) -> Result<Vec<T>>
    where
        I: Serialize,
        T: DeserializeOwned,
    {
        let run = self.start_run(actor, input).await?;
        tracing::info!(actor, run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        self.get_dataset_items(&completed.default_dataset_id).await
    }

    /// Scrape recent reels for a hashtag end-to-end.
    pub async fn search_instagram_hashtag(
        &self,
        hashtag: &str,
        limit: u32,
    ) -> Result<Vec<InstagramPost>> {
        tracing::info!(hashtag, limit, "Starting Instagram hashtag scrape");

        let input = InstagramHashtagInput {
            hashtags: vec![hashtag.to_string()],
            results_limit: limit,
            results_type: "reels".to_string(),
        };
        let posts: Vec<InstagramPost> = self
            .run_to_completion(INSTAGRAM_HASHTAG_SCRAPER, &input)
            .await?;
        tracing::info!(count = posts.len(), "Fetched Instagram posts");

        Ok(posts)
    }

    /// Search TikTok videos by keyword end-to-end.
    pub async fn search_tiktok(&self, query: &str, limit: u32) -> Result<Vec<TikTokPost>> {
        tracing::info!(query, limit, "Starting TikTok search scrape");

        let input = TikTokSearchInput {
            search_queries: vec![query.to_string()],
            results_per_page: limit,
            should_download_videos: false,
        };
        let posts: Vec<TikTokPost> = self.run_to_completion(TIKTOK_SCRAPER, &input).await?;
        tracing::info!(count = posts.len(), "Fetched TikTok posts");

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_for_run_stops_at_the_poll_limit() {
        // Port 9 is never reached: zero attempts means no request is sent.
        let client = ApifyClient::new("token".to_string())
            .with_base_url("http://127.0.0.1:9")
            .with_max_poll_attempts(0);

        match client.wait_for_run("run-1").await {
            Err(ApifyError::PollLimit { run_id, attempts }) => {
                assert_eq!(run_id, "run-1");
                assert_eq!(attempts, 0);
            }
            other => panic!("expected PollLimit, got {other:?}"),
        }
    }
}
