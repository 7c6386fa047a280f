use std::sync::Arc;

use apify_client::ApifyClient;
use tracing::{info, warn};
use youtube_client::YouTubeClient;

use ai_client::{Claude, Gemini};
use clipscout_common::{
    positioned_in_order, ClipScoutError, Config, ModelProvider, RankedRecord, Result,
    ScoredRecord, SearchSettings,
};

use crate::cache::ResultCache;
use crate::fetch::FetchOrchestrator;
use crate::ranker::AiRanker;
use crate::rule_filter::RuleFilter;
use crate::scorer::AiScorer;
use crate::sources::{InstagramSource, TikTokSource, YouTubeSource};
use crate::traits::{GenerativeModel, SourceFetcher, SystemClock};

/// The discovery pipeline: cache → fetch → rule filter → score → rank → cache.
pub struct Agent {
    fetcher: FetchOrchestrator,
    rule_filter: RuleFilter,
    scorer: AiScorer,
    ranker: AiRanker,
    cache: Option<ResultCache>,
    settings: SearchSettings,
}

impl Agent {
    /// Assemble from parts. `cache` of `None` runs every search uncached.
    pub fn new(
        sources: Vec<Arc<dyn SourceFetcher>>,
        model: Arc<dyn GenerativeModel>,
        cache: Option<ResultCache>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            fetcher: FetchOrchestrator::new(sources),
            rule_filter: RuleFilter::from_settings(&settings),
            scorer: AiScorer::new(model.clone()),
            ranker: AiRanker::new(model),
            cache,
            settings,
        }
    }

    /// Wire real clients from configuration. YouTube is always searched;
    /// Instagram and TikTok need an Apify token. A cache that cannot be
    /// opened is logged and skipped.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut sources: Vec<Arc<dyn SourceFetcher>> = vec![Arc::new(YouTubeSource::new(
            YouTubeClient::new(config.youtube_api_key.clone()),
            &config.youtube_region_code,
            &config.youtube_relevance_language,
        ))];

        match config.apify_api_key {
            Some(ref token) => {
                sources.push(Arc::new(InstagramSource::new(ApifyClient::new(token.clone()))));
                sources.push(Arc::new(TikTokSource::new(ApifyClient::new(token.clone()))));
            }
            None => warn!("APIFY_API_KEY not set, Instagram and TikTok sources disabled"),
        }

        let model: Arc<dyn GenerativeModel> = match config.model_provider {
            ModelProvider::Gemini => Arc::new(Gemini::new(
                config.model_api_key.clone(),
                config.model_name.clone(),
            )),
            ModelProvider::Claude => Arc::new(Claude::new(
                config.model_api_key.clone(),
                config.model_name.clone(),
            )),
        };

        let cache = if config.cache.enabled {
            match ResultCache::connect(
                &config.cache.database_url,
                config.cache.expiry_hours,
                Arc::new(SystemClock),
            )
            .await
            {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!(error = %e, "Result cache unavailable, searching without it");
                    None
                }
            }
        } else {
            info!("Result cache disabled");
            None
        };

        info!(
            sources = sources.len(),
            provider = ?config.model_provider,
            model = config.model_name.as_str(),
            cache = cache.is_some(),
            "Agent ready"
        );
        Ok(Self::new(sources, model, cache, config.search.clone()))
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Up to `top_n` ranked videos for `topic`, served from cache when a
    /// live entry exists. An empty result means nothing qualified.
    pub async fn search(&self, topic: &str, top_n: usize) -> Result<Vec<RankedRecord>> {
        self.run(topic, top_n, self.cache.as_ref()).await
    }

    /// As `search`, but neither reads nor writes the cache.
    pub async fn search_uncached(&self, topic: &str, top_n: usize) -> Result<Vec<RankedRecord>> {
        self.run(topic, top_n, None).await
    }

    async fn run(
        &self,
        topic: &str,
        top_n: usize,
        cache: Option<&ResultCache>,
    ) -> Result<Vec<RankedRecord>> {
        if top_n == 0 {
            return Err(ClipScoutError::Validation("top_n must be greater than zero".to_string()));
        }
        if topic.trim().is_empty() {
            return Err(ClipScoutError::Validation("topic must not be empty".to_string()));
        }
        info!(topic, top_n, "Search started");

        // 1. Cache
        if let Some(cache) = cache {
            if let Some(mut cached) = cache.get(topic).await {
                cached.truncate(top_n);
                info!(topic, returned = cached.len(), "Served from cache");
                return Ok(cached);
            }
        }

        // 2. Fetch
        let s = &self.settings;
        let fetched = self
            .fetcher
            .fetch_all(topic, s.max_results_per_source, s.max_age_days, s.min_views)
            .await;
        if fetched.is_empty() {
            info!(topic, "No candidates fetched");
            return Ok(Vec::new());
        }
        let fetched_count = fetched.len();

        // 3. Rule filter
        let filtered = self.rule_filter.filter(fetched, s.rule_filter_count);
        if filtered.is_empty() {
            info!(topic, fetched = fetched_count, "No candidates passed the rule filter");
            return Ok(Vec::new());
        }
        let filtered_count = filtered.len();

        // 4. Relevance scoring
        let scored = self.scorer.score(filtered.clone(), topic, s.ai_filter_count).await;
        if scored.is_empty() {
            info!(
                topic,
                fetched = fetched_count,
                filtered = filtered_count,
                "No candidates scored as relevant, returning rule-filtered set"
            );
            return Ok(positioned_in_order(
                filtered.into_iter().take(top_n).map(ScoredRecord::unscored),
            ));
        }
        let scored_count = scored.len();

        // 5. Ranking
        let mut ranked = self.ranker.rank(scored, topic, top_n).await;

        // 6. Cache the full set
        if let Some(cache) = cache {
            if !ranked.is_empty() {
                cache.set(topic, &ranked).await;
            }
        }

        ranked.truncate(top_n);
        info!(
            topic,
            fetched = fetched_count,
            filtered = filtered_count,
            scored = scored_count,
            ranked = ranked.len(),
            "Search complete"
        );
        Ok(ranked)
    }

    /// Remove one topic's cached results, or everything when `topic` is
    /// `None`. Returns the number of entries removed.
    pub async fn clear_cache(&self, topic: Option<&str>) -> Result<u64> {
        let Some(ref cache) = self.cache else {
            warn!("Result cache is disabled, nothing to clear");
            return Ok(0);
        };
        let removed = match topic {
            Some(topic) => u64::from(cache.delete(topic).await?),
            None => cache.clear_all().await?,
        };
        info!(topic = topic.unwrap_or("<all>"), removed, "Cache cleared");
        Ok(removed)
    }

    /// Remove every expired entry. Returns the number removed.
    pub async fn clear_expired_cache(&self) -> Result<u64> {
        let Some(ref cache) = self.cache else {
            warn!("Result cache is disabled, nothing to clear");
            return Ok(0);
        };
        let removed = cache.clear_expired().await?;
        info!(removed, "Expired cache entries cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{candidate_on, FixedClock, MockSource, ScriptedModel};
    use clipscout_common::Platform;

    fn settings() -> SearchSettings {
        SearchSettings {
            min_views: 100_000,
            max_age_days: 60,
            ..SearchSettings::default()
        }
    }

    #[tokio::test]
    async fn zero_top_n_is_rejected() {
        let agent = Agent::new(Vec::new(), Arc::new(ScriptedModel::new()), None, settings());
        assert!(matches!(
            agent.search("topic", 0).await,
            Err(ClipScoutError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn nothing_fetched_is_an_empty_result() {
        let model = Arc::new(ScriptedModel::new());
        let agent = Agent::new(
            vec![Arc::new(MockSource::new(Platform::YouTube)) as Arc<dyn SourceFetcher>],
            model.clone(),
            None,
            settings(),
        );
        assert!(agent.search("topic", 5).await.unwrap().is_empty());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn nothing_passing_filter_skips_models() {
        let model = Arc::new(ScriptedModel::new());
        let source = MockSource::new(Platform::YouTube)
            .with_records(vec![candidate_on(Platform::YouTube, "a", 10, 1)]);
        let agent = Agent::new(vec![Arc::new(source) as Arc<dyn SourceFetcher>], model.clone(), None, settings());

        assert!(agent.search("topic", 5).await.unwrap().is_empty());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn no_relevant_scores_returns_filtered_set_truncated() {
        let model = Arc::new(ScriptedModel::new().respond(r#"[{"id": 1, "score": 10}]"#));
        let source = MockSource::new(Platform::YouTube).with_records(vec![
            candidate_on(Platform::YouTube, "a", 200_000, 1),
            candidate_on(Platform::YouTube, "b", 300_000, 1),
            candidate_on(Platform::YouTube, "c", 400_000, 1),
        ]);
        let agent = Agent::new(vec![Arc::new(source) as Arc<dyn SourceFetcher>], model.clone(), None, settings());

        let results = agent.search("topic", 2).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.candidate().video_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(results[1].final_rank, 2);
        assert!(results.iter().all(|r| r.scored.relevance_score.is_none()));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn clearing_without_cache_is_a_no_op() {
        let agent = Agent::new(Vec::new(), Arc::new(ScriptedModel::new()), None, settings());
        assert_eq!(agent.clear_cache(None).await.unwrap(), 0);
        assert_eq!(agent.clear_expired_cache().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn uncached_search_leaves_cache_untouched() {
        let clock = Arc::new(FixedClock::default());
        let cache = ResultCache::in_memory(2, clock).await.unwrap();
        let model = Arc::new(
            ScriptedModel::new().respond(r#"[{"id": 1, "score": 90, "reason": "r", "hook": "h"}]"#),
        );
        let source = MockSource::new(Platform::TikTok)
            .with_records(vec![candidate_on(Platform::TikTok, "a", 900_000, 3)]);
        let agent = Agent::new(vec![Arc::new(source) as Arc<dyn SourceFetcher>], model, Some(cache.clone()), settings());

        let results = agent.search_uncached("topic", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(cache.entry_count().await.unwrap(), 0);
    }
}
