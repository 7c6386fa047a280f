//! End-to-end pipeline behaviour with mock sources, scripted models, and an
//! in-memory cache. No network access.

use std::sync::Arc;

use chrono::Duration;

use clipscout_common::{Platform, SearchSettings};
use clipscout_discovery::testing::{
    candidate_on, FailingModel, FailingSource, FixedClock, MockSource, ScriptedModel,
};
use clipscout_discovery::{Agent, ResultCache, SourceFetcher};

const SCORE_ALL: &str = r#"```json
[{"id": 1, "score": 92, "reason": "direct", "hook": "h"},
 {"id": 2, "score": 85, "reason": "close", "hook": "h"},
 {"id": 3, "score": 78, "reason": "related", "hook": "h"}]
```"#;

const RANK_TWO: &str = r#"[{"rank": 1, "id": 2, "reason": "best"}, {"rank": 2, "id": 1, "reason": "next"}]"#;

fn settings() -> SearchSettings {
    SearchSettings {
        min_views: 100_000,
        max_age_days: 60,
        ..SearchSettings::default()
    }
}

fn youtube() -> Arc<MockSource> {
    Arc::new(MockSource::new(Platform::YouTube).with_records(vec![
        candidate_on(Platform::YouTube, "yt-popular", 900_000, 5),
        candidate_on(Platform::YouTube, "yt-unpopular", 50_000, 5),
        candidate_on(Platform::YouTube, "yt-stale", 400_000, 90),
    ]))
}

fn tiktok() -> Arc<MockSource> {
    Arc::new(MockSource::new(Platform::TikTok).with_records(vec![
        candidate_on(Platform::TikTok, "tt-a", 300_000, 10),
        candidate_on(Platform::TikTok, "tt-b", 700_000, 2),
    ]))
}

fn sources(yt: &Arc<MockSource>, tt: &Arc<MockSource>) -> Vec<Arc<dyn SourceFetcher>> {
    vec![
        yt.clone() as Arc<dyn SourceFetcher>,
        tt.clone() as Arc<dyn SourceFetcher>,
        Arc::new(FailingSource::new(Platform::Instagram)) as Arc<dyn SourceFetcher>,
    ]
}

#[tokio::test]
async fn fresh_results_respect_thresholds_and_top_n() {
    let (yt, tt) = (youtube(), tiktok());
    let model = Arc::new(ScriptedModel::new().respond(SCORE_ALL).respond(RANK_TWO));
    let agent = Agent::new(sources(&yt, &tt), model.clone(), None, settings());

    let results = agent.search("home workouts", 2).await.unwrap();

    assert_eq!(results.len(), 2);
    for r in &results {
        assert!(r.candidate().view_count >= 100_000);
        assert!(r.candidate().age_days <= 60);
    }
    assert_eq!(results[0].final_rank, 1);
    assert_eq!(results[1].final_rank, 2);
    assert_eq!(results[0].recommendation_reason.as_deref(), Some("best"));
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn result_length_never_exceeds_top_n() {
    for top_n in 1..=6 {
        let (yt, tt) = (youtube(), tiktok());
        let agent = Agent::new(sources(&yt, &tt), Arc::new(FailingModel), None, settings());

        let results = agent.search("desk stretches", top_n).await.unwrap();
        assert!(results.len() <= top_n, "top_n={top_n} returned {}", results.len());
        assert_eq!(results.len(), top_n.min(3));
    }
}

#[tokio::test]
async fn second_search_within_ttl_is_served_from_cache() {
    let (yt, tt) = (youtube(), tiktok());
    let clock = Arc::new(FixedClock::default());
    let cache = ResultCache::in_memory(2, clock.clone()).await.unwrap();
    let model = Arc::new(ScriptedModel::new().respond(SCORE_ALL).respond(RANK_TWO));
    let agent = Agent::new(sources(&yt, &tt), model.clone(), Some(cache), settings());

    let first = agent.search("Home Workouts", 2).await.unwrap();
    clock.advance(Duration::minutes(90));
    let second = agent.search("  home workouts ", 2).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(model.calls(), 2);
    assert_eq!(yt.calls(), 1);
    assert_eq!(tt.calls(), 1);
}

#[tokio::test]
async fn cache_hit_is_sliced_to_requested_top_n() {
    let (yt, tt) = (youtube(), tiktok());
    let clock = Arc::new(FixedClock::default());
    let cache = ResultCache::in_memory(2, clock).await.unwrap();
    let model = Arc::new(ScriptedModel::new().respond(SCORE_ALL).respond(RANK_TWO));
    let agent = Agent::new(sources(&yt, &tt), model, Some(cache), settings());

    let first = agent.search("topic", 2).await.unwrap();
    let narrower = agent.search("topic", 1).await.unwrap();

    assert_eq!(narrower.len(), 1);
    assert_eq!(narrower[0], first[0]);
}

#[tokio::test]
async fn expired_entry_triggers_recomputation() {
    let (yt, tt) = (youtube(), tiktok());
    let clock = Arc::new(FixedClock::default());
    let cache = ResultCache::in_memory(2, clock.clone()).await.unwrap();
    let agent = Agent::new(sources(&yt, &tt), Arc::new(FailingModel), Some(cache), settings());

    agent.search("topic", 2).await.unwrap();
    clock.advance(Duration::hours(2) + Duration::seconds(1));
    agent.search("topic", 2).await.unwrap();

    assert_eq!(yt.calls(), 2);
}

#[tokio::test]
async fn empty_results_are_not_cached() {
    let clock = Arc::new(FixedClock::default());
    let cache = ResultCache::in_memory(2, clock).await.unwrap();
    let source = Arc::new(
        MockSource::new(Platform::YouTube)
            .with_records(vec![candidate_on(Platform::YouTube, "tiny", 10, 1)]),
    );
    let agent = Agent::new(
        vec![source.clone() as Arc<dyn SourceFetcher>],
        Arc::new(FailingModel),
        Some(cache.clone()),
        settings(),
    );

    assert!(agent.search("topic", 3).await.unwrap().is_empty());
    assert!(agent.search("topic", 3).await.unwrap().is_empty());
    assert_eq!(source.calls(), 2);
    assert_eq!(cache.entry_count().await.unwrap(), 0);
}

#[tokio::test]
async fn clear_cache_forces_recomputation() {
    let (yt, tt) = (youtube(), tiktok());
    let clock = Arc::new(FixedClock::default());
    let cache = ResultCache::in_memory(2, clock).await.unwrap();
    let agent = Agent::new(sources(&yt, &tt), Arc::new(FailingModel), Some(cache), settings());

    agent.search("topic", 2).await.unwrap();
    assert_eq!(agent.clear_cache(Some("TOPIC")).await.unwrap(), 1);
    agent.search("topic", 2).await.unwrap();

    assert_eq!(yt.calls(), 2);
}
