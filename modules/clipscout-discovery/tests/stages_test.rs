//! Stage-level scenarios: fetch isolation, rule filter thresholds, and the
//! deterministic fallbacks of the scoring and ranking stages.

use std::sync::Arc;

use clipscout_common::{CandidateRecord, ClipScoutError, Platform, ScoredRecord};
use clipscout_discovery::ranker::{combined_score, fallback_by_combined_score};
use clipscout_discovery::scorer::fallback_by_views;
use clipscout_discovery::testing::{
    candidate_on, FailingModel, FailingSource, MockSource, PanickingSource,
};
use clipscout_discovery::{AiRanker, AiScorer, FetchOrchestrator, RuleFilter, SourceFetcher};

#[tokio::test]
async fn one_failing_source_does_not_affect_the_other() {
    let ok = Arc::new(MockSource::new(Platform::YouTube).with_records(vec![
        candidate_on(Platform::YouTube, "a", 500_000, 1),
        candidate_on(Platform::YouTube, "b", 400_000, 2),
        candidate_on(Platform::YouTube, "c", 300_000, 3),
    ]));
    let fetcher = FetchOrchestrator::new(vec![
        ok.clone() as Arc<dyn SourceFetcher>,
        Arc::new(FailingSource::new(Platform::TikTok)) as Arc<dyn SourceFetcher>,
    ]);

    let outcome = fetcher.fetch("topic", 50, 60, 0).await;

    let mut ids: Vec<&str> = outcome.records.iter().map(|r| r.video_id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(ok.calls(), 1);

    assert_eq!(outcome.failures.len(), 1);
    match &outcome.failures[0] {
        ClipScoutError::SourceFetch { platform, message } => {
            assert_eq!(platform, "TikTok");
            assert!(message.contains("unavailable"));
        }
        other => panic!("expected a source fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn panicking_source_is_isolated_like_a_failure() {
    let ok = Arc::new(MockSource::new(Platform::YouTube).with_records(vec![
        candidate_on(Platform::YouTube, "a", 500_000, 1),
        candidate_on(Platform::YouTube, "b", 400_000, 2),
    ]));
    let fetcher = FetchOrchestrator::new(vec![
        Arc::new(PanickingSource::new(Platform::Instagram)) as Arc<dyn SourceFetcher>,
        ok.clone() as Arc<dyn SourceFetcher>,
    ]);

    let outcome = fetcher.fetch("topic", 50, 60, 0).await;

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(
        &outcome.failures[0],
        ClipScoutError::SourceFetch { platform, .. } if platform == "Instagram"
    ));
}

#[tokio::test]
async fn all_sources_failing_is_an_empty_result() {
    let fetcher = FetchOrchestrator::new(vec![
        Arc::new(FailingSource::new(Platform::YouTube)) as Arc<dyn SourceFetcher>,
        Arc::new(FailingSource::new(Platform::Instagram)) as Arc<dyn SourceFetcher>,
    ]);
    let outcome = fetcher.fetch("topic", 50, 60, 0).await;
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.failures.len(), 2);
    assert!(fetcher.fetch_all("topic", 50, 60, 0).await.is_empty());
}

#[tokio::test]
async fn no_sources_is_an_empty_result() {
    let fetcher = FetchOrchestrator::new(Vec::new());
    assert!(fetcher.fetch_all("topic", 50, 60, 0).await.is_empty());
}

#[test]
fn rule_filter_keeps_popular_recent_records() {
    let records = vec![
        candidate_on(Platform::YouTube, "first", 500_000, 15),
        candidate_on(Platform::Instagram, "second", 300_000, 20),
        candidate_on(Platform::TikTok, "low-views", 150_000, 10),
        candidate_on(Platform::YouTube, "too-old", 800_000, 80),
    ];

    let kept = RuleFilter::new(200_000, 60).filter(records, 30);

    let ids: Vec<&str> = kept.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
}

fn fixed_records() -> Vec<CandidateRecord> {
    vec![
        candidate_on(Platform::YouTube, "a", 120_000, 4),
        candidate_on(Platform::TikTok, "b", 880_000, 30),
        candidate_on(Platform::Instagram, "c", 450_000, 12),
        candidate_on(Platform::YouTube, "d", 610_000, 1),
    ]
}

#[tokio::test]
async fn scorer_fallback_is_view_order_truncated() {
    let scorer = AiScorer::new(Arc::new(FailingModel));

    let first = scorer.score(fixed_records(), "topic", 3).await;
    let second = scorer.score(fixed_records(), "topic", 3).await;

    let ids: Vec<&str> = first.iter().map(|s| s.candidate.video_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "d", "c"]);
    assert_eq!(first, second);
    assert_eq!(first, fallback_by_views(fixed_records(), 3));
}

#[tokio::test]
async fn ranker_fallback_reproduces_combined_score_order() {
    let scored: Vec<ScoredRecord> = fixed_records()
        .into_iter()
        .zip([Some(95), Some(70), None, Some(80)])
        .map(|(c, score)| ScoredRecord {
            relevance_score: score,
            ..ScoredRecord::unscored(c)
        })
        .collect();
    let ranker = AiRanker::new(Arc::new(FailingModel));

    let first = ranker.rank(scored.clone(), "topic", 3).await;
    let second = ranker.rank(scored.clone(), "topic", 3).await;
    assert_eq!(first, second);
    assert_eq!(first, fallback_by_combined_score(scored.clone(), 3));

    let max_views = 880_000.0;
    let expected = |s: &ScoredRecord| {
        let relevance = s.relevance_score.map(f64::from).unwrap_or(50.0);
        let views = 100.0 * s.candidate.view_count as f64 / max_views;
        let recency = (100.0 - 2.0 * f64::from(s.candidate.age_days)).max(0.0);
        0.6 * relevance + 0.3 * views + 0.1 * recency
    };
    for r in &first {
        let want = expected(&r.scored);
        assert!((r.final_score.unwrap() - want).abs() < 1e-9);
        assert!((combined_score(&r.scored, 880_000) - want).abs() < 1e-9);
    }

    let mut by_score: Vec<&ScoredRecord> = scored.iter().collect();
    by_score.sort_by(|a, b| expected(b).total_cmp(&expected(a)));
    let want_ids: Vec<&str> = by_score
        .iter()
        .take(3)
        .map(|s| s.candidate.video_id.as_str())
        .collect();
    let got_ids: Vec<&str> = first.iter().map(|r| r.candidate().video_id.as_str()).collect();
    assert_eq!(got_ids, want_ids);
}
