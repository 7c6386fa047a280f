use std::fmt::Write;
use std::sync::Arc;

use ai_client::util::truncate_chars;
use tracing::{debug, info, warn};

use clipscout_common::{format_count, CandidateRecord, ClipScoutError, Result, ScoredRecord};

use crate::response::{decode_scores, ScoreItem};
use crate::traits::GenerativeModel;

/// Records scoring below this are dropped after the model call.
pub const RELEVANCE_THRESHOLD: u8 = 70;

const TITLE_CHARS: usize = 100;
const DESCRIPTION_CHARS: usize = 150;

/// First model stage: a 0–100 relevance score per record, then keep the
/// clearly relevant ones.
pub struct AiScorer {
    model: Arc<dyn GenerativeModel>,
}

impl AiScorer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Never fails. A model or decode failure falls back to view-count order
    /// with no score fields populated.
    pub async fn score(
        &self,
        records: Vec<CandidateRecord>,
        topic: &str,
        target_count: usize,
    ) -> Vec<ScoredRecord> {
        if records.is_empty() {
            return Vec::new();
        }
        info!(topic, candidates = records.len(), "Scoring relevance");

        match self.try_score(&records, topic, target_count).await {
            Ok(scored) => {
                info!(kept = scored.len(), "Relevance scoring complete");
                scored
            }
            Err(e) => {
                warn!(error = %e, "Relevance scoring failed, falling back to view-count order");
                fallback_by_views(records, target_count)
            }
        }
    }

    async fn try_score(
        &self,
        records: &[CandidateRecord],
        topic: &str,
        target_count: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let prompt = build_prompt(records, topic);
        let raw = self
            .model
            .generate(&prompt)
            .await
            .map_err(|e| ClipScoutError::ModelCall(e.to_string()))?;
        let items = decode_scores(&raw)?;
        Ok(apply_scores(records, items, target_count))
    }
}

/// Attach judgements by 1-based id, keep raw scores at or above the
/// threshold, best first. Out-of-range ids are ignored; a repeated id overrides the
/// earlier judgement.
pub(crate) fn apply_scores(
    records: &[CandidateRecord],
    items: Vec<ScoreItem>,
    target_count: usize,
) -> Vec<ScoredRecord> {
    let mut judgements: Vec<Option<ScoreItem>> = vec![None; records.len()];
    for item in items {
        match judgements.get_mut(item.id - 1) {
            Some(slot) => *slot = Some(item),
            None => debug!(id = item.id, "Score id out of range"),
        }
    }

    let mut kept: Vec<(f64, ScoredRecord)> = records
        .iter()
        .zip(judgements)
        .filter_map(|(record, judgement)| {
            let item = judgement?;
            (item.score >= f64::from(RELEVANCE_THRESHOLD)).then(|| {
                let scored = ScoredRecord {
                    candidate: record.clone(),
                    relevance_score: Some(item.score.round() as u8),
                    relevance_reason: item.reason,
                    hook_text: item.hook,
                };
                (item.score, scored)
            })
        })
        .collect();

    kept.sort_by(|a, b| b.0.total_cmp(&a.0));
    kept.truncate(target_count);
    kept.into_iter().map(|(_, scored)| scored).collect()
}

/// Most viewed first, unscored.
pub fn fallback_by_views(mut records: Vec<CandidateRecord>, target_count: usize) -> Vec<ScoredRecord> {
    records.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    records.truncate(target_count);
    records.into_iter().map(ScoredRecord::unscored).collect()
}

fn build_prompt(records: &[CandidateRecord], topic: &str) -> String {
    let mut listing = String::new();
    for (i, r) in records.iter().enumerate() {
        let _ = writeln!(
            listing,
            "{}. [{}] {}\n   Author: {}\n   Description: {}\n   Views: {} | {} days ago",
            i + 1,
            r.platform,
            one_line(truncate_chars(&r.title, TITLE_CHARS)),
            r.author,
            one_line(truncate_chars(&r.description, DESCRIPTION_CHARS)),
            format_count(r.view_count),
            r.age_days,
        );
    }

    format!(
        r#"You are a short-form video content analyst. Judge how relevant each of the following videos is to the topic "{topic}".

These are real videos with real view counts and authors. Base your judgement on the data given.

Scoring rubric:
- 90-100: fully relevant, the content directly matches the topic and is worth studying
- 70-89: highly relevant, covers a core aspect of the topic
- 50-69: moderately relevant, only part of the content matches
- 30-49: weakly relevant, the topic is only mentioned in the title
- 0-29: irrelevant or clickbait

Videos:
{listing}
Return a JSON array with one object per video:
- id: the video's number (starting at 1)
- score: relevance score (0-100)
- reason: short reason (under 15 words)
- hook: the video's core hook (under 15 words)

Output only JSON, no other text:
[{{"id": 1, "score": 85, "reason": "complete tutorial covering the essentials", "hook": "zero to a million followers"}}, ...]"#
    )
}

fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
