use std::collections::HashSet;
use std::fmt::Write;
use std::sync::Arc;

use ai_client::util::truncate_chars;
use tracing::{debug, info, warn};

use clipscout_common::{
    format_count, positioned_in_order, ClipScoutError, RankedRecord, Result, ScoredRecord,
};

use crate::response::{decode_ranks, RankItem};
use crate::traits::GenerativeModel;

const TITLE_CHARS: usize = 80;

/// Relevance assumed for records the scorer could not judge.
const DEFAULT_RELEVANCE: f64 = 50.0;

/// Second model stage: pick and order the final top N.
pub struct AiRanker {
    model: Arc<dyn GenerativeModel>,
}

impl AiRanker {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Never fails. With `top_n` or fewer records there is nothing to choose
    /// and no model call is made; ranks follow input order.
    pub async fn rank(
        &self,
        records: Vec<ScoredRecord>,
        topic: &str,
        top_n: usize,
    ) -> Vec<RankedRecord> {
        if records.len() <= top_n {
            return positioned_in_order(records);
        }
        info!(topic, candidates = records.len(), top_n, "Ranking final selection");

        match self.try_rank(&records, topic, top_n).await {
            Ok(ranked) => {
                info!(selected = ranked.len(), "Ranking complete");
                ranked
            }
            Err(e) => {
                warn!(error = %e, "Ranking failed, falling back to combined score");
                fallback_by_combined_score(records, top_n)
            }
        }
    }

    async fn try_rank(
        &self,
        records: &[ScoredRecord],
        topic: &str,
        top_n: usize,
    ) -> Result<Vec<RankedRecord>> {
        let prompt = build_prompt(records, topic, top_n);
        let raw = self
            .model
            .generate(&prompt)
            .await
            .map_err(|e| ClipScoutError::ModelCall(e.to_string()))?;
        let items = decode_ranks(&raw)?;

        let ranked = apply_ranks(records, items, top_n);
        if ranked.is_empty() {
            return Err(ClipScoutError::ModelResponse(
                "no ranking entry referenced a candidate".to_string(),
            ));
        }
        Ok(ranked)
    }
}

/// Map rank items back to records by 1-based id, order by the model's rank,
/// cap at `top_n`, then renumber 1..=n. The first item for an id wins.
pub(crate) fn apply_ranks(
    records: &[ScoredRecord],
    items: Vec<RankItem>,
    top_n: usize,
) -> Vec<RankedRecord> {
    let mut seen = HashSet::new();
    let mut placed = Vec::with_capacity(items.len().min(top_n));

    for item in items {
        let Some(record) = records.get(item.id - 1) else {
            debug!(id = item.id, "Rank id out of range");
            continue;
        };
        if !seen.insert(item.id) {
            debug!(id = item.id, "Duplicate rank id");
            continue;
        }
        placed.push(RankedRecord {
            scored: record.clone(),
            final_rank: item.rank,
            final_score: Some(item.final_score),
            recommendation_reason: item.reason,
            replicability_score: item.replicability_score,
            key_takeaway: item.key_takeaway,
        });
    }

    placed.sort_by_key(|r| r.final_rank);
    placed.truncate(top_n);
    for (record, rank) in placed.iter_mut().zip(1u32..) {
        record.final_rank = rank;
    }
    placed
}

/// `0.6·relevance + 0.3·normalized views + 0.1·recency`, each on a 0–100
/// scale. `max_views` of zero normalizes every record's views to zero.
pub fn combined_score(record: &ScoredRecord, max_views: u64) -> f64 {
    let relevance = record
        .relevance_score
        .map(f64::from)
        .unwrap_or(DEFAULT_RELEVANCE);
    let normalized_views = if max_views > 0 {
        100.0 * record.candidate.view_count as f64 / max_views as f64
    } else {
        0.0
    };
    let recency = (100.0 - 2.0 * f64::from(record.candidate.age_days)).max(0.0);

    0.6 * relevance + 0.3 * normalized_views + 0.1 * recency
}

/// Highest combined score first. Equal scores keep input order.
pub fn fallback_by_combined_score(records: Vec<ScoredRecord>, top_n: usize) -> Vec<RankedRecord> {
    let max_views = records
        .iter()
        .map(|r| r.candidate.view_count)
        .max()
        .unwrap_or(0);

    let mut scored: Vec<(f64, ScoredRecord)> = records
        .into_iter()
        .map(|r| (combined_score(&r, max_views), r))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(top_n);

    scored
        .into_iter()
        .zip(1u32..)
        .map(|((score, record), rank)| RankedRecord {
            final_score: Some(score),
            ..RankedRecord::positioned(record, rank)
        })
        .collect()
}

fn build_prompt(records: &[ScoredRecord], topic: &str, top_n: usize) -> String {
    let mut listing = String::new();
    for (i, r) in records.iter().enumerate() {
        let c = &r.candidate;
        let relevance = r
            .relevance_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(
            listing,
            "{}. [{}] {}\n   Author: @{}\n   Views: {} | {} days ago\n   Relevance: {}",
            i + 1,
            c.platform,
            truncate_chars(&c.title, TITLE_CHARS),
            c.author,
            format_count(c.view_count),
            c.age_days,
            relevance,
        );
    }

    format!(
        r#"You are a video recommendation expert. From the videos below, choose the best {top_n} to recommend to someone interested in "{topic}".

Selection criteria:
1. Relevance: the content closely matches the topic
2. Popularity: views and engagement show the video resonates
3. Recency: newer videos are preferred, but this is not the only criterion
4. Diversity: cover different angles of the topic
5. Platform balance: include videos from each platform present where quality allows

Candidate videos:
{listing}
Return a JSON array with the best {top_n} videos, best first:
[
  {{
    "rank": 1,
    "id": <video number>,
    "reason": "why it is recommended (under 15 words)",
    "replicabilityScore": <0-10, how easy the format is to replicate>,
    "keyTakeaway": "the one thing a creator should learn from it"
  }},
  ...
]

Output only JSON, no other text."#
    )
}
