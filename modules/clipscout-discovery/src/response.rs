// Decoding of free-text model output into typed scoring and ranking items.
//
// The model is untrusted: the payload may be fenced, may not be JSON, and
// individual entries may be missing fields or carry out-of-range numbers.
// A payload that is not a JSON array is a decode error for the whole
// response. Entries that fail validation are dropped one by one.

use ai_client::strip_code_blocks;
use serde_json::Value;
use tracing::debug;

use clipscout_common::{ClipScoutError, Result};

/// One relevance judgement. `id` is the 1-based index from the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreItem {
    pub id: usize,
    /// As given by the model, 0–100. Rounded only when stored on a record.
    pub score: f64,
    pub reason: Option<String>,
    pub hook: Option<String>,
}

/// One placement in the final ordering. `id` is the 1-based index from the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct RankItem {
    pub rank: u32,
    pub id: usize,
    pub reason: Option<String>,
    /// 0–100 after clamping.
    pub final_score: f64,
    /// 0–10 after clamping.
    pub replicability_score: Option<u8>,
    pub key_takeaway: Option<String>,
}

pub fn decode_scores(raw: &str) -> Result<Vec<ScoreItem>> {
    let items = decode_array(raw)?;
    Ok(items
        .iter()
        .filter_map(|item| {
            let decoded = score_item(item);
            if decoded.is_none() {
                debug!(%item, "Dropping invalid score item");
            }
            decoded
        })
        .collect())
}

pub fn decode_ranks(raw: &str) -> Result<Vec<RankItem>> {
    let items = decode_array(raw)?;
    Ok(items
        .iter()
        .filter_map(|item| {
            let decoded = rank_item(item);
            if decoded.is_none() {
                debug!(%item, "Dropping invalid rank item");
            }
            decoded
        })
        .collect())
}

fn decode_array(raw: &str) -> Result<Vec<Value>> {
    let body = strip_code_blocks(raw);
    if body.is_empty() {
        return Err(ClipScoutError::ModelResponse("empty response".to_string()));
    }
    match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => Ok(items),
        other => Err(ClipScoutError::ModelResponse(format!(
            "expected a JSON array, got {}",
            kind(&other)
        ))),
    }
}

fn score_item(item: &Value) -> Option<ScoreItem> {
    let obj = item.as_object()?;
    let id = positive_integer(obj.get("id")?)?;
    let score = number(obj.get("score")?)?;
    if !(0.0..=100.0).contains(&score) {
        return None;
    }
    Some(ScoreItem {
        id: usize::try_from(id).ok()?,
        score,
        reason: text(obj.get("reason")),
        hook: text(obj.get("hook")),
    })
}

fn rank_item(item: &Value) -> Option<RankItem> {
    let obj = item.as_object()?;
    let rank = positive_integer(obj.get("rank")?)?;
    let id = positive_integer(obj.get("id")?)?;

    let final_score = obj
        .get("finalScore")
        .and_then(number)
        .or_else(|| obj.get("score").and_then(number))
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);
    let replicability_score = obj
        .get("replicabilityScore")
        .and_then(number)
        .map(|s| s.clamp(0.0, 10.0).round() as u8);

    Some(RankItem {
        rank: u32::try_from(rank).ok()?,
        id: usize::try_from(id).ok()?,
        reason: text(obj.get("reasonForSuccess")).or_else(|| text(obj.get("reason"))),
        final_score,
        replicability_score,
        key_takeaway: text(obj.get("keyTakeaway")),
    })
}

/// Integers ≥ 1, given either as a JSON number or a numeric string.
fn positive_integer(value: &Value) -> Option<u64> {
    let n = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        })?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (n >= 1).then_some(n)
}

fn number(value: &Value) -> Option<f64> {
    let n: f64 = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_and_plain_scores_decode_identically() {
        let plain = r#"[{"id": 1, "score": 92, "reason": "on topic", "hook": "Try this"}]"#;
        let fenced = format!("```json\n{plain}\n```");
        assert_eq!(decode_scores(&fenced).unwrap(), decode_scores(plain).unwrap());
    }

    #[test]
    fn invalid_score_items_are_dropped_individually() {
        let raw = r#"[
            {"id": 1, "score": 85},
            {"id": 2, "score": 140},
            {"id": 0, "score": 90},
            {"score": 90},
            {"id": "3", "score": "71.6", "reason": "  "},
            "garbage"
        ]"#;
        let items = decode_scores(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[1].id, 3);
        assert_eq!(items[1].score, 71.6);
        assert_eq!(items[1].reason, None);
    }

    #[test]
    fn non_array_payload_is_an_error() {
        assert!(matches!(
            decode_scores(r#"{"id": 1, "score": 90}"#),
            Err(ClipScoutError::ModelResponse(_))
        ));
        assert!(decode_scores("I could not score these videos.").is_err());
        assert!(decode_scores("```json\n```").is_err());
    }

    #[test]
    fn rank_items_use_aliases_and_clamp() {
        let raw = r#"[
            {"rank": 1, "id": 4, "reasonForSuccess": "strong hook", "reason": "ignored",
             "finalScore": 120, "replicabilityScore": 14, "keyTakeaway": "open fast"},
            {"rank": 2, "id": 2, "reason": "steady", "score": 77.5},
            {"rank": 3, "id": 1},
            {"id": 5, "reason": "no rank"}
        ]"#;
        let items = decode_ranks(raw).unwrap();
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].reason.as_deref(), Some("strong hook"));
        assert_eq!(items[0].final_score, 100.0);
        assert_eq!(items[0].replicability_score, Some(10));
        assert_eq!(items[0].key_takeaway.as_deref(), Some("open fast"));

        assert_eq!(items[1].reason.as_deref(), Some("steady"));
        assert_eq!(items[1].final_score, 77.5);
        assert_eq!(items[1].replicability_score, None);

        assert_eq!(items[2].final_score, 0.0);
    }
}
