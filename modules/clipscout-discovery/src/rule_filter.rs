use tracing::debug;

use clipscout_common::{CandidateRecord, SearchSettings};

/// Popularity and freshness thresholds. No topic matching happens here.
#[derive(Debug, Clone)]
pub struct RuleFilter {
    pub min_views: u64,
    pub max_age_days: u32,
    /// Lowercased language codes. Empty disables the language check.
    pub allowed_languages: Vec<String>,
}

impl RuleFilter {
    pub fn new(min_views: u64, max_age_days: u32) -> Self {
        Self {
            min_views,
            max_age_days,
            allowed_languages: Vec::new(),
        }
    }

    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self {
            min_views: settings.min_views,
            max_age_days: settings.max_age_days,
            allowed_languages: settings.allowed_languages.clone(),
        }
    }

    pub fn with_allowed_languages(mut self, languages: Vec<String>) -> Self {
        self.allowed_languages = languages.into_iter().map(|l| l.to_lowercase()).collect();
        self
    }

    pub fn accepts(&self, record: &CandidateRecord) -> bool {
        record.view_count >= self.min_views
            && record.age_days <= self.max_age_days
            && self.language_allowed(record)
    }

    /// A record with no language hint passes. Otherwise any hint whose
    /// primary subtag (`en` in `en-US`) is allowed passes.
    fn language_allowed(&self, record: &CandidateRecord) -> bool {
        if self.allowed_languages.is_empty() {
            return true;
        }
        let hints = record.language_hints();
        if hints.is_empty() {
            return true;
        }
        hints.iter().any(|hint| {
            let primary = hint.split(['-', '_']).next().unwrap_or(hint.as_str());
            self.allowed_languages
                .iter()
                .any(|allowed| allowed == hint || allowed == primary)
        })
    }

    /// Keep records passing the thresholds. Above `target_count`, keep the
    /// most viewed; the sort is stable so equal view counts keep input order.
    pub fn filter(&self, records: Vec<CandidateRecord>, target_count: usize) -> Vec<CandidateRecord> {
        let input = records.len();
        let mut kept: Vec<CandidateRecord> = records
            .into_iter()
            .filter(|r| {
                let ok = self.accepts(r);
                if !ok {
                    debug!(
                        platform = %r.platform,
                        video_id = r.video_id.as_str(),
                        views = r.view_count,
                        age_days = r.age_days,
                        "Rule filter dropped record"
                    );
                }
                ok
            })
            .collect();

        if kept.len() > target_count {
            kept.sort_by(|a, b| b.view_count.cmp(&a.view_count));
            kept.truncate(target_count);
        }

        debug!(input, kept = kept.len(), target_count, "Rule filter applied");
        kept
    }
}
