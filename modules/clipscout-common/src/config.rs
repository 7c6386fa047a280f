use std::env;

use crate::error::{ClipScoutError, Result};

/// Which generative model backs the scoring and ranking stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Gemini,
    Claude,
}

impl ModelProvider {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "gemini" => Ok(ModelProvider::Gemini),
            "claude" | "anthropic" => Ok(ModelProvider::Claude),
            other => Err(ClipScoutError::Config(format!(
                "MODEL_PROVIDER must be 'gemini' or 'claude', got '{other}'"
            ))),
        }
    }

    pub fn key_var(&self) -> &'static str {
        match self {
            ModelProvider::Gemini => "GEMINI_API_KEY",
            ModelProvider::Claude => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ModelProvider::Gemini => "gemini-2.5-flash",
            ModelProvider::Claude => "claude-haiku-4-5-20251001",
        }
    }
}

/// Thresholds and stage sizes for one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Candidates requested from each source.
    pub max_results_per_source: u32,
    pub min_views: u64,
    /// Recency window used both when fetching and when filtering.
    pub max_age_days: u32,
    /// Size cap after the rule filter.
    pub rule_filter_count: usize,
    /// Size cap after relevance scoring.
    pub ai_filter_count: usize,
    pub default_top_n: usize,
    /// Lowercased language codes; empty means no language filtering.
    pub allowed_languages: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results_per_source: 50,
            min_views: 100_000,
            max_age_days: 60,
            rule_filter_count: 30,
            ai_filter_count: 15,
            default_top_n: 10,
            allowed_languages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub expiry_hours: u32,
    pub database_url: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            expiry_hours: 2,
            database_url: "sqlite://clipscout-cache.db".to_string(),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Generative model
    pub model_provider: ModelProvider,
    pub model_api_key: String,
    pub model_name: String,

    // Sources
    pub youtube_api_key: String,
    pub youtube_region_code: String,
    pub youtube_relevance_language: String,
    pub apify_api_key: Option<String>,

    pub search: SearchSettings,
    pub cache: CacheSettings,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    /// Missing or placeholder credentials are a configuration error.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from an arbitrary key lookup. Used by `from_env` and tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let model_provider = match get("MODEL_PROVIDER") {
            Some(raw) => ModelProvider::parse(&raw)?,
            None => ModelProvider::Gemini,
        };

        let mut errors = Vec::new();
        let model_api_key = credential(&get, model_provider.key_var(), &mut errors);
        let youtube_api_key = credential(&get, "YOUTUBE_API_KEY", &mut errors);
        if !errors.is_empty() {
            return Err(ClipScoutError::Config(errors.join("; ")));
        }

        let defaults = SearchSettings::default();
        let search = SearchSettings {
            max_results_per_source: parse_or(&get, "MAX_RESULTS_PER_SOURCE", defaults.max_results_per_source)?,
            min_views: parse_or(&get, "MIN_VIEWS", defaults.min_views)?,
            max_age_days: parse_or(&get, "MAX_AGE_DAYS", defaults.max_age_days)?,
            rule_filter_count: parse_or(&get, "RULE_FILTER_COUNT", defaults.rule_filter_count)?,
            ai_filter_count: parse_or(&get, "AI_FILTER_COUNT", defaults.ai_filter_count)?,
            default_top_n: parse_or(&get, "TOP_N_RESULTS", defaults.default_top_n)?,
            allowed_languages: get("ALLOWED_LANGUAGES")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        };
        if search.default_top_n == 0 {
            return Err(ClipScoutError::Config("TOP_N_RESULTS must be greater than 0".to_string()));
        }

        let cache_defaults = CacheSettings::default();
        let cache = CacheSettings {
            enabled: get("CACHE_ENABLED")
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
                .unwrap_or(cache_defaults.enabled),
            expiry_hours: parse_or(&get, "CACHE_EXPIRY_HOURS", cache_defaults.expiry_hours)?,
            database_url: get("CACHE_DATABASE_URL").unwrap_or(cache_defaults.database_url),
        };

        Ok(Self {
            model_name: get("MODEL_NAME").unwrap_or_else(|| model_provider.default_model().to_string()),
            model_provider,
            model_api_key,
            youtube_api_key,
            youtube_region_code: get("YOUTUBE_REGION_CODE").unwrap_or_else(|| "US".to_string()),
            youtube_relevance_language: get("YOUTUBE_RELEVANCE_LANGUAGE")
                .unwrap_or_else(|| "en".to_string()),
            apify_api_key: get("APIFY_API_KEY").filter(|v| !is_placeholder(v)),
            search,
            cache,
        })
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(5).collect();
            format!("{}...({} chars)", head, val.chars().count())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  {}: {}", self.model_provider.key_var(), preview(&self.model_api_key));
        tracing::info!("  MODEL_NAME: {}", self.model_name);
        tracing::info!("  YOUTUBE_API_KEY: {}", preview(&self.youtube_api_key));
        tracing::info!("  APIFY_API_KEY: {}", preview_opt(&self.apify_api_key));
        tracing::info!(
            "  CACHE: enabled={} expiry_hours={} url={}",
            self.cache.enabled,
            self.cache.expiry_hours,
            self.cache.database_url
        );
    }
}

fn is_placeholder(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower.starts_with("your_") && lower.ends_with("_here")
}

fn credential<G>(get: &G, key: &str, errors: &mut Vec<String>) -> String
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) if !is_placeholder(&v) => v,
        _ => {
            errors.push(format!("{key} must be set"));
            String::new()
        }
    }
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ClipScoutError::Config(format!("{key} must be a number, got '{raw}'"))),
        None => Ok(default),
    }
}
