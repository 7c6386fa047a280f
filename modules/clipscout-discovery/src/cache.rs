use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};

use clipscout_common::{ClipScoutError, RankedRecord, Result};

use crate::traits::Clock;

/// Topic-keyed result sets with a fixed time-to-live, stored in SQLite.
///
/// Reads and writes never fail the caller: a store error on `get` is a
/// miss and a store error on `set` drops the write, both with a warning.
/// Administrative operations report errors.
#[derive(Clone)]
pub struct ResultCache {
    pool: SqlitePool,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

/// `"  Home Workout "` → `"home_workout"`.
pub fn normalize_key(topic: &str) -> String {
    topic.trim().to_lowercase().replace(' ', "_")
}

fn store_err(e: impl std::fmt::Display) -> ClipScoutError {
    ClipScoutError::CacheAccess(e.to_string())
}

impl ResultCache {
    /// Open (creating if needed) the database at `url` and apply migrations.
    pub async fn connect(url: &str, ttl_hours: u32, clock: Arc<dyn Clock>) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(store_err)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(store_err)?;
        Self::with_pool(pool, ttl_hours, clock).await
    }

    /// A private in-memory database. One connection that never idles out, so
    /// the data lives as long as the cache does.
    pub async fn in_memory(ttl_hours: u32, clock: Arc<dyn Clock>) -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(store_err)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(store_err)?;
        Self::with_pool(pool, ttl_hours, clock).await
    }

    async fn with_pool(pool: SqlitePool, ttl_hours: u32, clock: Arc<dyn Clock>) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(store_err)?;
        Ok(Self {
            pool,
            ttl: Duration::hours(i64::from(ttl_hours)),
            clock,
        })
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// Cached results for `topic`, if a live entry exists. An expired entry
    /// is removed on the way out.
    pub async fn get(&self, topic: &str) -> Option<Vec<RankedRecord>> {
        match self.try_get(topic).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(topic, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn try_get(&self, topic: &str) -> Result<Option<Vec<RankedRecord>>> {
        let key = normalize_key(topic);
        let row = sqlx::query_as::<_, (String, i64)>(
            "SELECT results, expires_at FROM video_cache WHERE query_key = ?",
        )
        .bind(&key)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        let Some((results, expires_at)) = row else {
            debug!(key, "Cache miss");
            return Ok(None);
        };

        if self.now_millis() > expires_at {
            sqlx::query("DELETE FROM video_cache WHERE query_key = ? AND expires_at = ?")
                .bind(&key)
                .bind(expires_at)
                .execute(&self.pool)
                .await
                .map_err(store_err)?;
            info!(key, "Cache entry expired and removed");
            return Ok(None);
        }

        let records: Vec<RankedRecord> = serde_json::from_str(&results).map_err(store_err)?;
        info!(key, count = records.len(), "Cache hit");
        Ok(Some(records))
    }

    /// Store `results` under `topic`, replacing any existing entry.
    pub async fn set(&self, topic: &str, results: &[RankedRecord]) {
        if let Err(e) = self.try_set(topic, results).await {
            warn!(topic, error = %e, "Cache write failed, result not cached");
        }
    }

    async fn try_set(&self, topic: &str, results: &[RankedRecord]) -> Result<()> {
        let key = normalize_key(topic);
        let payload = serde_json::to_string(results).map_err(store_err)?;
        let now = self.clock.now();
        let created_at = now.timestamp_millis();
        let expires_at = (now + self.ttl).timestamp_millis();

        sqlx::query(
            "INSERT OR REPLACE INTO video_cache (query_key, topic, results, created_at, expires_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&key)
        .bind(topic)
        .bind(&payload)
        .bind(created_at)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        info!(key, count = results.len(), ttl_hours = self.ttl.num_hours(), "Cached results");
        Ok(())
    }

    /// Remove the entry for `topic`. Returns whether one existed.
    pub async fn delete(&self, topic: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM video_cache WHERE query_key = ?")
            .bind(normalize_key(topic))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM video_cache")
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected())
    }

    /// Remove every entry whose expiry has passed, whatever its key.
    pub async fn clear_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM video_cache WHERE expires_at < ?")
            .bind(self.now_millis())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected())
    }

    /// Number of stored entries, live or expired.
    pub async fn entry_count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM video_cache")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)
    }
}
