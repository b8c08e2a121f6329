// src/store/mod.rs
use crate::models::{MonthlyStats, NotificationItem, RawDailyRecord};
use async_trait::async_trait;
use log::{debug, info, warn};
use redis::{aio::MultiplexedConnection, AsyncCommands};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_key_prefix() -> String {
    "bets".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/0".to_string(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl StoreConfig {
    /// Overrides from environment variables, loading .env if available.
    pub fn apply_env(&mut self) {
        dotenv::dotenv().ok();

        if let Ok(url) = std::env::var("REDIS_URL") {
            self.url = url;
        }
        if let Ok(prefix) = std::env::var("BET_KEY_PREFIX") {
            self.key_prefix = prefix;
        }
    }
}

/// Store failures keep the boundary that failed visible, so a caller can
/// tell a failed read of the daily records from a failed snapshot write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to record store: {0}")]
    Connect(#[source] redis::RedisError),

    #[error("failed to read from record store: {0}")]
    Read(#[source] redis::RedisError),

    #[error("failed to write to record store: {0}")]
    Write(#[source] redis::RedisError),

    #[error("failed to encode value for storage: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode stored snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Interface to the keyed record store. The engine only ever performs point
/// operations against it: one read of a month's records at the start of a
/// run and one snapshot write at the end.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All daily records for a month, date-sorted. Individual payloads that
    /// fail to decode are skipped, not fatal.
    async fn fetch_month_records(&self, month: &str) -> Result<Vec<RawDailyRecord>, StoreError>;

    /// Overwrites the monthly snapshot. No merge semantics; last writer wins.
    async fn write_monthly_stats(&self, month: &str, stats: &MonthlyStats)
        -> Result<(), StoreError>;

    async fn read_monthly_stats(&self, month: &str) -> Result<Option<MonthlyStats>, StoreError>;

    async fn fetch_notifications(&self, date: &str) -> Result<Vec<NotificationItem>, StoreError>;

    async fn store_notifications(
        &self,
        date: &str,
        items: &[NotificationItem],
    ) -> Result<(), StoreError>;

    /// Months that have at least one daily record stored.
    async fn list_record_months(&self) -> Result<Vec<String>, StoreError>;
}

/// Decodes raw `(date key, JSON payload)` entries into daily records,
/// skipping payloads that do not parse. Entries are sorted by date key so a
/// run always folds records in the same order.
pub fn decode_daily_records(mut entries: Vec<(String, String)>) -> Vec<RawDailyRecord> {
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut records = Vec::with_capacity(entries.len());
    for (date, payload) in entries {
        match serde_json::from_str::<RawDailyRecord>(&payload) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping unreadable daily record for {}: {}", date, e);
            }
        }
    }
    records
}

/// Redis-backed record store.
///
/// Key layout:
/// - `{prefix}:records:{YYYY-MM}` — hash of date -> daily record JSON
/// - `{prefix}:stats:{YYYY-MM}` — monthly snapshot JSON
/// - `{prefix}:notifications:{YYYY-MM-DD}` — notification list JSON
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
    key_prefix: String,
}

impl RedisStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str()).map_err(StoreError::Connect)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(StoreError::Connect)?;

        info!("Connected to record store at {}", config.url);

        Ok(Self {
            connection,
            key_prefix: config.key_prefix.clone(),
        })
    }

    pub async fn health_check(&self) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(StoreError::Read)?;
        Ok(reply == "PONG")
    }

    fn records_key(&self, month: &str) -> String {
        format!("{}:records:{}", self.key_prefix, month)
    }

    fn stats_key(&self, month: &str) -> String {
        format!("{}:stats:{}", self.key_prefix, month)
    }

    fn notifications_key(&self, date: &str) -> String {
        format!("{}:notifications:{}", self.key_prefix, date)
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn fetch_month_records(&self, month: &str) -> Result<Vec<RawDailyRecord>, StoreError> {
        let mut conn = self.connection.clone();
        let entries: HashMap<String, String> = conn
            .hgetall(self.records_key(month))
            .await
            .map_err(StoreError::Read)?;

        let records = decode_daily_records(entries.into_iter().collect());
        info!("Loaded {} daily records for {}", records.len(), month);
        Ok(records)
    }

    async fn write_monthly_stats(
        &self,
        month: &str,
        stats: &MonthlyStats,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(stats).map_err(StoreError::Encode)?;

        let mut conn = self.connection.clone();
        let _: () = conn
            .set(self.stats_key(month), json)
            .await
            .map_err(StoreError::Write)?;

        debug!("Stored monthly stats snapshot for {}", month);
        Ok(())
    }

    async fn read_monthly_stats(&self, month: &str) -> Result<Option<MonthlyStats>, StoreError> {
        let mut conn = self.connection.clone();
        let json: Option<String> = conn
            .get(self.stats_key(month))
            .await
            .map_err(StoreError::Read)?;

        match json {
            Some(json) => {
                let stats = serde_json::from_str(&json).map_err(StoreError::Decode)?;
                Ok(Some(stats))
            }
            None => Ok(None),
        }
    }

    async fn fetch_notifications(&self, date: &str) -> Result<Vec<NotificationItem>, StoreError> {
        let mut conn = self.connection.clone();
        let json: Option<String> = conn
            .get(self.notifications_key(date))
            .await
            .map_err(StoreError::Read)?;

        match json {
            Some(json) => match serde_json::from_str(&json) {
                Ok(items) => Ok(items),
                Err(e) => {
                    // Corrupt lists are discarded and rebuilt by the next publish.
                    warn!("Discarding unreadable notification list for {}: {}", date, e);
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }

    async fn store_notifications(
        &self,
        date: &str,
        items: &[NotificationItem],
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(items).map_err(StoreError::Encode)?;

        let mut conn = self.connection.clone();
        let _: () = conn
            .set(self.notifications_key(date), json)
            .await
            .map_err(StoreError::Write)?;
        Ok(())
    }

    async fn list_record_months(&self) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{}:records:*", self.key_prefix);
        let prefix = format!("{}:records:", self.key_prefix);

        let mut conn = self.connection.clone();
        let keys: Vec<String> = conn.keys(pattern).await.map_err(StoreError::Read)?;

        let mut months: Vec<String> = keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect();
        months.sort();
        Ok(months)
    }
}
