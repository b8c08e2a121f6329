// src/models/mod.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day's worth of raw bets as persisted by the settlement process.
///
/// Payloads come out of the record store as JSON written by other services,
/// so every field is optional and `bets` may be either a dense array or a
/// keyed object. Anything malformed inside a bet degrades to defaults in the
/// normalizer instead of failing the day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDailyRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub bets: Option<BetsInput>,
}

/// The two shapes `bets` arrives in. Both normalize to an ordered sequence
/// before aggregation; downstream code never branches on the shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BetsInput {
    List(Vec<serde_json::Value>),
    Map(BTreeMap<String, serde_json::Value>),
}

impl RawDailyRecord {
    /// Returns the day's bets as an ordered sequence. Keyed input is ordered
    /// by key; a missing or null collection is zero bets.
    pub fn ordered_bets(&self) -> Vec<&serde_json::Value> {
        match &self.bets {
            Some(BetsInput::List(bets)) => bets.iter().collect(),
            Some(BetsInput::Map(map)) => map.values().collect(),
            None => Vec::new(),
        }
    }
}

/// Per-category performance bucket. Buckets are created on first use, so
/// categories outside the defaults are tracked too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypePerformance {
    pub profit: f64,
    pub stake: f64,
    pub wins: u32,
    pub total: u32,
}

/// Selection accuracy bucket for one tracked sport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SportAccuracy {
    pub total: u32,
    pub won: u32,
    pub accuracy_percentage: f64,
}

/// One point of the cumulative profit curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub daily_profit: f64,
    pub accumulated_profit: f64,
}

/// The canonical statistics snapshot for one month. Fully recomputed from the
/// stored daily records on every run and written as a plain overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub month: String,
    pub total_profit: f64,
    pub total_stake: f64,
    #[serde(rename = "yield")]
    pub yield_pct: f64,
    pub win_rate: f64,
    /// Placeholder carried over from the original reports; always 0.
    pub win_rate_days: f64,
    pub days_operated: usize,
    pub max_drawdown: f64,
    pub performance_by_type: BTreeMap<String, TypePerformance>,
    pub accuracy_by_sport: BTreeMap<String, SportAccuracy>,
    pub chart_evolution: Vec<ChartPoint>,
    pub last_updated: DateTime<Utc>,
}

/// One entry of a per-day notification list. The dispatch layer that turns
/// these into bot messages lives outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationItem {
    pub id: String,
    pub category: String,
    pub title: String,
    pub message: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

impl NotificationItem {
    pub fn new(category: &str, title: &str, message: &str, icon: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category: category.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            icon: icon.to_string(),
            created_at: Utc::now(),
        }
    }
}
