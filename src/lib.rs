pub mod config;
pub mod engine;
pub mod metrics;
pub mod models;
pub mod normalizer;
pub mod notifications;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::engine::{compute_monthly_stats, recalculate_month};
pub use crate::models::{
    ChartPoint, MonthlyStats, NotificationItem, RawDailyRecord, SportAccuracy, TypePerformance,
};
pub use crate::normalizer::{normalize_bet, BetStatus, NormalizedBet};
pub use crate::stats::MonthAccumulator;
pub use crate::store::{RecordStore, RedisStore, StoreConfig, StoreError};

use log::info;
use tracing_subscriber::{fmt, EnvFilter};

pub fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bet_tracker=debug"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    info!("Logging initialized");
}
