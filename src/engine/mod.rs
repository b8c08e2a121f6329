// src/engine/mod.rs
//! Monthly recalculation pipeline: normalize each stored bet, fold the month
//! through the accumulator, derive the profit curve, assemble the snapshot.
//!
//! The computation itself is a pure function of the fetched records, so
//! recomputing from unchanged records always yields the same snapshot; the
//! store round-trips happen only at the edges.

use crate::metrics::{build_profit_curve, max_drawdown, round2};
use crate::models::{MonthlyStats, RawDailyRecord};
use crate::normalizer::normalize_bet;
use crate::stats::MonthAccumulator;
use crate::store::{RecordStore, StoreError};
use crate::notifications;
use chrono::Utc;
use log::{info, warn};

/// Runs the three pipeline stages over an in-memory snapshot of the month's
/// records and assembles the output object.
pub fn compute_monthly_stats(month: &str, records: &[RawDailyRecord]) -> MonthlyStats {
    let mut accumulator = MonthAccumulator::new();

    for record in records {
        let date = record.date.as_deref();
        for raw_bet in record.ordered_bets() {
            let bet = normalize_bet(raw_bet);
            accumulator.record_bet(date, &bet);
        }
    }

    let chart_evolution = build_profit_curve(&accumulator.daily_profit);
    let max_drawdown = max_drawdown(&chart_evolution);
    let days_operated = chart_evolution.len();
    let yield_pct = round2(accumulator.yield_pct());
    let win_rate = round2(accumulator.win_rate());

    let mut accuracy_by_sport = accumulator.accuracy_by_sport;
    for accuracy in accuracy_by_sport.values_mut() {
        accuracy.accuracy_percentage = if accuracy.total == 0 {
            0.0
        } else {
            round2(accuracy.won as f64 / accuracy.total as f64 * 100.0)
        };
    }

    MonthlyStats {
        month: month.to_string(),
        total_profit: accumulator.total_profit,
        total_stake: accumulator.total_staked,
        yield_pct,
        win_rate,
        win_rate_days: 0.0,
        days_operated,
        max_drawdown,
        performance_by_type: accumulator.performance_by_type,
        accuracy_by_sport,
        chart_evolution,
        last_updated: Utc::now(),
    }
}

/// Recalculates one month end to end: single read of the month's records,
/// pure computation, single snapshot overwrite. When the month being
/// recalculated is the current calendar month, a summary notification is
/// published as a best-effort side effect after the write.
pub async fn recalculate_month<S: RecordStore + ?Sized>(
    store: &S,
    month: &str,
    notifications_enabled: bool,
) -> Result<MonthlyStats, StoreError> {
    info!("Recalculating monthly stats for {}", month);

    let records = store.fetch_month_records(month).await?;
    let stats = compute_monthly_stats(month, &records);
    store.write_monthly_stats(month, &stats).await?;

    info!(
        "Stored snapshot for {}: {} days operated, total profit {:+.2}, yield {:.2}%",
        month, stats.days_operated, stats.total_profit, stats.yield_pct
    );

    let current_month = Utc::now().format("%Y-%m").to_string();
    if notifications_enabled && month == current_month {
        if let Err(e) = notifications::publish_month_summary(store, &stats).await {
            warn!("Monthly summary notification failed: {}", e);
        }
    }

    Ok(stats)
}
