// src/notifications/mod.rs
use crate::models::{MonthlyStats, NotificationItem};
use crate::store::{RecordStore, StoreError};
use chrono::Utc;
use log::info;

/// Category key for the recalculation summary. At most one item of this
/// category exists per day; republishing replaces the previous one.
pub const MONTHLY_SUMMARY_CATEGORY: &str = "monthly_summary";

/// Builds the summary item announcing a fresh snapshot for the month.
pub fn build_month_summary(stats: &MonthlyStats) -> NotificationItem {
    let message = format!(
        "Stats recalculated for {}: profit {:+.2} over {} days, yield {:.2}%, win rate {:.2}%",
        stats.month, stats.total_profit, stats.days_operated, stats.yield_pct, stats.win_rate
    );

    NotificationItem::new(
        MONTHLY_SUMMARY_CATEGORY,
        "Monthly stats updated",
        &message,
        "chart",
    )
}

/// Publishes the summary to today's notification list: any prior item of the
/// same category is dropped and the new one goes to the front. Callers treat
/// this as best-effort; a failure here never rolls back the snapshot write.
pub async fn publish_month_summary<S: RecordStore + ?Sized>(
    store: &S,
    stats: &MonthlyStats,
) -> Result<(), StoreError> {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let item = build_month_summary(stats);

    let mut items = store.fetch_notifications(&today).await?;
    items.retain(|existing| existing.category != MONTHLY_SUMMARY_CATEGORY);
    items.insert(0, item);

    store.store_notifications(&today, &items).await?;

    info!("Published monthly summary notification for {}", stats.month);
    Ok(())
}
