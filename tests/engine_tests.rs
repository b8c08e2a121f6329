// tests/engine_tests.rs
use async_trait::async_trait;
use bet_tracker::engine::{compute_monthly_stats, recalculate_month};
use bet_tracker::models::{MonthlyStats, NotificationItem, RawDailyRecord};
use bet_tracker::notifications::MONTHLY_SUMMARY_CATEGORY;
use bet_tracker::store::{decode_daily_records, RecordStore, StoreError};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

fn day(payload: serde_json::Value) -> RawDailyRecord {
    serde_json::from_value(payload).expect("test fixture should deserialize")
}

// Serialized snapshot with the recomputation timestamp stripped, for
// comparing two runs.
fn comparable(stats: &MonthlyStats) -> serde_json::Value {
    let mut value = serde_json::to_value(stats).expect("stats should serialize");
    value
        .as_object_mut()
        .expect("stats serialize to an object")
        .remove("last_updated");
    value
}

fn two_day_month() -> Vec<RawDailyRecord> {
    vec![
        day(json!({
            "date": "2026-08-01",
            "bets": [{
                "status": "WON",
                "betType": "safe",
                "stake": 6,
                "profit": 5.4,
                "selections": [
                    {"status": "WON", "sport": "football"},
                    {"status": "WON", "sport": "basketball"},
                ],
            }],
        })),
        day(json!({
            "date": "2026-08-02",
            "bets": [{
                "status": "LOST",
                "betType": "value",
                "stake": 3,
                "profit": -3,
                "selections": [{"status": "LOST", "sport": "football"}],
            }],
        })),
    ]
}

#[test]
fn test_two_day_scenario() {
    let stats = compute_monthly_stats("2026-08", &two_day_month());

    assert!((stats.total_profit - 2.4).abs() < 1e-9);
    assert!((stats.total_stake - 9.0).abs() < 1e-9);
    assert_eq!(stats.yield_pct, 26.67);
    assert_eq!(stats.win_rate, 50.0);
    assert_eq!(stats.win_rate_days, 0.0);
    assert_eq!(stats.days_operated, 2);
    assert_eq!(stats.max_drawdown, 3.0);

    assert_eq!(stats.chart_evolution.len(), 2);
    assert_eq!(stats.chart_evolution[0].date, "2026-08-01");
    assert_eq!(stats.chart_evolution[0].daily_profit, 5.4);
    assert_eq!(stats.chart_evolution[0].accumulated_profit, 5.4);
    assert_eq!(stats.chart_evolution[1].date, "2026-08-02");
    assert_eq!(stats.chart_evolution[1].daily_profit, -3.0);
    assert_eq!(stats.chart_evolution[1].accumulated_profit, 2.4);

    let safe = &stats.performance_by_type["safe"];
    assert_eq!(safe.wins, 1);
    assert_eq!(safe.total, 1);
    assert!((safe.profit - 5.4).abs() < 1e-9);

    let football = &stats.accuracy_by_sport["football"];
    assert_eq!(football.total, 2);
    assert_eq!(football.won, 1);
    assert_eq!(football.accuracy_percentage, 50.0);
    let basketball = &stats.accuracy_by_sport["basketball"];
    assert_eq!(basketball.total, 1);
    assert_eq!(basketball.accuracy_percentage, 100.0);
}

#[test]
fn test_recomputation_is_idempotent() {
    let records = two_day_month();
    let first = compute_monthly_stats("2026-08", &records);
    let second = compute_monthly_stats("2026-08", &records);
    assert_eq!(comparable(&first), comparable(&second));
}

#[test]
fn test_unsettled_bets_change_no_aggregate() {
    let mut records = two_day_month();
    let baseline = compute_monthly_stats("2026-08", &records);

    // Same month plus a pending and a manual-check bet on a new day.
    records.push(day(json!({
        "date": "2026-08-03",
        "bets": [
            {"status": "PENDING", "betType": "safe", "stake": 6, "profit": 99},
            {"status": "MANUAL_CHECK", "betType": "value", "profit": -50},
        ],
    })));
    let with_unsettled = compute_monthly_stats("2026-08", &records);

    assert_eq!(comparable(&baseline), comparable(&with_unsettled));
}

#[test]
fn test_legacy_aliases_match_canonical_statuses() {
    let canonical = compute_monthly_stats("2026-08", &two_day_month());

    let aliased = vec![
        day(json!({
            "date": "2026-08-01",
            "bets": [{
                "status": "ganada",
                "betType": "safe",
                "stake": 6,
                "profit": 5.4,
                "selections": [
                    {"status": "GANADA", "sport": "football"},
                    {"status": "GANADA", "sport": "basketball"},
                ],
            }],
        })),
        day(json!({
            "date": "2026-08-02",
            "bets": [{
                "status": "Perdida",
                "betType": "value",
                "stake": 3,
                "profit": -3,
                "selections": [{"status": "PERDIDA", "sport": "football"}],
            }],
        })),
    ];
    let localized = compute_monthly_stats("2026-08", &aliased);

    assert_eq!(comparable(&canonical), comparable(&localized));
}

#[test]
fn test_bets_as_map_match_bets_as_array() {
    let as_array = compute_monthly_stats("2026-08", &two_day_month());

    let keyed = vec![
        day(json!({
            "date": "2026-08-01",
            "bets": {"0": {
                "status": "WON",
                "betType": "safe",
                "stake": 6,
                "profit": 5.4,
                "selections": [
                    {"status": "WON", "sport": "football"},
                    {"status": "WON", "sport": "basketball"},
                ],
            }},
        })),
        day(json!({
            "date": "2026-08-02",
            "bets": {"0": {
                "status": "LOST",
                "betType": "value",
                "stake": 3,
                "profit": -3,
                "selections": [{"status": "LOST", "sport": "football"}],
            }},
        })),
    ];
    let as_map = compute_monthly_stats("2026-08", &keyed);

    assert_eq!(comparable(&as_array), comparable(&as_map));
}

#[test]
fn test_default_stakes_flow_into_totals() {
    let records = vec![day(json!({
        "date": "2026-08-01",
        "bets": [
            {"status": "WON", "betType": "safe", "profit": 2},
            {"status": "LOST", "betType": "funbet", "profit": -1},
            {"status": "LOST", "betType": "longshot", "profit": -2},
        ],
    }))];
    let stats = compute_monthly_stats("2026-08", &records);

    // safe defaults to 6, funbet to 1, unrecognized categories to 0
    assert!((stats.total_stake - 7.0).abs() < 1e-9);
    assert!(stats.performance_by_type.contains_key("longshot"));
    assert_eq!(stats.performance_by_type["longshot"].stake, 0.0);
}

#[test]
fn test_empty_month() {
    let stats = compute_monthly_stats("2026-08", &[]);

    assert_eq!(stats.total_profit, 0.0);
    assert_eq!(stats.total_stake, 0.0);
    assert_eq!(stats.yield_pct, 0.0);
    assert_eq!(stats.win_rate, 0.0);
    assert_eq!(stats.days_operated, 0);
    assert_eq!(stats.max_drawdown, 0.0);
    assert!(stats.chart_evolution.is_empty());
    assert!(stats.performance_by_type.is_empty());
    // The two sport buckets always exist, zeroed.
    assert_eq!(stats.accuracy_by_sport.len(), 2);
    assert_eq!(stats.accuracy_by_sport["football"].total, 0);
}

#[test]
fn test_record_without_bets_counts_as_zero() {
    let records = vec![
        day(json!({"date": "2026-08-01"})),
        day(json!({"date": "2026-08-02", "bets": null})),
    ];
    let stats = compute_monthly_stats("2026-08", &records);
    assert_eq!(stats.days_operated, 0);
    assert_eq!(stats.total_stake, 0.0);
}

#[test]
fn test_unreadable_day_payload_is_skipped() {
    let entries = vec![
        (
            "2026-08-01".to_string(),
            json!({
                "date": "2026-08-01",
                "bets": [{"status": "WON", "betType": "safe", "stake": 6, "profit": 5.4}],
            })
            .to_string(),
        ),
        ("2026-08-02".to_string(), "{broken".to_string()),
    ];

    let records = decode_daily_records(entries);
    let stats = compute_monthly_stats("2026-08", &records);
    assert_eq!(stats.days_operated, 1);
    assert!((stats.total_profit - 5.4).abs() < 1e-9);
}

// In-memory stand-in for the Redis store, enough to exercise the full
// recalculation flow including the notification side effect.
#[derive(Default)]
struct InMemoryStore {
    records: Mutex<HashMap<String, Vec<(String, String)>>>,
    stats: Mutex<HashMap<String, String>>,
    notifications: Mutex<HashMap<String, Vec<NotificationItem>>>,
    fail_notifications: bool,
}

impl InMemoryStore {
    fn with_records(month: &str, records: Vec<(String, serde_json::Value)>) -> Self {
        let store = Self::default();
        store.records.lock().unwrap().insert(
            month.to_string(),
            records
                .into_iter()
                .map(|(date, payload)| (date, payload.to_string()))
                .collect(),
        );
        store
    }

    fn io_error() -> StoreError {
        StoreError::Read(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "simulated outage",
        )))
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn fetch_month_records(&self, month: &str) -> Result<Vec<RawDailyRecord>, StoreError> {
        let entries = self
            .records
            .lock()
            .unwrap()
            .get(month)
            .cloned()
            .unwrap_or_default();
        Ok(decode_daily_records(entries))
    }

    async fn write_monthly_stats(
        &self,
        month: &str,
        stats: &MonthlyStats,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(stats).map_err(StoreError::Encode)?;
        self.stats.lock().unwrap().insert(month.to_string(), json);
        Ok(())
    }

    async fn read_monthly_stats(&self, month: &str) -> Result<Option<MonthlyStats>, StoreError> {
        match self.stats.lock().unwrap().get(month) {
            Some(json) => Ok(Some(serde_json::from_str(json).map_err(StoreError::Decode)?)),
            None => Ok(None),
        }
    }

    async fn fetch_notifications(&self, date: &str) -> Result<Vec<NotificationItem>, StoreError> {
        if self.fail_notifications {
            return Err(Self::io_error());
        }
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .get(date)
            .cloned()
            .unwrap_or_default())
    }

    async fn store_notifications(
        &self,
        date: &str,
        items: &[NotificationItem],
    ) -> Result<(), StoreError> {
        if self.fail_notifications {
            return Err(Self::io_error());
        }
        self.notifications
            .lock()
            .unwrap()
            .insert(date.to_string(), items.to_vec());
        Ok(())
    }

    async fn list_record_months(&self) -> Result<Vec<String>, StoreError> {
        let mut months: Vec<String> = self.records.lock().unwrap().keys().cloned().collect();
        months.sort();
        Ok(months)
    }
}

fn current_month_fixture() -> (String, InMemoryStore) {
    let month = Utc::now().format("%Y-%m").to_string();
    let date = format!("{}-01", month);
    let store = InMemoryStore::with_records(
        &month,
        vec![(
            date.clone(),
            json!({
                "date": date,
                "bets": [{"status": "WON", "betType": "safe", "stake": 6, "profit": 5.4}],
            }),
        )],
    );
    (month, store)
}

#[tokio::test]
async fn test_recalculate_writes_snapshot_and_notification() {
    let (month, store) = current_month_fixture();

    // Seed today's list with a stale summary and an unrelated item.
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let stale = NotificationItem::new(MONTHLY_SUMMARY_CATEGORY, "old", "old", "chart");
    let unrelated = NotificationItem::new("new_pick", "pick", "pick of the day", "ball");
    store
        .notifications
        .lock()
        .unwrap()
        .insert(today.clone(), vec![stale.clone(), unrelated.clone()]);

    let stats = recalculate_month(&store, &month, true).await.unwrap();
    assert!((stats.total_profit - 5.4).abs() < 1e-9);

    // Snapshot readable back and equal to what was returned.
    let stored = store.read_monthly_stats(&month).await.unwrap().unwrap();
    assert_eq!(comparable(&stats), comparable(&stored));

    // The stale summary was replaced and the new one sits at the front.
    let items = store.fetch_notifications(&today).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].category, MONTHLY_SUMMARY_CATEGORY);
    assert_ne!(items[0].id, stale.id);
    assert_eq!(items[1].id, unrelated.id);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_the_run() {
    let (month, mut_store) = current_month_fixture();
    let store = InMemoryStore {
        fail_notifications: true,
        ..mut_store
    };

    let result = recalculate_month(&store, &month, true).await;
    assert!(result.is_ok());
    assert!(store.read_monthly_stats(&month).await.unwrap().is_some());
}

#[tokio::test]
async fn test_past_month_publishes_no_notification() {
    let store = InMemoryStore::with_records(
        "2020-01",
        vec![(
            "2020-01-15".to_string(),
            json!({
                "date": "2020-01-15",
                "bets": [{"status": "WON", "betType": "safe", "stake": 6, "profit": 1.2}],
            }),
        )],
    );

    recalculate_month(&store, "2020-01", true).await.unwrap();
    assert!(store.notifications.lock().unwrap().is_empty());
}
