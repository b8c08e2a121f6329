// src/stats.rs
use crate::models::{SportAccuracy, TypePerformance};
use crate::normalizer::NormalizedBet;
use std::collections::BTreeMap;

/// Sports with a dedicated accuracy bucket. Selections in any other sport are
/// silently excluded from the accuracy stats.
pub const TRACKED_SPORTS: [&str; 2] = ["football", "basketball"];

/// Accumulates one month of settled bets: global totals, per-category
/// buckets, per-sport selection accuracy and the per-day net profit map.
///
/// Sums are commutative, so record order does not matter here; only the
/// curve step downstream needs chronological order.
#[derive(Debug, Default)]
pub struct MonthAccumulator {
    pub total_bets: u32,
    pub won_bets: u32,
    pub total_staked: f64,
    pub total_profit: f64,
    pub performance_by_type: BTreeMap<String, TypePerformance>,
    pub accuracy_by_sport: BTreeMap<String, SportAccuracy>,
    pub daily_profit: BTreeMap<String, f64>,
}

impl MonthAccumulator {
    pub fn new() -> Self {
        let mut accumulator = Self::default();
        for sport in TRACKED_SPORTS {
            accumulator
                .accuracy_by_sport
                .insert(sport.to_string(), SportAccuracy::default());
        }
        accumulator
    }

    /// Folds one normalized bet into the accumulator. Bets that are not
    /// settled are skipped entirely; they touch no counter.
    pub fn record_bet(&mut self, date: Option<&str>, bet: &NormalizedBet) {
        if !bet.status.is_settled() {
            return;
        }
        let won = bet.status.is_won();

        self.total_bets += 1;
        if won {
            self.won_bets += 1;
        }
        self.total_staked += bet.stake;
        self.total_profit += bet.profit;

        // Parallel per-category accumulation; buckets are created on first use.
        let perf = self
            .performance_by_type
            .entry(bet.category.clone())
            .or_default();
        perf.profit += bet.profit;
        perf.stake += bet.stake;
        perf.total += 1;
        if won {
            perf.wins += 1;
        }

        // Daily bucket only for records that carry a date.
        if let Some(date) = date {
            *self.daily_profit.entry(date.to_string()).or_insert(0.0) += bet.profit;
        }

        // Selections are scored on their own status, independent of the
        // parent bet's outcome and category.
        for selection in &bet.selections {
            if !selection.status.is_settled() {
                continue;
            }
            if let Some(sport) = self.accuracy_by_sport.get_mut(selection.sport.as_str()) {
                sport.total += 1;
                if selection.status.is_won() {
                    sport.won += 1;
                }
            }
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.total_bets == 0 {
            return 0.0;
        }
        self.won_bets as f64 / self.total_bets as f64 * 100.0
    }

    pub fn yield_pct(&self) -> f64 {
        if self.total_staked == 0.0 {
            return 0.0;
        }
        self.total_profit / self.total_staked * 100.0
    }
}
