// src/metrics/mod.rs
use crate::models::{ChartPoint, MonthlyStats};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Rounds to 2 decimal places for output values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builds the chronologically ordered cumulative profit curve from the
/// per-day net profit map. `BTreeMap` iteration is ascending on the
/// `YYYY-MM-DD` keys, which is date order.
pub fn build_profit_curve(daily_profit: &BTreeMap<String, f64>) -> Vec<ChartPoint> {
    let mut curve = Vec::with_capacity(daily_profit.len());
    let mut accumulated = 0.0;

    for (date, profit) in daily_profit {
        accumulated += profit;
        curve.push(ChartPoint {
            date: date.clone(),
            daily_profit: round2(*profit),
            accumulated_profit: round2(accumulated),
        });
    }

    curve
}

/// Maximum decline of accumulated profit from its highest prior point.
///
/// Single left-to-right pass over the chronological curve: the peak only
/// ever moves up, and every dip is measured against the highest peak seen
/// so far — not against a global maximum computed out of order.
pub fn max_drawdown(curve: &[ChartPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown: f64 = 0.0;

    for point in curve {
        if point.accumulated_profit > peak {
            peak = point.accumulated_profit;
        } else {
            max_drawdown = max_drawdown.max(peak - point.accumulated_profit);
        }
    }

    round2(max_drawdown)
}

/// Renders a snapshot as a plain-text report for the CLI.
pub fn render_report(stats: &MonthlyStats) -> String {
    let total_bets: u32 = stats.performance_by_type.values().map(|p| p.total).sum();
    let won_bets: u32 = stats.performance_by_type.values().map(|p| p.wins).sum();

    let mut report = String::new();
    let _ = writeln!(report, "Monthly Performance Report: {}", stats.month);
    let _ = writeln!(report, "==================================");
    let _ = writeln!(report, "Total Profit: {:+.2}", stats.total_profit);
    let _ = writeln!(report, "Total Staked: {:.2}", stats.total_stake);
    let _ = writeln!(report, "Yield: {:.2}%", stats.yield_pct);
    let _ = writeln!(
        report,
        "Win Rate: {:.2}% ({}/{} bets)",
        stats.win_rate, won_bets, total_bets
    );
    let _ = writeln!(report, "Days Operated: {}", stats.days_operated);
    let _ = writeln!(report, "Max Drawdown: {:.2}", stats.max_drawdown);

    let _ = writeln!(report, "\nPerformance by Type");
    let _ = writeln!(report, "-------------------");
    for (category, perf) in &stats.performance_by_type {
        let _ = writeln!(
            report,
            "{:<10} profit {:+8.2}  stake {:8.2}  wins {}/{}",
            category, perf.profit, perf.stake, perf.wins, perf.total
        );
    }

    let _ = writeln!(report, "\nAccuracy by Sport");
    let _ = writeln!(report, "-----------------");
    for (sport, accuracy) in &stats.accuracy_by_sport {
        let _ = writeln!(
            report,
            "{:<12} {:6.2}% ({}/{})",
            sport, accuracy.accuracy_percentage, accuracy.won, accuracy.total
        );
    }

    let _ = writeln!(report, "\nProfit Evolution");
    let _ = writeln!(report, "----------------");
    for point in &stats.chart_evolution {
        let _ = writeln!(
            report,
            "{}  {:+8.2}  -> {:8.2}",
            point.date, point.daily_profit, point.accumulated_profit
        );
    }

    report
}
