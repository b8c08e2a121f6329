// src/normalizer.rs
use serde_json::Value;

/// Settlement state after canonicalization. Raw statuses are uppercased and
/// the legacy localized aliases are folded into the canonical values; any
/// other string passes through as `Unknown` and is excluded downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetStatus {
    Won,
    Lost,
    Pending,
    ManualCheck,
    Unknown(String),
}

impl BetStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "WON" | "GANADA" => BetStatus::Won,
            "LOST" | "PERDIDA" => BetStatus::Lost,
            "PENDING" => BetStatus::Pending,
            "MANUAL_CHECK" => BetStatus::ManualCheck,
            other => BetStatus::Unknown(other.to_string()),
        }
    }

    /// Only settled bets contribute to any aggregate.
    pub fn is_settled(&self) -> bool {
        matches!(self, BetStatus::Won | BetStatus::Lost)
    }

    pub fn is_won(&self) -> bool {
        matches!(self, BetStatus::Won)
    }
}

/// Canonical form of a bet, ready for aggregation.
#[derive(Debug, Clone)]
pub struct NormalizedBet {
    pub status: BetStatus,
    pub category: String,
    pub stake: f64,
    pub profit: f64,
    pub selections: Vec<NormalizedSelection>,
}

#[derive(Debug, Clone)]
pub struct NormalizedSelection {
    pub status: BetStatus,
    pub sport: String,
}

/// Default stake per category when the bet carries no usable stake.
/// Categories outside the table default to 0.
pub fn default_stake(category: &str) -> f64 {
    match category {
        "safe" => 6.0,
        "value" => 3.0,
        "funbet" => 1.0,
        _ => 0.0,
    }
}

/// Converts a raw bet payload into its canonical form. Missing or mistyped
/// fields fall back to the documented defaults; nothing in here fails.
pub fn normalize_bet(raw: &Value) -> NormalizedBet {
    let status = BetStatus::parse(field_str(raw, "status").unwrap_or(""));

    // betType with fallback to the legacy "type" field, then to "safe".
    let category = field_str(raw, "betType")
        .or_else(|| field_str(raw, "type"))
        .unwrap_or("safe")
        .to_lowercase();

    let stake = field_number(raw, "stake").unwrap_or_else(|| default_stake(&category));
    let profit = field_number(raw, "profit").unwrap_or(0.0);

    let selections = raw
        .get("selections")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(normalize_selection).collect())
        .unwrap_or_default();

    NormalizedBet {
        status,
        category,
        stake,
        profit,
        selections,
    }
}

fn normalize_selection(raw: &Value) -> NormalizedSelection {
    NormalizedSelection {
        status: BetStatus::parse(field_str(raw, "status").unwrap_or("")),
        sport: field_str(raw, "sport").unwrap_or("").to_lowercase(),
    }
}

fn field_str<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str)
}

// Accepts numbers and numeric strings; anything else is treated as absent.
fn field_number(raw: &Value, key: &str) -> Option<f64> {
    match raw.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}
