use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::models::FinancialSnapshot;

/// Ratios derived from a single financial snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RatioKind {
    PriceToEarnings,
    PriceToSales,
    PriceToBook,
    NetDebtToEbitda,
    ReturnOnEquity,
    ReturnOnAssets,
    LiabilitiesToAssets,
}

impl RatioKind {
    /// Display order used by the company report
    pub const ALL: [RatioKind; 7] = [
        RatioKind::PriceToEarnings,
        RatioKind::PriceToSales,
        RatioKind::PriceToBook,
        RatioKind::NetDebtToEbitda,
        RatioKind::ReturnOnEquity,
        RatioKind::ReturnOnAssets,
        RatioKind::LiabilitiesToAssets,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RatioKind::PriceToEarnings => "P/E",
            RatioKind::PriceToSales => "P/S",
            RatioKind::PriceToBook => "P/B",
            RatioKind::NetDebtToEbitda => "ND/EBITDA",
            RatioKind::ReturnOnEquity => "ROE",
            RatioKind::ReturnOnAssets => "ROA",
            RatioKind::LiabilitiesToAssets => "L/A",
        }
    }

    /// (numerator, denominator) taken from the snapshot
    pub fn operands(self, snapshot: &FinancialSnapshot) -> (Option<f64>, Option<f64>) {
        match self {
            RatioKind::PriceToEarnings => (snapshot.market_price, snapshot.net_profit),
            RatioKind::PriceToSales => (snapshot.market_price, snapshot.sales),
            RatioKind::PriceToBook => (snapshot.market_price, snapshot.assets),
            RatioKind::NetDebtToEbitda => (snapshot.net_debt, snapshot.ebitda),
            RatioKind::ReturnOnEquity => (snapshot.net_profit, snapshot.equity),
            RatioKind::ReturnOnAssets => (snapshot.net_profit, snapshot.assets),
            RatioKind::LiabilitiesToAssets => (snapshot.liabilities, snapshot.assets),
        }
    }

    /// Compute this ratio for one snapshot, rounded to two decimals
    pub fn compute(self, snapshot: &FinancialSnapshot) -> Option<f64> {
        let (numerator, denominator) = self.operands(snapshot);
        safe_ratio(numerator, denominator)
    }
}

impl fmt::Display for RatioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Divide two optional figures.
///
/// Returns `None` when the numerator is missing or the denominator is missing
/// or exactly zero. A zero numerator is a valid operand.
pub fn safe_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (Some(numerator), Some(denominator)) = (numerator, denominator) else {
        return None;
    };
    if denominator == 0.0 {
        return None;
    }

    let ratio = round_to_cents(numerator / denominator);
    if !ratio.is_finite() {
        return None;
    }
    Some(ratio)
}

/// Above this magnitude an f64 has no fractional cents left to round
const ROUNDING_LIMIT: f64 = 1e15;

/// Round half away from zero to two decimal places
pub fn round_to_cents(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= ROUNDING_LIMIT {
        return value;
    }
    let rounded = (value * 100.0).round() / 100.0;
    // -0.0 would print as "-0.0" and sort below 0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// The seven ratios of one company, in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialRatios {
    pub ticker: String,
    values: [(RatioKind, Option<f64>); 7],
}

impl FinancialRatios {
    pub fn get(&self, kind: RatioKind) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| *k == kind)
            .and_then(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RatioKind, Option<f64>)> + '_ {
        self.values.iter().copied()
    }

    /// Ratios keyed by their label ("P/E", "ROE", ...)
    pub fn to_map(&self) -> BTreeMap<String, Option<f64>> {
        self.iter()
            .map(|(kind, value)| (kind.label().to_string(), value))
            .collect()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|(_, v)| v.is_some()).count()
    }
}

/// Derive every ratio from one snapshot
pub fn compute_ratios(snapshot: &FinancialSnapshot) -> FinancialRatios {
    FinancialRatios {
        ticker: snapshot.ticker.clone(),
        values: RatioKind::ALL.map(|kind| (kind, kind.compute(snapshot))),
    }
}
