use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::analysis::ratios::RatioKind;
use crate::error::AnalysisError;
use crate::models::FinancialSnapshot;

/// Number of companies returned by a ranking
pub const TOP_N: usize = 10;

/// Metrics companies can be ranked by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    NdEbitda,
    Roe,
    Roa,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::NdEbitda, Metric::Roe, Metric::Roa];

    /// The ratio this metric is computed with
    pub fn ratio(self) -> RatioKind {
        match self {
            Metric::NdEbitda => RatioKind::NetDebtToEbitda,
            Metric::Roe => RatioKind::ReturnOnEquity,
            Metric::Roa => RatioKind::ReturnOnAssets,
        }
    }

    pub fn label(self) -> &'static str {
        self.ratio().label()
    }

    /// Map a top ten menu key ("1".."3") to a metric
    pub fn from_menu_key(key: &str) -> Result<Self, AnalysisError> {
        match key.trim() {
            "1" => Ok(Metric::NdEbitda),
            "2" => Ok(Metric::Roe),
            "3" => Ok(Metric::Roa),
            other => Err(AnalysisError::UnknownMetric {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ND/EBITDA" | "ND_EBITDA" | "NDEBITDA" => Ok(Metric::NdEbitda),
            "ROE" => Ok(Metric::Roe),
            "ROA" => Ok(Metric::Roa),
            _ => Err(AnalysisError::UnknownMetric {
                value: s.to_string(),
            }),
        }
    }
}

/// One row of a top ten listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub ticker: String,
    pub value: f64,
}

/// Rank companies by `metric`, highest first.
///
/// Companies whose metric is undefined are left out. Equal values keep their
/// input order. At most `TOP_N` entries are returned.
pub fn rank(metric: Metric, snapshots: &[(String, FinancialSnapshot)]) -> Vec<RankedEntry> {
    let ratio = metric.ratio();

    let mut ranked: Vec<RankedEntry> = snapshots
        .iter()
        .filter_map(|(ticker, snapshot)| {
            ratio.compute(snapshot).map(|value| RankedEntry {
                ticker: ticker.clone(),
                value,
            })
        })
        .collect();

    debug!(
        "{}: {} of {} companies have a defined value",
        metric,
        ranked.len(),
        snapshots.len()
    );

    // sort_by is stable, ties stay in input order
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.truncate(TOP_N);
    ranked
}
