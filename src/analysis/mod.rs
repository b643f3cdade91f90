pub mod ranking;
pub mod ratios;

use anyhow::Result;

use crate::database::SnapshotRepository;

pub use ranking::{rank, Metric, RankedEntry, TOP_N};
pub use ratios::{compute_ratios, FinancialRatios, RatioKind};

/// Fetch every snapshot from the repository and rank it by `metric`
pub async fn top_ten<R>(repository: &R, metric: Metric) -> Result<Vec<RankedEntry>>
where
    R: SnapshotRepository + ?Sized,
{
    let snapshots = repository.list_snapshots().await?;
    Ok(rank(metric, &snapshots))
}

/// Ratios of one company, or `None` when it has no snapshot
pub async fn company_ratios<R>(repository: &R, ticker: &str) -> Result<Option<FinancialRatios>>
where
    R: SnapshotRepository + ?Sized,
{
    let snapshot = repository.get_snapshot(ticker).await?;
    Ok(snapshot.as_ref().map(compute_ratios))
}
