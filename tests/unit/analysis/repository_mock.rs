//! Analysis functions against a mocked snapshot repository

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use mockall::mock;
use pretty_assertions::assert_eq;

use crate::common::test_data;
use investor_calculator::analysis::{company_ratios, top_ten, Metric, RatioKind};
use investor_calculator::database::SnapshotRepository;
use investor_calculator::models::FinancialSnapshot;

mock! {
    pub Repository {}

    #[async_trait]
    impl SnapshotRepository for Repository {
        async fn get_snapshot(&self, ticker: &str) -> Result<Option<FinancialSnapshot>>;
        async fn list_snapshots(&self) -> Result<Vec<(String, FinancialSnapshot)>>;
    }
}

fn roe_snapshots() -> Vec<(String, FinancialSnapshot)> {
    [
        ("LOW", Some(1.0), 10.0),
        ("NONE", None, 10.0),
        ("HIGH", Some(9.0), 10.0),
        ("ZERO", Some(5.0), 0.0),
        ("MID", Some(4.0), 10.0),
    ]
    .into_iter()
    .map(|(ticker, net_profit, equity)| {
        (
            ticker.to_string(),
            test_data::create_roe_snapshot(ticker, net_profit, equity),
        )
    })
    .collect()
}

#[tokio::test]
async fn test_top_ten_ranks_repository_snapshots() -> Result<()> {
    let mut repo = MockRepository::new();
    repo.expect_list_snapshots()
        .times(1)
        .returning(|| Ok(roe_snapshots()));

    let ranked: Vec<(String, f64)> = top_ten(&repo, Metric::Roe)
        .await?
        .into_iter()
        .map(|e| (e.ticker, e.value))
        .collect();

    assert_eq!(
        ranked,
        vec![
            ("HIGH".to_string(), 0.9),
            ("MID".to_string(), 0.4),
            ("LOW".to_string(), 0.1),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_top_ten_metric_without_operands_is_empty() -> Result<()> {
    let mut repo = MockRepository::new();
    repo.expect_list_snapshots().returning(|| Ok(roe_snapshots()));

    // ROA needs assets, which none of these snapshots have
    assert!(top_ten(&repo, Metric::Roa).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_top_ten_propagates_repository_error() {
    let mut repo = MockRepository::new();
    repo.expect_list_snapshots()
        .returning(|| Err(anyhow!("database is locked")));

    let err = top_ten(&repo, Metric::NdEbitda)
        .await
        .expect_err("repository failure must surface");
    assert!(err.to_string().contains("database is locked"));
}

#[tokio::test]
async fn test_company_ratios_for_known_and_unknown_ticker() -> Result<()> {
    let mut repo = MockRepository::new();
    repo.expect_get_snapshot()
        .withf(|ticker| ticker == "MOON")
        .returning(|ticker| Ok(Some(test_data::create_test_snapshot(ticker))));
    repo.expect_get_snapshot()
        .withf(|ticker| ticker != "MOON")
        .returning(|_| Ok(None));

    let ratios = company_ratios(&repo, "MOON").await?.expect("ratios for MOON");
    assert_eq!(ratios.ticker, "MOON");
    assert_eq!(ratios.get(RatioKind::PriceToBook), Some(0.02));
    assert_eq!(ratios.defined_count(), 7);

    assert!(company_ratios(&repo, "NOPE").await?.is_none());
    Ok(())
}
