pub mod schema;

use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::models::{Company, FinancialSnapshot};

/// Read access to financial snapshots, as needed by the ratio and ranking engine
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Snapshot of one company, `None` if the ticker is unknown
    async fn get_snapshot(&self, ticker: &str) -> Result<Option<FinancialSnapshot>>;

    /// Every snapshot, in insertion order
    async fn list_snapshots(&self) -> Result<Vec<(String, FinancialSnapshot)>>;
}

/// SQLite storage for companies and their financial snapshots
#[derive(Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Open (or create) the database file and make sure both tables exist
    pub async fn new(database_path: &str) -> Result<Self> {
        let path = database_path.strip_prefix("sqlite:").unwrap_or(database_path);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", path))?;

        let db = Self { pool };
        db.create_schema().await?;
        info!("Database initialized at {}", path);

        Ok(db)
    }

    /// Private in-memory database, gone when the manager is dropped
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // A single connection that never expires, otherwise the data would vanish
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.create_schema().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_schema(&self) -> Result<()> {
        sqlx::query(schema::CREATE_COMPANIES).execute(&self.pool).await?;
        sqlx::query(schema::CREATE_FINANCIAL).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop both tables and recreate them empty
    pub async fn reset_schema(&self) -> Result<()> {
        for statement in schema::DROP_TABLES {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        self.create_schema().await?;
        info!("Database schema reset");
        Ok(())
    }

    /// Insert a company, replacing name and sector if the ticker exists
    pub async fn upsert_company(&self, company: &Company) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO companies (ticker, name, sector)
            VALUES (?, ?, ?)
            ON CONFLICT(ticker) DO UPDATE SET
                name = excluded.name,
                sector = excluded.sector
            "#,
        )
        .bind(&company.ticker)
        .bind(&company.name)
        .bind(&company.sector)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace the snapshot of an existing company
    pub async fn upsert_snapshot(&self, snapshot: &FinancialSnapshot) -> Result<()> {
        bind_snapshot(
            sqlx::query(
                r#"
                INSERT INTO financial (
                    ticker, ebitda, sales, net_profit, market_price, net_debt,
                    assets, equity, cash_equivalents, liabilities
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(ticker) DO UPDATE SET
                    ebitda = excluded.ebitda,
                    sales = excluded.sales,
                    net_profit = excluded.net_profit,
                    market_price = excluded.market_price,
                    net_debt = excluded.net_debt,
                    assets = excluded.assets,
                    equity = excluded.equity,
                    cash_equivalents = excluded.cash_equivalents,
                    liabilities = excluded.liabilities
                "#,
            ),
            snapshot,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create a company together with its snapshot. Fails if the ticker is taken.
    pub async fn create_company(&self, company: &Company, snapshot: &FinancialSnapshot) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO companies (ticker, name, sector) VALUES (?, ?, ?)")
            .bind(&company.ticker)
            .bind(&company.name)
            .bind(&company.sector)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to create company {}", company.ticker))?;

        bind_snapshot(
            sqlx::query(
                r#"
                INSERT INTO financial (
                    ticker, ebitda, sales, net_profit, market_price, net_debt,
                    assets, equity, cash_equivalents, liabilities
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            ),
            snapshot,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Created company {}", company.ticker);
        Ok(())
    }

    /// Get company by ticker
    pub async fn get_company(&self, ticker: &str) -> Result<Option<Company>> {
        let row = sqlx::query("SELECT ticker, name, sector FROM companies WHERE ticker = ?")
            .bind(ticker)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(company_from_row).transpose()
    }

    /// Companies whose name contains `fragment`, ignoring case
    pub async fn find_companies_by_name(&self, fragment: &str) -> Result<Vec<Company>> {
        let rows = sqlx::query(
            r#"
            SELECT ticker, name, sector
            FROM companies
            WHERE instr(lower(name), lower(?)) > 0
            ORDER BY rowid
            "#,
        )
        .bind(fragment.trim())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(company_from_row).collect()
    }

    /// All companies ordered by ticker
    pub async fn list_companies(&self) -> Result<Vec<Company>> {
        let rows = sqlx::query("SELECT ticker, name, sector FROM companies ORDER BY ticker")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(company_from_row).collect()
    }

    /// Replace the figures of an existing snapshot. Returns false if there was none.
    pub async fn update_snapshot(&self, snapshot: &FinancialSnapshot) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE financial SET
                ebitda = ?,
                sales = ?,
                net_profit = ?,
                market_price = ?,
                net_debt = ?,
                assets = ?,
                equity = ?,
                cash_equivalents = ?,
                liabilities = ?
            WHERE ticker = ?
            "#,
        )
        .bind(snapshot.ebitda)
        .bind(snapshot.sales)
        .bind(snapshot.net_profit)
        .bind(snapshot.market_price)
        .bind(snapshot.net_debt)
        .bind(snapshot.assets)
        .bind(snapshot.equity)
        .bind(snapshot.cash_equivalents)
        .bind(snapshot.liabilities)
        .bind(&snapshot.ticker)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a company and its snapshot. Returns false if the ticker was unknown.
    pub async fn delete_company(&self, ticker: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM financial WHERE ticker = ?")
            .bind(ticker)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM companies WHERE ticker = ?")
            .bind(ticker)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Deleted company {}", ticker);
        Ok(result.rows_affected() > 0)
    }

    /// (companies, snapshots) row counts
    pub async fn get_stats(&self) -> Result<(i64, i64)> {
        let companies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await?;
        let snapshots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM financial")
            .fetch_one(&self.pool)
            .await?;
        Ok((companies, snapshots))
    }
}

#[async_trait]
impl SnapshotRepository for DatabaseManager {
    async fn get_snapshot(&self, ticker: &str) -> Result<Option<FinancialSnapshot>> {
        let query = format!(
            "SELECT {} FROM financial WHERE ticker = ?",
            schema::SNAPSHOT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(ticker)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(snapshot_from_row).transpose()
    }

    async fn list_snapshots(&self) -> Result<Vec<(String, FinancialSnapshot)>> {
        let query = format!(
            "SELECT {} FROM financial ORDER BY rowid",
            schema::SNAPSHOT_COLUMNS
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                let snapshot = snapshot_from_row(row)?;
                Ok((snapshot.ticker.clone(), snapshot))
            })
            .collect()
    }
}

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

fn bind_snapshot<'q>(query: SqliteQuery<'q>, snapshot: &'q FinancialSnapshot) -> SqliteQuery<'q> {
    query
        .bind(&snapshot.ticker)
        .bind(snapshot.ebitda)
        .bind(snapshot.sales)
        .bind(snapshot.net_profit)
        .bind(snapshot.market_price)
        .bind(snapshot.net_debt)
        .bind(snapshot.assets)
        .bind(snapshot.equity)
        .bind(snapshot.cash_equivalents)
        .bind(snapshot.liabilities)
}

fn company_from_row(row: &SqliteRow) -> Result<Company> {
    Ok(Company {
        ticker: row.try_get("ticker")?,
        name: row.try_get("name")?,
        sector: row.try_get("sector")?,
    })
}

fn snapshot_from_row(row: &SqliteRow) -> Result<FinancialSnapshot> {
    Ok(FinancialSnapshot {
        ticker: row.try_get("ticker")?,
        ebitda: row.try_get("ebitda")?,
        sales: row.try_get("sales")?,
        net_profit: row.try_get("net_profit")?,
        market_price: row.try_get("market_price")?,
        net_debt: row.try_get("net_debt")?,
        assets: row.try_get("assets")?,
        equity: row.try_get("equity")?,
        cash_equivalents: row.try_get("cash_equivalents")?,
        liabilities: row.try_get("liabilities")?,
    })
}
