use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{info, warn};

use crate::database::DatabaseManager;
use crate::error::ImportError;
use crate::models::{Company, FinancialSnapshot, FINANCIAL_FIELDS};

/// Field separator of an import file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }

    /// Pick the separator that appears most in the header line, comma on a tie
    pub fn detect(header_line: &str) -> Self {
        let tabs = header_line.matches('\t').count();
        let commas = header_line.matches(',').count();
        if tabs > commas {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }
}

impl FromStr for Delimiter {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "," => return Ok(Delimiter::Comma),
            "\t" => return Ok(Delimiter::Tab),
            _ => {}
        }
        match s.trim().to_ascii_lowercase().as_str() {
            "comma" | "csv" => Ok(Delimiter::Comma),
            "tab" | "tsv" | "\\t" => Ok(Delimiter::Tab),
            _ => Err(ImportError::UnsupportedDelimiter {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => f.write_str("comma"),
            Delimiter::Tab => f.write_str("tab"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompanyRow {
    ticker: String,
    name: String,
    sector: String,
}

#[derive(Debug, Deserialize)]
struct FinancialRow {
    ticker: String,
    ebitda: Option<String>,
    sales: Option<String>,
    net_profit: Option<String>,
    market_price: Option<String>,
    net_debt: Option<String>,
    assets: Option<String>,
    equity: Option<String>,
    cash_equivalents: Option<String>,
    liabilities: Option<String>,
}

impl FinancialRow {
    fn into_snapshot(self) -> FinancialSnapshot {
        FinancialSnapshot {
            ticker: self.ticker,
            ebitda: clean_value(&self.ebitda),
            sales: clean_value(&self.sales),
            net_profit: clean_value(&self.net_profit),
            market_price: clean_value(&self.market_price),
            net_debt: clean_value(&self.net_debt),
            assets: clean_value(&self.assets),
            equity: clean_value(&self.equity),
            cash_equivalents: clean_value(&self.cash_equivalents),
            liabilities: clean_value(&self.liabilities),
        }
    }
}

#[derive(Debug, Default)]
pub struct ImportStats {
    pub companies_imported: usize,
    pub snapshots_imported: usize,
    pub undefined_fields: usize,
    pub errors: usize,
}

/// Parse a raw field into a number.
///
/// Empty, non-numeric and non-finite text all become `None`.
pub fn clean_value(value: &Option<String>) -> Option<f64> {
    value.as_deref().and_then(parse_number)
}

/// Parse trimmed text into a finite number
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

const COMPANY_COLUMNS: [&str; 3] = ["ticker", "name", "sector"];

fn reader_for<R: Read>(input: R, delimiter: Delimiter) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .trim(Trim::All)
        .from_reader(input)
}

fn check_columns<R: Read>(
    rdr: &mut csv::Reader<R>,
    source: &str,
    required: &[&str],
) -> Result<(), ImportError> {
    let headers = rdr.headers()?.clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(ImportError::MissingColumn {
                path: source.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Parse a companies file (`ticker`, `name`, `sector` columns)
pub fn read_companies<R: Read>(
    input: R,
    delimiter: Delimiter,
    source: &str,
) -> Result<Vec<Company>, ImportError> {
    let mut rdr = reader_for(input, delimiter);
    check_columns(&mut rdr, source, &COMPANY_COLUMNS)?;

    let mut companies = Vec::new();
    for (index, result) in rdr.deserialize::<CompanyRow>().enumerate() {
        let row = result.map_err(|e| ImportError::Row {
            path: source.to_string(),
            row: index + 1,
            source: e,
        })?;
        companies.push(Company {
            ticker: row.ticker,
            name: row.name,
            sector: row.sector,
        });
    }

    Ok(companies)
}

/// Parse a financial file (`ticker` plus one column per financial figure)
pub fn read_financials<R: Read>(
    input: R,
    delimiter: Delimiter,
    source: &str,
) -> Result<Vec<FinancialSnapshot>, ImportError> {
    let mut rdr = reader_for(input, delimiter);
    let mut required = vec!["ticker"];
    required.extend(FINANCIAL_FIELDS);
    check_columns(&mut rdr, source, &required)?;

    let mut snapshots = Vec::new();
    for (index, result) in rdr.deserialize::<FinancialRow>().enumerate() {
        let row = result.map_err(|e| ImportError::Row {
            path: source.to_string(),
            row: index + 1,
            source: e,
        })?;
        snapshots.push(row.into_snapshot());
    }

    Ok(snapshots)
}

/// Read a whole file and work out its delimiter unless one is forced
fn load_file(path: &str, forced: Option<Delimiter>) -> Result<(String, Delimiter)> {
    if !Path::new(path).exists() {
        return Err(ImportError::FileNotFound {
            path: path.to_string(),
        }
        .into());
    }

    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let delimiter = forced.unwrap_or_else(|| Delimiter::detect(content.lines().next().unwrap_or("")));
    Ok((content, delimiter))
}

/// Rebuild the database from a companies file and a financial file.
///
/// Existing tables are dropped first. Financial rows whose ticker has no
/// company, and repeated tickers after their first row, are skipped and
/// counted as errors.
pub async fn import_dataset(
    db: &DatabaseManager,
    companies_path: &str,
    financial_path: &str,
    delimiter: Option<Delimiter>,
) -> Result<ImportStats> {
    let (companies_text, companies_delimiter) = load_file(companies_path, delimiter)?;
    let (financial_text, financial_delimiter) = load_file(financial_path, delimiter)?;

    let companies = read_companies(companies_text.as_bytes(), companies_delimiter, companies_path)?;
    let snapshots = read_financials(financial_text.as_bytes(), financial_delimiter, financial_path)?;
    info!(
        "Parsed {} companies ({}) and {} snapshots ({})",
        companies.len(),
        companies_delimiter,
        snapshots.len(),
        financial_delimiter
    );

    db.reset_schema().await?;

    let mut stats = ImportStats::default();
    let mut seen = HashSet::new();
    for company in &companies {
        if !seen.insert(company.ticker.as_str()) {
            warn!("Skipping duplicate company row for {}", company.ticker);
            stats.errors += 1;
            continue;
        }
        match db.upsert_company(company).await {
            Ok(()) => stats.companies_imported += 1,
            Err(e) => {
                warn!("Failed to import company {}: {}", company.ticker, e);
                stats.errors += 1;
            }
        }
    }

    seen.clear();
    for snapshot in &snapshots {
        if !seen.insert(snapshot.ticker.as_str()) {
            warn!("Skipping duplicate financial row for {}", snapshot.ticker);
            stats.errors += 1;
            continue;
        }
        match db.upsert_snapshot(snapshot).await {
            Ok(()) => {
                stats.snapshots_imported += 1;
                stats.undefined_fields += snapshot.missing_fields();
            }
            Err(e) => {
                warn!("Failed to import financials for {}: {}", snapshot.ticker, e);
                stats.errors += 1;
            }
        }
    }

    info!(
        "Import finished: {} companies, {} snapshots, {} undefined fields, {} errors",
        stats.companies_imported, stats.snapshots_imported, stats.undefined_fields, stats.errors
    );
    Ok(stats)
}
