use serde::{Deserialize, Serialize};

use crate::importer::Delimiter;

/// Company listed in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub ticker: String,
    pub name: String,
    pub sector: String,
}

/// Most recent known financials of a company, keyed by ticker.
///
/// Every figure is optional: a field that was empty or not a number in the
/// source data is stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub ticker: String,
    pub ebitda: Option<f64>,
    pub sales: Option<f64>,
    pub net_profit: Option<f64>,
    pub market_price: Option<f64>,
    pub net_debt: Option<f64>,
    pub assets: Option<f64>,
    pub equity: Option<f64>,
    pub cash_equivalents: Option<f64>,
    pub liabilities: Option<f64>,
}

/// Financial fields in the order they are stored, imported and prompted for
pub const FINANCIAL_FIELDS: [&str; 9] = [
    "ebitda",
    "sales",
    "net_profit",
    "market_price",
    "net_debt",
    "assets",
    "equity",
    "cash_equivalents",
    "liabilities",
];

impl FinancialSnapshot {
    /// Snapshot with every figure undefined
    pub fn empty(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            ..Default::default()
        }
    }

    /// Figures in `FINANCIAL_FIELDS` order
    pub fn values(&self) -> [Option<f64>; 9] {
        [
            self.ebitda,
            self.sales,
            self.net_profit,
            self.market_price,
            self.net_debt,
            self.assets,
            self.equity,
            self.cash_equivalents,
            self.liabilities,
        ]
    }

    /// Build a snapshot from figures in `FINANCIAL_FIELDS` order
    pub fn from_values(ticker: &str, values: [Option<f64>; 9]) -> Self {
        let [ebitda, sales, net_profit, market_price, net_debt, assets, equity, cash_equivalents, liabilities] =
            values;
        Self {
            ticker: ticker.to_string(),
            ebitda,
            sales,
            net_profit,
            market_price,
            net_debt,
            assets,
            equity,
            cash_equivalents,
            liabilities,
        }
    }

    /// Number of figures that are undefined
    pub fn missing_fields(&self) -> usize {
        self.values().iter().filter(|v| v.is_none()).count()
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub companies_csv: String,
    pub financial_csv: String,
    /// `None` means the delimiter is detected from each file's header line
    pub import_delimiter: Option<Delimiter>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "investor.db".to_string(),
            companies_csv: "test/companies.csv".to_string(),
            financial_csv: "test/financial.csv".to_string(),
            import_delimiter: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Config::default();
        let import_delimiter = match std::env::var("IMPORT_DELIMITER") {
            Ok(value) if !value.eq_ignore_ascii_case("auto") => Some(value.parse()?),
            _ => None,
        };

        Ok(Config {
            database_path: std::env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            companies_csv: std::env::var("COMPANIES_CSV").unwrap_or(defaults.companies_csv),
            financial_csv: std::env::var("FINANCIAL_CSV").unwrap_or(defaults.financial_csv),
            import_delimiter,
        })
    }
}
