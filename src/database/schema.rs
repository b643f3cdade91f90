//! Table definitions for the companies dataset

pub const CREATE_COMPANIES: &str = r#"
    CREATE TABLE IF NOT EXISTS companies (
        ticker TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        sector TEXT NOT NULL
    )
"#;

pub const CREATE_FINANCIAL: &str = r#"
    CREATE TABLE IF NOT EXISTS financial (
        ticker TEXT PRIMARY KEY,
        ebitda REAL,
        sales REAL,
        net_profit REAL,
        market_price REAL,
        net_debt REAL,
        assets REAL,
        equity REAL,
        cash_equivalents REAL,
        liabilities REAL,
        FOREIGN KEY (ticker) REFERENCES companies(ticker)
    )
"#;

// financial first, it references companies
pub const DROP_TABLES: [&str; 2] = [
    "DROP TABLE IF EXISTS financial",
    "DROP TABLE IF EXISTS companies",
];

pub const SNAPSHOT_COLUMNS: &str = "ticker, ebitda, sales, net_profit, market_price, net_debt, \
     assets, equity, cash_equivalents, liabilities";
