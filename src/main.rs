use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use investor_calculator::database::DatabaseManager;
use investor_calculator::importer::{self, Delimiter};
use investor_calculator::models::Config;
use investor_calculator::ui::MenuSession;

#[derive(Debug, Parser)]
#[command(author, version, about = "Financial ratios and top ten rankings for a company dataset")]
struct Cli {
    /// Path to the SQLite database (overrides DATABASE_PATH)
    #[arg(long = "db", value_name = "FILE")]
    database: Option<String>,

    /// Rebuild the database from the companies and financial files before starting
    #[arg(long)]
    import: bool,

    /// Companies file for --import (overrides COMPANIES_CSV)
    #[arg(long, value_name = "FILE")]
    companies: Option<String>,

    /// Financial file for --import (overrides FINANCIAL_CSV)
    #[arg(long, value_name = "FILE")]
    financial: Option<String>,

    /// Field separator of the import files: comma or tab (detected when omitted)
    #[arg(long)]
    delimiter: Option<Delimiter>,

    /// Log filter, e.g. "debug" or "investor_calculator=info" (defaults to RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Exit after --import instead of opening the menu
    #[arg(long, requires = "import")]
    no_menu: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the menu
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("investor_calculator=warn")),
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Configuration Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(path) = cli.database {
        config.database_path = path;
    }
    if let Some(path) = cli.companies {
        config.companies_csv = path;
    }
    if let Some(path) = cli.financial {
        config.financial_csv = path;
    }
    if cli.delimiter.is_some() {
        config.import_delimiter = cli.delimiter;
    }
    info!("Configuration loaded: {:?}", config);

    let database = match DatabaseManager::new(&config.database_path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {:#}", e);
            eprintln!("Database Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if cli.import {
        let stats = importer::import_dataset(
            &database,
            &config.companies_csv,
            &config.financial_csv,
            config.import_delimiter,
        )
        .await?;
        info!(
            "Imported {} companies and {} snapshots",
            stats.companies_imported, stats.snapshots_imported
        );
        if stats.errors > 0 {
            eprintln!("{} rows could not be imported, see the log for details", stats.errors);
        }
        println!("Database created successfully!");

        if cli.no_menu {
            return Ok(());
        }
    }

    let stdin = io::stdin();
    let mut session = MenuSession::new(database, stdin.lock(), io::stdout());
    session.run().await
}
