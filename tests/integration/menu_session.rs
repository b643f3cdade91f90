//! End-to-end menu sessions driven by scripted input

use std::io::Cursor;

use anyhow::Result;

use crate::common::{database, fixtures, logging, test_data};
use investor_calculator::database::{DatabaseManager, SnapshotRepository};
use investor_calculator::importer::import_dataset;
use investor_calculator::ui::MenuSession;

/// Run a session over `db` feeding it `script`, return everything it printed
async fn run_script(db: &DatabaseManager, script: &str) -> Result<String> {
    let mut session = MenuSession::new(db.clone(), Cursor::new(script.to_string()), Vec::new());
    session.run().await?;
    Ok(String::from_utf8(session.into_output())?)
}

async fn imported_database() -> Result<database::TestDatabase> {
    let test_db = database::init_fresh_test_database().await?;
    let (companies, financial) = fixtures::write_dataset(test_db.dir.path(), ',')?;
    import_dataset(
        &test_db.db,
        &companies.to_string_lossy(),
        &financial.to_string_lossy(),
        None,
    )
    .await?;
    Ok(test_db)
}

#[tokio::test]
async fn test_exit_and_invalid_options() -> Result<()> {
    let test_db = database::init_fresh_test_database().await?;

    let output = run_script(&test_db.db, "7\n1\n9\n2\nx\n0\n").await?;

    assert!(output.contains("MAIN MENU"));
    assert!(output.contains("CRUD MENU"));
    assert!(output.contains("TOP TEN MENU"));
    assert_eq!(output.matches("Invalid option!").count(), 3);
    assert!(output.trim_end().ends_with("Have a nice day!"));
    Ok(())
}

#[tokio::test]
async fn test_end_of_input_ends_session() -> Result<()> {
    let test_db = database::init_fresh_test_database().await?;

    let output = run_script(&test_db.db, "1\n").await?;

    assert!(output.contains("CRUD MENU"));
    assert!(!output.contains("Have a nice day!"));
    Ok(())
}

#[tokio::test]
async fn test_create_then_read_company() -> Result<()> {
    logging::init_test_logging();
    let test_db = database::init_fresh_test_database().await?;

    let script = "\
1
1
MOON
Moon Corp
Technology
100
40
20
10
50
500
200
5
300
1
2
moon
0
0
";
    let output = run_script(&test_db.db, script).await?;

    assert!(output.contains("Enter ticker (in the format 'MOON'):"));
    assert!(output.contains("Enter net profit (in the format '987654321'):"));
    assert!(output.contains("Company created successfully!"));
    assert!(output.contains("0 Moon Corp"));

    let report = "\
MOON Moon Corp
P/E = 0.5
P/S = 0.25
P/B = 0.02
ND/EBITDA = 0.5
ROE = 0.1
ROA = 0.04
L/A = 0.6
";
    assert!(output.contains(report), "unexpected report:\n{}", output);
    Ok(())
}

#[tokio::test]
async fn test_create_with_blank_and_invalid_figures() -> Result<()> {
    let test_db = database::init_fresh_test_database().await?;

    // ebitda left blank, sales first typed wrong
    let script = "1\n1\nNEW\nNew Co\nRetail\n\nabc\n40\n\n\n\n\n\n\n\n0\n";
    let output = run_script(&test_db.db, script).await?;

    assert!(output.contains("Invalid number!"));
    assert!(output.contains("Company created successfully!"));

    let snapshot = test_db.db.get_snapshot("NEW").await?.expect("NEW snapshot");
    assert_eq!(snapshot.ebitda, None);
    assert_eq!(snapshot.sales, Some(40.0));
    assert_eq!(snapshot.missing_fields(), 8);
    Ok(())
}

#[tokio::test]
async fn test_create_existing_ticker_is_rejected() -> Result<()> {
    let test_db = imported_database().await?;

    let output = run_script(&test_db.db, "1\n1\nWMT\nWalmart Again\nRetail\n0\n").await?;

    assert!(output.contains("Company already exists!"));
    let wmt = test_db.db.get_company("WMT").await?.expect("WMT company");
    assert_eq!(wmt.name, "Walmart Inc");
    Ok(())
}

#[tokio::test]
async fn test_read_company_with_undefined_ratios() -> Result<()> {
    let test_db = imported_database().await?;

    let output = run_script(&test_db.db, "1\n2\namazon\n0\n0\n").await?;

    assert!(output.contains("AMZN Amazon.com Inc"));
    assert!(output.contains("P/E = None"));
    assert!(output.contains("ROE = None"));
    assert!(output.contains("ND/EBITDA = 0.71"));
    Ok(())
}

#[tokio::test]
async fn test_read_company_without_snapshot() -> Result<()> {
    let test_db = database::init_fresh_test_database().await?;
    test_db
        .db
        .upsert_company(&test_data::create_test_company("BARE", "Bare Corp"))
        .await?;

    let output = run_script(&test_db.db, "1\n2\nbare\n0\n0\n").await?;

    assert!(output.contains("BARE Bare Corp\nP/E = None\n"));
    assert_eq!(output.matches(" = None").count(), 7);
    Ok(())
}

#[tokio::test]
async fn test_unknown_company_and_bad_selection() -> Result<()> {
    let test_db = imported_database().await?;

    let output = run_script(&test_db.db, "1\n2\nzzz\n1\n4\ninc\n42\n0\n").await?;

    assert!(output.contains("Company not found!"));
    assert!(output.contains("Invalid option!"));
    assert_eq!(test_db.db.get_stats().await?, (5, 5));
    Ok(())
}

#[tokio::test]
async fn test_update_company() -> Result<()> {
    let test_db = imported_database().await?;

    let script = "1\n3\nwalmart\n0\n10\n20\n30\n40\n50\n60\n70\n80\n90\n0\n";
    let output = run_script(&test_db.db, script).await?;

    assert!(output.contains("Company updated successfully!"));
    let wmt = test_db.db.get_snapshot("WMT").await?.expect("WMT snapshot");
    assert_eq!(wmt.ebitda, Some(10.0));
    assert_eq!(wmt.liabilities, Some(90.0));
    Ok(())
}

#[tokio::test]
async fn test_delete_company() -> Result<()> {
    let test_db = imported_database().await?;

    let output = run_script(&test_db.db, "1\n4\ncvs\n0\n0\n").await?;

    assert!(output.contains("Company deleted successfully!"));
    assert!(test_db.db.get_company("CVS").await?.is_none());
    assert!(test_db.db.get_snapshot("CVS").await?.is_none());
    assert_eq!(test_db.db.get_stats().await?, (4, 4));
    Ok(())
}

#[tokio::test]
async fn test_list_all_companies() -> Result<()> {
    let test_db = imported_database().await?;

    let output = run_script(&test_db.db, "1\n5\n0\n").await?;

    let listing = "\
COMPANY LIST
AAPL Apple Inc Technology
AMZN Amazon.com Inc Consumer Cyclical
CVS CVS Health Corp Healthcare
UNH UnitedHealth Group Inc Healthcare
WMT Walmart Inc Consumer Defensive
";
    assert!(output.contains(listing), "unexpected listing:\n{}", output);
    Ok(())
}

#[tokio::test]
async fn test_top_ten_listings() -> Result<()> {
    let test_db = imported_database().await?;

    let output = run_script(&test_db.db, "2\n1\n2\n2\n2\n3\n0\n").await?;

    assert!(output.contains("TICKER ND/EBITDA\nWMT 1.29\nUNH 1.17\nAMZN 0.71\nAAPL 0.0\n"));
    assert!(output.contains("TICKER ROE\nAAPL 1.67\nUNH 0.25\nWMT 0.12\nCVS 0.06\n"));
    assert!(output.contains("TICKER ROA\nAAPL 0.29\nUNH 0.08\nWMT 0.04\nCVS 0.02\n"));
    Ok(())
}

#[tokio::test]
async fn test_top_ten_on_empty_database() -> Result<()> {
    let test_db = database::init_fresh_test_database().await?;

    let output = run_script(&test_db.db, "2\n2\n0\n").await?;

    // Header only
    assert!(output.contains("TICKER ROE\n\nMAIN MENU"));
    Ok(())
}
