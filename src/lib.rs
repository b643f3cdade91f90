pub mod analysis;
pub mod database;
pub mod error;
pub mod importer;
pub mod models;
pub mod ui;
