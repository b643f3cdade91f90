pub mod crud;
pub mod menu;
pub mod top_ten;

use std::io::{BufRead, Write};

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info};

use crate::database::DatabaseManager;
use menu::{CrudOption, MainOption, TopTenOption, CRUD_MENU, MAIN_MENU, TOP_TEN_MENU};

/// Raised when the input stream ends in the middle of a session
#[derive(Debug, Error)]
#[error("input closed")]
pub struct InputClosed;

/// One interactive session over a database.
///
/// Input and output are injected so the whole menu can be driven from tests.
pub struct MenuSession<R, W> {
    db: DatabaseManager,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> MenuSession<R, W> {
    pub fn new(db: DatabaseManager, input: R, output: W) -> Self {
        Self { db, input, output }
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.db
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the main menu until the user exits or input ends
    pub async fn run(&mut self) -> Result<()> {
        info!("Menu session started");
        match self.main_loop().await {
            Err(e) if e.is::<InputClosed>() => {
                debug!("Input closed, ending session");
                Ok(())
            }
            other => other,
        }
    }

    async fn main_loop(&mut self) -> Result<()> {
        loop {
            self.say("")?;
            self.say(MAIN_MENU)?;
            let choice = self.ask("Enter an option:")?;

            match MainOption::parse(&choice) {
                Some(MainOption::Exit) => {
                    self.say("Have a nice day!")?;
                    return Ok(());
                }
                Some(MainOption::Crud) => self.crud_menu().await?,
                Some(MainOption::TopTen) => self.top_ten_menu().await?,
                None => self.say("Invalid option!")?,
            }
        }
    }

    async fn crud_menu(&mut self) -> Result<()> {
        self.say("")?;
        self.say(CRUD_MENU)?;
        let choice = self.ask("Enter an option:")?;

        match CrudOption::parse(&choice) {
            Some(CrudOption::Back) => Ok(()),
            Some(CrudOption::Create) => self.create_company().await,
            Some(CrudOption::Read) => self.read_company().await,
            Some(CrudOption::Update) => self.update_company().await,
            Some(CrudOption::Delete) => self.delete_company().await,
            Some(CrudOption::List) => self.list_companies().await,
            None => self.say("Invalid option!"),
        }
    }

    async fn top_ten_menu(&mut self) -> Result<()> {
        self.say("")?;
        self.say(TOP_TEN_MENU)?;
        let choice = self.ask("Enter an option:")?;

        match TopTenOption::parse(&choice) {
            Some(TopTenOption::Back) => Ok(()),
            Some(TopTenOption::Rank(metric)) => self.show_top_ten(metric).await,
            None => self.say("Invalid option!"),
        }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Print a prompt and read one trimmed line
    fn ask(&mut self, prompt: &str) -> Result<String> {
        writeln!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputClosed.into());
        }
        Ok(line.trim().to_string())
    }
}
