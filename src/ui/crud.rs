use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::{info, warn};

use super::menu::{field_label, format_value};
use super::MenuSession;
use crate::analysis::{company_ratios, compute_ratios};
use crate::importer::parse_number;
use crate::models::{Company, FinancialSnapshot, FINANCIAL_FIELDS};

impl<R: BufRead, W: Write> MenuSession<R, W> {
    pub(super) async fn create_company(&mut self) -> Result<()> {
        let ticker = self.ask_non_empty("Enter ticker (in the format 'MOON'):")?;
        let name = self.ask_non_empty("Enter company (in the format 'Moon Corp'):")?;
        let sector = self.ask_non_empty("Enter industries (in the format 'Technology'):")?;

        if self.db.get_company(&ticker).await?.is_some() {
            return self.say("Company already exists!");
        }

        let snapshot = self.ask_financials(&ticker)?;
        let company = Company {
            ticker,
            name,
            sector,
        };
        self.db.create_company(&company, &snapshot).await?;

        info!("Created company {}", company.ticker);
        self.say("Company created successfully!")
    }

    pub(super) async fn read_company(&mut self) -> Result<()> {
        let Some(company) = self.select_company().await? else {
            return Ok(());
        };

        let ratios = match company_ratios(&self.db, &company.ticker).await? {
            Some(ratios) => ratios,
            None => {
                warn!("Company {} has no financial snapshot", company.ticker);
                compute_ratios(&FinancialSnapshot::empty(&company.ticker))
            }
        };

        self.say(&format!("{} {}", company.ticker, company.name))?;
        for (kind, value) in ratios.iter() {
            self.say(&format!("{} = {}", kind.label(), format_value(value)))?;
        }
        Ok(())
    }

    pub(super) async fn update_company(&mut self) -> Result<()> {
        let Some(company) = self.select_company().await? else {
            return Ok(());
        };

        let snapshot = self.ask_financials(&company.ticker)?;
        if !self.db.update_snapshot(&snapshot).await? {
            self.db.upsert_snapshot(&snapshot).await?;
        }

        info!("Updated financials of {}", company.ticker);
        self.say("Company updated successfully!")
    }

    pub(super) async fn delete_company(&mut self) -> Result<()> {
        let Some(company) = self.select_company().await? else {
            return Ok(());
        };

        self.db.delete_company(&company.ticker).await?;
        info!("Deleted company {}", company.ticker);
        self.say("Company deleted successfully!")
    }

    pub(super) async fn list_companies(&mut self) -> Result<()> {
        let companies = self.db.list_companies().await?;

        self.say("COMPANY LIST")?;
        for company in companies {
            self.say(&format!("{} {} {}", company.ticker, company.name, company.sector))?;
        }
        Ok(())
    }

    /// Search companies by name and let the user pick one by its list number
    async fn select_company(&mut self) -> Result<Option<Company>> {
        let fragment = self.ask("Enter company name:")?;
        let mut matches = self.db.find_companies_by_name(&fragment).await?;

        if matches.is_empty() {
            self.say("Company not found!")?;
            return Ok(None);
        }

        for (index, company) in matches.iter().enumerate() {
            self.say(&format!("{} {}", index, company.name))?;
        }

        let choice = self.ask("Enter company number:")?;
        match choice.parse::<usize>() {
            Ok(index) if index < matches.len() => Ok(Some(matches.swap_remove(index))),
            _ => {
                self.say("Invalid option!")?;
                Ok(None)
            }
        }
    }

    /// Prompt for every financial figure. An empty answer leaves it undefined.
    fn ask_financials(&mut self, ticker: &str) -> Result<FinancialSnapshot> {
        let mut values = [None; 9];
        for (slot, field) in values.iter_mut().zip(FINANCIAL_FIELDS) {
            *slot = self.ask_number(&format!(
                "Enter {} (in the format '987654321'):",
                field_label(field)
            ))?;
        }
        Ok(FinancialSnapshot::from_values(ticker, values))
    }

    fn ask_number(&mut self, prompt: &str) -> Result<Option<f64>> {
        loop {
            let answer = self.ask(prompt)?;
            if answer.is_empty() {
                return Ok(None);
            }
            match parse_number(&answer) {
                Some(value) => return Ok(Some(value)),
                None => self.say("Invalid number!")?,
            }
        }
    }

    fn ask_non_empty(&mut self, prompt: &str) -> Result<String> {
        loop {
            let answer = self.ask(prompt)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
    }
}
