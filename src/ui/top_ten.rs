use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::debug;

use super::menu::format_value;
use super::MenuSession;
use crate::analysis::{top_ten, Metric};

impl<R: BufRead, W: Write> MenuSession<R, W> {
    pub(super) async fn show_top_ten(&mut self, metric: Metric) -> Result<()> {
        let ranked = top_ten(&self.db, metric).await?;
        debug!("Top ten by {}: {} entries", metric, ranked.len());

        self.say(&format!("TICKER {}", metric.label()))?;
        for entry in ranked {
            self.say(&format!("{} {}", entry.ticker, format_value(Some(entry.value))))?;
        }
        Ok(())
    }
}
