//! Bootstraps [`crate::processor`] for the binary: reads a CSV script, runs every row
//! through an in-memory ledger and writes the outcome of each command.

use std::io::{Read, Write};

use crate::{
    command::AccountCommand,
    config::LedgerConfig,
    processor::{LedgerError, LedgerProcessor, in_memory_processor::InMemoryLedger},
};
use anyhow::{Context, Result};
use csv_parser::CsvScriptParser;
use csv_printer::{AccountSummary, print_accounts};
use thiserror::Error;
use tracing::info;
pub mod csv_parser;
pub mod csv_printer;

/// Problems with the script itself, as opposed to rejected account operations.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Malformed row: {0}")]
    Parse(#[from] csv::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub config: LedgerConfig,
    /// Append a CSV summary of every account once the script is done.
    pub summary: bool,
    pub error_printer: Box<dyn FnMut(u64, ScriptError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvScriptParser::new(self.input).context("Failed to read script header")?;
        let mut ledger = InMemoryLedger::new(self.config);
        let mut rows = 0usize;

        info!("replaying ledger script");
        for (line, row) in parser {
            rows += 1;
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    (self.error_printer)(line, err.into());
                    continue;
                }
            };
            let result =
                AccountCommand::parse_command(row.op, row.account, row.amount, row.target, row.name)
                    .map_err(LedgerError::from)
                    .and_then(|command| ledger.process(command));
            match result {
                Ok(outcome) => {
                    writeln!(self.output, "{outcome}").context("Failed to write outcome")?
                }
                // rejections are regular outcomes of the script
                Err(LedgerError::AccountErr(err)) => {
                    writeln!(self.output, "{err}").context("Failed to write outcome")?
                }
                Err(err) => (self.error_printer)(line, err.into()),
            }
        }
        info!(rows, "ledger script finished");

        if self.summary {
            writeln!(self.output).context("Failed to write summary")?;
            print_accounts(
                self.output,
                ledger.accounts().map(|(account, acc)| AccountSummary {
                    account,
                    owner: acc.name().to_string(),
                    balance: acc.balance(),
                    loan: acc.loan(),
                    minimum_balance: acc.minimum_balance(),
                    frozen: acc.is_frozen(),
                    closed: acc.is_closed(),
                }),
            )?;
        }
        Ok(())
    }
}
