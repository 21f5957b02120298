use std::io::Write;

use anyhow::Context;

use crate::processor::AccountId;
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub account: AccountId,
    pub owner: String,
    pub balance: Decimal,
    pub loan: Decimal,
    pub minimum_balance: Decimal,
    pub frozen: bool,
    pub closed: bool,
}

pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl Iterator<Item = AccountSummary>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for acc in accounts {
        let account = acc.account;
        writer
            .serialize(acc)
            .with_context(|| format!("Failed to write summary of account {account}"))?;
    }
    writer.flush().context("Failed to flush account summary")?;
    Ok(())
}
